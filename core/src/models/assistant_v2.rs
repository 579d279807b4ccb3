//! Assistant v2 session and message models, including the debug turn
//! events.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::decode::{deserialize_polymorphic, variant, Polymorphic, VariantTable};
use crate::field::Field;
use crate::models::runtime::{RuntimeEntity, RuntimeIntent, RuntimeResponseGeneric};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInput {
    /// `text` (the default) or `search`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<RuntimeIntent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<RuntimeEntity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<MessageInputOptions>,
}

impl MessageInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: MessageInputOptions) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInputOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_intents: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_context: Option<bool>,
    /// Ask for `output.debug`, including the turn events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<MessageContextGlobal>,
    /// Per-skill state, keyed by skill name (`main skill`, `actions skill`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContextGlobal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<MessageContextGlobalSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContextGlobalSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<MessageInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl MessageRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            input: Some(MessageInput::text(text)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub output: MessageOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic: Option<Vec<RuntimeResponseGeneric>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<RuntimeIntent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<RuntimeEntity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<MessageOutputDebug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_defined: Option<Map<String, Value>>,
}

impl MessageOutput {
    /// Text of every `text` response, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.generic.iter().flatten().filter_map(RuntimeResponseGeneric::text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageOutputDebug {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes_visited: Option<Vec<DialogNodeVisited>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_messages: Option<Vec<DialogLogMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_exited: Option<bool>,
    /// `completed` or `fallback`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_exited_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_events: Option<Vec<TurnEvent>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogNodeVisited {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogLogMessage {
    pub level: String,
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Map<String, Value>>,
}

/// What a turn event refers to: a dialog node or an action step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnEventSource {
    /// `dialog_node` or `action`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEventCallout {
    /// `client`, `cloud_function`, `integration_interaction` or `webhook`.
    #[serde(rename = "type")]
    pub callout_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEventCalloutError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEventSearchError {
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeVisited {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    /// `welcome`, `branch_start`, `topic_switch`, `topic_return`,
    /// `topic_switch_without_return` or `jump`.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub reason: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub callout: Field<TurnEventCallout>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub error: Field<TurnEventCalloutError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Search {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub error: Field<TurnEventSearchError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionVisited {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub action_start_time: Field<String>,
    /// `user_defined`, `welcome` or `anything_else`.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub condition_type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub reason: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub result_variable: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionFinished {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub action_start_time: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub condition_type: Field<String>,
    /// `all_steps_done`, `no_steps_visited`, `ended_by_step`, ...
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub reason: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub action_variables: Field<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepVisited {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub condition_type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub action_start_time: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub has_question: Field<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepAnswered {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub condition_type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub action_start_time: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub prompted: Field<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerVisited {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub action_start_time: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicSwitchDenied {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<TurnEventSource>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub condition_type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub action_start_time: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub reason: Field<String>,
}

/// One entry of `output.debug.turn_events`, keyed by `event`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    NodeVisited(NodeVisited),
    Callout(Callout),
    Search(Search),
    ActionVisited(ActionVisited),
    ActionFinished(ActionFinished),
    StepVisited(StepVisited),
    StepAnswered(StepAnswered),
    HandlerVisited(HandlerVisited),
    TopicSwitchDenied(TopicSwitchDenied),
}

static TURN_EVENT_VARIANTS: VariantTable<TurnEvent> = VariantTable::new(
    "TurnEvent",
    "event",
    &[
        ("node_visited", |v| variant(v).map(TurnEvent::NodeVisited)),
        ("callout", |v| variant(v).map(TurnEvent::Callout)),
        ("search", |v| variant(v).map(TurnEvent::Search)),
        ("action_visited", |v| variant(v).map(TurnEvent::ActionVisited)),
        ("action_finished", |v| variant(v).map(TurnEvent::ActionFinished)),
        ("step_visited", |v| variant(v).map(TurnEvent::StepVisited)),
        ("step_answered", |v| variant(v).map(TurnEvent::StepAnswered)),
        ("handler_visited", |v| variant(v).map(TurnEvent::HandlerVisited)),
        ("topic_switch_denied", |v| variant(v).map(TurnEvent::TopicSwitchDenied)),
    ],
);

impl Polymorphic for TurnEvent {
    fn variants() -> &'static VariantTable<Self> {
        &TURN_EVENT_VARIANTS
    }
}

impl<'de> Deserialize<'de> for TurnEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_polymorphic(deserializer)
    }
}

impl TurnEvent {
    pub fn event(&self) -> &'static str {
        match self {
            TurnEvent::NodeVisited(_) => "node_visited",
            TurnEvent::Callout(_) => "callout",
            TurnEvent::Search(_) => "search",
            TurnEvent::ActionVisited(_) => "action_visited",
            TurnEvent::ActionFinished(_) => "action_finished",
            TurnEvent::StepVisited(_) => "step_visited",
            TurnEvent::StepAnswered(_) => "step_answered",
            TurnEvent::HandlerVisited(_) => "handler_visited",
            TurnEvent::TopicSwitchDenied(_) => "topic_switch_denied",
        }
    }

    pub fn source(&self) -> Option<&TurnEventSource> {
        let source = match self {
            TurnEvent::NodeVisited(e) => &e.source,
            TurnEvent::Callout(e) => &e.source,
            TurnEvent::Search(e) => &e.source,
            TurnEvent::ActionVisited(e) => &e.source,
            TurnEvent::ActionFinished(e) => &e.source,
            TurnEvent::StepVisited(e) => &e.source,
            TurnEvent::StepAnswered(e) => &e.source,
            TurnEvent::HandlerVisited(e) => &e.source,
            TurnEvent::TopicSwitchDenied(e) => &e.source,
        };
        source.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode, DecodeError};
    use serde_json::json;

    #[test]
    fn node_visited_with_reason() {
        let event: TurnEvent = decode(json!({"event": "node_visited", "reason": "welcome"})).unwrap();
        let TurnEvent::NodeVisited(visited) = &event else {
            panic!("expected node_visited, got {}", event.event());
        };
        assert_eq!(visited.reason, Field::Present("welcome".to_string()));
        assert!(visited.source.is_absent());
        assert!(event.source().is_none());
    }

    #[test]
    fn unknown_event_is_a_decode_error() {
        let err = decode::<TurnEvent>(json!({"event": "unknown_kind"})).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownVariant { ref value, .. } if value == "unknown_kind"));
    }

    #[test]
    fn callout_populates_nested_fields() {
        let event: TurnEvent = decode(json!({
            "event": "callout",
            "source": {"type": "dialog_node", "dialog_node": "node_3"},
            "callout": {"type": "webhook", "result_variable": "webhook_result_1"},
            "error": {"message": "timed out"}
        }))
        .unwrap();
        let TurnEvent::Callout(callout) = &event else {
            panic!("expected callout");
        };
        assert_eq!(callout.callout.value().unwrap().callout_type, "webhook");
        assert_eq!(callout.error.value().unwrap().message, "timed out");
        assert_eq!(event.source().unwrap().dialog_node.as_deref(), Some("node_3"));
    }

    #[test]
    fn every_variant_round_trips() {
        let docs = [
            json!({"event": "node_visited", "source": {"type": "dialog_node", "dialog_node": "n1"}, "reason": "jump"}),
            json!({"event": "callout", "callout": {"type": "client"}}),
            json!({"event": "search", "error": {"message": "no index"}}),
            json!({"event": "action_visited", "source": {"type": "action", "action": "a1"}, "reason": "intent", "condition_type": "user_defined"}),
            json!({"event": "action_finished", "reason": "all_steps_done", "action_variables": {"size": "L"}}),
            json!({"event": "step_visited", "has_question": true}),
            json!({"event": "step_answered", "prompted": false, "action_start_time": "2021-06-14T10:00:00Z"}),
            json!({"event": "handler_visited", "source": {"type": "action", "action": "a1", "action_title": "Order"}}),
            json!({"event": "topic_switch_denied", "reason": null}),
        ];
        for doc in docs {
            let event: TurnEvent = decode(doc.clone()).unwrap();
            assert_eq!(event.event(), doc["event"]);
            assert_eq!(serde_json::to_value(&event).unwrap(), doc);
        }
    }

    #[test]
    fn explicit_null_survives_round_trip() {
        let event: TurnEvent = decode(json!({"event": "topic_switch_denied", "reason": null})).unwrap();
        let TurnEvent::TopicSwitchDenied(denied) = &event else {
            panic!("expected topic_switch_denied");
        };
        assert!(denied.reason.is_null());
        assert!(denied.source.is_absent());
    }

    #[test]
    fn message_response_with_debug_events() {
        let response: MessageResponse = serde_json::from_value(json!({
            "output": {
                "generic": [{"response_type": "text", "text": "Welcome"}],
                "intents": [],
                "entities": [],
                "debug": {
                    "nodes_visited": [{"dialog_node": "welcome", "title": "Welcome"}],
                    "branch_exited": true,
                    "branch_exited_reason": "completed",
                    "turn_events": [{"event": "node_visited", "reason": "welcome"}]
                }
            },
            "context": {"global": {"system": {"turn_count": 1}, "session_id": "s1"}}
        }))
        .unwrap();
        assert_eq!(response.output.texts().collect::<Vec<_>>(), ["Welcome"]);
        let debug = response.output.debug.unwrap();
        assert_eq!(debug.turn_events.map(|events| events.len()), Some(1));
        assert_eq!(
            response.context.unwrap().global.unwrap().system.unwrap().turn_count,
            Some(1)
        );
    }

    #[test]
    fn request_omits_unset_fields() {
        let request = MessageRequest::text("hello");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"input": {"text": "hello"}})
        );
    }

    #[test]
    fn output_without_lists_stays_without_lists() {
        let doc = json!({"output": {}});
        let response: MessageResponse = serde_json::from_value(doc.clone()).unwrap();
        assert!(response.output.generic.is_none());
        assert_eq!(serde_json::to_value(&response).unwrap(), doc);
    }

    #[test]
    fn whole_response_round_trips_with_empty_lists() {
        let doc = json!({
            "output": {
                "generic": [
                    {"response_type": "text", "text": "Hi", "channels": []},
                    {"response_type": "pause", "time": 300, "typing": null}
                ],
                "intents": [],
                "entities": [{"entity": "size", "location": [0, 5], "value": "large", "groups": []}],
                "debug": {"nodes_visited": [], "turn_events": [{"event": "node_visited", "reason": "welcome"}]}
            },
            "context": {"global": {"session_id": "s1"}}
        });
        let response: MessageResponse = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(response.output.intents.as_deref(), Some(&[][..]));
        assert_eq!(serde_json::to_value(&response).unwrap(), doc);
    }
}
