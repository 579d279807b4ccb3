//! Runtime message types shared by Assistant v1, Assistant v2 and
//! Conversation v1.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::decode::{deserialize_polymorphic, variant, Polymorphic, VariantTable};
use crate::field::Field;

/// An intent recognized in the user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeIntent {
    pub intent: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}

/// An entity value recognized in the user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEntity {
    pub entity: String,
    /// Start and end character offsets of the mention.
    pub location: Vec<u32>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<CaptureGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureGroup {
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseGenericChannel {
    pub channel: String,
}

/// One choice of an `option` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogNodeOutputOptionsElement {
    pub label: String,
    /// The input to send back when the option is picked.
    pub value: Value,
}

/// One entry of a `suggestion` (disambiguation) response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogSuggestion {
    pub label: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_node: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ResponseGenericChannel>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericPause {
    /// Milliseconds.
    pub time: u32,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub typing: Field<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ResponseGenericChannel>>,
}

/// Shared shape of the `image`, `video`, `audio` and `iframe` responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericMedia {
    pub source: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub alt_text: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub image_url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub channel_options: Field<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ResponseGenericChannel>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericOption {
    pub title: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    /// `dropdown` or `button`.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub preference: Field<String>,
    pub options: Vec<DialogNodeOutputOptionsElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ResponseGenericChannel>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericConnectToAgent {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub message_to_human_agent: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub agent_available: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub agent_unavailable: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub transfer_info: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub topic: Field<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ResponseGenericChannel>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericSuggestion {
    pub title: String,
    pub suggestions: Vec<DialogSuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ResponseGenericChannel>>,
}

/// Search skill results. v1 answers with `results`, v2 with
/// `primary_results` and `additional_results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericSearch {
    pub header: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub results: Field<Vec<SearchResult>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub primary_results: Field<Vec<SearchResult>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub additional_results: Field<Vec<SearchResult>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericChannelTransfer {
    pub message_to_user: String,
    pub transfer_info: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ResponseGenericChannel>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericUserDefined {
    pub user_defined: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ResponseGenericChannel>>,
}

/// One element of `output.generic`, keyed by `response_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "response_type", rename_all = "snake_case")]
pub enum RuntimeResponseGeneric {
    Text(GenericText),
    Pause(GenericPause),
    Image(GenericMedia),
    Option(GenericOption),
    ConnectToAgent(GenericConnectToAgent),
    Suggestion(GenericSuggestion),
    Search(GenericSearch),
    ChannelTransfer(GenericChannelTransfer),
    UserDefined(GenericUserDefined),
    Video(GenericMedia),
    Audio(GenericMedia),
    Iframe(GenericMedia),
}

static RESPONSE_GENERIC_VARIANTS: VariantTable<RuntimeResponseGeneric> = VariantTable::new(
    "RuntimeResponseGeneric",
    "response_type",
    &[
        ("text", |v| variant(v).map(RuntimeResponseGeneric::Text)),
        ("pause", |v| variant(v).map(RuntimeResponseGeneric::Pause)),
        ("image", |v| variant(v).map(RuntimeResponseGeneric::Image)),
        ("option", |v| variant(v).map(RuntimeResponseGeneric::Option)),
        ("connect_to_agent", |v| variant(v).map(RuntimeResponseGeneric::ConnectToAgent)),
        ("suggestion", |v| variant(v).map(RuntimeResponseGeneric::Suggestion)),
        ("search", |v| variant(v).map(RuntimeResponseGeneric::Search)),
        ("channel_transfer", |v| variant(v).map(RuntimeResponseGeneric::ChannelTransfer)),
        ("user_defined", |v| variant(v).map(RuntimeResponseGeneric::UserDefined)),
        ("video", |v| variant(v).map(RuntimeResponseGeneric::Video)),
        ("audio", |v| variant(v).map(RuntimeResponseGeneric::Audio)),
        ("iframe", |v| variant(v).map(RuntimeResponseGeneric::Iframe)),
    ],
);

impl Polymorphic for RuntimeResponseGeneric {
    fn variants() -> &'static VariantTable<Self> {
        &RESPONSE_GENERIC_VARIANTS
    }
}

impl<'de> Deserialize<'de> for RuntimeResponseGeneric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_polymorphic(deserializer)
    }
}

impl RuntimeResponseGeneric {
    /// The `response_type` this value encodes to.
    pub fn response_type(&self) -> &'static str {
        match self {
            RuntimeResponseGeneric::Text(_) => "text",
            RuntimeResponseGeneric::Pause(_) => "pause",
            RuntimeResponseGeneric::Image(_) => "image",
            RuntimeResponseGeneric::Option(_) => "option",
            RuntimeResponseGeneric::ConnectToAgent(_) => "connect_to_agent",
            RuntimeResponseGeneric::Suggestion(_) => "suggestion",
            RuntimeResponseGeneric::Search(_) => "search",
            RuntimeResponseGeneric::ChannelTransfer(_) => "channel_transfer",
            RuntimeResponseGeneric::UserDefined(_) => "user_defined",
            RuntimeResponseGeneric::Video(_) => "video",
            RuntimeResponseGeneric::Audio(_) => "audio",
            RuntimeResponseGeneric::Iframe(_) => "iframe",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            RuntimeResponseGeneric::Text(t) => Some(&t.text),
            _ => None,
        }
    }
}
