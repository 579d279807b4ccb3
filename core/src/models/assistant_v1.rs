//! Assistant v1 workspace and message models. Conversation v1 speaks the
//! same wire format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::Field;
use crate::models::runtime::{RuntimeEntity, RuntimeIntent, RuntimeResponseGeneric};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spelling_suggestions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spelling_auto_correct: Option<bool>,
    /// Set by the service when spelling correction changed the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl MessageInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Conversation state. Dialog skills add their own context variables, which
/// are kept in `variables`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageContextMetadata>,
    #[serde(flatten)]
    pub variables: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContextMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<MessageInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<RuntimeIntent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<RuntimeEntity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_intents: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputData>,
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

    /// Continue the conversation described by a previous response.
    pub fn follow_up(previous: &MessageResponse, text: impl Into<String>) -> Self {
        Self {
            input: Some(MessageInput::text(text)),
            context: Some(previous.context.clone()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub input: MessageInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<RuntimeIntent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<RuntimeEntity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_intents: Option<bool>,
    pub context: Context,
    pub output: OutputData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<DialogNodeAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl MessageResponse {
    /// The `text` responses joined with newlines.
    pub fn text(&self) -> String {
        self.output.text.as_deref().unwrap_or_default().join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes_visited: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes_visited_details: Option<Vec<DialogNodeVisitedDetails>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_messages: Option<Vec<LogMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic: Option<Vec<RuntimeResponseGeneric>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogNodeVisitedDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    /// `info`, `error` or `warn`.
    pub level: String,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A client or server action requested by a dialog node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogNodeAction {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    pub result_variable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

/// Training status of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkspaceStatus {
    NonExistent,
    Training,
    Failed,
    Available,
    Unavailable,
    /// A status this client does not know about, kept as sent.
    Unrecognized(String),
}

impl WorkspaceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            WorkspaceStatus::NonExistent => "Non Existent",
            WorkspaceStatus::Training => "Training",
            WorkspaceStatus::Failed => "Failed",
            WorkspaceStatus::Available => "Available",
            WorkspaceStatus::Unavailable => "Unavailable",
            WorkspaceStatus::Unrecognized(other) => other,
        }
    }
}

impl From<String> for WorkspaceStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "Non Existent" => WorkspaceStatus::NonExistent,
            "Training" => WorkspaceStatus::Training,
            "Failed" => WorkspaceStatus::Failed,
            "Available" => WorkspaceStatus::Available,
            "Unavailable" => WorkspaceStatus::Unavailable,
            _ => WorkspaceStatus::Unrecognized(status),
        }
    }
}

impl From<WorkspaceStatus> for String {
    fn from(status: WorkspaceStatus) -> Self {
        match status {
            WorkspaceStatus::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkspaceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_opt_out: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Present only when the workspace is fetched with `export=true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<Intent>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Example>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceCollection {
    pub workspaces: Vec<Workspace>,
}

/// Partial workspace update. `Absent` leaves a property unchanged, `Null`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateWorkspace {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub language: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub metadata: Field<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub learning_opt_out: Field<bool>,
}

/// Query options for listing workspaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListWorkspacesOptions {
    pub include_count: Option<bool>,
    /// `name` or `updated`, optionally prefixed with `-` for descending.
    pub sort: Option<String>,
    pub include_audit: Option<bool>,
}
