//! Conversation v1, the predecessor of Assistant v1. Same paths and wire
//! format, older version date and endpoint.

use std::future::Future;

use crate::client::WatsonClient;
use crate::config::{ServiceConfig, CONVERSATION_DEFAULT_URL, CONVERSATION_V1_VERSION};
use crate::error::Result;
use crate::models::assistant_v1::{
    ListWorkspacesOptions, MessageRequest, MessageResponse, Workspace, WorkspaceCollection,
};
use crate::services::assistant_v1::{
    get_workspace_args, list_workspaces_args, message_args, GET_WORKSPACE, LIST_WORKSPACES, MESSAGE,
};

#[derive(Debug, Clone)]
pub struct ConversationV1 {
    client: WatsonClient,
}

impl ConversationV1 {
    pub fn new(client: WatsonClient) -> Self {
        Self { client }
    }

    /// Configure from `CONVERSATION_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ServiceConfig::from_env(
            "CONVERSATION",
            CONVERSATION_DEFAULT_URL,
            CONVERSATION_V1_VERSION,
        )?;
        Ok(Self::new(WatsonClient::from_config(config)?))
    }

    pub fn client(&self) -> &WatsonClient {
        &self.client
    }

    pub fn list_workspaces(
        &self,
        options: &ListWorkspacesOptions,
    ) -> impl Future<Output = Result<WorkspaceCollection>> + Send + '_ {
        self.client.call(&LIST_WORKSPACES, list_workspaces_args(options))
    }

    pub fn get_workspace<'a>(
        &'a self,
        workspace_id: &str,
        export: Option<bool>,
    ) -> impl Future<Output = Result<Workspace>> + Send + 'a {
        self.client.call(&GET_WORKSPACE, get_workspace_args(workspace_id, export))
    }

    pub fn message<'a>(
        &'a self,
        workspace_id: &str,
        request: &MessageRequest,
    ) -> impl Future<Output = Result<MessageResponse>> + Send + 'a {
        self.client.call(&MESSAGE, message_args(workspace_id, request))
    }
}
