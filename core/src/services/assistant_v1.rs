//! Assistant v1: workspace management and stateless dialog messages.

use std::future::Future;

use crate::client::WatsonClient;
use crate::config::{ServiceConfig, ASSISTANT_DEFAULT_URL, ASSISTANT_V1_VERSION};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::models::assistant_v1::{
    ListWorkspacesOptions, MessageRequest, MessageResponse, UpdateWorkspace, Workspace,
    WorkspaceCollection,
};
use crate::operation::{Arguments, BodyKind, Operation, Param};

pub static LIST_WORKSPACES: Operation = Operation {
    name: "list_workspaces",
    method: HttpMethod::Get,
    path: "/v1/workspaces",
    params: &[
        Param::query("include_count"),
        Param::query("sort"),
        Param::query("include_audit"),
    ],
    body: BodyKind::None,
};

pub static GET_WORKSPACE: Operation = Operation {
    name: "get_workspace",
    method: HttpMethod::Get,
    path: "/v1/workspaces/{workspace_id}",
    params: &[
        Param::path("workspace_id"),
        Param::query("export"),
        Param::query("include_audit"),
    ],
    body: BodyKind::None,
};

pub static UPDATE_WORKSPACE: Operation = Operation {
    name: "update_workspace",
    method: HttpMethod::Post,
    path: "/v1/workspaces/{workspace_id}",
    params: &[Param::path("workspace_id"), Param::query("append")],
    body: BodyKind::Required,
};

pub static DELETE_WORKSPACE: Operation = Operation {
    name: "delete_workspace",
    method: HttpMethod::Delete,
    path: "/v1/workspaces/{workspace_id}",
    params: &[Param::path("workspace_id")],
    body: BodyKind::None,
};

pub static MESSAGE: Operation = Operation {
    name: "message",
    method: HttpMethod::Post,
    path: "/v1/workspaces/{workspace_id}/message",
    params: &[
        Param::path("workspace_id"),
        Param::query("nodes_visited_details"),
    ],
    body: BodyKind::Optional,
};

pub(crate) fn list_workspaces_args(options: &ListWorkspacesOptions) -> Arguments {
    Arguments::new()
        .set_opt("include_count", options.include_count)
        .set_opt("sort", options.sort.as_ref())
        .set_opt("include_audit", options.include_audit)
}

pub(crate) fn get_workspace_args(workspace_id: &str, export: Option<bool>) -> Arguments {
    Arguments::new()
        .set("workspace_id", workspace_id)
        .set_opt("export", export)
}

pub(crate) fn message_args(workspace_id: &str, request: &MessageRequest) -> Arguments {
    Arguments::new()
        .set("workspace_id", workspace_id)
        .json_body(request)
}

#[derive(Debug, Clone)]
pub struct AssistantV1 {
    client: WatsonClient,
}

impl AssistantV1 {
    pub fn new(client: WatsonClient) -> Self {
        Self { client }
    }

    /// Configure from `ASSISTANT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ServiceConfig::from_env("ASSISTANT", ASSISTANT_DEFAULT_URL, ASSISTANT_V1_VERSION)?;
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

    /// Fetch a workspace; `export` includes its training content.
    pub fn get_workspace<'a>(
        &'a self,
        workspace_id: &str,
        export: Option<bool>,
    ) -> impl Future<Output = Result<Workspace>> + Send + 'a {
        self.client.call(&GET_WORKSPACE, get_workspace_args(workspace_id, export))
    }

    /// Apply a partial update. With `append`, new training content is added
    /// to the existing content instead of replacing it.
    pub fn update_workspace<'a>(
        &'a self,
        workspace_id: &str,
        update: &UpdateWorkspace,
        append: Option<bool>,
    ) -> impl Future<Output = Result<Workspace>> + Send + 'a {
        let args = Arguments::new()
            .set("workspace_id", workspace_id)
            .set_opt("append", append)
            .json_body(update);
        self.client.call(&UPDATE_WORKSPACE, args)
    }

    pub fn delete_workspace<'a>(&'a self, workspace_id: &str) -> impl Future<Output = Result<()>> + Send + 'a {
        let args = Arguments::new().set("workspace_id", workspace_id);
        self.client.call_empty(&DELETE_WORKSPACE, args)
    }

    /// Send one user turn to a workspace's dialog.
    pub fn message<'a>(
        &'a self,
        workspace_id: &str,
        request: &MessageRequest,
    ) -> impl Future<Output = Result<MessageResponse>> + Send + 'a {
        self.client.call(&MESSAGE, message_args(workspace_id, request))
    }
}
