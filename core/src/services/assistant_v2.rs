//! Assistant v2: sessions and messages, stateful or stateless.

use std::future::Future;

use crate::client::WatsonClient;
use crate::config::{ServiceConfig, ASSISTANT_DEFAULT_URL, ASSISTANT_V2_VERSION};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::models::assistant_v2::{MessageRequest, MessageResponse, SessionResponse};
use crate::operation::{Arguments, BodyKind, Operation, Param};

pub static CREATE_SESSION: Operation = Operation {
    name: "create_session",
    method: HttpMethod::Post,
    path: "/v2/assistants/{assistant_id}/sessions",
    params: &[Param::path("assistant_id")],
    body: BodyKind::None,
};

pub static DELETE_SESSION: Operation = Operation {
    name: "delete_session",
    method: HttpMethod::Delete,
    path: "/v2/assistants/{assistant_id}/sessions/{session_id}",
    params: &[Param::path("assistant_id"), Param::path("session_id")],
    body: BodyKind::None,
};

pub static MESSAGE: Operation = Operation {
    name: "message",
    method: HttpMethod::Post,
    path: "/v2/assistants/{assistant_id}/sessions/{session_id}/message",
    params: &[Param::path("assistant_id"), Param::path("session_id")],
    body: BodyKind::Optional,
};

pub static MESSAGE_STATELESS: Operation = Operation {
    name: "message_stateless",
    method: HttpMethod::Post,
    path: "/v2/assistants/{assistant_id}/message",
    params: &[Param::path("assistant_id")],
    body: BodyKind::Optional,
};

#[derive(Debug, Clone)]
pub struct AssistantV2 {
    client: WatsonClient,
}

impl AssistantV2 {
    pub fn new(client: WatsonClient) -> Self {
        Self { client }
    }

    /// Configure from `ASSISTANT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ServiceConfig::from_env("ASSISTANT", ASSISTANT_DEFAULT_URL, ASSISTANT_V2_VERSION)?;
        Ok(Self::new(WatsonClient::from_config(config)?))
    }

    pub fn client(&self) -> &WatsonClient {
        &self.client
    }

    pub fn create_session<'a>(&'a self, assistant_id: &str) -> impl Future<Output = Result<SessionResponse>> + Send + 'a {
        let args = Arguments::new().set("assistant_id", assistant_id);
        self.client.call(&CREATE_SESSION, args)
    }

    pub fn delete_session<'a>(
        &'a self,
        assistant_id: &str,
        session_id: &str,
    ) -> impl Future<Output = Result<()>> + Send + 'a {
        let args = Arguments::new()
            .set("assistant_id", assistant_id)
            .set("session_id", session_id);
        self.client.call_empty(&DELETE_SESSION, args)
    }

    /// Send one user turn within a session. The service keeps the context.
    pub fn message<'a>(
        &'a self,
        assistant_id: &str,
        session_id: &str,
        request: &MessageRequest,
    ) -> impl Future<Output = Result<MessageResponse>> + Send + 'a {
        let args = Arguments::new()
            .set("assistant_id", assistant_id)
            .set("session_id", session_id)
            .json_body(request);
        self.client.call(&MESSAGE, args)
    }

    /// Send one user turn without a session. The caller carries the context
    /// from one response into the next request.
    pub fn message_stateless<'a>(
        &'a self,
        assistant_id: &str,
        request: &MessageRequest,
    ) -> impl Future<Output = Result<MessageResponse>> + Send + 'a {
        let args = Arguments::new()
            .set("assistant_id", assistant_id)
            .json_body(request);
        self.client.call(&MESSAGE_STATELESS, args)
    }
}
