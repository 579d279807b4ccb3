//! Stub transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use watson_core::{Credentials, HttpRequest, HttpResponse, ServiceConfig, Transport, WatsonClient, WatsonError};

pub const BASE_URL: &str = "https://watson.test/api";
pub const VERSION: &str = "2021-06-14";

/// Replays queued responses in order and records every request it sees.
/// Running out of responses is reported as a transport failure.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replying(responses: impl IntoIterator<Item = HttpResponse>) -> Arc<Self> {
        let stub = Self::default();
        stub.responses.lock().unwrap().extend(responses);
        Arc::new(stub)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WatsonError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| WatsonError::Transport("no stubbed response left".to_string()))
    }
}

pub fn config() -> ServiceConfig {
    ServiceConfig::new(BASE_URL, VERSION).with_credentials(Credentials::ApiKey("test-key".to_string()))
}

pub fn client(transport: Arc<StubTransport>) -> WatsonClient {
    WatsonClient::new(config(), transport).unwrap()
}
