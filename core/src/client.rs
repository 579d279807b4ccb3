//! Generic request builder and response mapper shared by every service.
//!
//! # Design
//! `WatsonClient` holds a parsed base URL, the API version date, static
//! credentials and a `Transport` handle, and carries no mutable state
//! between calls. Each call is split in two: `build_request` produces an
//! `HttpRequest` and `parse_response` consumes an `HttpResponse`, so a host
//! with its own HTTP stack can drive the client without a `Transport`.
//! `call` glues the halves together around exactly one `Transport::send`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::config::ServiceConfig;
use crate::error::{Result, WatsonError};
use crate::http::{HttpRequest, HttpResponse};
use crate::operation::{Arguments, Operation};
use crate::transport::{ReqwestTransport, Transport};

#[derive(Clone)]
pub struct WatsonClient {
    base_url: Url,
    version: String,
    credentials: Option<Credentials>,
    headers: Vec<(String, String)>,
    transport: Arc<dyn Transport>,
}

impl WatsonClient {
    /// Client over an explicit transport. Fails if `base_url` does not parse.
    pub fn new(config: ServiceConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| WatsonError::Config(format!("invalid base URL `{}`: {e}", config.base_url)))?;
        let mut headers = config.headers;
        if config.learning_opt_out {
            headers.push(("x-watson-learning-opt-out".to_string(), "true".to_string()));
        }
        Ok(Self {
            base_url,
            version: config.version,
            credentials: config.credentials,
            headers,
            transport,
        })
    }

    /// Client over a `ReqwestTransport` honouring `config.timeout`.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::new(config, Arc::new(transport))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Validate `args` and build the request, credentials and client-level
    /// headers included.
    pub fn build_request(&self, op: &Operation, args: &Arguments) -> Result<HttpRequest> {
        let mut request = op.build_request(&self.base_url, &self.version, args)?;
        if let Some(credentials) = &self.credentials {
            request
                .headers
                .push(("authorization".to_string(), credentials.header_value()));
        }
        request.headers.extend(self.headers.iter().cloned());
        Ok(request)
    }

    pub fn parse_response<T: DeserializeOwned>(&self, op: &Operation, response: HttpResponse) -> Result<T> {
        op.parse_response(response).inspect_err(|e| log_failure(op, e))
    }

    pub fn parse_empty(&self, op: &Operation, response: HttpResponse) -> Result<()> {
        op.parse_empty(response).inspect_err(|e| log_failure(op, e))
    }

    /// Perform `op` and decode the response body as `T`.
    ///
    /// The request is built before the returned future is first polled, so
    /// argument errors are detected without any I/O.
    pub fn call<T>(&self, op: &'static Operation, args: Arguments) -> impl Future<Output = Result<T>> + Send + '_
    where
        T: DeserializeOwned + Send,
    {
        let prepared = self.build_request(op, &args);
        async move {
            let response = self.exchange(op, prepared?).await?;
            self.parse_response(op, response)
        }
    }

    /// Perform `op`, discarding the success body.
    pub fn call_empty(&self, op: &'static Operation, args: Arguments) -> impl Future<Output = Result<()>> + Send + '_ {
        let prepared = self.build_request(op, &args);
        async move {
            let response = self.exchange(op, prepared?).await?;
            self.parse_empty(op, response)
        }
    }

    async fn exchange(&self, op: &Operation, request: HttpRequest) -> Result<HttpResponse> {
        debug!(
            operation = op.name,
            method = request.method.as_str(),
            url = %request.url,
            "sending request"
        );
        let response = self.transport.send(request).await?;
        debug!(operation = op.name, status = response.status, "response received");
        Ok(response)
    }
}

fn log_failure(op: &Operation, error: &WatsonError) {
    match error {
        WatsonError::Remote { status, .. } => {
            warn!(operation = op.name, status, message = ?error.remote_message(), "service returned an error");
        }
        other => warn!(operation = op.name, error = %other, "response could not be decoded"),
    }
}

impl fmt::Debug for WatsonClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatsonClient")
            .field("base_url", &self.base_url.as_str())
            .field("version", &self.version)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;

    use crate::config::ASSISTANT_V2_VERSION;
    use crate::http::HttpMethod;
    use crate::operation::{BodyKind, Param};

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Err(WatsonError::Transport("connection refused".to_string()))
        }
    }

    static GET_WIDGET: Operation = Operation {
        name: "get_widget",
        method: HttpMethod::Get,
        path: "/v2/widgets/{widget_id}",
        params: &[Param::path("widget_id")],
        body: BodyKind::None,
    };

    #[derive(Debug, Deserialize)]
    struct Widget {
        id: String,
    }

    fn client(config: ServiceConfig) -> WatsonClient {
        WatsonClient::new(config, Arc::new(Unreachable)).unwrap()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let c = client(ServiceConfig::new("http://localhost:3000/", ASSISTANT_V2_VERSION));
        let req = c
            .build_request(&GET_WIDGET, &Arguments::new().set("widget_id", "w"))
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/v2/widgets/w?version=2021-06-14"
        );
    }

    #[test]
    fn credentials_and_client_headers_are_attached() {
        let config = ServiceConfig::new("http://localhost:3000", ASSISTANT_V2_VERSION)
            .with_credentials(Credentials::Bearer("tok".to_string()))
            .with_learning_opt_out(true)
            .with_header("X-Trace", "1");
        let req = client(config)
            .build_request(&GET_WIDGET, &Arguments::new().set("widget_id", "w"))
            .unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        assert_eq!(req.header("x-watson-learning-opt-out"), Some("true"));
        assert_eq!(req.header("x-trace"), Some("1"));
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = WatsonClient::new(ServiceConfig::new("not a url", "v"), Arc::new(Unreachable)).unwrap_err();
        assert!(matches!(err, WatsonError::Config(_)));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = ServiceConfig::new("http://localhost:3000", "v")
            .with_credentials(Credentials::ApiKey("s3cret".to_string()));
        let rendered = format!("{:?}", client(config));
        assert!(rendered.contains("localhost"));
        assert!(!rendered.contains("s3cret"));
    }

    #[tokio::test]
    async fn transport_failure_is_not_a_remote_error() {
        let c = client(ServiceConfig::new("http://localhost:3000", "v"));
        let err = c
            .call::<Widget>(&GET_WIDGET, Arguments::new().set("widget_id", "w"))
            .await
            .unwrap_err();
        assert!(matches!(err, WatsonError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn parse_response_decodes_success_body() {
        let c = client(ServiceConfig::new("http://localhost:3000", "v"));
        let widget: Widget = c
            .parse_response(&GET_WIDGET, HttpResponse::new(200, r#"{"id":"w"}"#))
            .unwrap();
        assert_eq!(widget.id, "w");
    }
}
