//! Service configuration: endpoints, API version dates and credentials.

use std::time::Duration;

use crate::auth::Credentials;
use crate::error::{Result, WatsonError};

/// API version dates sent as the `version` query parameter.
pub const ASSISTANT_V1_VERSION: &str = "2021-06-14";
pub const ASSISTANT_V2_VERSION: &str = "2021-06-14";
pub const CONVERSATION_V1_VERSION: &str = "2017-05-26";
pub const VISUAL_RECOGNITION_V3_VERSION: &str = "2018-03-19";

pub const ASSISTANT_DEFAULT_URL: &str = "https://api.us-south.assistant.watson.cloud.ibm.com";
pub const CONVERSATION_DEFAULT_URL: &str = "https://gateway.watsonplatform.net/conversation/api";
pub const VISUAL_RECOGNITION_DEFAULT_URL: &str =
    "https://api.us-south.visual-recognition.watson.cloud.ibm.com";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything a `WatsonClient` needs besides its transport.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub version: String,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    /// Ask the service not to use request data for training.
    pub learning_opt_out: bool,
    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            version: version.into(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            learning_opt_out: false,
            headers: Vec::new(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_learning_opt_out(mut self, opt_out: bool) -> Self {
        self.learning_opt_out = opt_out;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Read `<PREFIX>_*` variables from the process environment.
    ///
    /// See [`ServiceConfig::from_lookup`] for the variables consulted.
    pub fn from_env(prefix: &str, default_url: &str, default_version: &str) -> Result<Self> {
        Self::from_lookup(prefix, default_url, default_version, |key| std::env::var(key).ok())
    }

    /// Build a config from `<PREFIX>_URL`, `<PREFIX>_VERSION`,
    /// `<PREFIX>_APIKEY`, `<PREFIX>_BEARER_TOKEN`, `<PREFIX>_USERNAME` /
    /// `<PREFIX>_PASSWORD`, `<PREFIX>_TIMEOUT_SECS` and
    /// `<PREFIX>_LEARNING_OPT_OUT`, resolved through `lookup`.
    ///
    /// Credential precedence: API key, then bearer token, then username and
    /// password.
    pub fn from_lookup<F>(
        prefix: &str,
        default_url: &str,
        default_version: &str,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{prefix}_{name}")).filter(|value| !value.trim().is_empty())
        };

        let base_url = var("URL").unwrap_or_else(|| default_url.to_string());
        let version = var("VERSION").unwrap_or_else(|| default_version.to_string());
        let mut config = Self::new(base_url, version);

        config.credentials = match (var("APIKEY"), var("BEARER_TOKEN"), var("USERNAME")) {
            (Some(key), _, _) => Some(Credentials::ApiKey(key)),
            (None, Some(token), _) => Some(Credentials::Bearer(token)),
            (None, None, Some(username)) => {
                let password = var("PASSWORD").ok_or_else(|| {
                    WatsonError::Config(format!("{prefix}_USERNAME is set but {prefix}_PASSWORD is not"))
                })?;
                Some(Credentials::Basic { username, password })
            }
            (None, None, None) => None,
        };

        if let Some(raw) = var("TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                WatsonError::Config(format!("{prefix}_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = var("LEARNING_OPT_OUT") {
            config.learning_opt_out = matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ServiceConfig::from_lookup(
            "ASSISTANT",
            ASSISTANT_DEFAULT_URL,
            ASSISTANT_V2_VERSION,
            lookup(&[]),
        )
        .unwrap();
        assert_eq!(config.base_url, ASSISTANT_DEFAULT_URL);
        assert_eq!(config.version, ASSISTANT_V2_VERSION);
        assert!(config.credentials.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!config.learning_opt_out);
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = ServiceConfig::from_lookup(
            "VISUAL_RECOGNITION",
            VISUAL_RECOGNITION_DEFAULT_URL,
            VISUAL_RECOGNITION_V3_VERSION,
            lookup(&[
                ("VISUAL_RECOGNITION_URL", "http://localhost:3000"),
                ("VISUAL_RECOGNITION_APIKEY", "key"),
                ("VISUAL_RECOGNITION_TIMEOUT_SECS", "5"),
                ("VISUAL_RECOGNITION_LEARNING_OPT_OUT", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.credentials, Some(Credentials::ApiKey("key".to_string())));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.learning_opt_out);
    }

    #[test]
    fn api_key_wins_over_basic() {
        let config = ServiceConfig::from_lookup(
            "CONVERSATION",
            CONVERSATION_DEFAULT_URL,
            CONVERSATION_V1_VERSION,
            lookup(&[
                ("CONVERSATION_USERNAME", "u"),
                ("CONVERSATION_PASSWORD", "p"),
                ("CONVERSATION_APIKEY", "k"),
            ]),
        )
        .unwrap();
        assert_eq!(config.credentials, Some(Credentials::ApiKey("k".to_string())));
    }

    #[test]
    fn username_without_password_is_a_config_error() {
        let err = ServiceConfig::from_lookup(
            "CONVERSATION",
            CONVERSATION_DEFAULT_URL,
            CONVERSATION_V1_VERSION,
            lookup(&[("CONVERSATION_USERNAME", "u")]),
        )
        .unwrap_err();
        assert!(matches!(err, WatsonError::Config(_)));
    }

    #[test]
    fn malformed_timeout_is_a_config_error() {
        let err = ServiceConfig::from_lookup(
            "ASSISTANT",
            ASSISTANT_DEFAULT_URL,
            ASSISTANT_V1_VERSION,
            lookup(&[("ASSISTANT_TIMEOUT_SECS", "soon")]),
        )
        .unwrap_err();
        assert!(matches!(err, WatsonError::Config(_)));
    }

    #[test]
    fn extra_headers_are_lowercased() {
        let config = ServiceConfig::new("http://localhost", ASSISTANT_V2_VERSION)
            .with_header("X-Global-Transaction-Id", "abc");
        assert_eq!(
            config.headers,
            vec![("x-global-transaction-id".to_string(), "abc".to_string())]
        );
    }
}
