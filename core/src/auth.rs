//! Static credential material attached to every request.
//!
//! Token exchange and refresh are not handled here: a bearer token is used
//! as given until the caller replaces the client.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service-instance username and password (HTTP basic).
    Basic { username: String, password: String },
    /// IBM Cloud API key sent as basic auth with the fixed user `apikey`.
    ApiKey(String),
    /// A pre-issued access token.
    Bearer(String),
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of the `authorization` header.
    pub fn header_value(&self) -> String {
        match self {
            Credentials::Basic { username, password } => basic(username, password),
            Credentials::ApiKey(key) => basic("apikey", key),
            Credentials::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Credentials::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_is_base64_of_user_colon_password() {
        let creds = Credentials::basic("user", "pass");
        assert_eq!(creds.header_value(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn api_key_uses_fixed_apikey_user() {
        let creds = Credentials::ApiKey("secret".to_string());
        assert_eq!(creds.header_value(), format!("Basic {}", STANDARD.encode("apikey:secret")));
    }

    #[test]
    fn bearer_header() {
        let creds = Credentials::Bearer("tok".to_string());
        assert_eq!(creds.header_value(), "Bearer tok");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let rendered = format!(
            "{:?} {:?} {:?}",
            Credentials::basic("user", "hunter2"),
            Credentials::ApiKey("k3y".to_string()),
            Credentials::Bearer("t0ken".to_string()),
        );
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("k3y"));
        assert!(!rendered.contains("t0ken"));
    }
}
