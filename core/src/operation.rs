//! Static operation descriptors and the per-call argument set.
//!
//! # Design
//! Every remote call is described once, at compile time, by an `Operation`:
//! method, path template, the parameters it accepts and where each one goes
//! (path, query or header), and whether it takes a JSON body. A call supplies
//! an `Arguments` value; `Operation::build_request` validates it against the
//! descriptor and produces an `HttpRequest`, and `Operation::parse_response`
//! maps the `HttpResponse` back. Neither half touches the network.

use std::collections::BTreeMap;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::decode::from_json_str;
use crate::error::{Result, WatsonError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub location: ParamLocation,
    pub required: bool,
}

impl Param {
    /// A `{name}` segment of the path template. Always required.
    pub const fn path(name: &'static str) -> Self {
        Self {
            name,
            location: ParamLocation::Path,
            required: true,
        }
    }

    pub const fn query(name: &'static str) -> Self {
        Self {
            name,
            location: ParamLocation::Query,
            required: false,
        }
    }

    pub const fn required_query(name: &'static str) -> Self {
        Self {
            name,
            location: ParamLocation::Query,
            required: true,
        }
    }

    pub const fn header(name: &'static str) -> Self {
        Self {
            name,
            location: ParamLocation::Header,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    None,
    Optional,
    Required,
}

/// Static description of one remote API call.
#[derive(Debug)]
pub struct Operation {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub params: &'static [Param],
    pub body: BodyKind,
}

/// Argument values for a single call, keyed by parameter name.
///
/// `None` values are dropped on insertion, so a null argument and a missing
/// one are the same thing. Body serialization errors are held until the
/// request is built.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: BTreeMap<&'static str, String>,
    body: Option<String>,
    body_error: Option<String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: impl ToString) -> Self {
        self.values.insert(name, value.to_string());
        self
    }

    pub fn set_opt<T: ToString>(self, name: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    /// Join a list into the comma-separated form Watson expects. An empty
    /// list is treated as missing.
    pub fn set_list<T: AsRef<str>>(self, name: &'static str, values: &[T]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
        self.set(name, joined)
    }

    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_string(body) {
            Ok(json) => self.body = Some(json),
            Err(e) => self.body_error = Some(e.to_string()),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl Operation {
    /// Check `args` against the descriptor without building anything.
    pub fn validate(&self, args: &Arguments) -> Result<()> {
        for name in args.values.keys() {
            if !self.params.iter().any(|p| p.name == *name) {
                return Err(WatsonError::invalid_argument(
                    *name,
                    format!("is not a parameter of {}", self.name),
                ));
            }
        }
        for param in self.params {
            match args.get(param.name) {
                None if param.required => {
                    return Err(WatsonError::invalid_argument(param.name, "is required"));
                }
                Some(value) if param.location == ParamLocation::Path && value.is_empty() => {
                    return Err(WatsonError::invalid_argument(param.name, "must not be empty"));
                }
                _ => {}
            }
        }
        if let Some(message) = &args.body_error {
            return Err(WatsonError::Serialization(message.clone()));
        }
        match (self.body, args.body.is_some()) {
            (BodyKind::Required, false) => Err(WatsonError::invalid_argument("body", "is required")),
            (BodyKind::None, true) => Err(WatsonError::invalid_argument(
                "body",
                format!("{} does not take a body", self.name),
            )),
            _ => Ok(()),
        }
    }

    /// Validate `args` and assemble the request against `base_url`.
    ///
    /// The query string always starts with `version`, followed by the
    /// operation's query parameters in declaration order.
    pub fn build_request(&self, base_url: &Url, version: &str, args: &Arguments) -> Result<HttpRequest> {
        self.validate(args)?;

        let mut url = base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                WatsonError::Config(format!("base URL `{base_url}` cannot carry a path"))
            })?;
            segments.pop_if_empty();
            for segment in self.path.split('/').filter(|s| !s.is_empty()) {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => {
                        let value = args
                            .get(name)
                            .ok_or_else(|| WatsonError::invalid_argument(name, "is required"))?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("version", version);
            for param in self.params.iter().filter(|p| p.location == ParamLocation::Query) {
                if let Some(value) = args.get(param.name) {
                    query.append_pair(param.name, value);
                }
            }
        }

        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if args.body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        for param in self.params.iter().filter(|p| p.location == ParamLocation::Header) {
            if let Some(value) = args.get(param.name) {
                headers.push((param.name.to_ascii_lowercase(), value.to_string()));
            }
        }

        Ok(HttpRequest {
            method: self.method,
            url: url.to_string(),
            headers,
            body: args.body.clone(),
        })
    }

    /// Decode a 2xx body into `T`; any other status is a `Remote` error.
    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T> {
        check_status(&response)?;
        Ok(from_json_str(&response.body)?)
    }

    /// Like `parse_response` for operations whose success body is ignored.
    pub fn parse_empty(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }
}

fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(WatsonError::Remote {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static GET_THING: Operation = Operation {
        name: "get_thing",
        method: HttpMethod::Get,
        path: "/v1/things/{thing_id}",
        params: &[
            Param::path("thing_id"),
            Param::query("verbose"),
            Param::query("fields"),
            Param::header("Accept-Language"),
        ],
        body: BodyKind::None,
    };

    static CREATE_THING: Operation = Operation {
        name: "create_thing",
        method: HttpMethod::Post,
        path: "/v1/things",
        params: &[Param::required_query("owner")],
        body: BodyKind::Required,
    };

    fn base() -> Url {
        Url::parse("http://localhost:3000/instances/abc/").unwrap()
    }

    #[test]
    fn builds_path_query_and_headers() {
        let args = Arguments::new()
            .set("thing_id", "t1")
            .set_opt("verbose", Some(true))
            .set_list("fields", &["a", "b"])
            .set("Accept-Language", "fr");
        let req = GET_THING.build_request(&base(), "2020-01-01", &args).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/instances/abc/v1/things/t1?version=2020-01-01&verbose=true&fields=a%2Cb"
        );
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("accept-language"), Some("fr"));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn path_values_are_encoded_as_one_segment() {
        let args = Arguments::new().set("thing_id", "a/b c");
        let req = GET_THING.build_request(&base(), "v", &args).unwrap();
        assert!(req.url.contains("/v1/things/a%2Fb%20c?"), "{}", req.url);
    }

    #[test]
    fn missing_required_path_param_is_invalid() {
        let err = GET_THING
            .build_request(&base(), "v", &Arguments::new())
            .unwrap_err();
        assert!(matches!(err, WatsonError::InvalidArgument { ref name, .. } if name == "thing_id"));
    }

    #[test]
    fn none_is_the_same_as_missing() {
        let args = Arguments::new().set_opt::<String>("thing_id", None);
        assert!(GET_THING.validate(&args).is_err());
    }

    #[test]
    fn empty_path_value_is_invalid() {
        let args = Arguments::new().set("thing_id", "");
        let err = GET_THING.validate(&args).unwrap_err();
        assert!(matches!(err, WatsonError::InvalidArgument { ref reason, .. } if reason == "must not be empty"));
    }

    #[test]
    fn undeclared_argument_is_invalid() {
        let args = Arguments::new().set("thing_id", "t1").set("verbsoe", true);
        let err = GET_THING.validate(&args).unwrap_err();
        assert!(matches!(err, WatsonError::InvalidArgument { ref name, .. } if name == "verbsoe"));
    }

    #[test]
    fn body_is_required_when_declared() {
        let args = Arguments::new().set("owner", "me");
        let err = CREATE_THING.validate(&args).unwrap_err();
        assert!(matches!(err, WatsonError::InvalidArgument { ref name, .. } if name == "body"));
    }

    #[test]
    fn body_is_rejected_when_not_declared() {
        let args = Arguments::new().set("thing_id", "t1").json_body(&json!({}));
        assert!(GET_THING.validate(&args).is_err());
    }

    #[test]
    fn json_body_sets_content_type() {
        let args = Arguments::new().set("owner", "me").json_body(&json!({"name": "x"}));
        let req = CREATE_THING.build_request(&base(), "v", &args).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "x"}));
    }

    #[test]
    fn body_serialization_failure_surfaces_at_build_time() {
        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1u8], 1);
        let args = Arguments::new().set("owner", "me").json_body(&bad);
        let err = CREATE_THING.build_request(&base(), "v", &args).unwrap_err();
        assert!(matches!(err, WatsonError::Serialization(_)));
    }

    #[test]
    fn empty_list_is_missing() {
        let args = Arguments::new().set_list::<&str>("fields", &[]);
        assert!(args.get("fields").is_none());
    }

    #[test]
    fn parse_response_maps_non_success_to_remote() {
        for status in [400, 401, 404, 409, 500, 503] {
            let err = GET_THING
                .parse_response::<serde_json::Value>(HttpResponse::new(status, "nope"))
                .unwrap_err();
            match err {
                WatsonError::Remote { status: s, body } => {
                    assert_eq!(s, status);
                    assert_eq!(body, "nope");
                }
                other => panic!("unexpected error for {status}: {other}"),
            }
        }
    }

    #[test]
    fn parse_response_bad_json_is_decode_error() {
        let err = GET_THING
            .parse_response::<serde_json::Value>(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, WatsonError::Decode(_)));
    }

    #[test]
    fn parse_empty_ignores_body() {
        assert!(GET_THING.parse_empty(HttpResponse::new(200, "{}")).is_ok());
        assert!(GET_THING.parse_empty(HttpResponse::new(204, "")).is_ok());
    }
}
