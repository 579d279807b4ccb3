//! Client core for the Watson Assistant, Conversation and Visual Recognition
//! REST APIs.
//!
//! # Overview
//! Each remote call is a static [`Operation`] descriptor. [`WatsonClient`]
//! turns a descriptor plus [`Arguments`] into an [`HttpRequest`], hands it to
//! a [`Transport`], and maps the [`HttpResponse`] back into a typed model or a
//! [`WatsonError`]. The service facades in [`services`] wrap one descriptor
//! per method.
//!
//! # Design
//! - Requests and responses are plain data; the build and parse halves never
//!   touch the network, so a host can run the round-trip itself.
//! - Required arguments are checked before any I/O; a failed check issues
//!   no request.
//! - Polymorphic members (`output.generic`, `debug.turn_events`) decode
//!   through explicit variant tables in [`decode`]; unknown discriminators are
//!   errors.
//! - [`Field`] keeps absent and `null` apart where the wire format cares.

pub mod auth;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod field;
pub mod http;
pub mod models;
pub mod operation;
pub mod poll;
pub mod services;
pub mod transport;

pub use auth::Credentials;
pub use client::WatsonClient;
pub use config::ServiceConfig;
pub use decode::{DecodeError, Polymorphic};
pub use error::{Result, WatsonError};
pub use field::Field;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operation::{Arguments, BodyKind, Operation, Param, ParamLocation};
pub use poll::{poll_until, Attempt, PollPolicy};
pub use services::{AssistantV1, AssistantV2, ConversationV1, VisualRecognitionV3};
pub use transport::{ReqwestTransport, Transport};
