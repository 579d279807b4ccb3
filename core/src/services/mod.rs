//! One facade per Watson service, one method per remote operation.
//!
//! Facade methods are plain functions returning futures: arguments are
//! validated and the request is built when the method is called, before
//! anything is awaited. The operation descriptors are public so hosts that
//! run their own HTTP stack can use `WatsonClient::build_request` and
//! `WatsonClient::parse_response` directly.

pub mod assistant_v1;
pub mod assistant_v2;
pub mod conversation_v1;
pub mod visual_recognition_v3;

pub use assistant_v1::AssistantV1;
pub use assistant_v2::AssistantV2;
pub use conversation_v1::ConversationV1;
pub use visual_recognition_v3::VisualRecognitionV3;
