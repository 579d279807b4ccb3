//! Wire models for the Watson REST APIs.
//!
//! Field names follow the JSON members exactly. Optional members use
//! `Option` with `skip_serializing_if` unless `null` carries meaning, in
//! which case they use [`Field`](crate::field::Field).

pub mod assistant_v1;
pub mod assistant_v2;
pub mod runtime;
pub mod visual_recognition_v3;
