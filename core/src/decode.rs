//! Discriminated-union decoding for polymorphic response types.
//!
//! # Design
//! A polymorphic Watson type is a JSON object whose string discriminator
//! (`response_type`, `event`, ...) selects one of a closed set of shapes. Each
//! such type is a Rust enum with a static `VariantTable` mapping every known
//! discriminator value to a decoder for that variant. Decoding looks the value
//! up in the table; a missing or unrecognized discriminator is an error, never
//! a fallback to some default shape.
//!
//! Encoding goes through serde's internally-tagged representation, so the
//! discriminator is written back out and decoded values round-trip.
//!
//! Inside a larger document serde only carries error text. `from_json_str`
//! hands back the typed `DecodeError` of the first polymorphic member that
//! failed, so callers can still match on `UnknownVariant`.

use std::cell::RefCell;

use serde::de::{self, DeserializeOwned};
use serde::Deserializer;
use serde_json::Value;
use thiserror::Error;

/// Builds one variant from the full JSON object, discriminator included.
pub type VariantDecoder<T> = fn(Value) -> Result<T, serde_json::Error>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{type_name}: expected a JSON object")]
    NotAnObject { type_name: &'static str },

    #[error("{type_name}: missing string discriminator `{field}`")]
    MissingDiscriminator {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("{type_name}: unknown {field} `{value}`")]
    UnknownVariant {
        type_name: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{type_name}::{variant}: {message}")]
    InvalidVariant {
        type_name: &'static str,
        variant: &'static str,
        message: String,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The closed set of variants for one polymorphic type.
pub struct VariantTable<T: 'static> {
    type_name: &'static str,
    discriminator: &'static str,
    variants: &'static [(&'static str, VariantDecoder<T>)],
}

impl<T> VariantTable<T> {
    pub const fn new(
        type_name: &'static str,
        discriminator: &'static str,
        variants: &'static [(&'static str, VariantDecoder<T>)],
    ) -> Self {
        Self {
            type_name,
            discriminator,
            variants,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn discriminator(&self) -> &'static str {
        self.discriminator
    }

    /// Known discriminator values, in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.iter().map(|(name, _)| *name)
    }

    pub fn decode(&self, document: Value) -> Result<T, DecodeError> {
        let Value::Object(ref object) = document else {
            return Err(DecodeError::NotAnObject {
                type_name: self.type_name,
            });
        };
        let Some(tag) = object.get(self.discriminator).and_then(Value::as_str) else {
            return Err(DecodeError::MissingDiscriminator {
                type_name: self.type_name,
                field: self.discriminator,
            });
        };
        let Some(&(variant, decoder)) = self.variants.iter().find(|(name, _)| *name == tag) else {
            return Err(DecodeError::UnknownVariant {
                type_name: self.type_name,
                field: self.discriminator,
                value: tag.to_string(),
            });
        };
        decoder(document).map_err(|e| DecodeError::InvalidVariant {
            type_name: self.type_name,
            variant,
            message: e.to_string(),
        })
    }
}

/// A type decoded through a `VariantTable`.
pub trait Polymorphic: Sized + 'static {
    fn variants() -> &'static VariantTable<Self>;
}

pub fn decode<T: Polymorphic>(document: Value) -> Result<T, DecodeError> {
    T::variants().decode(document)
}

pub fn decode_str<T: Polymorphic>(json: &str) -> Result<T, DecodeError> {
    decode(serde_json::from_str(json)?)
}

thread_local! {
    static NESTED_FAILURE: RefCell<Option<DecodeError>> = const { RefCell::new(None) };
}

/// Body of `Deserialize::deserialize` for a `Polymorphic` type.
pub fn deserialize_polymorphic<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Polymorphic,
{
    let document = <Value as serde::Deserialize>::deserialize(deserializer)?;
    decode(document).map_err(|err| {
        let message = err.to_string();
        NESTED_FAILURE.with(|slot| {
            slot.borrow_mut().get_or_insert(err);
        });
        de::Error::custom(message)
    })
}

/// Deserialize any document, reporting a failed polymorphic member with its
/// own `DecodeError` instead of a plain `Json` error.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> Result<T, DecodeError> {
    NESTED_FAILURE.with(|slot| slot.borrow_mut().take());
    serde_json::from_str(json).map_err(|err| {
        NESTED_FAILURE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or(DecodeError::Json(err))
    })
}

/// Decode one variant payload. Used to build table entries.
pub fn variant<V: DeserializeOwned>(document: Value) -> Result<V, serde_json::Error> {
    serde_json::from_value(document)
}
