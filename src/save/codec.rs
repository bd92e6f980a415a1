//! Text codecs used by the SaveManager
//!
//! The manager only needs `encode` and `decode`; `JsonCodec` is the one used
//! in practice.

use super::types::SaveError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Converts values to and from the text stored on disk
pub trait Codec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, SaveError>;

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, SaveError>;
}

/// serde_json backed codec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact output, e.g. `{"volume":5}`
    pub fn compact() -> Self {
        JsonCodec { pretty: false }
    }

    /// Indented output (human-readable, debuggable)
    pub fn pretty() -> Self {
        JsonCodec { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, SaveError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, SaveError> {
        Ok(serde_json::from_str(text)?)
    }
}
