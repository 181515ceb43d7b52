use serde::{Deserialize, Serialize};

/// Code the service uses for a successful response.
pub const SUCCESS_CODE: i32 = 200;

/// Error produced when extracting data from an [`ApiEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The service answered with a non-success code.
    #[error("API error {code}: {msg}")]
    Api { code: i32, msg: String },

    /// The response reported success but carried no data.
    #[error("successful response without data")]
    MissingData,
}

/// Envelope wrapping every upload API response.
///
/// The service answers `{code, data, msg}` on all endpoints; `data` is the
/// per-endpoint payload and is absent (or null) on failures and on bare
/// acknowledgements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg: String,
}

impl<T> ApiEnvelope<T> {
    /// Returns `true` if the service reported success.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Checks the code, ignoring any data (for bare-acknowledgement calls).
    pub fn ensure_success(&self) -> Result<(), EnvelopeError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(EnvelopeError::Api {
                code: self.code,
                msg: self.msg.clone(),
            })
        }
    }

    /// Extracts the payload of a successful response.
    pub fn into_data(self) -> Result<T, EnvelopeError> {
        if !self.is_success() {
            return Err(EnvelopeError::Api {
                code: self.code,
                msg: self.msg,
            });
        }
        self.data.ok_or(EnvelopeError::MissingData)
    }
}
