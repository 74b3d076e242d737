//! The backend's response envelope.
//!
//! Every JSON endpoint answers with `{ errorCode, errorMessage, data }`, for
//! application-level failures as well as successes. HTTP status is the
//! client's error channel; `errorCode` belongs to the caller.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised when mapping backend payloads onto typed models.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The envelope carried no data.
    #[error("Response carried no data")]
    MissingData,

    /// The payload did not match the expected shape.
    #[error("Unexpected {entity} payload: {source}")]
    Shape {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Opaque `{errorCode, errorMessage, data}` wrapper.
///
/// All fields default so that any JSON object decodes, including the
/// `{"message": ...}` bodies produced for plain-text responses. A missing or
/// null `errorCode` reads as success. Top-level keys beyond the known ones
/// (paging counters and the like) are kept in `extra`, so serializing an
/// envelope reproduces the body the backend sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Envelope {
    #[serde(alias = "error_code")]
    pub error_code: Option<i64>,
    #[serde(alias = "error_message")]
    pub error_message: Option<String>,
    pub data: Option<Value>,
    /// Free-form message some endpoints use instead of `errorMessage`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Application-level success: `errorCode == 0`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code() == 0
    }

    /// `errorCode`, with missing or null read as 0.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self.error_code {
            Some(code) => code,
            None => 0,
        }
    }

    /// Best available human-readable message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.message.as_deref().filter(|m| !m.is_empty()))
    }

    /// Decode `data` into a typed model.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::MissingData` when `data` is absent or null, and
    /// `MappingError::Shape` when it does not match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, MappingError> {
        match &self.data {
            None | Some(Value::Null) => Err(MappingError::MissingData),
            Some(value) => decode(value.clone()),
        }
    }

    /// Decode `data` as a list of typed models.
    ///
    /// Absent data is an empty list. Some list endpoints nest the rows under
    /// a key (`items`, `rows`, `results` or `data`) next to paging counters;
    /// those are unwrapped too.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Shape` when a row does not match `T`.
    pub fn list_as<T: DeserializeOwned>(&self) -> Result<Vec<T>, MappingError> {
        match &self.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(rows)) => rows.iter().cloned().map(decode).collect(),
            Some(Value::Object(map)) => {
                let nested = ["items", "rows", "results", "data"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_array));
                match nested {
                    Some(rows) => rows.iter().cloned().map(decode).collect(),
                    None => decode(Value::Object(map.clone())).map(|one| vec![one]),
                }
            }
            Some(other) => decode(other.clone()).map(|one| vec![one]),
        }
    }
}

impl TryFrom<Value> for Envelope {
    type Error = MappingError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        decode(value)
    }
}

/// Decode an arbitrary payload, naming the target type in the error.
///
/// # Errors
///
/// Returns `MappingError::Shape` when `value` does not match `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, MappingError> {
    serde_json::from_value(value).map_err(|source| MappingError::Shape {
        entity: short_type_name::<T>(),
        source,
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
