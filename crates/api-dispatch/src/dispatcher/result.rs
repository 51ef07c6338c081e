//! The normalized outcome of a dispatched request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DispatchError, Result};

/// Normalized outcome of every [`send`](super::RequestDispatcher::send) call.
///
/// | `status` | meaning |
/// |---|---|
/// | `0` | local error: unknown endpoint, missing transport, bad header, unparsable body |
/// | `-1` | the transport failed before a response arrived |
/// | `> 0` | the HTTP status of the response, whatever its `ok` flag |
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    /// HTTP status, or `0` / `-1` for local and transport failures.
    pub status: i32,
    /// `true` only for 2xx responses.
    pub ok: bool,
    /// Configured message for the status, or the error text on failure.
    pub err_msg: String,
    /// Parsed JSON body; `None` whenever no response body was read.
    pub data: Option<Value>,
}

impl SendResult {
    /// Build a failed result from a dispatch error.
    pub fn from_error(err: &DispatchError) -> Self {
        Self {
            status: err.status_code(),
            ok: false,
            err_msg: err.to_string(),
            data: None,
        }
    }

    /// The call failed locally, before or instead of reaching the server.
    pub fn is_config_error(&self) -> bool {
        self.status == 0
    }

    /// The transport could not obtain a response.
    pub fn is_transport_failure(&self) -> bool {
        self.status == -1
    }

    /// Deserialize the response body into `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.data
            .as_ref()
            .map(|value| T::deserialize(value).map_err(DispatchError::from))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_error() {
        let result = SendResult::from_error(&DispatchError::Transport("Failed to fetch".into()));
        assert_eq!(result.status, -1);
        assert!(!result.ok);
        assert_eq!(result.err_msg, "Failed to fetch");
        assert!(result.data.is_none());
        assert!(result.is_transport_failure());
        assert!(!result.is_config_error());
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = SendResult {
            status: 400,
            ok: false,
            err_msg: "bad request".into(),
            data: Some(json!({"data": "BAD REQUEST"})),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": 400, "ok": false, "errMsg": "bad request", "data": {"data": "BAD REQUEST"}})
        );
    }

    #[test]
    fn test_data_as() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Book {
            id: u32,
        }

        let result = SendResult {
            status: 200,
            ok: true,
            err_msg: String::new(),
            data: Some(json!({"id": 9})),
        };
        assert_eq!(result.data_as::<Book>().unwrap(), Some(Book { id: 9 }));

        let empty = SendResult::from_error(&DispatchError::TransportUnavailable);
        assert_eq!(empty.data_as::<Book>().unwrap(), None);
    }
}
