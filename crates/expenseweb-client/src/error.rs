//! Error types for expenseweb-client

use expenseweb_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid backend URL: {uri}")]
    InvalidUri { uri: String },

    #[error("Could not build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ClientError> for CoreError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Unauthorized => CoreError::Unauthorized,
            ClientError::Status { status, message } => CoreError::BackendStatus { status, message },
            ClientError::Decode(e) => CoreError::InvalidResponse {
                message: e.to_string(),
            },
            other => CoreError::Transport {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_core_error() {
        let core: CoreError = ClientError::Unauthorized.into();
        assert_eq!(core, CoreError::Unauthorized);

        let core: CoreError = ClientError::Status {
            status: 404,
            message: "Expense not found".to_string(),
        }
        .into();
        assert!(matches!(core, CoreError::BackendStatus { status: 404, .. }));

        let core: CoreError = ClientError::InvalidUri {
            uri: "nope".to_string(),
        }
        .into();
        assert!(matches!(core, CoreError::Transport { .. }));
    }
}
