use anyhow::{Context, Result};
use serde::Serialize;

/// `{"status": "success" | "error", ...}` envelope printed by the CLI tools.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse<T> {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<T>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        message: String,
    },
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        ApiResponse::Success {
            data: Some(data),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse::Success {
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        if pretty {
            serde_json::to_string_pretty(self).context("serialize response")
        } else {
            serde_json::to_string(self).context("serialize response")
        }
    }
}
