//! JSON bodies exchanged with the backend.
//!
//! ```text
//! POST /api/repos/validate   {label, path}      -> {valid, error?}
//! POST /api/repos/update     {repos: [...]}     -> {success, error?}
//! GET  /api/repos                               -> {repos, manage_repos_enabled}
//! ```

use serde::{Deserialize, Serialize};

use crate::types::Entry;

pub const VALIDATE_PATH: &str = "/api/repos/validate";
pub const UPDATE_PATH: &str = "/api/repos/update";
pub const LIST_PATH: &str = "/api/repos";
pub const SHUTDOWN_PATH: &str = "/api/shutdown";
pub const HEALTH_PATH: &str = "/healthz";

/// The validate request is a bare entry.
pub type ValidateRequest = Entry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub repos: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub repos: Vec<Entry>,
    pub manage_repos_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_request_is_flat() {
        let body = serde_json::to_string(&Entry::new("a", "/x")).expect("encode");
        assert_eq!(body, r#"{"label":"a","path":"/x"}"#);
    }

    #[test]
    fn missing_error_field_decodes_as_none() {
        let resp: ValidateResponse = serde_json::from_str(r#"{"valid":false}"#).expect("decode");
        assert_eq!(resp.error, None);
        let resp: UpdateResponse = serde_json::from_str(r#"{"success":true}"#).expect("decode");
        assert_eq!(resp, UpdateResponse::ok());
    }

    #[test]
    fn ok_responses_omit_error() {
        let body = serde_json::to_string(&UpdateResponse::ok()).expect("encode");
        assert_eq!(body, r#"{"success":true}"#);
    }
}
