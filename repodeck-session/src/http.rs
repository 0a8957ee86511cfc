//! Blocking HTTP client for `repodeck-daemon`.
//!
//! Non-2xx replies are still decoded: the daemon puts its verdict in the body
//! whatever the status. Only connection failures and undecodable bodies become
//! `Unreachable`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use repodeck_core::wire::{
    ListResponse, UpdateRequest, UpdateResponse, ValidateResponse, HEALTH_PATH, LIST_PATH,
    SHUTDOWN_PATH, UPDATE_PATH, VALIDATE_PATH,
};
use repodeck_core::Entry;

use crate::backend::{CommitReply, RegistryBackend};
use crate::error::SessionError;
use crate::gateway::{RemoteValidator, Verdict};

/// Fallback text when the daemon rejects without saying why.
const VALIDATION_FAILED: &str = "Validation failed";
const UPDATE_FAILED: &str = "Update failed";

pub struct HttpClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent("repodeck")
            .build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `body` as JSON and decode the reply body as `T`, regardless of status.
    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, String> {
        let response = match self.agent.post(&self.url(path)).send_json(body) {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => return Err(transport.to_string()),
        };
        response
            .into_json::<T>()
            .map_err(|e| format!("invalid response from {path}: {e}"))
    }

    /// Current persisted registry, used to seed a session.
    pub fn fetch(&self) -> Result<ListResponse, SessionError> {
        let response = self
            .agent
            .get(&self.url(LIST_PATH))
            .call()
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        response
            .into_json::<ListResponse>()
            .map_err(|e| SessionError::Transport(format!("invalid response from {LIST_PATH}: {e}")))
    }

    pub fn health(&self) -> Result<(), SessionError> {
        self.agent
            .get(&self.url(HEALTH_PATH))
            .call()
            .map(|_| ())
            .map_err(|e| SessionError::Transport(e.to_string()))
    }

    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.agent
            .post(&self.url(SHUTDOWN_PATH))
            .call()
            .map(|_| ())
            .map_err(|e| SessionError::Transport(e.to_string()))
    }
}

impl RemoteValidator for HttpClient {
    fn validate(&self, candidate: &Entry) -> Verdict {
        match self.post_json::<_, ValidateResponse>(VALIDATE_PATH, candidate) {
            Ok(reply) if reply.valid => Verdict::Valid,
            Ok(reply) => Verdict::Rejected(
                reply
                    .error
                    .unwrap_or_else(|| VALIDATION_FAILED.to_string()),
            ),
            Err(detail) => {
                tracing::warn!(url = %self.base_url, error = %detail, "validate request failed");
                Verdict::Unreachable(detail)
            }
        }
    }
}

impl RegistryBackend for HttpClient {
    fn replace(&self, entries: &[Entry]) -> CommitReply {
        let body = UpdateRequest {
            repos: entries.to_vec(),
        };
        match self.post_json::<_, UpdateResponse>(UPDATE_PATH, &body) {
            Ok(reply) if reply.success => CommitReply::Accepted,
            Ok(reply) => {
                CommitReply::Rejected(reply.error.unwrap_or_else(|| UPDATE_FAILED.to_string()))
            }
            Err(detail) => {
                tracing::warn!(url = %self.base_url, error = %detail, "update request failed");
                CommitReply::Unreachable(detail)
            }
        }
    }
}
