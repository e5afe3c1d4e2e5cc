//! Infrastructure implementation of the `SyncClient` port over HTTPS.
//!
//! Uses the blocking `ureq` agent inside `spawn_blocking` so the async
//! runtime never stalls on network I/O.

use std::time::Duration;

use crate::application::ports::{Migration, Registration, SyncClient, SyncReport};
use crate::domain::SyncError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CertWatch API client authenticated with a bearer API key.
pub struct HttpSyncClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl HttpSyncClient {
    #[must_use]
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/agents{path}", self.endpoint)
    }

    /// POST `body` and return the raw response body.
    async fn post(
        &self,
        operation: &'static str,
        url: String,
        body: serde_json::Value,
    ) -> Result<String, SyncError> {
        let agent = self.agent.clone();
        let auth = format!("Bearer {}", self.api_key);
        let payload = body.to_string();
        tokio::task::spawn_blocking(move || {
            let resp = agent
                .post(&url)
                .set("Authorization", &auth)
                .set("Content-Type", "application/json")
                .send_string(&payload);
            match resp {
                Ok(resp) => resp.into_string().map_err(|e| SyncError::InvalidResponse {
                    operation,
                    message: e.to_string(),
                }),
                Err(ureq::Error::Status(status, _)) => Err(SyncError::Status { operation, status }),
                Err(ureq::Error::Transport(t)) => Err(SyncError::Transport {
                    operation,
                    message: t.to_string(),
                }),
            }
        })
        .await
        .map_err(|e| SyncError::Transport {
            operation,
            message: format!("request task failed: {e}"),
        })?
    }
}

fn parse<T: serde::de::DeserializeOwned>(operation: &'static str, body: &str) -> Result<T, SyncError> {
    serde_json::from_str(body).map_err(|e| SyncError::InvalidResponse {
        operation,
        message: e.to_string(),
    })
}

impl SyncClient for HttpSyncClient {
    async fn register(&self, name: &str) -> Result<Registration, SyncError> {
        let body = self
            .post("register", self.url("/register"), serde_json::json!({ "name": name }))
            .await?;
        let registration: Registration = parse("register", &body)?;
        if registration.agent_id.is_empty() {
            return Err(SyncError::InvalidResponse {
                operation: "register",
                message: "empty agent_id".to_string(),
            });
        }
        Ok(registration)
    }

    async fn migrate(&self, from: &str, to: &str) -> Result<Migration, SyncError> {
        let body = self
            .post(
                "migrate",
                self.url(&format!("/{to}/migrate")),
                serde_json::json!({ "previous_agent_id": from }),
            )
            .await?;
        if body.trim().is_empty() {
            return Ok(Migration::default());
        }
        parse("migrate", &body)
    }

    async fn sync(&self, agent_id: &str, report: &SyncReport) -> Result<(), SyncError> {
        let body = serde_json::json!({
            "agent_name": report.agent_name,
            "certificates": report.certificates,
        });
        self.post("sync", self.url(&format!("/{agent_id}/sync")), body)
            .await?;
        Ok(())
    }
}
