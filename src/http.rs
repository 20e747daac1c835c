// Blocking HTTP plumbing shared by the embedding, chat and search clients.
// Calls are made exactly once; failures are classified and handed back to the caller.

use anyhow::{Result, anyhow};
use std::time::Duration;
use tracing::warn;

pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Turn a ureq outcome into a response body or a descriptive error
pub(crate) fn read_body(
    outcome: Result<String, ureq::Error>,
    service: &str,
    url: &str,
) -> Result<String> {
    outcome.map_err(|error| {
        let error = match error {
            ureq::Error::StatusCode(status) if (400..500).contains(&status) => {
                anyhow!("{} rejected the request: HTTP {}", service, status)
            }
            ureq::Error::StatusCode(status) => {
                anyhow!("{} server error: HTTP {}", service, status)
            }
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                anyhow!("Could not connect to {} at {}", service, url)
            }
            ureq::Error::Timeout(_) => anyhow!("{} request timed out", service),
            other => anyhow!("{} request failed: {}", service, other),
        };
        warn!("{}", error);
        error
    })
}
