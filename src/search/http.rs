//! Shared HTTP plumbing for the backend adapters.
//!
//! Both adapters perform one GET, check the status, and decode the body as
//! JSON. [`fetch_json`] does that once and reports the failure class so each
//! adapter can phrase its own error message.

use std::time::Duration;

/// Default per-request timeout for both adapters.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a round trip failed.
#[derive(Debug)]
pub enum FetchFailure {
    /// Server answered with a non-2xx status
    Status { status: reqwest::StatusCode, body: String },
    /// Request did not complete within the timeout
    Timeout(reqwest::Error),
    /// Connection, TLS, or body-read failure
    Request(reqwest::Error),
    /// Body was not valid JSON
    Decode(serde_json::Error),
}

/// An HTTP client plus whether the adapter holding it is responsible for it.
///
/// A shared client is never released by the adapter; an owned one is
/// released by [`ClientHandle::release`].
#[derive(Debug)]
pub struct ClientHandle {
    client: reqwest::Client,
    owned: bool,
}

impl ClientHandle {
    /// Use the injected client if any, otherwise create one this handle owns.
    pub fn new(shared: Option<reqwest::Client>) -> Self {
        match shared {
            Some(client) => Self {
                client,
                owned: false,
            },
            None => Self {
                client: reqwest::Client::new(),
                owned: true,
            },
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn owns_client(&self) -> bool {
        self.owned
    }

    /// Release the client if this handle owns it. Returns whether it did.
    pub fn release(self) -> bool {
        if self.owned {
            tracing::debug!("releasing owned http client");
            drop(self.client);
            true
        } else {
            tracing::trace!("leaving shared http client open");
            false
        }
    }
}

/// Send the request, require a success status, and parse the body as JSON.
pub async fn fetch_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, FetchFailure> {
    let response = request.send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchFailure::Status { status, body });
    }

    let bytes = response.bytes().await.map_err(classify)?;
    serde_json::from_slice(&bytes).map_err(FetchFailure::Decode)
}

fn classify(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        FetchFailure::Timeout(err)
    } else {
        FetchFailure::Request(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_without_shared_client_owns_it() {
        let handle = ClientHandle::new(None);
        assert!(handle.owns_client());
        assert!(handle.release());
    }

    #[test]
    fn test_handle_with_shared_client_does_not_release() {
        let shared = reqwest::Client::new();
        let handle = ClientHandle::new(Some(shared.clone()));
        assert!(!handle.owns_client());
        assert!(!handle.release());
    }
}
