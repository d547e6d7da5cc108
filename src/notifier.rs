//! Notification of the downstream indexing API.
//!
//! One GET per event: `{api}/{action}?uri={docid}`. The response body is
//! ignored and failures are warnings only; a flaky indexing server must
//! never stop the monitor from watching.

use std::time::Duration;

use crate::event::Action;

/// Client for the indexing API.
pub struct ActionNotifier {
    client: reqwest::Client,
    api_base: String,
}

impl ActionNotifier {
    /// Build a notifier with an explicit request timeout so a stalled
    /// server cannot stall event consumption.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
        })
    }

    /// The exact URL a notification for `doc_id` would hit.
    pub fn request_url(&self, doc_id: &str, action: Action) -> String {
        let query = serde_urlencoded::to_string([("uri", doc_id)]).unwrap_or_default();
        format!(
            "{}/{}?{}",
            self.api_base.trim_end_matches('/'),
            action.endpoint(),
            query
        )
    }

    /// Tell the indexing API to apply `action` to `doc_id`.
    ///
    /// Transport failures and error statuses are logged and swallowed;
    /// there is no retry.
    pub async fn notify(&self, doc_id: &str, action: Action) {
        let url = self.request_url(doc_id, action);

        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    crate::log_event!("notifier", action.endpoint(), "{doc_id}");
                } else {
                    tracing::warn!("[notifier] {url} answered {status}");
                }
            }
            Err(e) => {
                tracing::warn!("[notifier] request to {url} failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(api: &str) -> ActionNotifier {
        ActionNotifier::new(api, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn url_has_action_segment_and_encoded_uri() {
        let n = notifier("http://localhost/search-apps/api");
        assert_eq!(
            n.request_url("/data/x.txt", Action::Index),
            "http://localhost/search-apps/api/index-file?uri=%2Fdata%2Fx.txt"
        );
        assert_eq!(
            n.request_url("/data/x.txt", Action::Delete),
            "http://localhost/search-apps/api/delete?uri=%2Fdata%2Fx.txt"
        );
    }

    #[test]
    fn url_encodes_awkward_identifiers() {
        let n = notifier("http://host/api");
        let url = n.request_url("/data/a file & more.txt", Action::Index);
        assert_eq!(url, "http://host/api/index-file?uri=%2Fdata%2Fa+file+%26+more.txt");
    }

    #[test]
    fn trailing_slash_on_api_base_is_tolerated() {
        let n = notifier("http://host/api/");
        assert_eq!(
            n.request_url("/p", Action::Delete),
            "http://host/api/delete?uri=%2Fp"
        );
    }
}
