use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::Notification;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts a copy of each successful caption request to an external endpoint.
/// The call runs detached; its outcome never reaches the HTTP response.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl Notifier {
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self { client, url }
    }

    pub fn enabled(&self) -> bool {
        self.url.is_some()
    }

    // Returns the spawned task so tests can wait for it; the handler drops it.
    pub fn notify(&self, payload: Notification) -> Option<JoinHandle<()>> {
        let url = self.url.clone()?;
        let client = self.client.clone();

        Some(tokio::spawn(async move {
            let result = client
                .post(&url)
                .timeout(NOTIFY_TIMEOUT)
                .json(&payload)
                .send()
                .await;

            match result {
                Ok(res) if res.status().is_success() => {
                    debug!(url = %url, "Notification delivered");
                }
                Ok(res) => {
                    warn!(url = %url, status = %res.status(), "Notification rejected");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Notification failed");
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationData;
    use axum::{Json, Router, routing::post};
    use tokio::sync::mpsc;

    fn sample() -> Notification {
        Notification {
            ip: "203.0.113.7".to_string(),
            host: "example.com".to_string(),
            data: NotificationData {
                isi: "Hello world".to_string(),
                option: Some("type1".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn disabled_notifier_spawns_nothing() {
        let notifier = Notifier::new(reqwest::Client::new(), None);
        assert!(!notifier.enabled());
        assert!(notifier.notify(sample()).is_none());
    }

    #[tokio::test]
    async fn posts_payload_as_json() {
        let (tx, mut rx) = mpsc::channel::<serde_json::Value>(1);
        let app = Router::new().route(
            "/send-email",
            post(move |Json(body): Json<serde_json::Value>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body).await;
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let notifier = Notifier::new(reqwest::Client::new(), Some(format!("http://{addr}/send-email")));
        notifier.notify(sample()).unwrap().await.unwrap();

        let body = rx.recv().await.unwrap();
        assert_eq!(body["ip"], "203.0.113.7");
        assert_eq!(body["host"], "example.com");
        assert_eq!(body["data"]["isi"], "Hello world");
        assert_eq!(body["data"]["option"], "type1");
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let notifier = Notifier::new(reqwest::Client::new(), Some("http://127.0.0.1:1/send-email".to_string()));
        // the task completes normally even though the endpoint is unreachable
        notifier.notify(sample()).unwrap().await.unwrap();
    }
}
