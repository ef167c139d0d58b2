//! # WebSocket Channel
//!
//! Connects to the device's `/ws` endpoint.
//!
//! This module handles:
//! - Validating the device address before a link task is spawned
//! - Running the handshake and the read/write pump on the tokio runtime
//! - Translating socket activity into [`LinkEvent`]s

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use super::transport::{Connector, Link, LinkEvent, LinkEventSender, LinkId, LinkNotice};
use crate::error::{DashboardError, Result};

/// Default device endpoint (the device runs its own access point)
pub const DEFAULT_DEVICE_URL: &str = "ws://42.42.42.42/ws";

/// WebSocket connector for the device
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// Create a connector for the given `ws://` / `wss://` URL
    ///
    /// # Examples
    ///
    /// ```
    /// use sweep_dash::connection::websocket::WsConnector;
    ///
    /// let connector = WsConnector::new("ws://192.168.4.1/ws");
    /// assert_eq!(connector.url(), "ws://192.168.4.1/ws");
    /// ```
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Get the device URL this connector dials
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the handshake request
    ///
    /// # Errors
    ///
    /// Returns `Transport` error if the URL cannot form a WebSocket request
    fn request(&self) -> Result<Request> {
        self.url
            .as_str()
            .into_client_request()
            .map_err(|e| DashboardError::Transport(format!("Invalid device URL {}: {}", self.url, e)))
    }
}

impl Connector for WsConnector {
    fn connect(&mut self, id: LinkId, events: LinkEventSender) -> Result<Box<dyn Link>> {
        let request = self.request()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| DashboardError::Transport(format!("No async runtime available: {}", e)))?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        runtime.spawn(run_link(id, request, outbound_rx, events));

        debug!("Spawned link #{} to {}", id, self.url);
        Ok(Box::new(WsLink {
            outbound: Some(outbound_tx),
        }))
    }
}

/// Handle to a running link task
struct WsLink {
    /// Dropping the sender asks the task to close the socket
    outbound: Option<mpsc::UnboundedSender<String>>,
}

impl Link for WsLink {
    fn send(&mut self, text: String) -> Result<()> {
        let outbound = self
            .outbound
            .as_ref()
            .ok_or_else(|| DashboardError::Transport("Link already closed".to_string()))?;

        outbound
            .send(text)
            .map_err(|_| DashboardError::Transport("Link task has stopped".to_string()))
    }

    fn close(&mut self) {
        self.outbound = None;
    }
}

/// Drive one socket until it closes
///
/// Always finishes by reporting `Closed`, whatever ended the link.
async fn run_link(
    id: LinkId,
    request: Request,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: LinkEventSender,
) {
    let notify = |event: LinkEvent| {
        // Receiver gone means the dashboard is shutting down
        let _ = events.send(LinkNotice { link: id, event });
    };

    let stream = match tokio_tungstenite::connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            notify(LinkEvent::Error(e.to_string()));
            notify(LinkEvent::Closed);
            return;
        }
    };
    notify(LinkEvent::Opened);

    let (mut sink, mut source) = stream.split();
    loop {
        tokio::select! {
            text = outbound.recv() => match text {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        notify(LinkEvent::Error(e.to_string()));
                        break;
                    }
                }
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            inbound = source.next() => match inbound {
                Some(Ok(Message::Text(text))) => notify(LinkEvent::Message(text)),
                Some(Ok(Message::Binary(bytes))) => {
                    notify(LinkEvent::Message(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    notify(LinkEvent::Error(e.to_string()));
                    break;
                }
            },
        }
    }

    notify(LinkEvent::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        assert!(DEFAULT_DEVICE_URL.starts_with("ws://"));
        assert!(DEFAULT_DEVICE_URL.ends_with("/ws"));
    }

    #[test]
    fn test_invalid_url_is_construction_failure() {
        let mut connector = WsConnector::new("not a url");
        let (tx, _rx) = mpsc::unbounded_channel();

        match connector.connect(1, tx) {
            Err(DashboardError::Transport(msg)) => assert!(msg.contains("not a url")),
            Err(other) => panic!("Expected Transport error, got: {:?}", other),
            Ok(_) => panic!("Expected construction failure"),
        }
    }

    #[test]
    fn test_connect_outside_runtime_fails() {
        let mut connector = WsConnector::new(DEFAULT_DEVICE_URL);
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = connector.connect(1, tx);
        assert!(
            matches!(result, Err(DashboardError::Transport(_))),
            "Without a runtime no link can be spawned"
        );
    }

    #[tokio::test]
    async fn test_unreachable_device_reports_error_then_close() {
        // Port 9 on localhost: nothing listens there in test environments
        let mut connector = WsConnector::new("ws://127.0.0.1:9/ws");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _link = connector.connect(3, tx).expect("construction should succeed");

        let first = rx.recv().await.expect("link should report");
        assert_eq!(first.link, 3);
        assert!(matches!(first.event, LinkEvent::Error(_)));

        let second = rx.recv().await.expect("link should report close");
        assert_eq!(second.event, LinkEvent::Closed);
    }

    #[tokio::test]
    async fn test_send_after_close_is_error() {
        let mut connector = WsConnector::new("ws://127.0.0.1:9/ws");
        let (tx, _rx) = mpsc::unbounded_channel();

        let mut link = connector.connect(1, tx).unwrap();
        link.close();
        assert!(link.send("{}".to_string()).is_err());
    }
}
