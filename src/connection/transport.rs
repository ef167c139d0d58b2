//! Trait abstraction for the device channel and its status indicator to enable testing

use tokio::sync::mpsc;
use tracing::info;

use crate::error::Result;

/// Identifier of one connection attempt
///
/// Every call to [`Connector::connect`] gets a fresh id so that events from a
/// superseded link can be told apart from the current one.
pub type LinkId = u64;

/// Lifecycle and data events raised by a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Channel handshake completed
    Opened,
    /// One inbound text message
    Message(String),
    /// Transport-level error (always followed by `Closed` once the link is down)
    Error(String),
    /// Channel closed, remotely or locally
    Closed,
}

/// A [`LinkEvent`] tagged with the link that raised it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkNotice {
    pub link: LinkId,
    pub event: LinkEvent,
}

/// Queue the links report their events into
pub type LinkEventSender = mpsc::UnboundedSender<LinkNotice>;

/// Receiving half of the link event queue
pub type LinkEventReceiver = mpsc::UnboundedReceiver<LinkNotice>;

/// One established (or establishing) message-oriented, full-duplex channel
pub trait Link: Send {
    /// Queue a text message for transmission
    fn send(&mut self, text: String) -> Result<()>;

    /// Request a local close; the link reports `Closed` when it is down
    fn close(&mut self);
}

/// Factory for links to the device
pub trait Connector: Send {
    /// Create a new channel
    ///
    /// An `Err` means the channel could not even be constructed (no transport,
    /// invalid address). Anything that goes wrong after construction is
    /// reported asynchronously through `events` instead.
    fn connect(&mut self, id: LinkId, events: LinkEventSender) -> Result<Box<dyn Link>>;
}

/// Presentation tag for the connection indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    Active,
    Inactive,
    /// Device-reported status tag, shown as-is
    Status(String),
}

/// Sink for connection indicator updates
#[cfg_attr(test, mockall::automock)]
pub trait IndicatorSink: Send {
    fn show(&mut self, indicator: Indicator);
}

/// Indicator sink that reports through the log
#[derive(Debug, Default)]
pub struct LogIndicator;

impl IndicatorSink for LogIndicator {
    fn show(&mut self, indicator: Indicator) {
        match indicator {
            Indicator::Active => info!("Connection indicator: active"),
            Indicator::Inactive => info!("Connection indicator: inactive"),
            Indicator::Status(tag) => info!("Device status: {}", tag),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::*;
    use super::*;

    #[test]
    fn test_mock_connector_records_attempts() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut connector = MockConnector::new();

        let mut link = connector.connect(7, tx).expect("mock connect should succeed");
        link.send("hello".to_string()).unwrap();
        link.close();

        assert_eq!(connector.attempts(), vec![7]);
        assert_eq!(connector.sent(), vec!["hello".to_string()]);
        assert_eq!(connector.closed(), vec![7]);
    }

    #[test]
    fn test_failing_connector() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut connector = MockConnector::failing();

        assert!(connector.connect(1, tx).is_err());
        assert_eq!(connector.attempts(), vec![1], "Failed attempts are still recorded");
    }

    #[test]
    fn test_log_indicator_accepts_all_tags() {
        let mut indicator = LogIndicator;
        indicator.show(Indicator::Active);
        indicator.show(Indicator::Inactive);
        indicator.show(Indicator::Status("on".to_string()));
    }
}
