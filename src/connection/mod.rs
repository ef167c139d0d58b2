//! # Connection Module
//!
//! Keeps one logical connection to the device and recovers from drops.
//!
//! ## State machine
//!
//! ```text
//!   start / reconnect timer           link opened
//! DISCONNECTED ─────────────> CONNECTING ─────────────> OPEN
//!      ^                                                 │
//!      └──────────────── link closed ────────────────────┘
//!                  (schedules one reconnect after the delay)
//! ```
//!
//! A link that cannot even be constructed leaves the manager DISCONNECTED
//! without scheduling a retry. A link that closes, at any point after
//! construction, always schedules one.
//!
//! The manager does no I/O of its own and never sleeps: the owner feeds it
//! [`LinkNotice`]s, sleeps until [`ConnectionManager::next_deadline`] and
//! calls [`ConnectionManager::poll`].

pub mod debounce;
pub mod transport;
pub mod websocket;

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::protocol::{decode_frame, encode_command, Command, TelemetryFrame};
use transport::{Connector, Indicator, IndicatorSink, Link, LinkEvent, LinkEventSender, LinkId, LinkNotice};

/// Delay between a close and the next connection attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
}

/// Owns the device link and its reconnect timer
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    indicator: Box<dyn IndicatorSink>,
    events: LinkEventSender,
    reconnect_delay: Duration,
    state: ConnectionState,
    link: Option<Box<dyn Link>>,
    /// Id of the most recent attempt; 0 before the first one
    link_id: LinkId,
    reconnect_at: Option<Instant>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state)
            .field("link_id", &self.link_id)
            .field("reconnect_at", &self.reconnect_at)
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Create a manager in the DISCONNECTED state
    ///
    /// # Arguments
    ///
    /// * `connector` - Factory for device links
    /// * `indicator` - Sink for the connection indicator
    /// * `events` - Queue handed to every link for reporting its events
    /// * `reconnect_delay` - Delay between a close and the next attempt
    pub fn new(
        connector: Box<dyn Connector>,
        indicator: Box<dyn IndicatorSink>,
        events: LinkEventSender,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            connector,
            indicator,
            events,
            reconnect_delay,
            state: ConnectionState::Disconnected,
            link: None,
            link_id: 0,
            reconnect_at: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether commands would currently be transmitted
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Id of the most recent connection attempt
    pub fn link_id(&self) -> LinkId {
        self.link_id
    }

    /// Make the first connection attempt
    pub fn start(&mut self) {
        self.connect();
    }

    fn connect(&mut self) {
        self.link_id += 1;
        info!("Trying to open a connection (attempt #{})...", self.link_id);

        match self.connector.connect(self.link_id, self.events.clone()) {
            Ok(link) => {
                self.link = Some(link);
                self.state = ConnectionState::Connecting;
            }
            Err(e) => {
                // Terminal for this attempt; no retry is scheduled
                error!("Channel not available, giving up on attempt #{}: {}", self.link_id, e);
                self.link = None;
                self.state = ConnectionState::Disconnected;
            }
        }
    }

    /// Process one link event
    ///
    /// # Returns
    ///
    /// * `Option<TelemetryFrame>` - The decoded frame for a well-formed message,
    ///   `None` for lifecycle events, stale links and discarded frames
    pub fn handle(&mut self, notice: LinkNotice, now: Instant) -> Option<TelemetryFrame> {
        if notice.link != self.link_id {
            debug!("Ignoring {:?} from superseded link #{}", notice.event, notice.link);
            return None;
        }

        match notice.event {
            LinkEvent::Opened => {
                self.on_open();
                None
            }
            LinkEvent::Message(text) => match decode_frame(&text) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    warn!("Discarding malformed frame: {}", e);
                    None
                }
            },
            LinkEvent::Error(msg) => {
                // Only the paired close changes state
                warn!("Connection error: {}", msg);
                None
            }
            LinkEvent::Closed => {
                self.on_close(now);
                None
            }
        }
    }

    fn on_open(&mut self) {
        info!("Connection opened");
        self.state = ConnectionState::Open;
        self.indicator.show(Indicator::Active);
        self.send(&Command::GetStaticAdv);
    }

    fn on_close(&mut self, now: Instant) {
        info!("Connection closed");
        self.link = None;
        self.state = ConnectionState::Disconnected;
        self.indicator.show(Indicator::Inactive);

        if self.reconnect_at.is_none() {
            self.reconnect_at = Some(now + self.reconnect_delay);
            debug!("Reconnect scheduled in {:?}", self.reconnect_delay);
        }
    }

    /// When the pending reconnect attempt is due, if one is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Fire the reconnect timer if it is due
    pub fn poll(&mut self, now: Instant) {
        if let Some(at) = self.reconnect_at {
            if at <= now {
                self.reconnect_at = None;
                self.connect();
            }
        }
    }

    /// Send a command to the device
    ///
    /// Silently dropped unless the connection is OPEN; never queued.
    pub fn send(&mut self, command: &Command) {
        if self.state != ConnectionState::Open {
            debug!("Not connected, dropping {:?}", command);
            return;
        }

        let text = match encode_command(command) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to encode {:?}: {}", command, e);
                return;
            }
        };

        if let Some(link) = self.link.as_mut() {
            if let Err(e) = link.send(text) {
                warn!("Failed to send {:?}: {}", command, e);
            }
        }
    }

    /// Forward a device status tag to the indicator
    pub fn show_status(&mut self, tag: String) {
        self.indicator.show(Indicator::Status(tag));
    }

    /// Close the link and cancel any pending reconnect
    pub fn shutdown(&mut self) {
        self.reconnect_at = None;
        if let Some(mut link) = self.link.take() {
            link.close();
        }
        self.state = ConnectionState::Disconnected;
    }
}
