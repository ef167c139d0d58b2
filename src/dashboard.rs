//! # Dashboard
//!
//! Composes the connection manager, sampler and chart on one task.
//!
//! Every input (link events, operator controls, timers) is handled to
//! completion before the next one is looked at, so no state is shared
//! across threads and nothing needs a lock. Inbound frames are handled in
//! arrival order; a frame that appends a sample redraws the chart before the
//! next event is taken.

use std::fs;
use std::future;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::chart::svg::render_svg;
use crate::chart::{ChartEngine, DisplayList};
use crate::config::Config;
use crate::connection::debounce::Debouncer;
use crate::connection::transport::{Connector, IndicatorSink, LinkEventReceiver, LinkEventSender, LinkNotice};
use crate::connection::ConnectionManager;
use crate::control::ControlInput;
use crate::error::{DashboardError, Result};
use crate::protocol::{Command, TelemetryFrame};
use crate::sampler::export::FileExport;
use crate::sampler::Sampler;

/// Whether the event loop keeps going after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The whole dashboard state
pub struct Dashboard {
    connection: ConnectionManager,
    sampler: Sampler,
    chart: ChartEngine,
    surface: DisplayList,
    exporter: Box<dyn FileExport>,
    static_advance_debounce: Debouncer<i32>,
    /// Static advance as last reported by the device or set by the operator
    static_advance: Option<i32>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("connection", &self.connection)
            .field("samples", &self.sampler.log().len())
            .field("static_advance", &self.static_advance)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Build a dashboard from configuration and its I/O collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `connector` - Factory for device links
    /// * `indicator` - Connection indicator sink
    /// * `exporter` - Destination for CSV exports
    /// * `link_events` - Queue the links report into; its receiver goes to [`Dashboard::run`]
    pub fn new(
        config: &Config,
        connector: Box<dyn Connector>,
        indicator: Box<dyn IndicatorSink>,
        exporter: Box<dyn FileExport>,
        link_events: LinkEventSender,
    ) -> Self {
        let chart = ChartEngine::new(
            f64::from(config.chart.width),
            f64::from(config.chart.height),
            config.chart.margin,
            config.chart.style.clone(),
        );

        Self {
            connection: ConnectionManager::new(
                connector,
                indicator,
                link_events,
                config.connection.reconnect_delay(),
            ),
            sampler: Sampler::new(config.export.prefix.clone()),
            chart,
            surface: DisplayList::new(),
            exporter,
            static_advance_debounce: Debouncer::new(config.connection.debounce()),
            static_advance: None,
        }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn chart(&self) -> &ChartEngine {
        &self.chart
    }

    pub fn surface(&self) -> &DisplayList {
        &self.surface
    }

    pub fn static_advance(&self) -> Option<i32> {
        self.static_advance
    }

    /// Draw the empty chart and make the first connection attempt
    pub fn start(&mut self) {
        self.chart.render(&mut self.surface);
        self.connection.start();
    }

    /// Handle one event from a device link
    pub fn on_link(&mut self, notice: LinkNotice, now: Instant) {
        if let Some(frame) = self.connection.handle(notice, now) {
            self.apply_frame(frame);
        }
    }

    fn apply_frame(&mut self, frame: TelemetryFrame) {
        if let Some(tag) = frame.status.filter(|tag| !tag.is_empty()) {
            self.connection.show_status(tag);
        }

        if let Some(value) = frame.static_advance {
            debug!("Device static advance: {}", value);
            self.static_advance = Some(value);
        }

        if let Some(rpm) = frame.rpm {
            if self.sampler.ingest(rpm, frame.advance).is_some() {
                if let Err(e) = self.chart.update(self.sampler.log(), &mut self.surface) {
                    warn!("Chart not updated: {}", e);
                }
            }
        }
    }

    /// Handle one operator input
    ///
    /// # Errors
    ///
    /// Returns error if an export or snapshot cannot be written, or the
    /// chart cannot take its snapshot of the log
    pub fn on_control(&mut self, input: ControlInput, now: Instant) -> Result<Flow> {
        match input {
            ControlInput::SetStaticAdvance(value) => {
                self.static_advance = Some(value);
                if self.static_advance_debounce.push(value, now) {
                    debug!("Superseded pending static advance with {}", value);
                }
            }
            ControlInput::Reset => {
                self.sampler.reset();
                self.chart.update(self.sampler.log(), &mut self.surface)?;
            }
            ControlInput::Export => {
                let filename = self.sampler.export(self.exporter.as_mut())?;
                info!("Exported {} samples as {}", self.sampler.log().len(), filename);
            }
            ControlInput::PointerMove { x, y } => {
                if let Some(sample) = self.chart.pointer_move(x, y, &mut self.surface) {
                    debug!("Inspecting {} rpm, {} deg", sample.rpm, sample.advance);
                }
            }
            ControlInput::PointerLeave => self.chart.pointer_leave(),
            ControlInput::Resize { width, height } => {
                self.chart.resize(width, height, &mut self.surface);
            }
            ControlInput::Snapshot(path) => {
                let (width, height) = self.chart.size();
                let svg = render_svg(&self.surface, width, height, self.chart.tooltip());
                fs::write(&path, svg)
                    .map_err(|e| DashboardError::Export(format!("{}: {}", path.display(), e)))?;
                info!("Chart snapshot written to {}", path.display());
            }
            ControlInput::Status => {
                let readout = self.sampler.readout();
                let advance = readout
                    .advance
                    .map_or_else(|| "-".to_string(), |a| format!("{}°", a));
                let static_advance = self
                    .static_advance
                    .map_or_else(|| "-".to_string(), |a| a.to_string());
                info!(
                    "RPM: {} | PEAK: {} | ADV: {} | static: {} | {:?} | {} samples",
                    readout.rpm,
                    readout.peak_rpm,
                    advance,
                    static_advance,
                    self.connection.state(),
                    self.sampler.log().len()
                );
            }
            ControlInput::ClearPeak => self.sampler.reset_peak(),
            ControlInput::Quit => {
                self.shutdown();
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Drop any pending send and close the device link
    pub fn shutdown(&mut self) {
        self.static_advance_debounce.cancel();
        self.connection.shutdown();
    }

    /// Fire whichever timers are due
    pub fn on_timer(&mut self, now: Instant) {
        self.connection.poll(now);

        if let Some(value) = self.static_advance_debounce.poll(now) {
            if self.connection.is_open() {
                info!("Setting static advance to {}", value);
                self.connection.send(&Command::SetStaticAdv { value });
            } else {
                debug!("Not connected, dropping static advance {}", value);
            }
        }
    }

    /// Earliest pending timer, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.connection.next_deadline(), self.static_advance_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run the event loop until a `Quit` input
    ///
    /// Makes the first connection attempt itself. If the control queue
    /// closes, the loop keeps serving the device.
    ///
    /// # Arguments
    ///
    /// * `links` - Receiver of the queue given to [`Dashboard::new`]
    /// * `controls` - Operator inputs
    pub async fn run(
        &mut self,
        mut links: LinkEventReceiver,
        mut controls: mpsc::UnboundedReceiver<ControlInput>,
    ) -> Result<()> {
        self.start();
        let mut controls_open = true;

        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                biased;

                Some(notice) = links.recv() => {
                    self.on_link(notice, Instant::now());
                }

                input = controls.recv(), if controls_open => match input {
                    Some(input) => match self.on_control(input, Instant::now()) {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => error!("{}", e),
                    },
                    None => {
                        warn!("Control input closed; serving the device only");
                        controls_open = false;
                    }
                },

                _ = wait_until(deadline) => {
                    self.on_timer(Instant::now());
                }
            }
        }

        info!("Dashboard stopped with {} samples logged", self.sampler.log().len());
        Ok(())
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => future::pending().await,
    }
}
