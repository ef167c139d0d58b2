//! # Telemetry Sampler
//!
//! Turns the live RPM / advance stream into a stored sweep curve.
//!
//! This module handles:
//! - Tracking the peak RPM for display
//! - Logging one sample per new RPM high-water mark (the sampling gate)
//! - Replacing out-of-range advance readings with a sentinel
//! - Clearing the log and exporting it as CSV
//!
//! ## Sampling gate
//!
//! During a throttle sweep RPM rises, so a frame is logged only if its RPM
//! is above the RPM of the last logged sample. Falling or repeated RPM
//! values are acknowledged (the peak may still move) but not logged. This
//! yields a single-valued advance-over-RPM curve.
//!
//! ```
//! use sweep_dash::sampler::Sampler;
//!
//! let mut sampler = Sampler::new("log");
//! sampler.ingest(1000, Some(20.0));
//! sampler.ingest(1500, Some(25.0));
//! sampler.ingest(1200, Some(99.0)); // below the gate: dropped
//! sampler.ingest(2000, Some(60.0)); // logged with the sentinel
//!
//! assert_eq!(sampler.log().to_csv()?, "1000,20\n1500,25\n2000,-1\n");
//! assert_eq!(sampler.peak_rpm(), 2000);
//! # Ok::<(), sweep_dash::error::DashboardError>(())
//! ```

pub mod export;
pub mod log;

use tracing::{debug, info};

use crate::error::Result;
use self::export::{FileExport, CSV_MIME_TYPE};
use self::log::{Sample, SweepLog};

/// Stored advance meaning "no reliable reading at this RPM"
pub const ADVANCE_SENTINEL: f64 = -1.0;

/// Exclusive lower bound of a valid advance reading, in degrees
pub const ADVANCE_VALID_MIN: f64 = 0.0;

/// Exclusive upper bound of a valid advance reading, in degrees
pub const ADVANCE_VALID_MAX: f64 = 50.0;

/// Default export file name prefix (`log1.csv`, `log2.csv`, ...)
pub const DEFAULT_EXPORT_PREFIX: &str = "log";

/// Apply the advance validity filter
///
/// Values strictly between 0 and 50 are kept; anything else, including a
/// missing or non-finite reading, becomes [`ADVANCE_SENTINEL`].
pub fn filter_advance(advance: Option<f64>) -> f64 {
    match advance {
        Some(a) if a > ADVANCE_VALID_MIN && a < ADVANCE_VALID_MAX => a,
        _ => ADVANCE_SENTINEL,
    }
}

/// Live values for the numeric readout
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readout {
    /// RPM from the most recent frame
    pub rpm: u32,
    /// Highest RPM seen
    pub peak_rpm: u32,
    /// Raw advance of the most recently logged frame
    pub advance: Option<f64>,
}

/// Owns the sweep log and the markers that gate it
#[derive(Debug, Clone)]
pub struct Sampler {
    log: SweepLog,
    peak_rpm: u32,
    last_logged_rpm: u32,
    current_rpm: u32,
    last_advance: Option<f64>,
    export_count: u32,
    export_prefix: String,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_PREFIX)
    }
}

impl Sampler {
    /// Create an empty sampler
    ///
    /// # Arguments
    ///
    /// * `export_prefix` - File name prefix for exports
    pub fn new(export_prefix: impl Into<String>) -> Self {
        Self {
            log: SweepLog::new(),
            peak_rpm: 0,
            last_logged_rpm: 0,
            current_rpm: 0,
            last_advance: None,
            export_count: 0,
            export_prefix: export_prefix.into(),
        }
    }

    /// Feed one frame's RPM and (optional) advance
    ///
    /// # Returns
    ///
    /// * `Option<Sample>` - The appended sample, or `None` if the gate held
    ///   it back. `Some` means the chart must be redrawn.
    pub fn ingest(&mut self, rpm: u32, advance: Option<f64>) -> Option<Sample> {
        self.current_rpm = rpm;
        if rpm > self.peak_rpm {
            self.peak_rpm = rpm;
        }

        if rpm <= self.last_logged_rpm {
            return None;
        }

        let sample = Sample::new(rpm, filter_advance(advance));
        self.log.append(sample);
        self.last_logged_rpm = rpm;
        self.last_advance = advance;

        debug!("Logged sample #{}: {} rpm, {} deg", self.log.len(), sample.rpm, sample.advance);
        Some(sample)
    }

    /// Clear the sweep log
    ///
    /// The gate marker is kept: logging resumes only once the live RPM
    /// exceeds the last RPM logged before the reset.
    pub fn reset(&mut self) {
        info!(
            "Sweep log cleared ({} samples); logging resumes above {} rpm",
            self.log.len(),
            self.last_logged_rpm
        );
        self.log.clear();
    }

    /// Forget the peak RPM; the next frame sets a new one
    pub fn reset_peak(&mut self) {
        self.peak_rpm = 0;
    }

    /// Hand the log to an export sink as `<prefix><n>.csv`
    ///
    /// The counter advances on every call, whether or not the log changed
    /// since the previous export.
    ///
    /// # Returns
    ///
    /// * `Result<String>` - File name the log was exported under
    ///
    /// # Errors
    ///
    /// Returns whatever error the sink reports
    pub fn export(&mut self, sink: &mut dyn FileExport) -> Result<String> {
        self.export_count += 1;
        let filename = format!("{}{}.csv", self.export_prefix, self.export_count);

        sink.export(self.log.to_csv()?.into(), &filename, CSV_MIME_TYPE)?;
        Ok(filename)
    }

    pub fn log(&self) -> &SweepLog {
        &self.log
    }

    pub fn peak_rpm(&self) -> u32 {
        self.peak_rpm
    }

    pub fn last_logged_rpm(&self) -> u32 {
        self.last_logged_rpm
    }

    pub fn export_count(&self) -> u32 {
        self.export_count
    }

    pub fn readout(&self) -> Readout {
        Readout {
            rpm: self.current_rpm,
            peak_rpm: self.peak_rpm,
            advance: self.last_advance,
        }
    }
}
