//! # Sweep Log
//!
//! Ordered, append-only record of the sweep curve and its text form.
//!
//! The text form has one record per line, `<rpm>,<advance>\n`, with no
//! header. A sentinel advance of `-1` marks an RPM with no valid reading.

use super::{ADVANCE_SENTINEL, ADVANCE_VALID_MAX, ADVANCE_VALID_MIN};
use crate::error::{DashboardError, Result};

/// One logged point of the sweep curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub rpm: u32,
    /// Advance in degrees, or [`super::ADVANCE_SENTINEL`]
    pub advance: f64,
}

impl Sample {
    pub fn new(rpm: u32, advance: f64) -> Self {
        Self { rpm, advance }
    }
}

/// Ordered sequence of samples in insertion order
///
/// Samples are never edited or removed individually; the only mutation
/// besides [`SweepLog::append`] is a full [`SweepLog::clear`]. Nothing here
/// enforces RPM ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepLog {
    samples: Vec<Sample>,
}

impl SweepLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Serialize as newline-terminated `rpm,advance` records
    ///
    /// # Errors
    ///
    /// Returns error if the CSV writer fails to flush
    ///
    /// # Examples
    ///
    /// ```
    /// use sweep_dash::sampler::log::{Sample, SweepLog};
    ///
    /// let mut log = SweepLog::new();
    /// log.append(Sample::new(1000, 20.0));
    /// log.append(Sample::new(2000, -1.0));
    /// assert_eq!(log.to_csv()?, "1000,20\n2000,-1\n");
    /// # Ok::<(), sweep_dash::error::DashboardError>(())
    /// ```
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        for sample in &self.samples {
            writer.write_record([sample.rpm.to_string(), sample.advance.to_string()])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DashboardError::Export(format!("Failed to flush sweep log: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| DashboardError::Export(e.to_string()))
    }

    /// Parse the text form back into a log
    ///
    /// Blank lines are skipped. A trailing empty field (`1000,20,`) is
    /// accepted, as earlier versions of this logger wrote records that way.
    ///
    /// # Errors
    ///
    /// Returns `Record` error naming the 1-based line of the first bad record:
    /// an RPM that is not a plain unsigned integer, or an advance that is
    /// neither inside (0, 50) nor the `-1` sentinel
    pub fn parse_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut log = Self::new();
        for record in reader.records() {
            let record = record?;
            let sample = parse_record(&record).map_err(|reason| {
                let line = record.position().map_or(0, |p| p.line());
                let fields: Vec<&str> = record.iter().collect();
                DashboardError::Record(format!("line {}: {} ({:?})", line, reason, fields.join(",")))
            })?;
            log.append(sample);
        }

        Ok(log)
    }
}

fn parse_record(record: &csv::StringRecord) -> std::result::Result<Sample, &'static str> {
    match record.len() {
        2 => {}
        3 if record.get(2).map_or(false, str::is_empty) => {}
        _ => return Err("expected rpm,advance"),
    }

    let rpm = record
        .get(0)
        .filter(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|f| f.parse::<u32>().ok())
        .ok_or("bad rpm field")?;
    let advance = record
        .get(1)
        .and_then(|f| f.parse::<f64>().ok())
        .ok_or("bad advance field")?;

    let in_range = advance > ADVANCE_VALID_MIN && advance < ADVANCE_VALID_MAX;
    if !(in_range || advance == ADVANCE_SENTINEL) {
        return Err("advance out of range");
    }

    Ok(Sample { rpm, advance })
}
