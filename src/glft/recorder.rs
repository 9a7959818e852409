use super::types::StepStats;
use crate::errors::Result;
use std::{
    fs::{create_dir_all, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Sink for per-step statistics.
pub trait StatsRecorder {
    fn record(&mut self, stats: &StepStats) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards everything.
impl StatsRecorder for () {
    fn record(&mut self, _: &StepStats) -> Result<()> {
        Ok(())
    }
}

impl StatsRecorder for Vec<StepStats> {
    fn record(&mut self, stats: &StepStats) -> Result<()> {
        self.push(*stats);
        Ok(())
    }
}

const CSV_HEADER: &[u8] = b"step,half_spread,skew,volatility,a,k,bid_price,ask_price,position\n";

/// Appends one CSV row per step. The header is written only when the file
/// is created; unknown values are left empty.
pub struct CsvStatsRecorder {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl CsvStatsRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let is_new = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        if is_new {
            writer.write_all(CSV_HEADER)?;
        }
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsRecorder for CsvStatsRecorder {
    fn record(&mut self, stats: &StepStats) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{}",
            stats.step,
            fmt_f64(stats.half_spread),
            fmt_f64(stats.skew),
            fmt_f64(stats.volatility),
            fmt_f64(stats.a),
            fmt_f64(stats.k),
            fmt_f64(stats.bid_price),
            fmt_f64(stats.ask_price),
            fmt_f64(stats.position),
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn fmt_f64(value: f64) -> String {
    if value.is_finite() {
        format!("{:.6}", value)
    } else {
        String::new()
    }
}

/// Writes every step as one JSON object per line.
pub struct JsonLinesStatsRecorder<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesStatsRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> StatsRecorder for JsonLinesStatsRecorder<W> {
    fn record(&mut self, stats: &StepStats) -> Result<()> {
        serde_json::to_writer(&mut self.writer, stats)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
