//! Logging and usage counters for pinmap
//!
//! - Structured logging with tracing, to stderr or a log file
//! - A per-run session id for correlating log lines
//! - Counters and timers for saves and lookups

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global metrics registry
static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Counter names recorded by the CLI
pub mod counters {
    pub const LOCATIONS_SAVED: &str = "locations_saved";
    pub const SAVES_CANCELLED: &str = "saves_cancelled";
    pub const NEAREST_LOOKUPS: &str = "nearest_lookups";
    pub const GEOLOCATION_FAILURES: &str = "geolocation_failures";
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Each step raises the level: warn, info, debug, trace
    pub verbosity: u8,
    /// Write to this file instead of stderr
    pub log_file: Option<PathBuf>,
    pub show_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            verbosity: 0,
            log_file: None,
            show_target: false,
        }
    }
}

impl TelemetryConfig {
    /// The filter directive after applying verbosity.
    pub fn effective_level(&self) -> String {
        match self.verbosity {
            0 => self.log_level.clone(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

/// Initialize logging with defaults
pub fn init() -> anyhow::Result<Option<WorkerGuard>> {
    init_with_config(TelemetryConfig::default())
}

/// Initialize logging.
///
/// When a log file is configured the returned guard must be held until exit
/// so buffered lines are flushed.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_level()));

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;

            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::never(&dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(config.show_target);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = file_layer.is_none().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.show_target)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(guard)
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Counters and operation timings for one run
pub struct MetricsRegistry {
    counters: RwLock<BTreeMap<String, AtomicU64>>,
    timings: RwLock<BTreeMap<String, TimingStats>>,
    start_time: Instant,
}

/// Aggregated durations of one operation, in milliseconds
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TimingStats {
    pub count: u64,
    pub total_ms: f64,
    pub max_ms: f64,
}

impl TimingStats {
    fn record(&mut self, ms: f64) {
        self.count += 1;
        self.total_ms += ms;
        self.max_ms = self.max_ms.max(ms);
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }
}

impl MetricsRegistry {
    fn new() -> Self {
        Self {
            counters: RwLock::new(BTreeMap::new()),
            timings: RwLock::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter
    pub fn increment(&self, name: &str) {
        if let Ok(counters) = self.counters.read() {
            if let Some(counter) = counters.get(name) {
                counter.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        if let Ok(mut counters) = self.counters.write() {
            counters
                .entry(name.to_string())
                .or_insert_with(|| AtomicU64::new(0))
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current value of a counter
    pub fn count(&self, name: &str) -> u64 {
        self.counters
            .read()
            .ok()
            .and_then(|counters| counters.get(name).map(|c| c.load(Ordering::Relaxed)))
            .unwrap_or(0)
    }

    /// Record one duration for `name`
    pub fn record_duration(&self, name: &str, duration: Duration) {
        if let Ok(mut timings) = self.timings.write() {
            timings
                .entry(name.to_string())
                .or_default()
                .record(duration.as_secs_f64() * 1000.0);
        }
    }

    /// Timing stats for `name`, if anything was recorded
    pub fn timing(&self, name: &str) -> Option<TimingStats> {
        self.timings.read().ok().and_then(|t| t.get(name).copied())
    }

    /// Export metrics as JSON
    pub fn export_json(&self) -> serde_json::Value {
        let counters: BTreeMap<String, u64> = self
            .counters
            .read()
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed))).collect())
            .unwrap_or_default();

        let timings: BTreeMap<String, TimingStats> =
            self.timings.read().map(|t| t.clone()).unwrap_or_default();

        serde_json::json!({
            "session_id": session_id(),
            "uptime_ms": self.start_time.elapsed().as_millis() as u64,
            "counters": counters,
            "timings": timings,
        })
    }
}

/// Get the global metrics registry
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

/// Timer for measuring operation duration
pub struct Timer {
    name: String,
    start: Instant,
    stopped: bool,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(mut self) -> Duration {
        self.stopped = true;
        let duration = self.start.elapsed();
        metrics().record_duration(&self.name, duration);
        tracing::debug!(
            metric = %self.name,
            duration_ms = duration.as_millis() as u64,
            "Timer completed"
        );
        duration
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if !self.stopped {
            metrics().record_duration(&self.name, self.start.elapsed());
        }
    }
}
