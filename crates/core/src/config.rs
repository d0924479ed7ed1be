use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

const ENV_PREFIX: &str = "TILEBATCH";

fn env_opt(key: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{key}"))
        .ok()
        .filter(|s| !s.is_empty())
}

// ── Launch mode ───────────────────────────────────────────────

/// How the PE array is executed on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// One thread per PE on a dedicated rayon pool.
    #[default]
    Parallel,
    /// PEs run one after another on the calling thread.
    Sequential,
}

impl FromStr for LaunchMode {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parallel" => Ok(LaunchMode::Parallel),
            "sequential" => Ok(LaunchMode::Sequential),
            other => Err(TileError::Config(format!(
                "invalid launch mode '{other}', expected 'parallel' or 'sequential'"
            ))),
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::Parallel => write!(f, "parallel"),
            LaunchMode::Sequential => write!(f, "sequential"),
        }
    }
}

// ── Launch config ─────────────────────────────────────────────

/// Shape of the PE array and the tile/lane decomposition, typically parsed
/// from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Number of physical processing elements.
    #[serde(default = "default_pe_count")]
    pub pe_count: usize,
    /// Contiguous work items per virtual tile.
    #[serde(default = "default_elements_per_tile")]
    pub elements_per_tile: usize,
    /// Work items per sub-batch. Must divide `elements_per_tile`.
    #[serde(default = "default_lane_width")]
    pub lane_width: usize,
    /// Popped sub-batch indices at or above this are skipped.
    /// Defaults to `elements_per_tile / lane_width`.
    #[serde(default)]
    pub sub_batch_bound: Option<usize>,
    /// Sub-batch indices each PE pops per live tile.
    /// Defaults to `elements_per_tile / lane_width`.
    #[serde(default)]
    pub pops_per_tile: Option<usize>,
    /// Over-provisioned batch loop bound. Defaults to the minimum that
    /// reaches every tile.
    #[serde(default)]
    pub batch_count: Option<usize>,
    /// Give up on an empty parameter queue after this many milliseconds.
    /// `None` blocks forever.
    #[serde(default)]
    pub pop_timeout_ms: Option<u64>,
    /// Host threads for parallel launches. 0 = one per PE.
    #[serde(default)]
    pub worker_threads: usize,
    #[serde(default)]
    pub mode: LaunchMode,
}

fn default_pe_count() -> usize {
    2
}

fn default_elements_per_tile() -> usize {
    8
}

fn default_lane_width() -> usize {
    2
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            pe_count: default_pe_count(),
            elements_per_tile: default_elements_per_tile(),
            lane_width: default_lane_width(),
            sub_batch_bound: None,
            pops_per_tile: None,
            batch_count: None,
            pop_timeout_ms: None,
            worker_threads: 0,
            mode: LaunchMode::default(),
        }
    }
}

impl LaunchConfig {
    /// Shorthand for the three shape parameters, everything else defaulted.
    pub fn new(pe_count: usize, elements_per_tile: usize, lane_width: usize) -> Self {
        Self {
            pe_count,
            elements_per_tile,
            lane_width,
            ..Self::default()
        }
    }

    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> TileResult<Self> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> TileResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Defaults plus environment overrides (call `load_dotenv()` first).
    pub fn from_env() -> TileResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    // ── Environment variable overrides ──────────────────────────────

    /// Apply `TILEBATCH_<KEY>` overrides, e.g. `TILEBATCH_PE_COUNT` -> `pe_count`.
    pub fn apply_env_overrides(&mut self) -> TileResult<()> {
        self.apply_overrides_from(env_opt)
    }

    /// Apply overrides from an arbitrary key lookup. Keys are the
    /// unprefixed upper-case field names.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> TileResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PE_COUNT") {
            self.pe_count = parse_key("PE_COUNT", &v)?;
        }
        if let Some(v) = lookup("ELEMENTS_PER_TILE") {
            self.elements_per_tile = parse_key("ELEMENTS_PER_TILE", &v)?;
        }
        if let Some(v) = lookup("LANE_WIDTH") {
            self.lane_width = parse_key("LANE_WIDTH", &v)?;
        }
        if let Some(v) = lookup("SUB_BATCH_BOUND") {
            self.sub_batch_bound = Some(parse_key("SUB_BATCH_BOUND", &v)?);
        }
        if let Some(v) = lookup("POPS_PER_TILE") {
            self.pops_per_tile = Some(parse_key("POPS_PER_TILE", &v)?);
        }
        if let Some(v) = lookup("BATCH_COUNT") {
            self.batch_count = Some(parse_key("BATCH_COUNT", &v)?);
        }
        if let Some(v) = lookup("POP_TIMEOUT_MS") {
            self.pop_timeout_ms = Some(parse_key("POP_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("WORKER_THREADS") {
            self.worker_threads = parse_key("WORKER_THREADS", &v)?;
        }
        if let Some(v) = lookup("MODE") {
            self.mode = v.parse()?;
        }
        Ok(())
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Reject shapes the scheduler cannot run. Called before any PE starts.
    pub fn validate(&self) -> TileResult<()> {
        if self.pe_count == 0 {
            return Err(TileError::Config("pe_count must be positive".into()));
        }
        if self.elements_per_tile == 0 {
            return Err(TileError::Config("elements_per_tile must be positive".into()));
        }
        if self.lane_width == 0 {
            return Err(TileError::Config("lane_width must be positive".into()));
        }
        if self.elements_per_tile % self.lane_width != 0 {
            return Err(TileError::Config(format!(
                "lane_width {} does not divide elements_per_tile {}",
                self.lane_width, self.elements_per_tile
            )));
        }
        let per_tile = self.sub_batches_per_tile();
        match self.sub_batch_bound {
            Some(0) => {
                return Err(TileError::Config("sub_batch_bound must be positive".into()));
            }
            Some(bound) if bound > per_tile => {
                return Err(TileError::Config(format!(
                    "sub_batch_bound {bound} exceeds the {per_tile} sub-batches in a tile"
                )));
            }
            _ => {}
        }
        if self.pops_per_tile == Some(0) {
            return Err(TileError::Config("pops_per_tile must be positive".into()));
        }
        if self.batch_count == Some(0) {
            return Err(TileError::Config("batch_count must be positive".into()));
        }
        Ok(())
    }

    // ── Resolved values ─────────────────────────────────────────────

    /// Number of lane-width sub-batches that fit in one tile.
    pub fn sub_batches_per_tile(&self) -> usize {
        if self.lane_width == 0 {
            0
        } else {
            self.elements_per_tile / self.lane_width
        }
    }

    pub fn resolved_sub_batch_bound(&self) -> usize {
        self.sub_batch_bound.unwrap_or_else(|| self.sub_batches_per_tile())
    }

    pub fn resolved_pops_per_tile(&self) -> usize {
        self.pops_per_tile.unwrap_or_else(|| self.sub_batches_per_tile())
    }

    /// Resolve worker thread count (0 means one thread per PE).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            self.pe_count
        } else {
            self.worker_threads
        }
    }

    pub fn pop_timeout(&self) -> Option<Duration> {
        self.pop_timeout_ms.map(Duration::from_millis)
    }

    /// Batch loop bound for `n` items.
    ///
    /// An explicit `batch_count` may over-provision but never fall short of
    /// `ceil(ceil(n / elements_per_tile) / pe_count)`, since a short loop
    /// silently drops the tail tiles.
    pub fn batch_count_for(&self, n: usize) -> TileResult<usize> {
        let required = n
            .div_ceil(self.elements_per_tile)
            .div_ceil(self.pe_count);
        match self.batch_count {
            Some(count) if count < required => Err(TileError::Config(format!(
                "batch_count {count} is below the {required} batches needed for {n} items"
            ))),
            Some(count) => Ok(count),
            None => Ok(required),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Launch config loaded:");
        tracing::info!(
            "  shape:    pe_count={}, elements_per_tile={}, lane_width={}",
            self.pe_count,
            self.elements_per_tile,
            self.lane_width
        );
        tracing::info!(
            "  queues:   sub_batch_bound={}, pops_per_tile={}, pop_timeout={}",
            self.resolved_sub_batch_bound(),
            self.resolved_pops_per_tile(),
            self.pop_timeout_ms
                .map(|ms| format!("{ms}ms"))
                .unwrap_or_else(|| "none".into())
        );
        tracing::info!(
            "  host:     mode={}, worker_threads={}",
            self.mode,
            self.resolved_worker_threads()
        );
    }

    /// JSON view for reports.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "pe_count": self.pe_count,
            "elements_per_tile": self.elements_per_tile,
            "lane_width": self.lane_width,
            "sub_batch_bound": self.resolved_sub_batch_bound(),
            "pops_per_tile": self.resolved_pops_per_tile(),
            "batch_count": self.batch_count,
            "mode": self.mode,
        })
    }
}

fn parse_key<T: FromStr>(key: &str, value: &str) -> TileResult<T> {
    value.trim().parse().map_err(|_| {
        TileError::Config(format!("{ENV_PREFIX}_{key}: cannot parse '{value}'"))
    })
}
