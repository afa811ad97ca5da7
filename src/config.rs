//! Immutable run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::coords::{subtree_len, total_points};

/// Configuration for one generation job. Built once, passed by value into
/// the driver and supervisor; nothing global, nothing mutable.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root directory receiving live subtrees, archives and the checkpoint.
    pub output_root: PathBuf,
    /// Per-channel cardinality. Channel values occupy `0..base`; capped at 256.
    pub base: u32,
    /// Edge length of each square tile, in pixels.
    pub tile_size: u32,
    /// Number of tiles buffered in memory before a flush.
    pub batch_size: usize,
    /// Pause between driver invocations in the supervisor loop.
    pub restart_delay: Duration,
}

impl GeneratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With output root
    #[inline]
    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// With per-channel cardinality, clamped to `1..=256`
    #[inline]
    #[must_use]
    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base.clamp(1, 256);
        self
    }

    /// With tile edge length
    #[inline]
    #[must_use]
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size.max(1);
        self
    }

    /// With batch size
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// With inter-run delay
    #[inline]
    #[must_use]
    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    /// Total number of tiles in the job.
    #[inline]
    #[must_use]
    pub fn total_points(&self) -> u64 {
        total_points(self.base)
    }

    /// Number of tiles per first-channel subtree.
    #[inline]
    #[must_use]
    pub fn subtree_len(&self) -> u64 {
        subtree_len(self.base)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("tiles"),
            base: 256,
            tile_size: 256,
            batch_size: 2048,
            restart_delay: Duration::from_secs(1),
        }
    }
}
