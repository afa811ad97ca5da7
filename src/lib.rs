//! chromatile: crash-safe, resumable bulk generation of the full RGB tile
//! space.
//!
//! Every point of a 3-channel discrete space (`base^3` points, 16,777,216 at
//! the default base of 256) maps to a solid-color PNG tile, written into a
//! `root/<c0>/<c1>/<c0>_<c1>_<c2>.png` tree. Generation is batched: tiles
//! buffer in memory, hit the disk in one burst, and only then does the
//! resume checkpoint advance. Each pass of the [`driver::GenerationDriver`]
//! flushes one batch and exits, and the [`supervisor::Supervisor`] restarts
//! it until the space is exhausted. Completed first-channel subtrees are
//! compacted into one zip archive each and their live directories removed.

pub mod archive;
pub mod buffer;
pub mod checkpoint;
pub mod config;
pub mod coords;
pub mod driver;
pub mod error;
pub mod render;
pub mod supervisor;

pub use archive::{archive_subtree, ArchiveReport};
pub use buffer::{BatchBuffer, FlushReport, PendingTile};
pub use checkpoint::CheckpointStore;
pub use config::GeneratorConfig;
pub use coords::{coord_to_index, index_to_coord, Coord};
pub use driver::{GenerationDriver, RunOutcome};
pub use error::{
    ArchiveError, CheckpointError, DriverError, FlushError, RenderError, SupervisorError,
};
pub use supervisor::{interpret_exit, Supervisor, Verdict};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
