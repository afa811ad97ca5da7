//! Error types for the generation engine.
//!
//! One enum per concern, rolled up into [`DriverError`] at the pass
//! boundary. Archiving failures keep their own exit code because continuing
//! after a half-written archive would either duplicate or lose tiles.

use crate::coords::Coord;
use std::path::PathBuf;

/// Checkpoint record I/O failures.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Writing or renaming the record failed.
    #[error("checkpoint write failed: {0}")]
    Write(#[source] std::io::Error),

    /// Removing the record failed.
    #[error("checkpoint removal failed: {0}")]
    Remove(#[source] std::io::Error),
}

/// Tile encoding failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// PNG encoding failed for a coordinate.
    #[error("png encoding failed for {coord}: {source}")]
    Encode {
        /// Coordinate being rendered.
        coord: Coord,
        #[source]
        source: png::EncodingError,
    },
}

/// Batch flush failures.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    /// A tile write (or its directory creation) failed. Tiles before
    /// `index` in the batch are already on disk and checkpointed.
    #[error("write failed at index {index} ({coord}): {source}")]
    Write {
        /// Linear index of the failing tile.
        index: u64,
        /// Coordinate of the failing tile.
        coord: Coord,
        #[source]
        source: std::io::Error,
    },
}

/// Subtree compaction failures. All fatal; never retried.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Walking the live subtree failed.
    #[error("archive walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Writing the container failed.
    #[error("archive container error: {0}")]
    Container(#[from] zip::result::ZipError),

    /// Reading a member or creating the container file failed.
    #[error("archive io error: {0}")]
    Io(#[from] std::io::Error),

    /// The container was written but the live directory could not be removed.
    #[error("failed to remove archived subtree {path}: {source}")]
    Remove {
        /// Live directory that survived.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single generation pass.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The output root could not be created.
    #[error("output root unavailable: {0}")]
    OutputRoot(#[source] std::io::Error),

    /// Rendering a tile failed; its index was not checkpointed.
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// Flushing the batch failed part-way.
    #[error("flush failed: {0}")]
    Flush(#[from] FlushError),

    /// Archiving a closed subtree failed.
    #[error("archive failed: {0}")]
    Archive(#[from] ArchiveError),

    /// Clearing the checkpoint at job completion failed.
    #[error("checkpoint failed: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl DriverError {
    /// Process exit code for this failure. Archiving gets a distinct code so
    /// the operator can tell a fatal compaction error from a write error the
    /// next pass will simply retry.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::Archive(_) => 3,
            _ => 2,
        }
    }
}

/// Failure of the supervisor loop.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The driver subprocess could not be spawned.
    #[error("failed to spawn driver: {0}")]
    Spawn(#[source] std::io::Error),

    /// The driver failed while a checkpoint was still present.
    #[error("driver exited with status {code}")]
    DriverFailed {
        /// Exit code reported by the driver process.
        code: i32,
    },
}
