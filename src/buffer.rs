//! In-memory batch buffer and the flush protocol.
//!
//! Tiles accumulate in generation order and hit the disk in one burst. The
//! checkpoint only ever advances to an index whose tile, and every tile
//! before it, is already on disk.

use crate::checkpoint::CheckpointStore;
use crate::coords::{closes_subtree, Coord};
use crate::error::FlushError;
use crate::render::TILE_EXT;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// One rendered tile waiting for the next flush.
#[derive(Debug, Clone)]
pub struct PendingTile {
    /// Linear index of the tile.
    pub index: u64,
    /// Decoded coordinate; determines directory and file name.
    pub coord: Coord,
    /// Encoded PNG payload.
    pub bytes: Vec<u8>,
}

/// Insertion-ordered batch of pending tiles. Grows to the configured batch
/// size, then is flushed whole and cleared; never partially flushed.
#[derive(Debug, Default)]
pub struct BatchBuffer {
    entries: Vec<PendingTile>,
}

/// What a flush accomplished.
#[derive(Debug, Clone, Default)]
pub struct FlushReport {
    /// Tiles written by this call.
    pub written: usize,
    /// Highest index written, if any tile was.
    pub last_index: Option<u64>,
    /// `c0` values whose final member was written by this flush, recorded
    /// from the writes actually performed.
    pub closed_subtrees: Vec<u8>,
    /// Wall time spent in the write burst.
    pub elapsed: Duration,
}

impl BatchBuffer {
    /// Empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tile in generation order.
    pub fn push(&mut self, tile: PendingTile) {
        self.entries.push(tile);
    }

    /// Number of buffered tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes every buffered tile under `root`, advances the checkpoint, and
    /// clears the buffer. Flushing an empty buffer is a no-op.
    ///
    /// Entries are written in generation order. If a write fails, the
    /// checkpoint still advances over the prefix that reached the disk, the
    /// rest of the batch is dropped (the next run regenerates it), and the
    /// failing index is reported.
    pub fn flush(
        &mut self,
        root: &Path,
        store: &CheckpointStore,
        base: u32,
    ) -> Result<FlushReport, FlushError> {
        if self.entries.is_empty() {
            return Ok(FlushReport::default());
        }

        let started = Instant::now();
        let mut report = FlushReport::default();
        let mut failure = None;

        for tile in &self.entries {
            match write_tile(root, tile) {
                Ok(()) => {
                    report.written += 1;
                    report.last_index = Some(tile.index);
                    if closes_subtree(tile.index, base) {
                        report.closed_subtrees.push(tile.coord.c0);
                    }
                }
                Err(source) => {
                    failure = Some(FlushError::Write {
                        index: tile.index,
                        coord: tile.coord,
                        source,
                    });
                    break;
                }
            }
        }

        self.entries.clear();

        // Checkpoint strictly after the writes it covers. A failed save is
        // logged and survived; the previous record still resumes correctly,
        // at the cost of regenerating this batch.
        if let Some(last_index) = report.last_index {
            if let Err(e) = store.save(last_index) {
                tracing::error!("checkpoint save failed at index {last_index}: {e}");
            }
        }

        report.elapsed = started.elapsed();
        match failure {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}

fn write_tile(root: &Path, tile: &PendingTile) -> Result<(), std::io::Error> {
    let dir = root
        .join(format!("{:03}", tile.coord.c0))
        .join(format!("{:03}", tile.coord.c1));
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(format!("{}.{TILE_EXT}", tile.coord)), &tile.bytes)
}
