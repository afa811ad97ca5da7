//! One generation pass: resume, render, flush, archive, exit.
//!
//! Each pass flushes at most one batch and then asks to be restarted, which
//! keeps peak memory at one batch regardless of how long the whole job
//! takes. The process exit is the batch boundary; the supervisor provides
//! the restarts.

use crate::archive::{archive_subtree, ArchiveReport, ARCHIVE_EXT};
use crate::buffer::{BatchBuffer, FlushReport, PendingTile};
use crate::checkpoint::CheckpointStore;
use crate::config::GeneratorConfig;
use crate::coords::index_to_coord;
use crate::error::DriverError;
use crate::render::render_tile;
use std::fs;
use std::time::Instant;

/// How a driver pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A full batch was flushed; the process should exit and be re-invoked.
    BatchFlushed,
    /// The tail of the job was flushed and the checkpoint cleared.
    JobFinished,
    /// No checkpoint and the final archive already exists; the job was
    /// finished by an earlier run.
    NothingToDo,
}

impl RunOutcome {
    /// Exit code the binary reports for this outcome. `NothingToDo` is
    /// nonzero on purpose: paired with the absent checkpoint it is the
    /// supervisor's completion signal.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::BatchFlushed | RunOutcome::JobFinished => 0,
            RunOutcome::NothingToDo => 4,
        }
    }
}

/// Runs single batched generation passes over the tile space.
pub struct GenerationDriver {
    config: GeneratorConfig,
    store: CheckpointStore,
}

impl GenerationDriver {
    /// Driver over the configured output root.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let store = CheckpointStore::new(&config.output_root);
        Self { config, store }
    }

    /// Executes one `STARTING → GENERATING → FLUSHING → ARCHIVING → EXITING`
    /// pass and reports how it ended.
    pub fn run(&self) -> Result<RunOutcome, DriverError> {
        let cfg = &self.config;
        let total = cfg.total_points();

        fs::create_dir_all(&cfg.output_root).map_err(DriverError::OutputRoot)?;

        let resume = self.store.next_index();
        // A malformed record also resumes at 0, but it still counts as
        // present: that is a restart, not a finished job.
        if resume == 0 && !self.store.exists() && self.final_archive_exists() {
            tracing::info!("no checkpoint and the final archive exists; job already complete");
            return Ok(RunOutcome::NothingToDo);
        }
        self.archive_backlog(resume)?;

        if resume > 0 && resume < total {
            tracing::info!(
                "resuming at index {resume} of {total} (coordinate {})",
                index_to_coord(resume, cfg.base)
            );
        } else if resume == 0 {
            tracing::info!(
                "generating {total} tiles at base {} ({}x{} px, batches of {})",
                cfg.base,
                cfg.tile_size,
                cfg.tile_size,
                cfg.batch_size
            );
        }

        let started = Instant::now();
        let mut buffer = BatchBuffer::new();

        for index in resume..total {
            let coord = index_to_coord(index, cfg.base);
            let bytes = match render_tile(coord, cfg.tile_size) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!("render failed at index {index} ({coord}): {e}");
                    // Whatever rendered before the failure can still reach
                    // the disk and be checkpointed.
                    if let Err(fe) = buffer.flush(&cfg.output_root, &self.store, cfg.base) {
                        tracing::error!("best-effort flush after render failure: {fe}");
                    }
                    return Err(DriverError::Render(e));
                }
            };
            buffer.push(PendingTile { index, coord, bytes });

            if buffer.len() >= cfg.batch_size {
                let report = buffer.flush(&cfg.output_root, &self.store, cfg.base)?;
                self.archive_closed(&report)?;
                self.log_progress(&report, resume, total, &started);
                return Ok(RunOutcome::BatchFlushed);
            }
        }

        // Tail of the job: the loop ran out before filling a batch.
        let report = buffer.flush(&cfg.output_root, &self.store, cfg.base)?;
        self.archive_closed(&report)?;
        if report.written > 0 {
            self.log_progress(&report, resume, total, &started);
        }
        self.store.clear()?;
        tracing::info!("all {total} tiles generated; checkpoint cleared");
        Ok(RunOutcome::JobFinished)
    }

    /// Archives every subtree the flush closed.
    fn archive_closed(&self, report: &FlushReport) -> Result<(), DriverError> {
        for &c0 in &report.closed_subtrees {
            archive_subtree(&self.config.output_root, c0)?;
        }
        Ok(())
    }

    /// Archives any fully-checkpointed subtree whose live directory survived
    /// a run that stopped between its flush and its archive step.
    fn archive_backlog(&self, resume: u64) -> Result<(), DriverError> {
        let complete = (resume / self.config.subtree_len()).min(u64::from(self.config.base));
        for c0 in 0..complete {
            if let ArchiveReport::Archived { .. } =
                archive_subtree(&self.config.output_root, c0 as u8)?
            {
                tracing::warn!("archived leftover subtree {c0:03} from an interrupted run");
            }
        }
        Ok(())
    }

    fn final_archive_exists(&self) -> bool {
        let last = (self.config.base - 1) as u8;
        self.config
            .output_root
            .join(format!("{last:03}.{ARCHIVE_EXT}"))
            .is_file()
    }

    fn log_progress(&self, report: &FlushReport, resume: u64, total: u64, started: &Instant) {
        let Some(last_index) = report.last_index else {
            return;
        };
        let done = last_index + 1;
        let elapsed = started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            (done - resume) as f64 / elapsed
        } else {
            0.0
        };
        let remaining_secs = if rate > 0.0 {
            (total - done) as f64 / rate
        } else {
            0.0
        };
        let hours = (remaining_secs / 3600.0) as u64;
        let minutes = ((remaining_secs % 3600.0) / 60.0) as u64;
        tracing::info!(
            "flushed {} tiles in {:.2?}; {done} / {total} complete; {rate:.0} tiles/s; eta {hours}h {minutes}m",
            report.written,
            report.elapsed
        );
    }
}
