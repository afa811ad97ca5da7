//! Outer restart loop: re-invoke the driver until the job completes.
//!
//! The driver and supervisor never overlap; exactly one process touches the
//! output tree at a time, which is what makes the checkpoint safe without
//! locking.

use crate::checkpoint::CheckpointStore;
use crate::config::GeneratorConfig;
use crate::error::SupervisorError;
use std::io::{Error, ErrorKind};
use std::process::Command;
use std::thread;

/// What a finished driver run means for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Batch flushed; wait the fixed interval and re-invoke.
    Continue,
    /// Failure with no checkpoint left behind: the job is complete.
    Complete,
    /// Failure with the checkpoint still present: a real error.
    Failed(i32),
}

/// Exit-status interpretation, kept pure so it can be tested without
/// spawning processes.
#[must_use]
pub fn interpret_exit(code: i32, checkpoint_present: bool) -> Verdict {
    if code == 0 {
        Verdict::Continue
    } else if checkpoint_present {
        Verdict::Failed(code)
    } else {
        Verdict::Complete
    }
}

/// Repeatedly invokes the driver as a subprocess and inspects its exits.
pub struct Supervisor {
    config: GeneratorConfig,
    driver: Vec<String>,
}

impl Supervisor {
    /// `driver` is the argv for one generation pass, e.g.
    /// `["/path/to/chromatile", "generate", "--root", "tiles"]`.
    #[must_use]
    pub fn new(config: GeneratorConfig, driver: Vec<String>) -> Self {
        Self { config, driver }
    }

    /// Runs driver passes until completion or a hard failure. No retry cap
    /// and no backoff beyond the fixed restart delay.
    pub fn run(&self) -> Result<(), SupervisorError> {
        let (program, args) = self.driver.split_first().ok_or_else(|| {
            SupervisorError::Spawn(Error::new(ErrorKind::InvalidInput, "empty driver command"))
        })?;
        let store = CheckpointStore::new(&self.config.output_root);

        loop {
            tracing::info!("starting next generation pass");
            let status = Command::new(program)
                .args(args)
                .status()
                .map_err(SupervisorError::Spawn)?;
            let code = status.code().unwrap_or(-1);

            match interpret_exit(code, store.exists()) {
                Verdict::Continue => {
                    tracing::info!(
                        "pass complete; waiting {:?} before resuming",
                        self.config.restart_delay
                    );
                    thread::sleep(self.config.restart_delay);
                }
                Verdict::Complete => {
                    tracing::info!("no checkpoint left behind; generation is complete");
                    return Ok(());
                }
                Verdict::Failed(code) => {
                    tracing::error!("driver pass failed with status {code}; stopping");
                    return Err(SupervisorError::DriverFailed { code });
                }
            }
        }
    }
}
