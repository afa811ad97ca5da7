//! End-to-end driver passes over a small space (base 4: 64 tiles, subtrees
//! of 16), exercising resume, archiving and completion across restarts.

use chromatile::{CheckpointStore, GenerationDriver, GeneratorConfig, RunOutcome};
use std::fs;
use std::path::Path;
use std::time::Duration;

fn test_config(root: &Path) -> GeneratorConfig {
    GeneratorConfig::new()
        .with_output_root(root)
        .with_base(4)
        .with_tile_size(8)
        .with_batch_size(4)
        .with_restart_delay(Duration::from_millis(0))
}

#[test]
fn test_single_pass_flushes_one_batch() {
    let dir = tempfile::tempdir().unwrap();
    let driver = GenerationDriver::new(test_config(dir.path()));

    assert_eq!(driver.run().unwrap(), RunOutcome::BatchFlushed);

    let store = CheckpointStore::new(dir.path());
    assert_eq!(store.next_index(), 4);
    assert!(dir.path().join("000/000/000_000_000.png").is_file());
    assert!(dir.path().join("000/000/000_000_003.png").is_file());
    assert!(!dir.path().join("000/001").exists());
}

#[test]
fn test_resume_continues_without_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let driver = GenerationDriver::new(test_config(dir.path()));

    assert_eq!(driver.run().unwrap(), RunOutcome::BatchFlushed);
    assert_eq!(driver.run().unwrap(), RunOutcome::BatchFlushed);

    // Second pass generated exactly indexes 4..=7, nothing twice.
    for c2 in 0..4 {
        assert!(dir.path().join(format!("000/001/000_001_00{c2}.png")).is_file());
    }
    let content = fs::read_to_string(dir.path().join("resume_index.txt")).unwrap();
    assert_eq!(content.trim(), "7");
}

#[test]
fn test_subtree_archived_after_sixteen_tiles() {
    // At base 4 with batches of 4, index 15 closes subtree 000: the fourth
    // flush leaves a zip, no live directory, and a checkpoint of 15.
    let dir = tempfile::tempdir().unwrap();
    let driver = GenerationDriver::new(test_config(dir.path()));
    for _ in 0..4 {
        assert_eq!(driver.run().unwrap(), RunOutcome::BatchFlushed);
    }

    assert!(dir.path().join("000.zip").is_file());
    assert!(!dir.path().join("000").exists());
    let content = fs::read_to_string(dir.path().join("resume_index.txt")).unwrap();
    assert_eq!(content.trim(), "15");
}

#[test]
fn test_runs_to_completion_and_clears_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let driver = GenerationDriver::new(test_config(dir.path()));

    let mut finished = false;
    for _ in 0..32 {
        match driver.run().unwrap() {
            RunOutcome::BatchFlushed => {}
            RunOutcome::JobFinished => {
                finished = true;
                break;
            }
            RunOutcome::NothingToDo => panic!("completion detected before the job finished"),
        }
    }
    assert!(finished);

    let store = CheckpointStore::new(dir.path());
    assert!(!store.exists());
    for c0 in 0..4 {
        assert!(dir.path().join(format!("{c0:03}.zip")).is_file());
        assert!(!dir.path().join(format!("{c0:03}")).exists());
    }

    // A further pass sees the final archive and the missing checkpoint.
    assert_eq!(driver.run().unwrap(), RunOutcome::NothingToDo);
}

#[test]
fn test_malformed_checkpoint_restarts_from_zero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("resume_index.txt"), "abc").unwrap();

    let driver = GenerationDriver::new(test_config(dir.path()));
    assert_eq!(driver.run().unwrap(), RunOutcome::BatchFlushed);

    let content = fs::read_to_string(dir.path().join("resume_index.txt")).unwrap();
    assert_eq!(content.trim(), "3");
    assert!(dir.path().join("000/000/000_000_000.png").is_file());
}

#[test]
fn test_kill_before_flush_regenerates_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let driver = GenerationDriver::new(test_config(dir.path()));
    for _ in 0..5 {
        assert_eq!(driver.run().unwrap(), RunOutcome::BatchFlushed);
    }
    // Checkpoint says 19; a kill mid-batch leaves it there. A fresh driver
    // (fresh process) picks up at 20 and does not disturb the archived
    // subtree 000.
    let restarted = GenerationDriver::new(test_config(dir.path()));
    assert_eq!(restarted.run().unwrap(), RunOutcome::BatchFlushed);

    assert!(dir.path().join("000.zip").is_file());
    assert!(!dir.path().join("000").exists());
    assert!(dir.path().join("001/001/001_001_003.png").is_file());
    let content = fs::read_to_string(dir.path().join("resume_index.txt")).unwrap();
    assert_eq!(content.trim(), "23");
}

#[test]
fn test_leftover_complete_subtree_is_archived_on_start() {
    // Simulates a run that checkpointed subtree 000's last index but died
    // before the archive step.
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("000/000")).unwrap();
    fs::write(dir.path().join("000/000/000_000_000.png"), b"stub").unwrap();
    fs::write(dir.path().join("resume_index.txt"), "15").unwrap();

    let driver = GenerationDriver::new(test_config(dir.path()));
    assert_eq!(driver.run().unwrap(), RunOutcome::BatchFlushed);

    assert!(dir.path().join("000.zip").is_file());
    assert!(!dir.path().join("000").exists());
    // Generation carried on into subtree 001.
    assert!(dir.path().join("001/000/001_000_000.png").is_file());
}

#[test]
fn test_resume_at_total_closes_the_job() {
    // A crash between the final archive and the checkpoint clear leaves the
    // checkpoint at the last index; the next pass must just finish up.
    let dir = tempfile::tempdir().unwrap();
    let driver = GenerationDriver::new(test_config(dir.path()));
    for _ in 0..16 {
        assert_eq!(driver.run().unwrap(), RunOutcome::BatchFlushed);
    }
    // All 64 tiles are flushed and archived; the checkpoint still reads 63.
    let content = fs::read_to_string(dir.path().join("resume_index.txt")).unwrap();
    assert_eq!(content.trim(), "63");
    assert!(dir.path().join("003.zip").is_file());

    assert_eq!(driver.run().unwrap(), RunOutcome::JobFinished);
    assert!(!CheckpointStore::new(dir.path()).exists());
}
