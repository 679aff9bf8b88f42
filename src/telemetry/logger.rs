//! # Command Log Module
//!
//! Writes one JSON line per emitted velocity command into rotating files
//! under the configured log directory. Files are named
//! `commands-<index>.jsonl` with a monotonically growing index; on startup
//! the index continues after whatever is already on disk, and pruning keeps
//! only the newest files.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::teleop::VelocityCommand;

/// One telemetry record, the flattened view of a command.
#[derive(Debug, Serialize)]
struct CommandRecord<'a> {
    /// Time the record was written (not the command stamp)
    stamp: DateTime<Utc>,
    /// Frame id for stamped commands, absent otherwise
    frame_id: Option<&'a str>,
    linear_x: f64,
    angular_z: f64,
}

/// Rotating JSONL log of emitted commands.
pub struct CommandLog {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,

    file: File,
    file_index: u64,
    records_in_file: usize,
}

impl std::fmt::Debug for CommandLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLog")
            .field("dir", &self.dir)
            .field("file_index", &self.file_index)
            .finish_non_exhaustive()
    }
}

impl CommandLog {
    /// Open the log directory and start a fresh file.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or the first file cannot be created.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&dir)?;

        let file_index = next_file_index(&dir)?;
        let file = File::create(dir.join(file_name(file_index)))?;

        let log = Self {
            dir,
            max_records_per_file: config.max_records_per_file,
            max_files_to_keep: config.max_files_to_keep,
            file,
            file_index,
            records_in_file: 0,
        };

        log.prune()?;
        Ok(log)
    }

    /// Append one command to the log, rotating first if the current file
    /// is full.
    pub fn record(&mut self, command: &VelocityCommand) -> Result<()> {
        if self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = CommandRecord {
            stamp: Utc::now(),
            frame_id: command.frame_id(),
            linear_x: command.twist().linear_x,
            angular_z: command.twist().angular_z,
        };

        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.records_in_file += 1;

        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        self.file_index += 1;
        let path = self.dir.join(file_name(self.file_index));
        self.file = File::create(&path)?;
        self.records_in_file = 0;

        debug!("Telemetry log rotated to {}", path.display());

        self.prune()
    }

    /// Delete the oldest log files until only `max_files_to_keep` remain.
    fn prune(&self) -> Result<()> {
        let mut logs = existing_logs(&self.dir)?;
        logs.sort_by_key(|(index, _)| *index);

        while logs.len() > self.max_files_to_keep {
            let (index, path) = logs.remove(0);
            fs::remove_file(&path)?;
            debug!("Pruned telemetry log commands-{}.jsonl", index);
        }

        Ok(())
    }
}

fn file_name(index: u64) -> String {
    format!("commands-{:05}.jsonl", index)
}

/// Index one past the newest log file already on disk (1 for an empty dir).
fn next_file_index(dir: &Path) -> Result<u64> {
    let newest = existing_logs(dir)?
        .into_iter()
        .map(|(index, _)| index)
        .max();

    Ok(newest.map_or(1, |index| index + 1))
}

/// All `commands-<index>.jsonl` files in the directory.
fn existing_logs(dir: &Path) -> Result<Vec<(u64, PathBuf)>> {
    let mut logs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        if let Some(index) = name
            .strip_prefix("commands-")
            .and_then(|rest| rest.strip_suffix(".jsonl"))
            .and_then(|digits| digits.parse::<u64>().ok())
        {
            logs.push((index, path));
        }
    }

    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teleop::Twist;
    use std::io::BufRead;

    fn test_config(dir: &Path, max_records: usize, max_files: usize) -> TelemetryConfig {
        TelemetryConfig {
            enabled: true,
            log_dir: dir.to_string_lossy().to_string(),
            max_records_per_file: max_records,
            max_files_to_keep: max_files,
        }
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        let file = File::open(path).unwrap();
        std::io::BufReader::new(file)
            .lines()
            .map(|line| serde_json::from_str(&line.unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn test_record_writes_json_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = CommandLog::new(&test_config(dir.path(), 100, 5)).unwrap();

        log.record(&VelocityCommand::plain(Twist::new(0.5, -0.25)))
            .unwrap();
        drop(log);

        let lines = read_lines(&dir.path().join("commands-00001.jsonl"));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["linear_x"], 0.5);
        assert_eq!(lines[0]["angular_z"], -0.25);
        assert!(lines[0]["frame_id"].is_null());
        assert!(lines[0]["stamp"].is_string());
    }

    #[test]
    fn test_record_keeps_frame_id_of_stamped_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = CommandLog::new(&test_config(dir.path(), 100, 5)).unwrap();

        log.record(&VelocityCommand::stamped(
            "base_link".to_string(),
            Twist::ZERO,
        ))
        .unwrap();
        drop(log);

        let lines = read_lines(&dir.path().join("commands-00001.jsonl"));
        assert_eq!(lines[0]["frame_id"], "base_link");
    }

    #[test]
    fn test_rotation_after_max_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = CommandLog::new(&test_config(dir.path(), 2, 5)).unwrap();

        for _ in 0..5 {
            log.record(&VelocityCommand::plain(Twist::ZERO)).unwrap();
        }
        drop(log);

        // 2 + 2 + 1 records across three files
        assert_eq!(
            read_lines(&dir.path().join("commands-00001.jsonl")).len(),
            2
        );
        assert_eq!(
            read_lines(&dir.path().join("commands-00002.jsonl")).len(),
            2
        );
        assert_eq!(
            read_lines(&dir.path().join("commands-00003.jsonl")).len(),
            1
        );
    }

    #[test]
    fn test_retention_prunes_oldest_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = CommandLog::new(&test_config(dir.path(), 1, 2)).unwrap();

        for _ in 0..5 {
            log.record(&VelocityCommand::plain(Twist::ZERO)).unwrap();
        }
        drop(log);

        let mut logs = existing_logs(dir.path()).unwrap();
        logs.sort_by_key(|(index, _)| *index);
        let indices: Vec<u64> = logs.into_iter().map(|(index, _)| index).collect();
        assert_eq!(indices, vec![4, 5]);
    }

    #[test]
    fn test_index_continues_after_restart() {
        let dir = tempfile::tempdir().unwrap();

        let mut log = CommandLog::new(&test_config(dir.path(), 100, 5)).unwrap();
        log.record(&VelocityCommand::plain(Twist::ZERO)).unwrap();
        drop(log);

        let mut log = CommandLog::new(&test_config(dir.path(), 100, 5)).unwrap();
        log.record(&VelocityCommand::plain(Twist::ZERO)).unwrap();
        drop(log);

        assert!(dir.path().join("commands-00001.jsonl").exists());
        assert!(dir.path().join("commands-00002.jsonl").exists());
    }

    #[test]
    fn test_unrelated_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        fs::write(dir.path().join("commands-junk.jsonl"), "").unwrap();

        let mut log = CommandLog::new(&test_config(dir.path(), 1, 1)).unwrap();
        for _ in 0..3 {
            log.record(&VelocityCommand::plain(Twist::ZERO)).unwrap();
        }
        drop(log);

        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("commands-junk.jsonl").exists());
    }
}
