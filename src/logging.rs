//! Log setup: `env_logger` writing into a size-rotated file under
//! `~/jenkins-bt-logs/`.
//!
//! The level defaults to `info` and can be changed through `RUST_LOG`.

use anyhow::{Context, Result};
use env_logger::{Env, Target};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const LOG_DIR: &str = "jenkins-bt-logs";
const LOG_FILE: &str = "build.log";
const MAX_LOG_BYTES: u64 = 1_000_000;
const LOG_BACKUPS: usize = 2;

/// Initialise the global logger. Returns the path of the active log file.
pub fn init_logging() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_DIR);
    let path = dir.join(LOG_FILE);

    let file = RotatingFile::open(&path, MAX_LOG_BYTES, LOG_BACKUPS)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .context("Failed to initialise logger")?;

    Ok(path)
}

/// Append-only file that rolls over to `<name>.1`, `<name>.2`, ... once it
/// would grow past `max_bytes`.
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    backups: usize,
}

impl RotatingFile {
    pub fn open(path: &Path, max_bytes: u64, backups: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            written,
            max_bytes,
            backups,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups > 0 {
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }

        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("build.log");

        let mut file = RotatingFile::open(&path, 100, 2).unwrap();
        file.write_all(b"hello\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn rotates_and_keeps_limited_backups() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("build.log");
        let mut file = RotatingFile::open(&path, 10, 2).unwrap();

        for line in ["first-aaa\n", "second-bb\n", "third-ccc\n", "fourth-dd\n"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fourth-dd\n");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("build.log.1")).unwrap(),
            "third-ccc\n"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("build.log.2")).unwrap(),
            "second-bb\n"
        );
        assert!(!temp_dir.path().join("build.log.3").exists());
    }

    #[test]
    fn appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("build.log");
        fs::write(&path, "old\n").unwrap();

        let mut file = RotatingFile::open(&path, 100, 1).unwrap();
        file.write_all(b"new\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }
}
