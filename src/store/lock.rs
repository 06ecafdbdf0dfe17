// Single-writer guard for load/mutate/save cycles.
//
// Stores rewrite whole documents, so two overlapping passes would silently
// lose each other's updates. Every mutating command takes this lock first.
// The lock is a file created with create_new, which fails atomically if
// another process already holds it; dropping the guard removes the file.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const LOCK_FILE: &str = "outreach.lock";

#[derive(Debug)]
pub struct PassLock {
    path: PathBuf,
}

impl PassLock {
    /// Take the lock in `data_dir`, failing if another run holds it.
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        let path = data_dir.join(LOCK_FILE);

        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                anyhow::bail!(
                    "Another outreach run holds {}.\n\
                     If no other run is active, delete the file and retry.",
                    path.display()
                );
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        };

        writeln!(file, "{}", std::process::id())?;
        debug!(path = %path.display(), "Acquired pass lock");
        Ok(Self { path })
    }
}

impl Drop for PassLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to release pass lock");
        }
    }
}
