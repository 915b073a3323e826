//! Kernel wake lock used while the vendor asks the system to stay awake

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use log::{debug, warn};

pub trait WakeLock: Send + Sync {
    fn acquire(&self);
    fn release(&self);
}

/// Wake lock backed by `/sys/power/wake_lock` and `/sys/power/wake_unlock`
#[derive(Debug, Clone)]
pub struct SysfsWakeLock {
    name: String,
    lock_path: PathBuf,
    unlock_path: PathBuf,
}

impl SysfsWakeLock {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_paths(name, "/sys/power/wake_lock", "/sys/power/wake_unlock")
    }

    pub fn with_paths(
        name: impl Into<String>,
        lock_path: impl Into<PathBuf>,
        unlock_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            lock_path: lock_path.into(),
            unlock_path: unlock_path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn write_name(&self, path: &PathBuf) {
        let result = OpenOptions::new()
            .write(true)
            .open(path)
            .and_then(|mut file| file.write_all(self.name.as_bytes()));
        match result {
            Ok(()) => debug!("{} -> {}", self.name, path.display()),
            Err(e) => warn!("Failed to write wake lock {}: {}", path.display(), e),
        }
    }
}

impl WakeLock for SysfsWakeLock {
    fn acquire(&self) {
        self.write_name(&self.lock_path);
    }

    fn release(&self) {
        self.write_name(&self.unlock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysfs_wake_lock_writes_name() {
        let dir = std::env::temp_dir().join(format!("u-hardware-wakelock-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let lock = dir.join("wake_lock");
        let unlock = dir.join("wake_unlock");
        std::fs::write(&lock, b"").unwrap();
        std::fs::write(&unlock, b"").unwrap();

        let wake_lock = SysfsWakeLock::with_paths("U_HARDWARE_GPS", &lock, &unlock);
        wake_lock.acquire();
        assert_eq!(std::fs::read(&lock).unwrap(), b"U_HARDWARE_GPS");
        wake_lock.release();
        assert_eq!(std::fs::read(&unlock).unwrap(), b"U_HARDWARE_GPS");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_sysfs_node_is_not_fatal() {
        let wake_lock = SysfsWakeLock::with_paths("x", "/nonexistent/wake_lock", "/nonexistent/wake_unlock");
        wake_lock.acquire();
        wake_lock.release();
        assert_eq!(wake_lock.name(), "x");
    }
}
