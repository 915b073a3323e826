//! Runtime configuration.
//!
//! Defaults reproduce the behaviour consumers have always seen (50
//! acquisition attempts, 200 ms apart, wake lock `U_HARDWARE_GPS`). A JSON
//! file named by `U_HARDWARE_CONFIG` may override any key; the PerfService
//! library path may also come from the environment or, on Android, from the
//! `ubuntu.perfservice.dl` system property.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use serde::Deserialize;

use crate::acquire::RetryPolicy;
use crate::error::{ShimError, ShimResult};

/// Environment variable naming the JSON configuration file
pub const CONFIG_PATH_ENV: &str = "U_HARDWARE_CONFIG";

/// Environment variable naming the PerfService library
pub const PERFSERVICE_ENV: &str = "UBUNTU_PERFSERVICE_DL";

/// System property naming the PerfService library
pub const PERFSERVICE_PROPERTY: &str = "ubuntu.perfservice.dl";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShimConfig {
    /// Acquisition attempts before construction gives up
    pub acquire_attempts: u32,
    /// Delay between acquisition attempts in milliseconds
    pub acquire_delay_ms: u64,
    /// Name written to the kernel wake lock interface
    pub wake_lock_name: String,
    /// Logcat tag
    pub log_tag: String,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
    /// Library providing `hw_get_module`
    pub legacy_hal_library: String,
    /// PerfService library for the booster, if any
    pub perfservice_library: Option<PathBuf>,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            acquire_attempts: 50,
            acquire_delay_ms: 200,
            wake_lock_name: "U_HARDWARE_GPS".to_string(),
            log_tag: "UbuntuHardware".to_string(),
            log_level: "debug".to_string(),
            legacy_hal_library: "libhardware.so".to_string(),
            perfservice_library: None,
        }
    }
}

impl ShimConfig {
    pub fn from_json(json: &str) -> ShimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> ShimResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ShimError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Configuration for this process: file, then environment, then
    /// system properties
    ///
    /// A file that fails to load is replaced by the defaults and handed back
    /// as the error; the environment and system properties still apply.
    pub fn load() -> (Self, Option<ShimError>) {
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_with(
            path.as_deref(),
            |key| std::env::var(key).ok(),
            system_property,
        )
    }

    fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
        property: impl Fn(&str) -> Option<String>,
    ) -> (Self, Option<ShimError>) {
        let (mut config, error) = match path.map(Self::from_path) {
            Some(Ok(config)) => (config, None),
            Some(Err(e)) => (Self::default(), Some(e)),
            None => (Self::default(), None),
        };
        config.apply_overrides(env, property);
        (config, error)
    }

    fn validate(&self) -> ShimResult<()> {
        if self.acquire_attempts == 0 {
            return Err(ShimError::Config("acquire_attempts must be at least 1".into()));
        }
        if self.wake_lock_name.is_empty() || self.wake_lock_name.contains(char::is_whitespace) {
            return Err(ShimError::Config(format!(
                "invalid wake lock name {:?}",
                self.wake_lock_name
            )));
        }
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| ShimError::Config(format!("unknown log level {:?}", self.log_level)))?;
        Ok(())
    }

    fn apply_overrides(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
        property: impl Fn(&str) -> Option<String>,
    ) {
        if self.perfservice_library.is_some() {
            return;
        }
        self.perfservice_library = env(PERFSERVICE_ENV)
            .or_else(|| property(PERFSERVICE_PROPERTY))
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.acquire_attempts,
            delay: Duration::from_millis(self.acquire_delay_ms),
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Debug)
    }
}

/// Read an Android system property through bionic
#[cfg(target_os = "android")]
fn system_property(name: &str) -> Option<String> {
    use std::ffi::{c_char, c_int, CStr, CString};

    const PROP_VALUE_MAX: usize = 92;
    type PropertyGet = unsafe extern "C" fn(*const c_char, *mut c_char) -> c_int;

    let name = CString::new(name).ok()?;
    // SAFETY: libc.so is always mapped in an Android process and
    // __system_property_get has had this signature since API level 1
    unsafe {
        let libc = libloading::Library::new("libc.so").ok()?;
        let get: libloading::Symbol<PropertyGet> = libc.get(b"__system_property_get\0").ok()?;
        let mut value = [0 as c_char; PROP_VALUE_MAX];
        if get(name.as_ptr(), value.as_mut_ptr()) <= 0 {
            return None;
        }
        Some(CStr::from_ptr(value.as_ptr()).to_string_lossy().into_owned())
    }
}

#[cfg(not(target_os = "android"))]
fn system_property(_name: &str) -> Option<String> {
    None
}
