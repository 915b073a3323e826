//! # Ubuntu Hardware Native Shim
//!
//! This library exports the stable `u_hardware_gps_*` and
//! `u_hardware_booster_*` C API on top of whatever GNSS and power stack the
//! device vendor ships. It handles:
//!
//! - Service acquisition with bounded retry, newest generation first
//! - Probing the optional GNSS extensions the vendor implements
//! - Forwarding vendor callbacks to the caller's callback table
//! - Performance boosting through PerfService or the power service
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Caller (C / libhybris)                       │
//! │                                                                 │
//! │   u_hardware_gps_*                      u_hardware_booster_*    │
//! └────────────┬───────────────────────────────────────┬────────────┘
//!              │ capi                                  │ capi
//!              ▼                                       ▼
//! ┌──────────────────────────────────────┐   ┌──────────────────────┐
//! │ GpsSession                           │   │ Booster              │
//! │  ┌──────────┐  ┌──────────────────┐  │   │  PerfService | Power │
//! │  │ acquire  │  │ probe extensions │  │   │  | Inert             │
//! │  └────┬─────┘  └──────────────────┘  │   └──────────────────────┘
//! │       ▼                              │
//! │  VendorBinding (legacy HAL / 1.0 /   │
//! │  1.1)         ◄── Trampolines ───────┼──► Registry ──► caller cbs
//! └──────────────────────────────────────┘
//! ```
//!
//! ## C Functions Exported
//!
//! - `u_hardware_gps_new` / `u_hardware_gps_delete`: create / destroy the
//!   single GPS instance
//! - `u_hardware_gps_start`, `_stop`, `_inject_time`, `_inject_location`,
//!   `_delete_aiding_data`, `_set_position_mode`, `_inject_xtra_data`
//! - `u_hardware_gps_agps_*`: network assistance and reference location
//! - `u_hardware_booster_new`, `_ref`, `_unref`, `_enable_scenario`,
//!   `_disable_scenario`

// Required for lazy_static
#[macro_use]
extern crate lazy_static;

use std::sync::Once;

pub mod acquire;
pub mod binding;
pub mod booster;
pub mod capi;
pub mod config;
pub mod error;
pub mod legacy;
pub mod probe;
pub mod registry;
pub mod session;
pub mod spawn;
pub mod trampoline;
pub mod wakelock;

pub use binding::{install_gnss_provider, GnssGeneration, GnssProvider, ProviderChain, VendorBinding};
pub use booster::{install_power_provider, Booster, PowerGeneration, PowerProvider, Scenario};
pub use config::ShimConfig;
pub use error::{Extension, ShimError, ShimResult};
pub use registry::Registry;
pub use session::{GpsSession, SessionState};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Start the Android logger with the configured tag and level
///
/// Returns `true` for the call that actually initialised it.
pub fn init_logging(config: &ShimConfig) -> bool {
    let mut first = false;
    INIT_LOGGER.call_once(|| {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(config.level_filter())
                .with_tag(config.log_tag.as_str()),
        );
        first = true;
    });
    first
}
