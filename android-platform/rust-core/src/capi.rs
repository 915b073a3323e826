//! # Stable C API
//!
//! The `u_hardware_gps_*` and `u_hardware_booster_*` entry points. Handles
//! are opaque pointers:
//!
//! - GPS: `Box<GpsSession>` turned into a raw pointer, freed by
//!   `u_hardware_gps_delete`
//! - Booster: `Arc<Booster>` turned into a raw pointer, one strong count per
//!   `new` / `ref`, released by `unref`
//!
//! Every entry point accepts a null handle and turns failures into `false`,
//! null, or a logged no-op. Nothing unwinds across the boundary.

use std::ffi::{c_char, c_int, CStr};
use std::sync::Arc;

use log::{error, info, warn};
use shared::abi::{UHardwareGpsAGpsRefLocation, UHardwareGpsLocation};
use shared::vendor::PositionMode;
use shared::UHardwareGpsParams;

use crate::binding::ProviderChain;
use crate::booster::{Booster, Scenario};
use crate::config::ShimConfig;
use crate::error::{ShimError, ShimResult};
use crate::session::{check_ref_location_size, GpsSession};

lazy_static! {
    /// Configuration of this process, with the load error if there was one
    static ref RUNTIME_CONFIG: (ShimConfig, Option<ShimError>) = ShimConfig::load();
}

/// Configuration for an entry point; starts logging on first use
fn runtime() -> &'static ShimConfig {
    let (config, load_error) = &*RUNTIME_CONFIG;
    if crate::init_logging(config) {
        info!("Ubuntu hardware shim {}", shared::VERSION);
        if let Some(e) = load_error {
            warn!("Using default configuration: {}", e);
        }
    }
    config
}

/// Log a failed command and fold it into the C result
fn report(call: &str, result: ShimResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("{}: {}", call, e);
            false
        }
    }
}

unsafe fn session<'a>(handle: *mut GpsSession, call: &str) -> Option<&'a GpsSession> {
    let session = handle.as_ref();
    if session.is_none() {
        warn!("{} called with a null handle", call);
    }
    session
}

unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    match CStr::from_ptr(ptr).to_str() {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Dropping non UTF-8 string: {}", e);
            None
        }
    }
}

/// Create the GPS instance
///
/// Called from C:
/// ```c
/// UHardwareGps u_hardware_gps_new(UHardwareGpsParams* params);
/// ```
///
/// Returns null when `params` is null, an instance already exists, or no
/// vendor service could be acquired.
///
/// # Safety
///
/// `params` must be null or point to a valid `UHardwareGpsParams`.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_new(params: *mut UHardwareGpsParams) -> *mut GpsSession {
    let config = runtime();
    let Some(params) = params.as_ref() else {
        error!("u_hardware_gps_new called without params");
        return std::ptr::null_mut();
    };

    let provider = ProviderChain::platform(config);
    match GpsSession::create(*params, &provider, config) {
        Ok(session) => Box::into_raw(Box::new(session)),
        Err(e) => {
            error!("Unable to create GPS session: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Destroy the GPS instance; returns once no callback is running
///
/// # Safety
///
/// `handle` must be null or a pointer returned by `u_hardware_gps_new`
/// that was not deleted yet.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_delete(handle: *mut GpsSession) {
    if handle.is_null() {
        return;
    }
    drop(Box::from_raw(handle));
    info!("GPS session destroyed");
}

/// # Safety
///
/// `handle` must be null or a live GPS handle.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_start(handle: *mut GpsSession) -> bool {
    match session(handle, "u_hardware_gps_start") {
        Some(session) => report("start", session.start()),
        None => false,
    }
}

/// # Safety
///
/// `handle` must be null or a live GPS handle.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_stop(handle: *mut GpsSession) -> bool {
    match session(handle, "u_hardware_gps_stop") {
        Some(session) => report("stop", session.stop()),
        None => false,
    }
}

/// # Safety
///
/// `handle` must be null or a live GPS handle.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_inject_time(
    handle: *mut GpsSession,
    time: i64,
    time_reference: i64,
    uncertainty: c_int,
) {
    if let Some(session) = session(handle, "u_hardware_gps_inject_time") {
        report(
            "inject_time",
            session.inject_time(time, time_reference, uncertainty),
        );
    }
}

/// Only latitude, longitude and accuracy reach the vendor
///
/// # Safety
///
/// `handle` must be null or a live GPS handle.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_inject_location(
    handle: *mut GpsSession,
    location: UHardwareGpsLocation,
) {
    if let Some(session) = session(handle, "u_hardware_gps_inject_location") {
        report(
            "inject_location",
            session.inject_location(location.latitude, location.longitude, location.accuracy),
        );
    }
}

/// # Safety
///
/// `handle` must be null or a live GPS handle.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_delete_aiding_data(handle: *mut GpsSession, flags: u16) {
    if let Some(session) = session(handle, "u_hardware_gps_delete_aiding_data") {
        report("delete_aiding_data", session.delete_aiding_data(flags));
    }
}

/// # Safety
///
/// `handle` must be null or a live GPS handle; `hostname` must be null or a
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_agps_set_server_for_type(
    handle: *mut GpsSession,
    agps_type: u16,
    hostname: *const c_char,
    port: u16,
) {
    let Some(session) = session(handle, "u_hardware_gps_agps_set_server_for_type") else {
        return;
    };
    match c_str(hostname) {
        Some(hostname) => {
            report(
                "set_server",
                session.set_server_for_type(agps_type, hostname, port),
            );
        }
        None => error!("set_server: missing hostname"),
    }
}

/// `size_of_struct` is checked before `location` is read
///
/// # Safety
///
/// `handle` must be null or a live GPS handle; `location` must be null or
/// point to at least `size_of_struct` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_agps_set_reference_location(
    handle: *mut GpsSession,
    location: *mut UHardwareGpsAGpsRefLocation,
    size_of_struct: usize,
) {
    let Some(session) = session(handle, "u_hardware_gps_agps_set_reference_location") else {
        return;
    };
    if let Err(e) = check_ref_location_size(size_of_struct) {
        error!("set_reference_location: {}", e);
        return;
    }
    match location.as_ref() {
        Some(location) => {
            report(
                "set_reference_location",
                session.set_reference_location(location, size_of_struct),
            );
        }
        None => error!("set_reference_location: null location"),
    }
}

/// # Safety
///
/// `handle` must be null or a live GPS handle; `apn` must be null or a
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_agps_notify_connection_is_open(
    handle: *mut GpsSession,
    apn: *const c_char,
) {
    if let Some(session) = session(handle, "u_hardware_gps_agps_notify_connection_is_open") {
        report("data_conn_open", session.notify_connection_open(c_str(apn)));
    }
}

/// # Safety
///
/// `handle` must be null or a live GPS handle.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_agps_notify_connection_is_closed(handle: *mut GpsSession) {
    if let Some(session) = session(handle, "u_hardware_gps_agps_notify_connection_is_closed") {
        report("data_conn_closed", session.notify_connection_closed());
    }
}

/// # Safety
///
/// `handle` must be null or a live GPS handle.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_agps_notify_connection_not_available(
    handle: *mut GpsSession,
) {
    if let Some(session) = session(handle, "u_hardware_gps_agps_notify_connection_not_available")
    {
        report("data_conn_failed", session.notify_connection_unavailable());
    }
}

/// # Safety
///
/// `handle` must be null or a live GPS handle.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_set_position_mode(
    handle: *mut GpsSession,
    mode: u32,
    recurrence: u32,
    min_interval: u32,
    preferred_accuracy: u32,
    preferred_time: u32,
) -> bool {
    let Some(session) = session(handle, "u_hardware_gps_set_position_mode") else {
        return false;
    };
    let mode = PositionMode {
        mode,
        recurrence,
        min_interval_ms: min_interval,
        preferred_accuracy_m: preferred_accuracy,
        preferred_time_ms: preferred_time,
    };
    report("set_position_mode", session.set_position_mode(&mode))
}

/// # Safety
///
/// `handle` must be null or a live GPS handle; `data` must be null or point
/// to `length` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_gps_inject_xtra_data(
    handle: *mut GpsSession,
    data: *mut c_char,
    length: c_int,
) {
    let Some(session) = session(handle, "u_hardware_gps_inject_xtra_data") else {
        return;
    };
    let Ok(length) = usize::try_from(length) else {
        error!("inject_xtra_data: negative length {}", length);
        return;
    };
    if data.is_null() {
        error!("inject_xtra_data: null data");
        return;
    }
    let data = std::slice::from_raw_parts(data as *const u8, length);
    report("inject_xtra_data", session.inject_vendor_data(data));
}

/// Create a booster; never null
///
/// Called from C:
/// ```c
/// UHardwareBooster* u_hardware_booster_new(void);
/// ```
#[no_mangle]
pub extern "C" fn u_hardware_booster_new() -> *mut Booster {
    let booster = Arc::new(Booster::new(runtime()));
    info!("Created {:?}", booster);
    Arc::into_raw(booster) as *mut Booster
}

/// # Safety
///
/// `booster` must be null or a handle with a live reference.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_booster_ref(booster: *mut Booster) {
    if !booster.is_null() {
        Arc::increment_strong_count(booster as *const Booster);
    }
}

/// Drop one reference; the last one releases the backend
///
/// # Safety
///
/// `booster` must be null or a handle with a live reference owned by the
/// caller.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_booster_unref(booster: *mut Booster) {
    if !booster.is_null() {
        Arc::decrement_strong_count(booster as *const Booster);
    }
}

unsafe fn boost(booster: *mut Booster, scenario: u32, enable: bool) {
    let Some(booster) = (booster as *const Booster).as_ref() else {
        return;
    };
    let Ok(scenario) = Scenario::try_from(scenario) else {
        warn!("Unknown booster scenario {}", scenario);
        return;
    };
    if enable {
        booster.enable_scenario(scenario);
    } else {
        booster.disable_scenario(scenario);
    }
}

/// # Safety
///
/// `booster` must be null or a handle with a live reference.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_booster_enable_scenario(booster: *mut Booster, scenario: u32) {
    boost(booster, scenario, true);
}

/// # Safety
///
/// `booster` must be null or a handle with a live reference.
#[no_mangle]
pub unsafe extern "C" fn u_hardware_booster_disable_scenario(booster: *mut Booster, scenario: u32) {
    boost(booster, scenario, false);
}
