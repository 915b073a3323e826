//! Thread creation on behalf of the legacy HAL.
//!
//! The HAL asks for its worker threads through a `create_thread` callback:
//! a name, an entry point and one untyped argument. The thread must start
//! right away, detached, and the HAL expects a pthread id back.

use std::ffi::c_void;
use std::os::unix::thread::{JoinHandleExt, RawPthread};
use std::thread;

use log::debug;

use crate::error::{ShimError, ShimResult};

/// Entry point handed over by the vendor
pub type EntryPoint = unsafe extern "C" fn(arg: *mut c_void);

pub trait TaskSpawner: Send + Sync {
    /// Run `entry(arg)` on a new detached thread named after `name`
    fn submit(&self, name: &str, entry: EntryPoint, arg: *mut c_void) -> ShimResult<RawPthread>;
}

/// Vendor argument moved onto the new thread
struct VendorArg(*mut c_void);

// SAFETY: the vendor hands the argument to exactly one new thread
unsafe impl Send for VendorArg {}

impl VendorArg {
    fn into_inner(self) -> *mut c_void {
        self.0
    }
}

/// `std::thread` backed spawner
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSpawner;

impl TaskSpawner for NativeSpawner {
    fn submit(&self, name: &str, entry: EntryPoint, arg: *mut c_void) -> ShimResult<RawPthread> {
        let arg = VendorArg(arg);
        let handle = thread::Builder::new()
            .name(name.replace('\0', ""))
            .spawn(move || {
                let arg = arg.into_inner();
                // SAFETY: vendor-supplied entry point with its own argument
                unsafe { entry(arg) }
            })
            .map_err(|e| ShimError::Spawn(e.to_string()))?;

        let id = handle.as_pthread_t();
        // Dropping the handle detaches the thread
        drop(handle);
        debug!("Spawned vendor thread {:?}", name);
        Ok(id)
    }
}
