//! # Capability Prober
//!
//! Each optional extension is obtained on its own; one that is missing or
//! fails never affects the others. Extensions with a callback surface are
//! kept only if registering the trampolines with them succeeds.
//!
//! | Extension | Callback surface | Used by                           |
//! |-----------|------------------|-----------------------------------|
//! | xtra      | yes              | `inject_vendor_data`              |
//! | agnss     | yes              | server / data connection commands |
//! | agnss ril | yes              | `set_reference_location`          |
//! | ni        | yes              | `respond_to_notification`         |
//! | debug     | no               | `debug_state`                     |

use std::sync::Arc;

use log::{debug, info};
use shared::{
    AGnssExtension, AGnssRilExtension, DebugExtension, GnssService, NiExtension, VendorResult,
    XtraExtension,
};

use crate::error::{confirm, Extension};
use crate::trampoline::Trampolines;

/// Extension handles of one session; set during construction only
#[derive(Default, Clone)]
pub struct Extensions {
    xtra: Option<Arc<dyn XtraExtension>>,
    agnss: Option<Arc<dyn AGnssExtension>>,
    agnss_ril: Option<Arc<dyn AGnssRilExtension>>,
    debug: Option<Arc<dyn DebugExtension>>,
    ni: Option<Arc<dyn NiExtension>>,
}

fn probe_one<T: ?Sized>(extension: Extension, result: VendorResult<Arc<T>>) -> Option<Arc<T>> {
    match result {
        Ok(handle) => Some(handle),
        Err(e) => {
            debug!("{} extension unavailable: {}", extension, e);
            None
        }
    }
}

/// Keep `handle` only if its callback registration is confirmed
fn register<T: ?Sized>(
    extension: Extension,
    handle: Option<Arc<T>>,
    set_callback: impl FnOnce(&T) -> VendorResult<bool>,
) -> Option<Arc<T>> {
    let handle = handle?;
    match confirm("set_callback", set_callback(&*handle)) {
        Ok(()) => Some(handle),
        Err(e) => {
            info!("{} extension dropped: {}", extension, e);
            None
        }
    }
}

impl Extensions {
    /// Probe every extension of `service` and register `trampolines` with
    /// the ones that have callbacks
    pub fn probe(service: &dyn GnssService, trampolines: &Arc<Trampolines>) -> Self {
        let xtra = probe_one(Extension::Xtra, service.xtra());
        let agnss = probe_one(Extension::AGnss, service.agnss());
        let agnss_ril = probe_one(Extension::AGnssRil, service.agnss_ril());
        let debug = probe_one(Extension::Debug, service.debug());
        let ni = probe_one(Extension::Ni, service.ni());

        let extensions = Self {
            xtra: register(Extension::Xtra, xtra, |x| x.set_callback(trampolines.clone())),
            agnss: register(Extension::AGnss, agnss, |x| x.set_callback(trampolines.clone())),
            agnss_ril: register(Extension::AGnssRil, agnss_ril, |x| {
                x.set_callback(trampolines.clone())
            }),
            debug,
            ni: register(Extension::Ni, ni, |x| x.set_callback(trampolines.clone())),
        };
        info!("Extensions: {:?}", extensions.supported());
        extensions
    }

    pub fn xtra(&self) -> Option<&Arc<dyn XtraExtension>> {
        self.xtra.as_ref()
    }

    pub fn agnss(&self) -> Option<&Arc<dyn AGnssExtension>> {
        self.agnss.as_ref()
    }

    pub fn agnss_ril(&self) -> Option<&Arc<dyn AGnssRilExtension>> {
        self.agnss_ril.as_ref()
    }

    pub fn debug(&self) -> Option<&Arc<dyn DebugExtension>> {
        self.debug.as_ref()
    }

    pub fn ni(&self) -> Option<&Arc<dyn NiExtension>> {
        self.ni.as_ref()
    }

    pub fn has(&self, extension: Extension) -> bool {
        match extension {
            Extension::Xtra => self.xtra.is_some(),
            Extension::AGnss => self.agnss.is_some(),
            Extension::AGnssRil => self.agnss_ril.is_some(),
            Extension::Debug => self.debug.is_some(),
            Extension::Ni => self.ni.is_some(),
        }
    }

    /// Present extensions, in a fixed order
    pub fn supported(&self) -> Vec<Extension> {
        [
            Extension::Xtra,
            Extension::AGnss,
            Extension::AGnssRil,
            Extension::Debug,
            Extension::Ni,
        ]
        .into_iter()
        .filter(|&e| self.has(e))
        .collect()
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.supported()).finish()
    }
}
