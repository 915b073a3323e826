//! # Vendor Bindings
//!
//! One adopted vendor GNSS stack, whatever its generation. Every generation
//! exposes the base [`GnssService`] capability set; the 1.1 service adds
//! [`GnssServiceV1_1`] on top.
//!
//! Providers turn a requested generation into a binding. Platform glue
//! (a service RPC client, a test double) installs its providers with
//! [`install_gnss_provider`]; the dlopen'ed legacy HAL is always tried last.

use std::sync::{Arc, Mutex, PoisonError};

use log::warn;
use shared::{GnssService, GnssServiceV1_1};

use crate::acquire::Generation;
use crate::config::ShimConfig;
use crate::legacy::LegacyHalProvider;

/// GNSS interface generations, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GnssGeneration {
    /// `hw_get_module("gps")` struct-of-function-pointers HAL
    LegacyHal,
    V1_0,
    V1_1,
}

impl Generation for GnssGeneration {
    const ALL: &'static [Self] = &[
        GnssGeneration::LegacyHal,
        GnssGeneration::V1_0,
        GnssGeneration::V1_1,
    ];
}

/// An adopted vendor GNSS interface
#[derive(Clone)]
pub enum VendorBinding {
    LegacyHal(Arc<dyn GnssService>),
    ServiceV1_0(Arc<dyn GnssService>),
    ServiceV1_1 {
        base: Arc<dyn GnssService>,
        v1_1: Arc<dyn GnssServiceV1_1>,
    },
}

impl VendorBinding {
    pub fn v1_1<S: GnssServiceV1_1 + 'static>(service: Arc<S>) -> Self {
        VendorBinding::ServiceV1_1 {
            base: service.clone(),
            v1_1: service,
        }
    }

    /// The base capability set, available on every generation
    pub fn service(&self) -> &Arc<dyn GnssService> {
        match self {
            VendorBinding::LegacyHal(service) | VendorBinding::ServiceV1_0(service) => service,
            VendorBinding::ServiceV1_1 { base, .. } => base,
        }
    }

    pub fn service_v1_1(&self) -> Option<&Arc<dyn GnssServiceV1_1>> {
        match self {
            VendorBinding::ServiceV1_1 { v1_1, .. } => Some(v1_1),
            _ => None,
        }
    }

    pub fn generation(&self) -> GnssGeneration {
        match self {
            VendorBinding::LegacyHal(_) => GnssGeneration::LegacyHal,
            VendorBinding::ServiceV1_0(_) => GnssGeneration::V1_0,
            VendorBinding::ServiceV1_1 { .. } => GnssGeneration::V1_1,
        }
    }
}

impl std::fmt::Debug for VendorBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("VendorBinding").field(&self.generation()).finish()
    }
}

/// Source of vendor bindings
pub trait GnssProvider: Send + Sync {
    /// A binding for exactly `generation`, if that generation is up
    fn resolve(&self, generation: GnssGeneration) -> Option<VendorBinding>;
}

/// Providers asked in order; the first binding wins
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn GnssProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: Arc<dyn GnssProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Installed providers followed by the legacy HAL
    pub fn platform(config: &ShimConfig) -> Self {
        let installed = GNSS_PROVIDERS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self {
            providers: installed,
        }
        .with(Arc::new(LegacyHalProvider::new(&config.legacy_hal_library)))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl GnssProvider for ProviderChain {
    fn resolve(&self, generation: GnssGeneration) -> Option<VendorBinding> {
        self.providers.iter().find_map(|provider| {
            let binding = provider.resolve(generation)?;
            if binding.generation() != generation {
                warn!(
                    "Provider answered {:?} with a {:?} binding, ignoring it",
                    generation,
                    binding.generation()
                );
                return None;
            }
            Some(binding)
        })
    }
}

lazy_static! {
    static ref GNSS_PROVIDERS: Mutex<Vec<Arc<dyn GnssProvider>>> = Mutex::new(Vec::new());
}

/// Make a vendor GNSS provider available to sessions created afterwards
pub fn install_gnss_provider(provider: Arc<dyn GnssProvider>) {
    GNSS_PROVIDERS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(provider);
}
