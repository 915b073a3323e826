//! # Performance Booster
//!
//! Ramps system performance up for a scenario and back down. One backend is
//! chosen when the booster is created:
//!
//! 1. **PerfService**: a vendor library named by configuration, exporting
//!    `PerfServiceNative_boostEnable` / `PerfServiceNative_boostDisable`
//!    (each optional)
//! 2. **Power service**: the newest power service generation an installed
//!    provider can resolve, retried like GNSS acquisition; the
//!    user-interaction scenario maps to `set_interactive`
//! 3. **Inert**: every request is a no-op

use std::ffi::c_int;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use libloading::Library;
use log::{debug, info, warn};
use shared::PowerService;

use crate::acquire::{acquire_with_retry, resolve_newest, Generation, RetryPolicy};
use crate::config::ShimConfig;
use crate::error::ShimResult;

/// Booster scenarios of the public API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Scenario {
    UserInteraction = 0,
}

impl TryFrom<u32> for Scenario {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::UserInteraction),
            _ => Err(()),
        }
    }
}

/// Power service generations, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PowerGeneration {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
}

impl Generation for PowerGeneration {
    const ALL: &'static [Self] = &[
        PowerGeneration::V1_0,
        PowerGeneration::V1_1,
        PowerGeneration::V1_2,
        PowerGeneration::V1_3,
    ];
}

/// Source of power service handles
pub trait PowerProvider: Send + Sync {
    fn resolve(&self, generation: PowerGeneration) -> Option<Arc<dyn PowerService>>;
}

lazy_static! {
    static ref POWER_PROVIDERS: Mutex<Vec<Arc<dyn PowerProvider>>> = Mutex::new(Vec::new());
}

/// Make a power service provider available to boosters created afterwards
pub fn install_power_provider(provider: Arc<dyn PowerProvider>) {
    POWER_PROVIDERS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(provider);
}

type BoostFn = unsafe extern "C" fn(scenario: c_int);

enum Backend {
    PerfService {
        enable: Option<BoostFn>,
        disable: Option<BoostFn>,
        // Keeps `enable` / `disable` mapped
        _library: Library,
    },
    Power {
        generation: PowerGeneration,
        service: Arc<dyn PowerService>,
    },
    Inert,
}

/// Which backend a booster ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    PerfService,
    Power(PowerGeneration),
    Inert,
}

pub struct Booster {
    backend: Backend,
}

impl Booster {
    /// Booster for this process: configured PerfService library, then
    /// installed power providers
    pub fn new(config: &ShimConfig) -> Self {
        let providers = POWER_PROVIDERS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self::select(
            config.perfservice_library.as_deref(),
            &providers,
            config.retry_policy(),
        )
    }

    pub fn select(
        perfservice: Option<&Path>,
        providers: &[Arc<dyn PowerProvider>],
        policy: RetryPolicy,
    ) -> Self {
        if let Some(path) = perfservice {
            match Self::load_perfservice(path) {
                Ok(backend) => return Self { backend },
                Err(e) => warn!("PerfService {}: {}", path.display(), e),
            }
        }

        if providers.is_empty() {
            debug!("No power provider installed, booster is inert");
            return Self::inert();
        }

        let acquired = acquire_with_retry(policy, || {
            resolve_newest(|g: PowerGeneration| {
                providers.iter().find_map(|provider| provider.resolve(g))
            })
        });
        match acquired {
            Ok((generation, service)) => {
                info!("Booster using power service {:?}", generation);
                Self {
                    backend: Backend::Power {
                        generation,
                        service,
                    },
                }
            }
            Err(e) => {
                warn!("Unable to get power service: {}", e);
                Self::inert()
            }
        }
    }

    pub fn inert() -> Self {
        Self {
            backend: Backend::Inert,
        }
    }

    fn load_perfservice(path: &Path) -> ShimResult<Backend> {
        // SAFETY: the configured library is trusted vendor code
        let library = unsafe { Library::new(path)? };
        let symbol = |name: &[u8]| -> Option<BoostFn> {
            // SAFETY: PerfService entry points take one int scenario
            unsafe { library.get::<BoostFn>(name).ok().map(|f| *f) }
        };
        let enable = symbol(b"PerfServiceNative_boostEnable\0");
        let disable = symbol(b"PerfServiceNative_boostDisable\0");
        info!(
            "Booster using PerfService {} (enable: {}, disable: {})",
            path.display(),
            enable.is_some(),
            disable.is_some()
        );
        Ok(Backend::PerfService {
            enable,
            disable,
            _library: library,
        })
    }

    pub fn kind(&self) -> BackendKind {
        match &self.backend {
            Backend::PerfService { .. } => BackendKind::PerfService,
            Backend::Power { generation, .. } => BackendKind::Power(*generation),
            Backend::Inert => BackendKind::Inert,
        }
    }

    pub fn enable_scenario(&self, scenario: Scenario) {
        self.apply(scenario, true);
    }

    pub fn disable_scenario(&self, scenario: Scenario) {
        self.apply(scenario, false);
    }

    fn apply(&self, scenario: Scenario, enable: bool) {
        match &self.backend {
            Backend::PerfService {
                enable: on,
                disable: off,
                ..
            } => {
                if let Some(boost) = if enable { on } else { off } {
                    // SAFETY: resolved from the PerfService library we hold
                    unsafe { boost(scenario as c_int) };
                }
            }
            Backend::Power { service, .. } => match scenario {
                Scenario::UserInteraction => {
                    if let Err(e) = service.set_interactive(enable) {
                        warn!("set_interactive({}) failed: {}", enable, e);
                    }
                }
            },
            Backend::Inert => {}
        }
    }
}

impl std::fmt::Debug for Booster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Booster").field("backend", &self.kind()).finish()
    }
}
