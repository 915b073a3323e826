//! # Adapter Registry
//!
//! Vendor callbacks arrive on vendor threads with no user data, so the
//! trampolines find the caller's callback table through a process-wide
//! registry holding at most one adapter.
//!
//! ## Slot Lifecycle
//!
//! ```text
//!            reserve()            publish()
//!  Vacant ─────────────► Reserved ─────────► Live
//!     ▲                     │                  │ retire()
//!     │   drop(Reservation) │                  ▼
//!     ├─────────────────────┘              Retiring
//!     │                                        │ drop(Registration)
//!     └────────────────────────────────────────┘
//! ```
//!
//! Only `Live` dispatches. Events arriving while the slot is `Reserved`
//! (the session is still acquiring) or `Retiring` are dropped.
//!
//! ## Draining
//!
//! A dispatch clones the live `Arc<Adapter>` and bumps `in_flight` under the
//! lock, then runs outside it. `retire` waits for `in_flight` to fall to the
//! number of dispatches the calling thread itself is inside of, so a caller
//! deleting its session from within a callback does not wait on itself.

use std::cell::RefCell;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::debug;
use shared::UHardwareGpsParams;

use crate::error::{ShimError, ShimResult};
use crate::wakelock::WakeLock;

/// The caller's callback table plus what trampolines need alongside it
pub struct Adapter {
    callbacks: UHardwareGpsParams,
    wake_lock: Box<dyn WakeLock>,
}

// SAFETY: the callback table is plain function pointers and an opaque
// context the caller promised may be used from any thread
unsafe impl Send for Adapter {}
unsafe impl Sync for Adapter {}

impl Adapter {
    pub fn new(callbacks: UHardwareGpsParams, wake_lock: Box<dyn WakeLock>) -> Self {
        Self {
            callbacks,
            wake_lock,
        }
    }

    pub fn callbacks(&self) -> &UHardwareGpsParams {
        &self.callbacks
    }

    pub fn wake_lock(&self) -> &dyn WakeLock {
        self.wake_lock.as_ref()
    }
}

enum Slot {
    Vacant,
    Reserved,
    Live(Arc<Adapter>),
    Retiring,
}

struct State {
    slot: Slot,
    in_flight: usize,
}

pub struct Registry {
    state: Mutex<State>,
    idle: Condvar,
}

thread_local! {
    // Registries this thread is currently dispatching through, innermost last
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

lazy_static! {
    /// The registry behind the exported C API
    pub static ref ADAPTERS: Arc<Registry> = Arc::new(Registry::new());
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                slot: Slot::Vacant,
                in_flight: 0,
            }),
            idle: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(&self) -> usize {
        self as *const Self as usize
    }

    fn own_depth(&self) -> usize {
        let key = self.key();
        DISPATCHING.with(|stack| stack.borrow().iter().filter(|&&k| k == key).count())
    }

    /// Claim the slot for a session under construction
    pub fn reserve(self: &Arc<Self>) -> ShimResult<Reservation> {
        let mut state = self.lock();
        match state.slot {
            Slot::Vacant => {
                state.slot = Slot::Reserved;
                Ok(Reservation {
                    registry: Arc::clone(self),
                    armed: true,
                })
            }
            _ => Err(ShimError::AlreadyExists),
        }
    }

    pub fn is_vacant(&self) -> bool {
        matches!(self.lock().slot, Slot::Vacant)
    }

    pub fn is_live(&self) -> bool {
        matches!(self.lock().slot, Slot::Live(_))
    }

    /// Run `f` against the live adapter; `None` if there is none
    pub fn dispatch<R>(&self, f: impl FnOnce(&Adapter) -> R) -> Option<R> {
        let adapter = {
            let mut state = self.lock();
            let adapter = match &state.slot {
                Slot::Live(adapter) => Arc::clone(adapter),
                _ => return None,
            };
            state.in_flight += 1;
            adapter
        };

        let _in_flight = InFlight::enter(self);
        Some(f(&adapter))
    }
}

/// Bookkeeping for one running dispatch
struct InFlight<'a> {
    registry: &'a Registry,
}

impl<'a> InFlight<'a> {
    fn enter(registry: &'a Registry) -> Self {
        DISPATCHING.with(|stack| stack.borrow_mut().push(registry.key()));
        Self { registry }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        DISPATCHING.with(|stack| {
            stack.borrow_mut().pop();
        });
        let mut state = self.registry.lock();
        state.in_flight -= 1;
        drop(state);
        self.registry.idle.notify_all();
    }
}

/// A claimed but not yet published slot; dropping it frees the slot
pub struct Reservation {
    registry: Arc<Registry>,
    armed: bool,
}

impl Reservation {
    /// Make `adapter` visible to dispatch
    pub fn publish(mut self, adapter: Arc<Adapter>) -> Registration {
        self.armed = false;
        self.registry.lock().slot = Slot::Live(adapter);
        debug!("Adapter published");
        Registration {
            registry: Arc::clone(&self.registry),
            retired: false,
        }
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.armed {
            self.registry.lock().slot = Slot::Vacant;
            debug!("Reservation released");
        }
    }
}

/// A published adapter; dropping it retires the adapter and frees the slot
pub struct Registration {
    registry: Arc<Registry>,
    retired: bool,
}

impl Registration {
    /// Stop new dispatches and wait for running ones on other threads
    pub fn retire(&mut self) {
        if self.retired {
            return;
        }
        self.retired = true;

        let own = self.registry.own_depth();
        let mut state = self.registry.lock();
        state.slot = Slot::Retiring;
        let _drained = self
            .registry
            .idle
            .wait_while(state, |s| s.in_flight > own)
            .unwrap_or_else(PoisonError::into_inner);
        debug!("Adapter retired");
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.retire();
        self.registry.lock().slot = Slot::Vacant;
    }
}
