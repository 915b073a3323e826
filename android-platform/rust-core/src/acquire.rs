//! # Service Acquirer
//!
//! Vendor services come in ordered generations. Acquisition adopts the
//! newest generation that resolves and repeats the whole attempt while the
//! service is not up yet:
//!
//! ```text
//! attempt 1:  V1_1 ✗  V1_0 ✗  Legacy ✗   ── sleep ──┐
//! attempt 2:  V1_1 ✗  V1_0 ✓ ──► adopted             │
//!             (Legacy never tried)       ◄───────────┘
//! ```

use std::fmt::Debug;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::error::{ShimError, ShimResult};

/// An ordered set of interface generations
pub trait Generation: Copy + Ord + Debug + 'static {
    /// Every generation, oldest first
    const ALL: &'static [Self];
}

/// How often and how patiently to retry acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 50,
            delay: Duration::from_millis(200),
        }
    }
}

/// Adopt the newest generation `resolve` can produce a handle for
pub fn resolve_newest<G, T>(mut resolve: impl FnMut(G) -> Option<T>) -> Option<(G, T)>
where
    G: Generation,
{
    G::ALL.iter().rev().find_map(|&generation| {
        let handle = resolve(generation)?;
        debug!("Adopted {:?}", generation);
        Some((generation, handle))
    })
}

/// Run `attempt` until it yields a value or the policy is exhausted
///
/// There is no delay after the final attempt.
pub fn acquire_with_retry<T>(
    policy: RetryPolicy,
    mut attempt: impl FnMut() -> Option<T>,
) -> ShimResult<T> {
    for n in 1..=policy.attempts {
        if let Some(value) = attempt() {
            if n > 1 {
                debug!("Acquired on attempt {}/{}", n, policy.attempts);
            }
            return Ok(value);
        }
        if n < policy.attempts {
            thread::sleep(policy.delay);
        }
    }
    warn!("Giving up after {} attempts", policy.attempts);
    Err(ShimError::ServiceUnavailable {
        attempts: policy.attempts,
    })
}
