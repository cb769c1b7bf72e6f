//! # Call Context
//!
//! Every operation in the Tenancy Stack receives the caller's identity and
//! the current logical time as an explicit [`CallContext`] argument. The
//! surrounding host (which authenticated the caller and sequences the
//! calls) constructs one per operation; the core never consults an ambient
//! identity or clock.

use serde::{Deserialize, Serialize};

use crate::identity::PartyId;
use crate::time::Timestamp;

/// The authenticated caller and current logical time for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// The principal on whose behalf the operation runs.
    pub caller: PartyId,
    /// The logical time of the operation. Monotonically non-decreasing
    /// across calls; supplied by the host, never read from the wall clock
    /// inside an operation.
    pub now: Timestamp,
}

impl CallContext {
    /// Build a context from an authenticated caller and an explicit time.
    pub fn new(caller: PartyId, now: Timestamp) -> Self {
        Self { caller, now }
    }

    /// Build a context at the host's current wall-clock time.
    pub fn current(caller: PartyId) -> Self {
        Self {
            caller,
            now: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_carries_caller_and_time() {
        let caller = PartyId::new("tenant-1").unwrap();
        let now = Timestamp::from_epoch_secs(1625097600).unwrap();
        let ctx = CallContext::new(caller.clone(), now);
        assert_eq!(ctx.caller, caller);
        assert_eq!(ctx.now, now);
    }

    #[test]
    fn current_uses_wall_clock() {
        let before = Timestamp::now();
        let ctx = CallContext::current(PartyId::new("tenant-1").unwrap());
        assert!(ctx.now >= before);
    }
}
