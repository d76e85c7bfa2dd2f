//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation Platform interface.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::common::{CallId, PeerId, Result};
use crate::core::call_lock::CallMutex;
use crate::core::platform::Platform;
use crate::error::SessionRtcError;

/// Simulation implementation of core::Platform.
///
/// Records the calls the session core hands to the transport so the
/// test suites can assert on them, and can be told to fail
/// `start_outgoing()` to exercise the `ConnectionFailed` path.
pub struct SimPlatform {
    /// Outgoing calls handed to the transport, most recent last.
    outgoing: Arc<CallMutex<Vec<(CallId, PeerId)>>>,
    /// Number of calls reported as concluded.
    concluded: Arc<AtomicUsize>,
    /// True if start_outgoing() should fail.
    fail_start_outgoing: Arc<AtomicBool>,
}

impl fmt::Display for SimPlatform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "outgoing: {}, concluded: {}",
            self.start_outgoing_count(),
            self.concluded_count()
        )
    }
}

impl fmt::Debug for SimPlatform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Clone for SimPlatform {
    fn clone(&self) -> Self {
        Self {
            outgoing: Arc::clone(&self.outgoing),
            concluded: Arc::clone(&self.concluded),
            fail_start_outgoing: Arc::clone(&self.fail_start_outgoing),
        }
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPlatform {
    /// Create a new SimPlatform.
    pub fn new() -> Self {
        Self {
            outgoing: Arc::new(CallMutex::new(Vec::new(), "outgoing")),
            concluded: Arc::new(AtomicUsize::new(0)),
            fail_start_outgoing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_fail_start_outgoing(&self, enable: bool) {
        self.fail_start_outgoing.store(enable, Ordering::Release);
    }

    pub fn start_outgoing_count(&self) -> usize {
        match self.outgoing.lock() {
            Ok(v) => v.len(),
            Err(_) => 0,
        }
    }

    pub fn last_outgoing(&self) -> Option<CallId> {
        match self.outgoing.lock() {
            Ok(v) => v.last().map(|(call_id, _)| *call_id),
            Err(_) => None,
        }
    }

    pub fn concluded_count(&self) -> usize {
        self.concluded.load(Ordering::Acquire)
    }
}

impl Platform for SimPlatform {
    fn start_outgoing(&self, call_id: CallId, remote_peer: &PeerId) -> Result<()> {
        info!("SimPlatform:start_outgoing(): {} -> {}", call_id, remote_peer);
        if self.fail_start_outgoing.load(Ordering::Acquire) {
            return Err(SessionRtcError::StartNegotiationFailed(
                "simulated transport outage".to_string(),
            )
            .into());
        }
        self.outgoing.lock()?.push((call_id, remote_peer.clone()));
        Ok(())
    }

    fn on_call_concluded(&self, call_id: CallId) -> Result<()> {
        info!("SimPlatform:on_call_concluded(): {}", call_id);
        self.concluded.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
