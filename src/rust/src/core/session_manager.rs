//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! The per-instance Session Manager object definitions.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::common::{
    validate_identifier, CallDirection, CallId, CallState, PeerId, Result,
};
use crate::core::call::Call;
use crate::core::call_lock::CallRwLock;
use crate::core::platform::Platform;
use crate::error::SessionRtcError;

/// Session level configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of concurrently live (non-terminal) calls.
    pub max_concurrent_calls: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 10,
        }
    }
}

/// One initialized library context, tied to one local identity.
///
/// Owns the registry of calls for that identity and drives each call
/// through its state machine.  All mutating operations serialize on
/// the call map write lock; `call_state()` takes only the read lock
/// so concurrent polling never blocks other readers.
pub struct SessionManager<T>
where
    T: Platform,
{
    /// The local identity this instance was initialized with.
    identity: String,
    /// Interface to platform specific methods.
    platform: Arc<T>,
    /// Map of all calls, indexed by CallId.
    call_map: Arc<CallRwLock<HashMap<CallId, Call>>>,
    /// Set once the instance is released.  Only touched while holding
    /// the call map write lock, so inserts serialize with teardown.
    closed: Arc<AtomicBool>,
    /// Session level configuration.
    config: SessionConfig,
}

impl<T> fmt::Display for SessionManager<T>
where
    T: Platform,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let calls = match self.call_map.read() {
            Ok(v) => format!("{}", v.len()),
            Err(_) => "unavailable".to_string(),
        };
        write!(f, "identity: {}, calls: {}", self.identity, calls)
    }
}

impl<T> fmt::Debug for SessionManager<T>
where
    T: Platform,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl<T> Clone for SessionManager<T>
where
    T: Platform,
{
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            platform: Arc::clone(&self.platform),
            call_map: Arc::clone(&self.call_map),
            closed: Arc::clone(&self.closed),
            config: self.config.clone(),
        }
    }
}

impl<T> SessionManager<T>
where
    T: Platform,
{
    /// Create a new SessionManager.
    pub fn new(identity: String, platform: T, config: SessionConfig) -> Self {
        info!("SessionManager(): identity: {}", identity);
        Self {
            identity,
            platform: Arc::new(platform),
            call_map: Arc::new(CallRwLock::new(HashMap::new(), "call_map")),
            closed: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create an outgoing call to `remote_peer`.
    ///
    /// The call is registered in the `Connecting` state and
    /// negotiation is started through the platform.  If the platform
    /// cannot even begin, the record is discarded and the error maps
    /// to `ConnectionFailed`; later transport failures surface
    /// asynchronously as the `Failed` state instead.
    ///
    /// The insert and the transport start share one critical section:
    /// a concurrent `conclude_all()` either refuses this call up
    /// front or concludes it only after the record fully exists, so
    /// the caller never receives an id for a call the instance cannot
    /// reach.  A transport failure is backed out in the same section,
    /// so pollers never observe the stillborn record.
    pub fn place_call(&self, remote_peer: PeerId) -> Result<CallId> {
        info!("API:place_call():");
        validate_identifier("place_call()", "remote_peer", &remote_peer)?;

        let call_id = {
            let mut call_map = self.call_map.write()?;
            self.check_open()?;
            self.check_call_limit(&call_map)?;

            // Fresh ids are re-rolled on the off chance of colliding
            // with a retained record; ids are never reused.
            let mut call_id = CallId::random();
            while call_map.contains_key(&call_id) {
                call_id = CallId::random();
            }

            call_map.insert(
                call_id,
                Call::new(call_id, CallDirection::OutGoing, remote_peer.clone()),
            );

            if let Err(e) = self.platform.start_outgoing(call_id, &remote_peer) {
                error!("start_outgoing() failed for call {}: {}", call_id, e);
                call_map.remove(&call_id);
                return Err(SessionRtcError::StartNegotiationFailed(e.to_string()).into());
            }
            call_id
        };
        info!("place_call(): call_id: {}", call_id);

        Ok(call_id)
    }

    /// Register an incoming call attempt announced by the platform.
    ///
    /// The call id comes from the remote side; a collision with a
    /// retained record violates id uniqueness and is rejected.
    pub fn received_incoming_call(&self, call_id: CallId, remote_peer: PeerId) -> Result<()> {
        info!("API:received_incoming_call({}):", call_id);
        validate_identifier("received_incoming_call()", "remote_peer", &remote_peer)?;

        let mut call_map = self.call_map.write()?;
        self.check_open()?;
        if call_map.contains_key(&call_id) {
            return Err(SessionRtcError::CallIdAlreadyUsed(call_id).into());
        }
        self.check_call_limit(&call_map)?;
        call_map.insert(
            call_id,
            Call::new(call_id, CallDirection::InComing, remote_peer),
        );
        Ok(())
    }

    /// Accept an incoming call, moving it from `Connecting` to
    /// `Active`.
    ///
    /// A call that already reached a terminal state is left alone;
    /// the earlier end or failure wins.
    pub fn accept_call(&self, call_id: CallId) -> Result<()> {
        info!("API:accept_call({}):", call_id);
        let mut call_map = self.call_map.write()?;
        match call_map.get_mut(&call_id) {
            Some(call) if call.direction() == CallDirection::InComing => {
                call.connection_established();
                Ok(())
            }
            Some(_) => Err(SessionRtcError::InvalidParameter(
                "accept_call()".to_string(),
                "call_id".to_string(),
            )
            .into()),
            None => Err(SessionRtcError::CallIdNotFound(call_id).into()),
        }
    }

    /// Reject an incoming call, moving it from `Connecting` to
    /// `Failed`.
    pub fn reject_call(&self, call_id: CallId) -> Result<()> {
        info!("API:reject_call({}):", call_id);
        let rejected = {
            let mut call_map = self.call_map.write()?;
            match call_map.get_mut(&call_id) {
                Some(call) if call.direction() == CallDirection::InComing => {
                    call.connection_failed()
                }
                Some(_) => {
                    return Err(SessionRtcError::InvalidParameter(
                        "reject_call()".to_string(),
                        "call_id".to_string(),
                    )
                    .into());
                }
                None => return Err(SessionRtcError::CallIdNotFound(call_id).into()),
            }
        };
        if rejected {
            self.notify_concluded(call_id);
        }
        Ok(())
    }

    /// Look up the current state of a call.  Read-only and
    /// non-blocking with respect to other readers.
    ///
    /// Unknown ids are a defined error, never an undefined value.
    pub fn call_state(&self, call_id: CallId) -> Result<CallState> {
        let call_map = self.call_map.read()?;
        match call_map.get(&call_id) {
            Some(call) => Ok(call.state()),
            None => Err(SessionRtcError::CallIdNotFound(call_id).into()),
        }
    }

    /// End a call.
    ///
    /// Idempotent: ending an already terminal or unknown call
    /// succeeds as a no-op, so duplicate teardown requests racing an
    /// asynchronous failure notification never error.
    pub fn end_call(&self, call_id: CallId) -> Result<()> {
        info!("API:end_call({}):", call_id);
        let ended = {
            let mut call_map = self.call_map.write()?;
            match call_map.get_mut(&call_id) {
                Some(call) => call.end(),
                None => {
                    debug!("end_call(): unknown call {}", call_id);
                    false
                }
            }
        };
        if ended {
            self.notify_concluded(call_id);
        }
        Ok(())
    }

    /// Platform notification that negotiation for a call completed.
    ///
    /// Ignored for calls that are already terminal (an explicit end
    /// wins) or already torn down.
    pub fn connection_established(&self, call_id: CallId) -> Result<()> {
        let mut call_map = self.call_map.write()?;
        match call_map.get_mut(&call_id) {
            Some(call) => {
                call.connection_established();
            }
            None => debug!("connection_established(): unknown call {}", call_id),
        }
        Ok(())
    }

    /// Platform notification that negotiation for a call timed out or
    /// was rejected by the peer.
    pub fn connection_failed(&self, call_id: CallId) -> Result<()> {
        let failed = {
            let mut call_map = self.call_map.write()?;
            match call_map.get_mut(&call_id) {
                Some(call) => call.connection_failed(),
                None => {
                    debug!("connection_failed(): unknown call {}", call_id);
                    false
                }
            }
        };
        if failed {
            self.notify_concluded(call_id);
        }
        Ok(())
    }

    /// Remove a terminal call record from the registry.
    ///
    /// Releasing an unknown (already released) id is a no-op; a call
    /// that is still live is refused.
    pub fn release_call(&self, call_id: CallId) -> Result<()> {
        info!("API:release_call({}):", call_id);
        let mut call_map = self.call_map.write()?;
        match call_map.get(&call_id) {
            Some(call) if call.state().is_terminal() => {
                call_map.remove(&call_id);
                Ok(())
            }
            Some(_) => Err(SessionRtcError::CallStillActive(call_id).into()),
            None => {
                debug!("release_call(): unknown call {}", call_id);
                Ok(())
            }
        }
    }

    /// End every non-terminal call, clear the registry, and mark the
    /// instance closed.  Used when the owning instance is released;
    /// afterwards any in-flight `place_call()` or
    /// `received_incoming_call()` is refused instead of registering a
    /// call nothing can reach.
    pub fn conclude_all(&self) -> Result<()> {
        info!("conclude_all(): identity: {}", self.identity);
        let ended: Vec<CallId> = {
            let mut call_map = self.call_map.write()?;
            self.closed.store(true, Ordering::Relaxed);
            let ended = call_map
                .values_mut()
                .filter_map(|call| if call.end() { Some(call.call_id()) } else { None })
                .collect();
            call_map.clear();
            ended
        };
        for call_id in ended {
            self.notify_concluded(call_id);
        }
        Ok(())
    }

    /// Total number of retained call records.
    pub fn call_count(&self) -> Result<usize> {
        Ok(self.call_map.read()?.len())
    }

    /// Number of non-terminal calls.
    pub fn live_call_count(&self) -> Result<usize> {
        Ok(self
            .call_map
            .read()?
            .values()
            .filter(|call| !call.state().is_terminal())
            .count())
    }

    // Caller must hold the call map write lock.
    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(SessionRtcError::SessionReleased(self.identity.clone()).into());
        }
        Ok(())
    }

    fn check_call_limit(&self, call_map: &HashMap<CallId, Call>) -> Result<()> {
        let live = call_map
            .values()
            .filter(|call| !call.state().is_terminal())
            .count();
        if live >= self.config.max_concurrent_calls {
            warn!(
                "call limit reached: {} live calls",
                self.config.max_concurrent_calls
            );
            return Err(
                SessionRtcError::CallLimitExceeded(self.config.max_concurrent_calls).into(),
            );
        }
        Ok(())
    }

    fn notify_concluded(&self, call_id: CallId) {
        if let Err(e) = self.platform.on_call_concluded(call_id) {
            error!("on_call_concluded() failed for call {}: {}", call_id, e);
        }
    }
}
