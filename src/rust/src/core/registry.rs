//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! The instance registry, mapping opaque handles to live sessions.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::common::{
    validate_identifier, CallId, CallState, InstanceHandle, PeerId, Result,
};
use crate::core::call_lock::CallRwLock;
use crate::core::platform::Platform;
use crate::core::session_manager::{SessionConfig, SessionManager};
use crate::error::SessionRtcError;

/// Registry of initialized client instances.
///
/// This is the ownership registry that stands in for the opaque
/// handle + manual free contract of a native boundary: `initialize`
/// mints a fresh handle, `release` removes the session and drops it,
/// and any operation on a stale handle fails with `NotInitialized`
/// instead of touching freed state.
///
/// The registry is an explicitly constructed value; callers pass it
/// where it is needed rather than reaching for process-global state.
pub struct SessionRegistry<T>
where
    T: Platform,
{
    /// Map of all live sessions, indexed by InstanceHandle.
    session_map: Arc<CallRwLock<HashMap<InstanceHandle, SessionManager<T>>>>,
    /// Source of fresh handles.  Monotone, so handles are never
    /// reused within a process.
    next_handle: Arc<AtomicU64>,
}

impl<T> fmt::Display for SessionRegistry<T>
where
    T: Platform,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sessions = match self.session_map.read() {
            Ok(v) => format!("{}", v.len()),
            Err(_) => "unavailable".to_string(),
        };
        write!(f, "sessions: {}", sessions)
    }
}

impl<T> fmt::Debug for SessionRegistry<T>
where
    T: Platform,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl<T> Clone for SessionRegistry<T>
where
    T: Platform,
{
    fn clone(&self) -> Self {
        Self {
            session_map: Arc::clone(&self.session_map),
            next_handle: Arc::clone(&self.next_handle),
        }
    }
}

impl<T> Default for SessionRegistry<T>
where
    T: Platform,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SessionRegistry<T>
where
    T: Platform,
{
    /// Create a new, empty SessionRegistry.
    pub fn new() -> Self {
        Self {
            session_map: Arc::new(CallRwLock::new(HashMap::new(), "session_map")),
            next_handle: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Initialize a new instance for `identity` and register it.
    ///
    /// At most one live instance per identity is permitted; a second
    /// `initialize` for the same identity fails with
    /// `AlreadyInitialized` until the first is released.
    pub fn initialize(
        &self,
        identity: &str,
        platform: T,
        config: SessionConfig,
    ) -> Result<InstanceHandle> {
        info!("API:initialize():");
        validate_identifier("initialize()", "identity", identity)?;

        let mut session_map = self.session_map.write()?;
        if session_map
            .values()
            .any(|session| session.identity() == identity)
        {
            return Err(SessionRtcError::AlreadyInitialized(identity.to_string()).into());
        }

        let handle = InstanceHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        session_map.insert(
            handle,
            SessionManager::new(identity.to_string(), platform, config),
        );
        info!("initialize(): identity: {}, handle: {}", identity, handle);
        Ok(handle)
    }

    /// Release an instance: every non-terminal call it owns is
    /// transitioned to `Ended`, then the session is removed and
    /// dropped.  The session is also marked closed, so a forwarded
    /// operation that cloned it just before the removal cannot
    /// register new calls afterwards.
    ///
    /// Policy: releasing an invalid or already-released handle is a
    /// silent no-op, so double-release is always safe.
    pub fn release(&self, handle: InstanceHandle) -> Result<()> {
        info!("API:release({}):", handle);
        let session = {
            let mut session_map = self.session_map.write()?;
            session_map.remove(&handle)
        };
        match session {
            Some(session) => session.conclude_all(),
            None => {
                debug!("release(): unknown handle {}", handle);
                Ok(())
            }
        }
    }

    /// Create an outgoing call on the instance behind `handle`.
    pub fn place_call(&self, handle: InstanceHandle, remote_peer: PeerId) -> Result<CallId> {
        self.session(handle)?.place_call(remote_peer)
    }

    /// Look up the state of a call on the instance behind `handle`.
    pub fn call_state(&self, handle: InstanceHandle, call_id: CallId) -> Result<CallState> {
        self.session(handle)?.call_state(call_id)
    }

    /// End a call on the instance behind `handle`.  Idempotent.
    pub fn end_call(&self, handle: InstanceHandle, call_id: CallId) -> Result<()> {
        self.session(handle)?.end_call(call_id)
    }

    /// Register an incoming call announced by the platform.
    pub fn received_incoming_call(
        &self,
        handle: InstanceHandle,
        call_id: CallId,
        remote_peer: PeerId,
    ) -> Result<()> {
        self.session(handle)?
            .received_incoming_call(call_id, remote_peer)
    }

    /// Accept an incoming call.
    pub fn accept_call(&self, handle: InstanceHandle, call_id: CallId) -> Result<()> {
        self.session(handle)?.accept_call(call_id)
    }

    /// Reject an incoming call.
    pub fn reject_call(&self, handle: InstanceHandle, call_id: CallId) -> Result<()> {
        self.session(handle)?.reject_call(call_id)
    }

    /// Platform notification that negotiation completed.
    pub fn connection_established(&self, handle: InstanceHandle, call_id: CallId) -> Result<()> {
        self.session(handle)?.connection_established(call_id)
    }

    /// Platform notification that negotiation failed.
    pub fn connection_failed(&self, handle: InstanceHandle, call_id: CallId) -> Result<()> {
        self.session(handle)?.connection_failed(call_id)
    }

    /// Remove a terminal call record.
    pub fn release_call(&self, handle: InstanceHandle, call_id: CallId) -> Result<()> {
        self.session(handle)?.release_call(call_id)
    }

    /// True if `handle` references a live instance.
    pub fn is_initialized(&self, handle: InstanceHandle) -> bool {
        match self.session_map.read() {
            Ok(session_map) => session_map.contains_key(&handle),
            Err(_) => false,
        }
    }

    /// Number of live instances.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.session_map.read()?.len())
    }

    /// Clone the session behind `handle` out of the registry so the
    /// registry lock is not held while operating on it.  Sessions
    /// share their internals, so the clone observes and mutates the
    /// same call map.  A concurrent `release()` is safe against such
    /// clones: once `conclude_all()` has run, the session refuses new
    /// call registrations.
    fn session(&self, handle: InstanceHandle) -> Result<SessionManager<T>> {
        let session_map = self.session_map.read()?;
        match session_map.get(&handle) {
            Some(session) => Ok(session.clone()),
            None => Err(SessionRtcError::NotInitialized(handle).into()),
        }
    }
}
