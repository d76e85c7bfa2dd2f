//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Common error codes.

use thiserror::Error;

use crate::common::{CallId, InstanceHandle, ResultCode};

/// Platform independent error conditions.
#[derive(Error, Debug)]
pub enum SessionRtcError {
    // Project wide common error codes
    #[error("Mutex poisoned: {0}")]
    MutexPoisoned(String),
    #[error("RwLock poisoned: {0}")]
    RwLockPoisoned(String),

    // Parameter validation error codes
    #[error("Invalid parameter in: {0}, var: {1}")]
    InvalidParameter(String, String),
    #[error("Malformed call id: {0}")]
    MalformedCallId(String),

    // Session registry error codes
    #[error("Instance already initialized for identity: {0}")]
    AlreadyInitialized(String),
    #[error("Handle does not reference a live instance: {0}")]
    NotInitialized(InstanceHandle),
    #[error("Instance has been released, identity: {0}")]
    SessionReleased(String),

    // Call registry error codes
    #[error("CallId not found in call_map: {0}")]
    CallIdNotFound(CallId),
    #[error("CallId already in use in call_map: {0}")]
    CallIdAlreadyUsed(CallId),
    #[error("Call is not in a terminal state: {0}")]
    CallStillActive(CallId),
    #[error("Concurrent call limit reached: {0}")]
    CallLimitExceeded(usize),

    // Transport error codes
    #[error("Unable to begin negotiation: {0}")]
    StartNegotiationFailed(String),
}

impl SessionRtcError {
    /// The status code reported for this error across the client
    /// boundary.
    pub fn result_code(&self) -> ResultCode {
        match self {
            SessionRtcError::InvalidParameter(_, _) | SessionRtcError::MalformedCallId(_) => {
                ResultCode::InvalidParameter
            }
            SessionRtcError::AlreadyInitialized(_) => ResultCode::AlreadyInitialized,
            SessionRtcError::NotInitialized(_)
            | SessionRtcError::SessionReleased(_)
            | SessionRtcError::CallIdNotFound(_) => ResultCode::NotInitialized,
            // The call cannot begin, the boundary taxonomy has no
            // dedicated busy code.
            SessionRtcError::CallLimitExceeded(_)
            | SessionRtcError::StartNegotiationFailed(_) => ResultCode::ConnectionFailed,
            SessionRtcError::MutexPoisoned(_)
            | SessionRtcError::RwLockPoisoned(_)
            | SessionRtcError::CallIdAlreadyUsed(_)
            | SessionRtcError::CallStillActive(_) => ResultCode::InternalError,
        }
    }
}

/// Derive the boundary status code for any error, falling back to
/// `InternalError` for unclassified failures.
pub fn code_for_error(error: &anyhow::Error) -> ResultCode {
    match error.downcast_ref::<SessionRtcError>() {
        Some(e) => e.result_code(),
        None => ResultCode::InternalError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_boundary_taxonomy() {
        assert_eq!(
            ResultCode::InvalidParameter,
            SessionRtcError::InvalidParameter("call()".to_string(), "remote_peer".to_string())
                .result_code()
        );
        assert_eq!(
            ResultCode::AlreadyInitialized,
            SessionRtcError::AlreadyInitialized("alice".to_string()).result_code()
        );
        assert_eq!(
            ResultCode::NotInitialized,
            SessionRtcError::NotInitialized(InstanceHandle::new(7)).result_code()
        );
        assert_eq!(
            ResultCode::NotInitialized,
            SessionRtcError::SessionReleased("alice".to_string()).result_code()
        );
        assert_eq!(
            ResultCode::ConnectionFailed,
            SessionRtcError::StartNegotiationFailed("no route".to_string()).result_code()
        );
    }

    #[test]
    fn unclassified_errors_become_internal_error() {
        let error = anyhow::anyhow!("something else entirely");
        assert_eq!(ResultCode::InternalError, code_for_error(&error));
    }

    #[test]
    fn classified_errors_downcast_through_anyhow() {
        let error: anyhow::Error = SessionRtcError::CallIdNotFound(CallId::new(1)).into();
        assert_eq!(ResultCode::NotInitialized, code_for_error(&error));
    }
}
