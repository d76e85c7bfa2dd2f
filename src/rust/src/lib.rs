//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! # SessionRTC -- A Rust Call Session Manager
//!
//! This crate provides the session-management core behind a
//! handle-based calling interface: a registry of initialized client
//! instances, a per-instance registry of calls, and the state machine
//! that governs each call from `Connecting` to a terminal state.
//!
//! Signaling, media negotiation, and transport all live below the
//! [`Platform`](core::platform::Platform) seam; this crate only
//! tracks who is calling whom and where each call stands.

#[macro_use]
extern crate log;

pub mod common;

pub mod error;

/// Core, platform independent functionality.
pub mod core {
    pub mod call;
    pub mod call_lock;
    pub mod platform;
    pub mod registry;
    pub mod session_manager;
}

/// Client boundary, marshaling between raw strings and core types.
pub mod api {
    pub mod session_interface;
}

/// Simulation platform, used by the test suites.
pub mod sim {
    pub mod sim_platform;
}
