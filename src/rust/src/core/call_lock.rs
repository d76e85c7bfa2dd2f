//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Poison-consuming lock wrappers.
//!
//! Wrappers around `std::sync::Mutex` and `std::sync::RwLock` that on
//! error consume the poisoned lock and return a simple error code.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::Result;
use crate::error::SessionRtcError;

#[derive(Debug)]
pub struct CallMutex<T: ?Sized> {
    /// Human readable label for the mutex
    label: String,
    /// The actual mutex
    mutex: Mutex<T>,
}

impl<T> CallMutex<T> {
    /// Creates a new CallMutex
    pub fn new(t: T, label: &str) -> CallMutex<T> {
        CallMutex {
            mutex: Mutex::new(t),
            label: label.to_string(),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, T>> {
        match self.mutex.lock() {
            Ok(v) => Ok(v),
            Err(_) => Err(SessionRtcError::MutexPoisoned(self.label.clone()).into()),
        }
    }
}

#[derive(Debug)]
pub struct CallRwLock<T: ?Sized> {
    /// Human readable label for the rwlock
    label: String,
    /// The actual rwlock
    rwlock: RwLock<T>,
}

impl<T> CallRwLock<T> {
    /// Creates a new CallRwLock
    pub fn new(t: T, label: &str) -> CallRwLock<T> {
        CallRwLock {
            rwlock: RwLock::new(t),
            label: label.to_string(),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, T>> {
        match self.rwlock.read() {
            Ok(v) => Ok(v),
            Err(_) => Err(SessionRtcError::RwLockPoisoned(self.label.clone()).into()),
        }
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, T>> {
        match self.rwlock.write() {
            Ok(v) => Ok(v),
            Err(_) => Err(SessionRtcError::RwLockPoisoned(self.label.clone()).into()),
        }
    }
}
