//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Common test utilities

use std::env;
use std::sync::Mutex;

use lazy_static::lazy_static;
use rand::distributions::{Distribution, Standard};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use sessionrtc::common::InstanceHandle;
use sessionrtc::core::registry::SessionRegistry;
use sessionrtc::core::session_manager::SessionConfig;
use sessionrtc::sim::sim_platform::SimPlatform;

macro_rules! error_line {
    () => {
        concat!(module_path!(), ":", line!())
    };
}

pub struct Prng {
    seed: u64,
    rng: Mutex<Option<ChaCha20Rng>>,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(None),
        }
    }

    // Use a freshly seeded PRNG for each test
    pub fn init(&self) {
        let mut opt = self.rng.lock().unwrap();
        let _ = opt.replace(ChaCha20Rng::seed_from_u64(self.seed));
    }

    pub fn gen<T>(&self) -> T
    where
        Standard: Distribution<T>,
    {
        self.rng.lock().unwrap().as_mut().unwrap().gen::<T>()
    }
}

lazy_static! {
    pub static ref PRNG: Prng = {
        let rand_seed = match env::var("RANDOM_SEED") {
            Ok(v) => v.parse().unwrap(),
            Err(_) => 0,
        };

        println!("\n*** Using random seed: {}", rand_seed);
        Prng::new(rand_seed)
    };
}

pub fn test_init() {
    let log_level = if env::var("DEBUG_TESTS").is_ok() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };
    let _ = env_logger::builder()
        .filter_level(log_level)
        .is_test(true)
        .try_init();

    PRNG.init();
}

/// One initialized instance and the simulated transport behind it.
pub struct TestContext {
    registry: SessionRegistry<SimPlatform>,
    platform: SimPlatform,
    handle: InstanceHandle,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = self.registry.release(self.handle);
    }
}

impl TestContext {
    pub fn new(identity: &str) -> Self {
        Self::with_config(identity, SessionConfig::default())
    }

    pub fn with_config(identity: &str, config: SessionConfig) -> Self {
        let registry = SessionRegistry::new();
        let platform = SimPlatform::new();
        let handle = registry
            .initialize(identity, platform.clone(), config)
            .expect(error_line!());
        Self {
            registry,
            platform,
            handle,
        }
    }

    pub fn registry(&self) -> &SessionRegistry<SimPlatform> {
        &self.registry
    }

    pub fn platform(&self) -> &SimPlatform {
        &self.platform
    }

    pub fn handle(&self) -> InstanceHandle {
        self.handle
    }

    /// Place a call through the string boundary and hand back the
    /// owned call id string.
    pub fn place_call(&self, remote_peer: &str) -> String {
        sessionrtc::api::session_interface::place_call(&self.registry, self.handle, remote_peer)
            .expect(error_line!())
    }

    /// Mint a random peer name so tests never depend on a fixed id.
    pub fn random_peer(&self) -> String {
        format!("REMOTE_PEER-{}", PRNG.gen::<u16>())
    }
}
