//! Shared helpers for client integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use otherworlds_client::{ClientConfig, Host};
use otherworlds_core::clock::Timer;
use otherworlds_core::input::Key;
use otherworlds_test_support::{FixedClock, RecordingTimer};

/// Fade delay used by every test host.
pub const FADE: Duration = Duration::from_millis(250);

/// A host plus the timer it sleeps on.
pub struct TestHost {
    pub host: Host,
    pub timer: Arc<RecordingTimer>,
}

/// Builds a host that will replay `script`, with deterministic time.
pub fn host_with_script(script: &[Key]) -> TestHost {
    let config = ClientConfig {
        tick: Duration::from_millis(16),
        fade: FADE,
        max_ticks: 100,
        script: script.to_vec(),
    };
    let timer = Arc::new(RecordingTimer::new());
    let host = Host::new(
        &config,
        Arc::new(FixedClock::standard()),
        Arc::clone(&timer) as Arc<dyn Timer>,
    );
    TestHost { host, timer }
}

/// Builds and starts a host with an empty script.
pub async fn started_host() -> TestHost {
    let test_host = host_with_script(&[]);
    test_host.host.start().await.unwrap();
    test_host
}

/// Presses `keys` in order, running one tick after each.
pub async fn press_all(host: &Host, keys: &[Key]) {
    for key in keys {
        host.input().press(*key);
        host.tick(16.0).await.unwrap();
    }
}
