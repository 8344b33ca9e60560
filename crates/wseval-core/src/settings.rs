//! Process-wide throttle interval shared by every dispatcher in the process.
//!
//! The CLI installs the value once before any client is built.

use crate::errors::ConfigError;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

pub const DEFAULT_THROTTLE: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct SettingsState {
    throttle: Duration,
}

fn state() -> &'static Mutex<SettingsState> {
    static STATE: OnceLock<Mutex<SettingsState>> = OnceLock::new();
    STATE.get_or_init(|| {
        Mutex::new(SettingsState {
            throttle: DEFAULT_THROTTLE,
        })
    })
}

/// Parse a throttle given in seconds.
pub fn parse_throttle_secs(raw: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| ConfigError::InvalidThrottle(format!("'{}': {}", raw, e)))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|e| ConfigError::InvalidThrottle(format!("'{}': {}", raw, e)))
}

pub fn set_throttle(interval: Duration) {
    let mut s = state().lock().expect("settings mutex poisoned");
    s.throttle = interval;
}

/// Scoped override, restored on drop. Tests use this to avoid leaking state.
pub struct ThrottleGuard {
    previous: Duration,
}

impl ThrottleGuard {
    pub fn set(interval: Duration) -> Self {
        let mut s = state().lock().expect("settings mutex poisoned");
        let previous = s.throttle;
        s.throttle = interval;
        Self { previous }
    }
}

impl Drop for ThrottleGuard {
    fn drop(&mut self) {
        if let Ok(mut s) = state().lock() {
            s.throttle = self.previous;
        }
    }
}

/// Interval between two physical sends.
pub fn throttle_interval() -> Duration {
    let s = state().lock().expect("settings mutex poisoned");
    s.throttle
}
