//! Wall-clock time handler.

use cosign_core::{ClockEffects, Timestamp};
use std::time::{SystemTime, UNIX_EPOCH};

/// Reads the host's system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockEffects for SystemClock {
    fn now(&self) -> Timestamp {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Timestamp::from_millis(ms)
    }
}
