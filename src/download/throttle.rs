//! Politeness delay between completed downloads

use crate::config::ThrottleConfig;
use rand::Rng;
use std::time::Duration;

/// Draw a delay uniformly from `[min_delay, max_delay]`
///
/// A degenerate range returns `min_delay`.
pub fn random_delay(throttle: &ThrottleConfig) -> Duration {
    if throttle.max_delay <= throttle.min_delay {
        return throttle.min_delay;
    }
    let mut rng = rand::thread_rng();
    let secs = rng.gen_range(throttle.min_delay.as_secs_f64()..=throttle.max_delay.as_secs_f64());
    Duration::from_secs_f64(secs).clamp(throttle.min_delay, throttle.max_delay)
}
