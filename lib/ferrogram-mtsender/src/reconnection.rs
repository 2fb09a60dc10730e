// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::ops::ControlFlow;
use std::time::Duration;

/// Decides whether a dropped connection should be attempted again, and
/// after how long.
///
/// Implement this trait to customize how connection failures are
/// handled; the built-in implementations cover the common cases.
pub trait ReconnectionPolicy: Send + Sync {
    /// Whether a new reconnection attempt should be made.
    ///
    /// `attempts` is the number of reconnection tries made so far.
    fn should_retry(&self, attempts: usize) -> ControlFlow<(), Duration>;
}

/// Never reconnect; connection errors surface immediately.
pub struct NoReconnect;

impl ReconnectionPolicy for NoReconnect {
    fn should_retry(&self, _: usize) -> ControlFlow<(), Duration> {
        ControlFlow::Break(())
    }
}

/// Reconnect a fixed number of times with a constant delay.
pub struct FixedReconnect {
    pub attempts: usize,
    pub delay: Duration,
}

impl ReconnectionPolicy for FixedReconnect {
    fn should_retry(&self, attempts: usize) -> ControlFlow<(), Duration> {
        if attempts <= self.attempts {
            ControlFlow::Continue(self.delay)
        } else {
            ControlFlow::Break(())
        }
    }
}

/// Reconnect with exponentially growing, capped delays and a random
/// jitter so that many clients dropped at once do not reconnect in
/// lockstep.
pub struct ExponentialBackoff {
    /// Delay of the first retry; subsequent ones double it.
    pub base: Duration,

    /// Largest delay the backoff will grow to.
    pub cap: Duration,

    /// Give up after this many attempts.
    pub max_attempts: usize,
}

impl ExponentialBackoff {
    fn jitter() -> Duration {
        let mut byte = [0u8; 1];
        getrandom::getrandom(&mut byte).expect("failed to generate jitter");
        Duration::from_millis(byte[0] as u64)
    }
}

impl Default for ExponentialBackoff {
    /// 100ms base, capped at 5 seconds, with up to 10 attempts.
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(5),
            max_attempts: 10,
        }
    }
}

impl ReconnectionPolicy for ExponentialBackoff {
    fn should_retry(&self, attempts: usize) -> ControlFlow<(), Duration> {
        if attempts > self.max_attempts {
            return ControlFlow::Break(());
        }

        let exponent = attempts.min(16) as u32;
        let delay = self
            .base
            .saturating_mul(1u32 << exponent)
            .min(self.cap);
        ControlFlow::Continue(delay + Self::jitter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reconnect_breaks_immediately() {
        assert_eq!(NoReconnect.should_retry(0), ControlFlow::Break(()));
    }

    #[test]
    fn fixed_respects_attempt_budget() {
        let policy = FixedReconnect {
            attempts: 2,
            delay: Duration::from_secs(1),
        };
        assert!(matches!(policy.should_retry(1), ControlFlow::Continue(_)));
        assert!(matches!(policy.should_retry(2), ControlFlow::Continue(_)));
        assert_eq!(policy.should_retry(3), ControlFlow::Break(()));
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = ExponentialBackoff {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(5),
            max_attempts: 10,
        };

        // The jitter adds at most 255ms on top of the deterministic part.
        for (attempts, expected) in [(0, 100u64), (1, 200), (4, 1600), (8, 5000), (10, 5000)] {
            match policy.should_retry(attempts) {
                ControlFlow::Continue(delay) => {
                    assert!(delay >= Duration::from_millis(expected));
                    assert!(delay <= Duration::from_millis(expected + 255));
                }
                ControlFlow::Break(()) => panic!("expected retry at attempt {attempts}"),
            }
        }

        assert_eq!(policy.should_retry(11), ControlFlow::Break(()));
    }
}
