// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bounded retry with exponential backoff.

use std::fmt::Display;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to make attempt `n` (1-based).
    Attempting(u32),
    Succeeded,
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct Retry {
    policy: RetryPolicy,
    state: RetryState,
}

impl Retry {
    pub fn new(policy: RetryPolicy) -> Self {
        let state = if policy.max_attempts == 0 {
            RetryState::Exhausted
        } else {
            RetryState::Attempting(1)
        };
        Retry { policy, state }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn succeed(&mut self) {
        if let RetryState::Attempting(_) = self.state {
            self.state = RetryState::Succeeded;
        }
    }

    /// Records a failed attempt. Returns the delay before the next attempt,
    /// or `None` once the attempt budget is spent.
    pub fn fail(&mut self) -> Option<Duration> {
        match self.state {
            RetryState::Attempting(n) if n < self.policy.max_attempts => {
                self.state = RetryState::Attempting(n + 1);
                Some(self.policy.delay_for(n))
            }
            RetryState::Attempting(_) => {
                self.state = RetryState::Exhausted;
                None
            }
            RetryState::Succeeded | RetryState::Exhausted => None,
        }
    }

    /// Gives up on the remaining attempts.
    pub fn abandon(&mut self) {
        if let RetryState::Attempting(_) = self.state {
            self.state = RetryState::Exhausted;
        }
    }
}

#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `op` until it succeeds or the policy is exhausted. `op` receives the
/// 1-based attempt number.
pub fn run<T, E, F>(policy: &RetryPolicy, op: F) -> Result<(T, u32), Exhausted<E>>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    run_if(policy, |_| true, op)
}

/// Like `run`, but an error for which `retryable` is false ends the loop
/// at once without waiting.
pub fn run_if<T, E, F, P>(policy: &RetryPolicy, retryable: P, mut op: F) -> Result<(T, u32), Exhausted<E>>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let mut retry = Retry::new(RetryPolicy {
        max_attempts: policy.max_attempts.max(1),
        ..policy.clone()
    });
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => {
                retry.succeed();
                return Ok((value, attempt));
            }
            Err(err) => {
                debug!(attempt, error = %err, "attempt failed");
                if !retryable(&err) {
                    retry.abandon();
                    return Err(Exhausted {
                        attempts: attempt,
                        last_error: err,
                    });
                }
                match retry.fail() {
                    Some(delay) => {
                        if !delay.is_zero() {
                            std::thread::sleep(delay);
                        }
                        attempt += 1;
                    }
                    None => {
                        return Err(Exhausted {
                            attempts: attempt,
                            last_error: err,
                        });
                    }
                }
            }
        }
    }
}
