//! Bounded polling.
//!
//! Every hardware wait in the crate goes through [`poll_until`]: a fixed number
//! of attempts with a fixed delay between them. There is no unbounded wait and
//! no way to cancel a poll early.

use std::time::Duration;

use crate::card::interconnect::Bus;

/// Result of a bounded poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The condition was met.
    Ready {
        /// Value produced by the successful poll.
        value: T,
        /// Polls issued, including the successful one.
        attempts: u32,
    },
    /// The budget ran out.
    TimedOut {
        /// Polls issued.
        attempts: u32,
    },
}

impl<T> PollOutcome<T> {
    /// Returns the ready value, if any.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::TimedOut { .. } => None,
        }
    }

    /// Returns the number of polls issued.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. } | Self::TimedOut { attempts } => *attempts,
        }
    }
}

/// Calls `poll` up to `max_attempts` times, sleeping `delay` between calls.
///
/// `poll` returns `Some` once the awaited condition holds. No sleep follows
/// the final attempt.
pub fn poll_until<T>(
    bus: &mut Bus,
    max_attempts: u32,
    delay: Duration,
    mut poll: impl FnMut(&mut Bus) -> Option<T>,
) -> PollOutcome<T> {
    for attempt in 1..=max_attempts {
        if let Some(value) = poll(bus) {
            return PollOutcome::Ready {
                value,
                attempts: attempt,
            };
        }
        if attempt < max_attempts {
            bus.sleep(delay);
        }
    }
    PollOutcome::TimedOut {
        attempts: max_attempts,
    }
}
