//! Countdown state machine for timed attempts.
//!
//! `TimerEngine` holds no clock of its own: whoever owns it calls [`TimerEngine::tick`]
//! once per elapsed second. This keeps expiry deterministic and lets tests drive
//! the countdown by hand.

use thiserror::Error;

use crate::model::UNLIMITED_SENTINEL;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimerError {
    #[error("countdown duration must be greater than zero")]
    ZeroDuration,

    #[error("countdown already finished ({0:?})")]
    Finished(TimerState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    /// Reached zero; terminal.
    Expired,
    /// Cancelled before reaching zero; terminal.
    Stopped,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ticked { remaining: u32 },
    /// Returned exactly once, on the tick that reaches zero.
    Expired,
    /// The timer is not running, or the tick belongs to a superseded countdown.
    Inactive,
}

/// Token identifying one `start` call.
///
/// A restarted timer gets a new token, so ticks scheduled for the old countdown
/// are ignored instead of double-decrementing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEngine {
    state: TimerState,
    remaining: u32,
    generation: u64,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            remaining: 0,
            generation: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Remaining seconds once the countdown has been started.
    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        match self.state {
            TimerState::Idle => None,
            _ => Some(self.remaining),
        }
    }

    /// Start counting down from `duration_secs`.
    ///
    /// A running countdown is stopped first; its token stops matching.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::ZeroDuration` for a zero duration.
    /// Returns `TimerError::Finished` if the timer already expired or was stopped.
    pub fn start(&mut self, duration_secs: u32) -> Result<CountdownToken, TimerError> {
        if duration_secs == 0 {
            return Err(TimerError::ZeroDuration);
        }
        match self.state {
            TimerState::Idle => {}
            TimerState::Running => {
                self.stop();
            }
            finished => return Err(TimerError::Finished(finished)),
        }

        self.generation += 1;
        self.remaining = duration_secs;
        self.state = TimerState::Running;
        Ok(CountdownToken(self.generation))
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self, token: CountdownToken) -> TickOutcome {
        if self.state != TimerState::Running || token.0 != self.generation {
            return TickOutcome::Inactive;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = TimerState::Expired;
            return TickOutcome::Expired;
        }
        TickOutcome::Ticked {
            remaining: self.remaining,
        }
    }

    /// Cancel a running countdown. Returns `false` when there was nothing to stop.
    pub fn stop(&mut self) -> bool {
        if self.state == TimerState::Running {
            self.state = TimerState::Stopped;
            true
        } else {
            false
        }
    }
}

/// Render a seconds value as `HH:MM:SS`; the `-1` sentinel renders as "Unlimited".
#[must_use]
pub fn format_remaining(seconds: i64) -> String {
    if seconds == UNLIMITED_SENTINEL {
        return "Unlimited".to_string();
    }
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
