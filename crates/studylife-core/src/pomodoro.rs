//! Pomodoro study timer.
//!
//! Focus for 25 minutes, then a 5 minute break; every fourth focus period is
//! followed by a 15 minute break instead. The session count goes up when a
//! break ends. The timer is driven by `tick` so callers choose the clock.

use std::fmt;
use std::time::Duration;

pub const FOCUS: Duration = Duration::from_secs(25 * 60);
pub const SHORT_BREAK: Duration = Duration::from_secs(5 * 60);
pub const LONG_BREAK: Duration = Duration::from_secs(15 * 60);

/// Focus periods per long break.
const LONG_BREAK_EVERY: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PomodoroPhase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl PomodoroPhase {
    pub fn is_break(&self) -> bool {
        !matches!(self, PomodoroPhase::Focus)
    }
}

impl fmt::Display for PomodoroPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PomodoroPhase::Focus => write!(f, "Study Session"),
            PomodoroPhase::ShortBreak | PomodoroPhase::LongBreak => write!(f, "Break Time"),
        }
    }
}

/// A phase change produced by [`PomodoroTimer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: PomodoroPhase,
    pub to: PomodoroPhase,
    pub sessions: u32,
}

#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    phase: PomodoroPhase,
    remaining: Duration,
    running: bool,
    sessions: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PomodoroTimer {
    pub fn new() -> Self {
        Self {
            phase: PomodoroPhase::Focus,
            remaining: FOCUS,
            running: false,
            sessions: 0,
        }
    }

    pub fn phase(&self) -> PomodoroPhase {
        self.phase
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    /// Start or pause. Returns whether the timer is now running.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Stop and return to a fresh focus period with no sessions.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance the clock by `elapsed`. Does nothing while paused.
    pub fn tick(&mut self, mut elapsed: Duration) -> Vec<PhaseTransition> {
        let mut transitions = Vec::new();
        if !self.running {
            return transitions;
        }
        while elapsed >= self.remaining {
            elapsed -= self.remaining;
            transitions.push(self.advance());
        }
        self.remaining -= elapsed;
        transitions
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        let secs = self.remaining.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    fn advance(&mut self) -> PhaseTransition {
        let from = self.phase;
        let (to, length) = if from.is_break() {
            self.sessions += 1;
            (PomodoroPhase::Focus, FOCUS)
        } else if (self.sessions + 1) % LONG_BREAK_EVERY == 0 {
            (PomodoroPhase::LongBreak, LONG_BREAK)
        } else {
            (PomodoroPhase::ShortBreak, SHORT_BREAK)
        };
        self.phase = to;
        self.remaining = length;
        PhaseTransition {
            from,
            to,
            sessions: self.sessions,
        }
    }
}
