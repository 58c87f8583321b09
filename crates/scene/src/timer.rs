use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Longest gap a single tick will account for. Longer pauses (debugger,
/// dragging the window) are treated as this much time.
pub const MAX_DELTA: Duration = Duration::from_millis(100);

/// Fixed steps within this distance of the target are snapped to it.
const FIXED_STEP_SNAP: Duration = Duration::from_micros(250);

/// Timer mode and target step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    pub fixed_step: bool,
    /// Target updates per second in fixed-step mode.
    pub target_rate: f64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            fixed_step: false,
            target_rate: 60.0,
        }
    }
}

/// Timing handed to one simulation step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds covered by this step.
    pub elapsed: f32,
    /// Seconds since the timer started.
    pub total: f32,
    /// Number of steps run so far, including this one.
    pub frame: u64,
}

/// Frame stepper with variable or fixed timestep.
///
/// In variable mode every tick runs exactly one update covering the real
/// elapsed time. In fixed mode time accumulates and the update runs once per
/// whole target step, possibly zero or several times per tick.
#[derive(Debug)]
pub struct StepTimer {
    settings: TimerSettings,
    target: Duration,
    last: Option<Instant>,
    leftover: Duration,
    elapsed: Duration,
    total: Duration,
    frame_count: u64,
    frames_this_second: u32,
    second_counter: Duration,
    frames_per_second: u32,
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

impl StepTimer {
    pub fn new(settings: TimerSettings) -> Self {
        let rate = if settings.target_rate.is_finite() && settings.target_rate > 0.0 {
            settings.target_rate
        } else {
            tracing::warn!(rate = settings.target_rate, "invalid target rate, using 60");
            60.0
        };
        Self {
            settings,
            target: Duration::from_secs_f64(1.0 / rate),
            last: None,
            leftover: Duration::ZERO,
            elapsed: Duration::ZERO,
            total: Duration::ZERO,
            frame_count: 0,
            frames_this_second: 0,
            second_counter: Duration::ZERO,
            frames_per_second: 0,
        }
    }

    pub fn is_fixed_step(&self) -> bool {
        self.settings.fixed_step
    }

    pub fn target_step(&self) -> Duration {
        self.target
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn total_seconds(&self) -> f64 {
        self.total.as_secs_f64()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    /// Forget the time since the last tick, e.g. after resuming from
    /// suspension, so the next tick does not try to catch up.
    pub fn reset_elapsed(&mut self) {
        self.last = None;
        self.leftover = Duration::ZERO;
        self.frames_per_second = 0;
        self.frames_this_second = 0;
        self.second_counter = Duration::ZERO;
    }

    /// Advance by wall-clock time and run `update` for every due step.
    pub fn tick(&mut self, update: impl FnMut(&FrameTime)) {
        let now = Instant::now();
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.tick_with(delta, update);
    }

    /// Advance by an explicit `delta`. Returns the number of updates run.
    pub fn tick_with(&mut self, delta: Duration, mut update: impl FnMut(&FrameTime)) -> u32 {
        let mut delta = delta.min(MAX_DELTA);
        let last_frame_count = self.frame_count;

        if self.settings.fixed_step {
            if abs_diff(delta, self.target) < FIXED_STEP_SNAP {
                delta = self.target;
            }
            self.leftover += delta;
            while self.leftover >= self.target {
                self.elapsed = self.target;
                self.total += self.target;
                self.leftover -= self.target;
                self.frame_count += 1;
                update(&self.frame_time());
            }
        } else {
            self.elapsed = delta;
            self.total += delta;
            self.leftover = Duration::ZERO;
            self.frame_count += 1;
            update(&self.frame_time());
        }

        let ran = (self.frame_count - last_frame_count) as u32;
        self.frames_this_second += ran;
        self.second_counter += delta;
        if self.second_counter >= Duration::from_secs(1) {
            self.frames_per_second = self.frames_this_second;
            self.frames_this_second = 0;
            self.second_counter = Duration::from_nanos(
                (self.second_counter.as_nanos() % 1_000_000_000) as u64,
            );
            tracing::trace!(fps = self.frames_per_second, "frame rate");
        }
        ran
    }

    fn frame_time(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed.as_secs_f32(),
            total: self.total.as_secs_f32(),
            frame: self.frame_count,
        }
    }
}

fn abs_diff(a: Duration, b: Duration) -> Duration {
    if a > b { a - b } else { b - a }
}
