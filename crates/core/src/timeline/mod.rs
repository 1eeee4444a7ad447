use std::{cell::Cell, fmt, rc::Rc, time::Duration, time::Instant};

/// Monotonic source of "now", measured from an arbitrary origin.
pub trait TimeSource: fmt::Debug {
    fn now(&self) -> Duration;
}

/// Wall-clock source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced source. Clones share one underlying time value, so a
/// caller can keep a handle and step a clock that owns another clone.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<Duration>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    pub fn advance_secs(&self, seconds: f32) {
        self.advance(Duration::from_secs_f32(seconds.max(0.0)));
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Stopwatch over a [`TimeSource`]. Time only accumulates while running.
#[derive(Debug)]
pub struct PlaybackClock {
    source: Box<dyn TimeSource>,
    started_at: Option<Duration>,
    accumulated: Duration,
}

impl PlaybackClock {
    pub fn new(source: impl TimeSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    /// Clock driven by the wall clock.
    pub fn system() -> Self {
        Self::new(SystemTimeSource::new())
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Starts or resumes accumulation. Has no effect while already running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.source.now());
        }
    }

    /// Freezes the accumulated time.
    pub fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += self.source.now().saturating_sub(started_at);
        }
    }

    /// Stops the clock and discards the accumulated time.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    /// Discards the accumulated time and starts counting again from zero.
    pub fn restart(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = Some(self.source.now());
    }

    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started_at) => self.accumulated + self.source.now().saturating_sub(started_at),
            None => self.accumulated,
        }
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::system()
    }
}
