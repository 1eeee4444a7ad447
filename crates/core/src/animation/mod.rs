//! Animation state machine driving the displacement pass.
//!
//! The controller is single-threaded and cooperative. An external render loop
//! calls [`AnimationController::update`] once per frame; every other command
//! is expected on that same thread. Phase is normalised to one oscillation
//! period, which decouples playback speed from a mode's physical frequency.

use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::{
    displacement::{DisplacementPass, FrameStats},
    render::FLOATS_PER_VERTEX,
    AnimationConfig, GradientSelection, ModalMode, ModalSet, ModalVizError, PlaybackClock,
    Result, SharedMesh, TimeSource, VertexMesh,
};

/// Phase advanced by a single frame step: 1/120 of a period.
pub const FRAME_STEP: f32 = 1.0 / 120.0;
pub const MIN_SPEED: f32 = 0.001;
pub const MIN_AMPLIFICATION: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Notification raised by the controller. Delivered synchronously, after the
/// buffer write or transition it describes has completed.
#[derive(Debug, Clone, Copy)]
pub enum AnimationEvent<'a> {
    VerticesUpdated { mesh: &'a VertexMesh },
    StateChanged(AnimationState),
}

type Listener = Box<dyn FnMut(&AnimationEvent<'_>)>;

struct Target {
    mesh: SharedMesh,
    original: Vec<f32>,
}

pub struct AnimationController {
    state: AnimationState,
    paused_phase: f32,
    clock: PlaybackClock,
    speed: f32,
    amplification: f32,
    looping: bool,
    gradient: GradientSelection,
    modal_set: Option<ModalSet>,
    target: Option<Target>,
    pass: DisplacementPass,
    last_frame: Option<FrameStats>,
    listeners: Vec<Listener>,
}

impl AnimationController {
    /// Creates a stopped controller timed by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(PlaybackClock::system())
    }

    /// Creates a stopped controller timed by `source`.
    pub fn with_time_source(source: impl TimeSource + 'static) -> Self {
        Self::with_clock(PlaybackClock::new(source))
    }

    fn with_clock(clock: PlaybackClock) -> Self {
        let defaults = AnimationConfig::default();
        Self {
            state: AnimationState::Stopped,
            paused_phase: 0.0,
            clock,
            speed: defaults.speed,
            amplification: defaults.amplification,
            looping: defaults.looping,
            gradient: defaults.gradient,
            modal_set: None,
            target: None,
            pass: DisplacementPass::new(),
            last_frame: None,
            listeners: Vec::new(),
        }
    }

    /// Applies every setting in `config` through the clamping setters.
    pub fn apply_config(&mut self, config: &AnimationConfig) {
        self.set_speed(config.speed);
        self.set_amplification(config.amplification);
        self.set_looping(config.looping);
        self.set_gradient(config.gradient);
    }

    /// Registers a listener for [`AnimationEvent`]s. Listeners run in
    /// registration order.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&AnimationEvent<'_>) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Installs the modes to animate. An empty set is rejected.
    pub fn set_modal_set(&mut self, modal_set: ModalSet) -> Result<()> {
        if modal_set.is_empty() {
            return Err(ModalVizError::EmptyModalSet);
        }
        tracing::debug!(modes = modal_set.len(), "modal set configured");
        self.modal_set = Some(modal_set);
        Ok(())
    }

    pub fn modal_set(&self) -> Option<&ModalSet> {
        self.modal_set.as_ref()
    }

    /// Points the controller at a caller-owned vertex buffer and snapshots its
    /// current contents; [`stop`](Self::stop) restores that snapshot. Layout is
    /// already validated when the [`VertexMesh`] is built.
    pub fn set_target(&mut self, mesh: SharedMesh) {
        let original = mesh.borrow().as_slice().to_vec();
        tracing::debug!(vertices = original.len() / FLOATS_PER_VERTEX, "target mesh configured");
        self.target = Some(Target { mesh, original });
        self.pass.reset_range();
    }

    /// Drops the target reference without touching its contents.
    pub fn clear_target(&mut self) -> Option<SharedMesh> {
        self.target.take().map(|target| target.mesh)
    }

    pub fn target(&self) -> Option<&SharedMesh> {
        self.target.as_ref().map(|target| &target.mesh)
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Normalised phase within the current period. While playing this may
    /// briefly exceed `1.0` until the next [`update`](Self::update) wraps it.
    pub fn current_time(&self) -> f32 {
        match self.state {
            AnimationState::Playing => self.paused_phase + self.clock.elapsed_secs() * self.speed,
            AnimationState::Stopped | AnimationState::Paused => self.paused_phase,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Periods per second. Values below [`MIN_SPEED`] are raised to it.
    pub fn set_speed(&mut self, speed: f32) {
        let speed = clamp_floor(speed, MIN_SPEED);
        if self.state == AnimationState::Playing {
            // fold progress made at the old speed into the base phase
            self.paused_phase = self.current_time();
            self.clock.restart();
        }
        self.speed = speed;
    }

    pub fn amplification(&self) -> f32 {
        self.amplification
    }

    /// Values below [`MIN_AMPLIFICATION`] are raised to it.
    pub fn set_amplification(&mut self, amplification: f32) {
        self.amplification = clamp_floor(amplification, MIN_AMPLIFICATION);
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn gradient(&self) -> GradientSelection {
        self.gradient
    }

    pub fn set_gradient(&mut self, gradient: GradientSelection) {
        self.gradient = gradient;
    }

    /// Smoothed `(min, max)` vertical displacement seen so far.
    pub fn observed_range(&self) -> (f32, f32) {
        self.pass.observed_range()
    }

    /// Statistics from the most recent displacement frame.
    pub fn last_frame(&self) -> Option<FrameStats> {
        self.last_frame
    }

    pub fn mode_count(&self) -> usize {
        self.modal_set.as_ref().map_or(0, ModalSet::len)
    }

    pub fn current_mode(&self) -> Option<&ModalMode> {
        self.modal_set.as_ref().and_then(ModalSet::current_mode)
    }

    /// Starts or resumes playback from the current phase and immediately
    /// renders one frame.
    pub fn play(&mut self) {
        if self.state == AnimationState::Playing {
            return;
        }
        self.clock.restart();
        self.transition(AnimationState::Playing);
        let phase = self.paused_phase;
        self.render_frame(phase);
        self.notify_state();
    }

    /// Freezes the phase where it is.
    pub fn pause(&mut self) {
        if self.state != AnimationState::Playing {
            return;
        }
        self.paused_phase = self.current_time();
        self.clock.reset();
        self.transition(AnimationState::Paused);
        self.notify_state();
    }

    /// Rewinds to phase zero and restores the target's original contents.
    pub fn stop(&mut self) {
        self.paused_phase = 0.0;
        self.clock.reset();
        self.transition(AnimationState::Stopped);
        self.restore_original();
        self.notify_state();
    }

    /// Rewinds to phase zero, keeping playback running if it was.
    pub fn reset(&mut self) {
        let was_playing = self.state == AnimationState::Playing;
        self.paused_phase = 0.0;
        self.clock.reset();

        if !self.render_frame(0.0) {
            self.restore_original();
        }

        if was_playing {
            self.clock.restart();
            self.transition(AnimationState::Playing);
        } else {
            self.transition(AnimationState::Stopped);
        }
        self.notify_state();
    }

    /// Steps one frame back. Only acts while paused.
    pub fn previous_frame(&mut self) {
        if self.state != AnimationState::Paused {
            return;
        }
        let mut phase = self.paused_phase - FRAME_STEP;
        if phase < 0.0 {
            phase = if self.looping { 1.0 - FRAME_STEP } else { 0.0 };
        }
        self.paused_phase = phase;
        self.render_frame(phase);
    }

    /// Steps one frame forward. Only acts while paused.
    pub fn next_frame(&mut self) {
        if self.state != AnimationState::Paused {
            return;
        }
        let mut phase = self.paused_phase + FRAME_STEP;
        if phase >= 1.0 {
            phase = if self.looping { 0.0 } else { 1.0 };
        }
        self.paused_phase = phase;
        self.render_frame(phase);
    }

    /// Selects the `index`-th mode in ascending frequency order and redraws at
    /// the current phase. Out-of-range indices are ignored.
    pub fn set_current_mode(&mut self, index: usize) {
        let Some(modal_set) = self.modal_set.as_mut() else {
            return;
        };
        if !modal_set.set_current_mode_index(index) {
            return;
        }
        tracing::debug!(index, "current mode changed");
        let phase = self.current_time();
        self.render_frame(phase);
    }

    /// Advances playback. Call once per rendered frame; does nothing unless
    /// playing with both a mode and a target configured.
    pub fn update(&mut self) {
        if self.state != AnimationState::Playing
            || self.current_mode().is_none()
            || self.target.is_none()
        {
            return;
        }

        let mut phase = self.current_time();
        if phase >= 1.0 {
            if self.looping {
                phase = 0.0;
                self.paused_phase = 0.0;
                self.clock.restart();
            } else {
                self.stop();
                return;
            }
        }
        self.render_frame(phase);
    }

    /// Stops playback and releases the modal set, target and listeners.
    pub fn dispose(&mut self) {
        self.stop();
        self.modal_set = None;
        self.target = None;
        self.listeners.clear();
    }

    fn transition(&mut self, next: AnimationState) {
        tracing::debug!(from = ?self.state, to = ?next, phase = self.paused_phase, "animation state");
        self.state = next;
    }

    /// Runs the displacement pass at `phase`. Returns `false` when no mode or
    /// target is configured.
    fn render_frame(&mut self, phase: f32) -> bool {
        let Some(mode) = self.modal_set.as_ref().and_then(ModalSet::current_mode) else {
            return false;
        };
        let Some(target) = self.target.as_ref() else {
            return false;
        };

        let mesh = Rc::clone(&target.mesh);
        let stats = self.pass.run(
            mode,
            phase,
            self.amplification,
            self.gradient,
            &target.original,
            &mut mesh.borrow_mut(),
        );
        self.last_frame = Some(stats);
        self.notify_vertices(&mesh);
        true
    }

    fn restore_original(&mut self) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let mesh = Rc::clone(&target.mesh);
        mesh.borrow_mut().copy_from(&target.original);
        self.notify_vertices(&mesh);
    }

    fn notify_vertices(&mut self, mesh: &SharedMesh) {
        let mesh = mesh.borrow();
        let event = AnimationEvent::VerticesUpdated { mesh: &*mesh };
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn notify_state(&mut self) {
        let event = AnimationEvent::StateChanged(self.state);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationController")
            .field("state", &self.state)
            .field("paused_phase", &self.paused_phase)
            .field("speed", &self.speed)
            .field("amplification", &self.amplification)
            .field("looping", &self.looping)
            .field("gradient", &self.gradient)
            .field("modes", &self.mode_count())
            .field("has_target", &self.target.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn clamp_floor(value: f32, floor: f32) -> f32 {
    if value.is_nan() {
        floor
    } else {
        value.max(floor)
    }
}
