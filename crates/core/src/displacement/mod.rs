use crate::{
    render::{FrameWriter, FLOATS_PER_VERTEX},
    GradientSelection, ModalMode, VertexMesh,
};

/// Displacement component that drives the heat map (z).
pub const VERTICAL_AXIS: usize = 2;

const EMA_RETAIN: f32 = 0.9;
const MIN_SPAN: f32 = 1e-6;
const DEFAULT_WINDOW: f32 = 0.1;

/// Statistics gathered while evaluating one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub phase: f32,
    pub physical_time: f32,
    pub current_min: f32,
    pub current_max: f32,
    /// Largest absolute vertical displacement, after the small-value floor.
    pub current_max_abs: f32,
    pub written: usize,
    pub skipped: usize,
}

/// Converts a phase normalised to one period into seconds for `frequency`.
/// A zero (or negative) frequency has no period; the phase is used as-is.
pub fn physical_time(phase: f32, frequency: f32) -> f32 {
    if frequency > 0.0 {
        phase / frequency
    } else {
        phase
    }
}

/// Per-frame displacement and colouring of every record in a mode.
///
/// Keeps an EMA-smoothed estimate of the vertical displacement range across
/// frames. Colours are normalised by the current frame's peak, not by that
/// smoothed range.
#[derive(Debug, Clone)]
pub struct DisplacementPass {
    scratch: Vec<(usize, [f32; 3])>,
    observed_min: f32,
    observed_max: f32,
}

impl Default for DisplacementPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplacementPass {
    pub fn new() -> Self {
        Self {
            scratch: Vec::new(),
            observed_min: -DEFAULT_WINDOW,
            observed_max: DEFAULT_WINDOW,
        }
    }

    /// Smoothed `(min, max)` of the vertical displacement.
    pub fn observed_range(&self) -> (f32, f32) {
        (self.observed_min, self.observed_max)
    }

    pub fn reset_range(&mut self) {
        self.observed_min = -DEFAULT_WINDOW;
        self.observed_max = DEFAULT_WINDOW;
    }

    /// Displaces every vertex of `mode` at `phase` relative to `original`,
    /// colours it with `gradient`, and writes both into `mesh`.
    pub fn run(
        &mut self,
        mode: &ModalMode,
        phase: f32,
        amplification: f32,
        gradient: GradientSelection,
        original: &[f32],
        mesh: &mut VertexMesh,
    ) -> FrameStats {
        let frequency = mode.frequency();
        let time = physical_time(phase, frequency);

        self.scratch.clear();
        let mut current_min = f32::INFINITY;
        let mut current_max = f32::NEG_INFINITY;
        let mut current_max_abs = 0.0_f32;
        for record in mode.records() {
            let d = record.displacement(time, frequency, amplification);
            let vertical = d[VERTICAL_AXIS];
            current_min = current_min.min(vertical);
            current_max = current_max.max(vertical);
            current_max_abs = current_max_abs.max(vertical.abs());
            self.scratch.push((record.vertex_index, d));
        }
        if self.scratch.is_empty() {
            current_min = 0.0;
            current_max = 0.0;
        }

        self.observed_max = self.observed_max * EMA_RETAIN + current_max * (1.0 - EMA_RETAIN);
        self.observed_min = self.observed_min * EMA_RETAIN + current_min * (1.0 - EMA_RETAIN);
        if self.observed_max - self.observed_min < MIN_SPAN {
            self.reset_range();
        }
        if current_max_abs < MIN_SPAN {
            current_max_abs = DEFAULT_WINDOW;
        }

        let mut writer = FrameWriter::new(mesh);
        for &(index, d) in &self.scratch {
            let rest = rest_position(original, index);
            let position = [rest[0] + d[0], rest[1] + d[1], rest[2] + d[2]];
            let signed = (d[VERTICAL_AXIS] / current_max_abs).clamp(-1.0, 1.0);
            let t = ((signed + 1.0) * 0.5).clamp(0.0, 1.0);
            writer.write(index, position, gradient.evaluate(t));
        }
        let (written, skipped) = writer.commit();
        if skipped > 0 {
            tracing::warn!(skipped, "records reference vertices outside the target buffer");
        }

        tracing::trace!(
            phase,
            time,
            current_min,
            current_max,
            current_max_abs,
            written,
            "displacement frame"
        );

        FrameStats {
            phase,
            physical_time: time,
            current_min,
            current_max,
            current_max_abs,
            written,
            skipped,
        }
    }
}

fn rest_position(original: &[f32], index: usize) -> [f32; 3] {
    let base = index.saturating_mul(FLOATS_PER_VERTEX);
    match original.get(base..base.saturating_add(3)) {
        Some(slot) => [slot[0], slot[1], slot[2]],
        None => [0.0; 3],
    }
}
