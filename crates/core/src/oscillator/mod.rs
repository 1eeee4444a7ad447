use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

/// Per-axis amplitude and phase describing how one vertex moves within a mode.
///
/// Records are plain values. The displacement they produce is a pure function
/// of time and the owning mode's frequency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OscillatorRecord {
    pub amplitude: [f32; 3],
    /// Phase offsets in radians.
    pub phase: [f32; 3],
    pub vertex_index: usize,
}

impl OscillatorRecord {
    pub fn new(vertex_index: usize, amplitude: [f32; 3], phase: [f32; 3]) -> Self {
        Self {
            amplitude,
            phase,
            vertex_index,
        }
    }

    /// A record that never moves its vertex.
    pub fn zero(vertex_index: usize) -> Self {
        Self {
            vertex_index,
            ..Self::default()
        }
    }

    /// Largest absolute amplitude across the three axes.
    pub fn peak_amplitude(&self) -> f32 {
        self.amplitude
            .iter()
            .fold(0.0_f32, |peak, value| peak.max(value.abs()))
    }

    /// Evaluates `amplitude * cos(2π·frequency·time + phase) * amplification`
    /// on every axis.
    ///
    /// A frequency of zero leaves each axis at the constant
    /// `amplitude * cos(phase)`; the vertex is offset but does not oscillate.
    pub fn displacement(&self, time: f32, frequency: f32, amplification: f32) -> [f32; 3] {
        let omega = TAU * frequency;
        std::array::from_fn(|axis| {
            self.amplitude[axis] * (omega * time + self.phase[axis]).cos() * amplification
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= EPS)
    }

    #[test]
    fn starts_at_amplitude_times_cos_phase() {
        let record = OscillatorRecord::new(0, [0.5, -1.0, 2.0], [0.3, 1.2, -2.0]);
        for frequency in [0.5, 2.0, 17.0] {
            let expected = [0.5 * 0.3_f32.cos(), -1.2_f32.cos(), 2.0 * (-2.0_f32).cos()];
            assert!(close(record.displacement(0.0, frequency, 1.0), expected));
        }
    }

    #[test]
    fn repeats_after_one_period() {
        let record = OscillatorRecord::new(3, [1.0, 0.25, 0.75], [0.0, 0.7, 2.1]);
        let frequency = 4.0;
        for step in 0..16 {
            let t = step as f32 * 0.013;
            let now = record.displacement(t, frequency, 1.0);
            let later = record.displacement(t + 1.0 / frequency, frequency, 1.0);
            assert!(close(now, later), "{now:?} vs {later:?} at t={t}");
        }
    }

    #[test]
    fn half_period_inverts_vertical_axis() {
        let record = OscillatorRecord::new(0, [0.0, 0.0, 1.0], [0.0; 3]);
        let d = record.displacement(0.25, 2.0, 1.0);
        assert!((d[2] + 1.0).abs() <= EPS);
    }

    #[test]
    fn zero_frequency_holds_a_constant_offset() {
        let record = OscillatorRecord::new(0, [1.0, 1.0, 1.0], [0.0, std::f32::consts::PI, 0.5]);
        let a = record.displacement(0.0, 0.0, 1.0);
        let b = record.displacement(12.5, 0.0, 1.0);
        assert!(close(a, b));
        assert!(close(a, [1.0, -1.0, 0.5_f32.cos()]));
    }

    #[test]
    fn amplification_scales_linearly() {
        let record = OscillatorRecord::new(0, [0.2, 0.4, 0.6], [0.1, 0.2, 0.3]);
        let base = record.displacement(0.1, 3.0, 1.0);
        let scaled = record.displacement(0.1, 3.0, 5.0);
        assert!(close(scaled, [base[0] * 5.0, base[1] * 5.0, base[2] * 5.0]));
    }

    #[test]
    fn peak_amplitude_uses_absolute_values() {
        let record = OscillatorRecord::new(0, [0.1, -3.0, 2.0], [0.0; 3]);
        assert_eq!(record.peak_amplitude(), 3.0);
    }
}
