use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{ModalVizError, OscillatorRecord, Result};

/// One vibration shape: a frequency shared by an ordered list of per-vertex
/// oscillator records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalMode {
    frequency: f32,
    name: String,
    records: Vec<OscillatorRecord>,
    max_amplitude: f32,
}

impl ModalMode {
    /// Creates an empty mode labelled after its frequency.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            name: default_label(frequency),
            records: Vec::new(),
            max_amplitude: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[OscillatorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Running maximum of the per-record peak amplitude.
    pub fn max_amplitude(&self) -> f32 {
        self.max_amplitude
    }

    pub fn add_record(&mut self, record: OscillatorRecord) {
        self.max_amplitude = self.max_amplitude.max(record.peak_amplitude());
        self.records.push(record);
    }

    pub fn add_records<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = OscillatorRecord>,
    {
        for record in records {
            self.add_record(record);
        }
    }

    /// Replaces every record with one built per index from the six axis arrays.
    ///
    /// The lengths are checked before anything is touched, so a mismatch
    /// leaves the existing records and maximum amplitude as they were.
    pub fn set_from_arrays(
        &mut self,
        amp_x: &[f32],
        amp_y: &[f32],
        amp_z: &[f32],
        phase_x: &[f32],
        phase_y: &[f32],
        phase_z: &[f32],
    ) -> Result<()> {
        let lengths = [
            amp_x.len(),
            amp_y.len(),
            amp_z.len(),
            phase_x.len(),
            phase_y.len(),
            phase_z.len(),
        ];
        if lengths.iter().any(|len| *len != lengths[0]) {
            return Err(ModalVizError::LengthMismatch { lengths });
        }

        self.records.clear();
        self.max_amplitude = 0.0;
        self.records.reserve(lengths[0]);
        for index in 0..lengths[0] {
            self.add_record(OscillatorRecord::new(
                index,
                [amp_x[index], amp_y[index], amp_z[index]],
                [phase_x[index], phase_y[index], phase_z[index]],
            ));
        }

        tracing::debug!(
            frequency = self.frequency,
            records = self.records.len(),
            max_amplitude = self.max_amplitude,
            "rebuilt mode from arrays"
        );
        Ok(())
    }

    /// Returns the record at `index` with amplitudes scaled into `[-1, 1]` by
    /// the mode's maximum amplitude.
    ///
    /// Out-of-range indices and modes without any amplitude yield a zero record.
    pub fn normalized_record(&self, index: usize) -> OscillatorRecord {
        match self.records.get(index) {
            Some(record) if self.max_amplitude != 0.0 => {
                let mut normalized = *record;
                for value in &mut normalized.amplitude {
                    *value /= self.max_amplitude;
                }
                normalized
            }
            _ => OscillatorRecord::default(),
        }
    }
}

fn default_label(frequency: f32) -> String {
    format!("{frequency:.2} Hz")
}

/// Frequency-keyed collection of modes plus the current selection.
///
/// Keys compare with exact floating point equality, except that NaN matches
/// NaN so such a mode can still be found and selected. Modes are kept in
/// ascending frequency order so positional selection is stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalSet {
    modes: Vec<ModalMode>,
    current: Option<f32>,
}

impl ModalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Inserts `mode`, replacing any mode registered under the same frequency.
    /// The first mode added to a set without a selection becomes current.
    pub fn add_mode(&mut self, mode: ModalMode) {
        let frequency = mode.frequency;
        match self.position(frequency) {
            Some(index) => self.modes[index] = mode,
            None => {
                let index = self
                    .modes
                    .partition_point(|existing| compare(existing.frequency, frequency).is_lt());
                self.modes.insert(index, mode);
            }
        }

        if self.current.is_none() {
            self.current = Some(frequency);
        }
    }

    pub fn mode(&self, frequency: f32) -> Option<&ModalMode> {
        self.position(frequency).map(|index| &self.modes[index])
    }

    /// Modes in ascending frequency order.
    pub fn modes(&self) -> &[ModalMode] {
        &self.modes
    }

    /// All registered frequencies in ascending order.
    pub fn frequencies(&self) -> Vec<f32> {
        self.modes.iter().map(|mode| mode.frequency).collect()
    }

    /// Selects the mode registered under `frequency`. Unknown frequencies leave
    /// the selection unchanged and return `false`.
    pub fn select_mode(&mut self, frequency: f32) -> bool {
        match self.position(frequency) {
            Some(index) => {
                self.current = Some(self.modes[index].frequency);
                true
            }
            None => false,
        }
    }

    /// Selects the `index`-th mode in ascending frequency order. Out-of-range
    /// indices are ignored and return `false`.
    pub fn set_current_mode_index(&mut self, index: usize) -> bool {
        match self.modes.get(index) {
            Some(mode) => {
                self.current = Some(mode.frequency);
                true
            }
            None => false,
        }
    }

    pub fn current_mode(&self) -> Option<&ModalMode> {
        self.current_index().map(|index| &self.modes[index])
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current.and_then(|frequency| self.position(frequency))
    }

    fn position(&self, frequency: f32) -> Option<usize> {
        self.modes
            .iter()
            .position(|mode| same_key(mode.frequency, frequency))
    }
}

fn same_key(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn compare(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}
