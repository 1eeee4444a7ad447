//! Core library for the Modal Visualiser application.
//!
//! The crate animates modal (eigen-mode) vibration data on a mesh. Each
//! module owns one stage of the per-frame pipeline: oscillator evaluation,
//! the modal data model, playback timing, the displacement pass, colour
//! gradients and the vertex buffer the renderer uploads.

pub mod animation;
pub mod config;
pub mod displacement;
pub mod error;
pub mod gradient;
pub mod modal;
pub mod oscillator;
pub mod render;
pub mod timeline;

pub use animation::{AnimationController, AnimationEvent, AnimationState};
pub use config::{AnimationConfig, AppConfig};
pub use displacement::{DisplacementPass, FrameStats};
pub use error::{ModalVizError, Result};
pub use gradient::{GradientBase, GradientSelection, Rgb};
pub use modal::{ModalMode, ModalSet};
pub use oscillator::OscillatorRecord;
pub use render::{FrameWriter, SharedMesh, VertexMesh};
pub use timeline::{ManualTimeSource, PlaybackClock, SystemTimeSource, TimeSource};
