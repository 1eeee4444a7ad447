//! Host-side vertex buffer shared with the renderer.
//!
//! The buffer is interleaved as `[x, y, z, r, g, b]` per vertex. It is owned
//! by the caller and shared through [`SharedMesh`]; the animation core is its
//! only writer while animating and every write is visible to readers on the
//! same thread as soon as the frame completes. Nothing here is `Send`.

use std::{cell::RefCell, rc::Rc};

use crate::{ModalVizError, Result, Rgb};

/// Number of `f32` values stored per vertex.
pub const FLOATS_PER_VERTEX: usize = 6;

/// Shared handle to a caller-owned vertex buffer.
pub type SharedMesh = Rc<RefCell<VertexMesh>>;

#[derive(Debug, Clone, PartialEq)]
pub struct VertexMesh {
    vertices: Vec<f32>,
}

impl VertexMesh {
    /// Wraps interleaved vertex data. The data must hold at least one vertex
    /// and its length must be a multiple of [`FLOATS_PER_VERTEX`].
    pub fn new(vertices: Vec<f32>) -> Result<Self> {
        validate_layout(&vertices)?;
        Ok(Self { vertices })
    }

    /// Builds a mesh from positions, giving every vertex the same colour.
    pub fn from_positions(positions: &[[f32; 3]], color: Rgb) -> Result<Self> {
        let mut vertices = Vec::with_capacity(positions.len() * FLOATS_PER_VERTEX);
        for position in positions {
            vertices.extend_from_slice(position);
            vertices.extend_from_slice(&color.to_array());
        }
        Self::new(vertices)
    }

    pub fn into_shared(self) -> SharedMesh {
        Rc::new(RefCell::new(self))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn position(&self, index: usize) -> Option<[f32; 3]> {
        let (base, _) = slot_bounds(index)?;
        let slot = self.vertices.get(base..base + 3)?;
        Some([slot[0], slot[1], slot[2]])
    }

    pub fn color(&self, index: usize) -> Option<Rgb> {
        let (base, end) = slot_bounds(index)?;
        let slot = self.vertices.get(base + 3..end)?;
        Some(Rgb::new(slot[0], slot[1], slot[2]))
    }

    /// Raw interleaved data, ready for upload.
    pub fn as_slice(&self) -> &[f32] {
        &self.vertices
    }

    pub(crate) fn vertex_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        let (base, end) = slot_bounds(index)?;
        self.vertices.get_mut(base..end)
    }

    pub(crate) fn copy_from(&mut self, snapshot: &[f32]) {
        let len = self.vertices.len().min(snapshot.len());
        self.vertices[..len].copy_from_slice(&snapshot[..len]);
    }
}

/// `[start, end)` of a vertex slot, or `None` when it cannot be addressed.
fn slot_bounds(index: usize) -> Option<(usize, usize)> {
    let base = index.checked_mul(FLOATS_PER_VERTEX)?;
    let end = base.checked_add(FLOATS_PER_VERTEX)?;
    Some((base, end))
}

fn validate_layout(vertices: &[f32]) -> Result<()> {
    if vertices.is_empty() {
        return Err(ModalVizError::InvalidMesh("buffer holds no vertices".into()));
    }
    if vertices.len() % FLOATS_PER_VERTEX != 0 {
        return Err(ModalVizError::InvalidMesh(format!(
            "length {} is not a multiple of {FLOATS_PER_VERTEX}",
            vertices.len()
        )));
    }
    Ok(())
}

/// Writes one frame of positions and colours into a mesh, counting the
/// vertices it touched and the ones it had to skip.
#[derive(Debug)]
pub struct FrameWriter<'a> {
    mesh: &'a mut VertexMesh,
    written: usize,
    skipped: usize,
}

impl<'a> FrameWriter<'a> {
    pub fn new(mesh: &'a mut VertexMesh) -> Self {
        Self {
            mesh,
            written: 0,
            skipped: 0,
        }
    }

    /// Stores `position` and `color` in the slot of `index`. Indices past the
    /// end of the buffer are counted as skipped.
    pub fn write(&mut self, index: usize, position: [f32; 3], color: Rgb) -> bool {
        match self.mesh.vertex_mut(index) {
            Some(slot) => {
                slot[..3].copy_from_slice(&position);
                slot[3..].copy_from_slice(&color.to_array());
                self.written += 1;
                true
            }
            None => {
                self.skipped += 1;
                false
            }
        }
    }

    /// Finishes the frame, returning `(written, skipped)`.
    pub fn commit(self) -> (usize, usize) {
        (self.written, self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_buffers() {
        assert!(matches!(
            VertexMesh::new(Vec::new()),
            Err(ModalVizError::InvalidMesh(_))
        ));
        let err = VertexMesh::new(vec![0.0; 7]).unwrap_err();
        assert!(format!("{err}").contains("multiple of 6"));
    }

    #[test]
    fn reads_interleaved_slots() {
        let mesh = VertexMesh::from_positions(
            &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            Rgb::new(0.1, 0.2, 0.3),
        )
        .unwrap();

        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.position(1), Some([4.0, 5.0, 6.0]));
        assert_eq!(mesh.color(0), Some(Rgb::new(0.1, 0.2, 0.3)));
        assert_eq!(mesh.position(2), None);
        assert_eq!(mesh.as_slice().len(), 12);
    }

    #[test]
    fn frame_writer_counts_writes_and_skips() {
        let mut mesh = VertexMesh::new(vec![0.0; 12]).unwrap();
        let mut writer = FrameWriter::new(&mut mesh);

        assert!(writer.write(1, [7.0, 8.0, 9.0], Rgb::new(1.0, 0.0, 0.5)));
        assert!(!writer.write(5, [0.0; 3], Rgb::default()));
        assert_eq!(writer.commit(), (1, 1));

        assert_eq!(mesh.position(1), Some([7.0, 8.0, 9.0]));
        assert_eq!(mesh.color(1), Some(Rgb::new(1.0, 0.0, 0.5)));
        assert_eq!(mesh.position(0), Some([0.0; 3]));
    }

    #[test]
    fn huge_indices_are_skipped_not_fatal() {
        let mut mesh = VertexMesh::new(vec![0.0; 6]).unwrap();
        let index = usize::MAX / FLOATS_PER_VERTEX;
        assert_eq!(mesh.position(index), None);
        assert_eq!(mesh.color(index), None);
        assert_eq!(mesh.position(usize::MAX), None);

        let mut writer = FrameWriter::new(&mut mesh);
        assert!(!writer.write(index, [1.0; 3], Rgb::default()));
        assert_eq!(writer.commit(), (0, 1));
    }

    #[test]
    fn copy_from_restores_snapshot() {
        let original = vec![1.0; 6];
        let mut mesh = VertexMesh::new(original.clone()).unwrap();
        FrameWriter::new(&mut mesh).write(0, [5.0; 3], Rgb::default());
        mesh.copy_from(&original);
        assert_eq!(mesh.as_slice(), original.as_slice());
    }
}
