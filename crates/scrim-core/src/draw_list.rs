//! Renderer-agnostic capture of tessellated draw output.
//!
//! A [`DrawList`] copies one frame's tessellated meshes out of the GUI
//! library into owned vertex/index/command storage, then emits them on
//! demand in a form any host renderer can consume: translated vertices,
//! contiguous index ranges, and per-command clip/texture metadata.

use bytemuck::{Pod, Zeroable};
use egui::epaint::{ClippedPrimitive, Primitive};
use egui::TextureId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Renderer-ready vertex: position and UV in points, sRGBA color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct RenderVertex {
    /// Position in the consumer's local space.
    pub position: [f32; 2],
    /// Texture coordinates.
    pub uv: [f32; 2],
    /// Color as sRGBA bytes, unchanged from the library's vertex color.
    pub color: [u8; 4],
}

/// Axis-aligned rectangle in consumer pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl ScreenRect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    /// Creates a rectangle from corners.
    #[must_use]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a rectangle from an origin and size.
    #[must_use]
    pub fn from_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Returns the rectangle shifted by `offset`.
    #[must_use]
    pub fn translate(self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Returns the intersection with `other` (possibly empty).
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Returns true if the rectangle covers no area.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Returns the rectangle width.
    #[must_use]
    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    /// Returns the rectangle height.
    #[must_use]
    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }
}

impl From<egui::Rect> for ScreenRect {
    fn from(rect: egui::Rect) -> Self {
        Self {
            min: Vec2::new(rect.min.x, rect.min.y),
            max: Vec2::new(rect.max.x, rect.max.y),
        }
    }
}

/// One draw command: an element count into the owning list's index buffer,
/// a clip rectangle, and an opaque texture reference the host resolves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    /// Number of indices this command consumes.
    pub element_count: u32,
    /// Clip rectangle in canvas space.
    pub clip_rect: ScreenRect,
    /// Texture referenced by this command.
    pub texture: TextureId,
}

/// Owned per-frame capture of tessellated draw output.
///
/// Replaced wholesale every frame; nothing in here borrows library memory.
#[derive(Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    indices: Vec<u32>,
    vertices: Vec<egui::epaint::Vertex>,
}

impl DrawList {
    /// Copies tessellated primitives into owned storage.
    ///
    /// Meshes are concatenated into shared vertex/index buffers, with their
    /// indices rebased onto the shared vertex buffer and one command recorded
    /// per mesh. Paint-callback primitives cannot be represented in the
    /// renderer-agnostic output and are skipped.
    #[must_use]
    pub fn capture(primitives: &[ClippedPrimitive]) -> Self {
        let mut list = Self::default();

        for clipped in primitives {
            match &clipped.primitive {
                Primitive::Mesh(mesh) => {
                    if mesh.indices.is_empty() {
                        continue;
                    }
                    let base = u32::try_from(list.vertices.len())
                        .expect("vertex buffer exceeds u32 index space");
                    list.vertices.extend_from_slice(&mesh.vertices);
                    list.indices.extend(mesh.indices.iter().map(|&i| i + base));
                    list.commands.push(DrawCommand {
                        element_count: u32::try_from(mesh.indices.len())
                            .expect("mesh index count exceeds u32"),
                        clip_rect: ScreenRect::from(clipped.clip_rect),
                        texture: mesh.texture_id,
                    });
                }
                Primitive::Callback(_) => {
                    log::warn!("paint callback primitive cannot be captured; skipping");
                }
            }
        }

        list
    }

    /// Returns the number of draw commands.
    #[must_use]
    pub fn num_commands(&self) -> usize {
        self.commands.len()
    }

    /// Returns the command at `index`.
    #[must_use]
    pub fn command(&self, index: usize) -> DrawCommand {
        self.commands[index]
    }

    /// Returns all commands.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns the total number of captured indices.
    #[must_use]
    pub fn total_elements(&self) -> usize {
        self.indices.len()
    }

    /// Returns the number of captured vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Replaces `out` with every captured vertex translated by `offset`.
    ///
    /// Vertex order is preserved exactly; index ranges emitted by
    /// [`Self::emit_indices`] are positional references into this sequence.
    pub fn emit_vertices(&self, out: &mut Vec<RenderVertex>, offset: Vec2) {
        out.clear();
        out.reserve(self.vertices.len());
        out.extend(self.vertices.iter().map(|vertex| RenderVertex {
            position: [vertex.pos.x + offset.x, vertex.pos.y + offset.y],
            uv: [vertex.uv.x, vertex.uv.y],
            color: vertex.color.to_array(),
        }));
    }

    /// Replaces `out` with the contiguous index sub-range `start..start + count`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the captured total; command metadata and
    /// buffer contents are then inconsistent, which is unrecoverable.
    pub fn emit_indices(&self, out: &mut Vec<u32>, start: usize, count: usize) {
        assert!(
            start + count <= self.indices.len(),
            "index range {start}..{} exceeds captured total {}",
            start + count,
            self.indices.len()
        );
        out.clear();
        out.extend_from_slice(&self.indices[start..start + count]);
    }
}
