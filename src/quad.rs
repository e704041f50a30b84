//! Screen-covering quad emitted by the vertex stage.
//!
//! CPU mirror of `vs_main` in `shader.wgsl`: four vertices, drawn as a
//! triangle strip, cover clip space exactly with no gaps or overlaps.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct QuadVertex {
    /// Homogeneous clip-space position, z = 0, w = 1.
    pub clip_position: [f32; 4],
    /// Normalized position in [0,1]^2, interpolated per fragment by the
    /// rasterizer.
    pub surface_coordinate: [f32; 2],
}

/// Vertex for one invocation index in `{0, 1, 2, 3}`.
///
/// Indices walk the strip corners `(-1,-1), (1,-1), (-1,1), (1,1)`. The
/// pipeline draws exactly 4 vertices; an index outside that range is a
/// caller precondition violation, not a runtime error.
pub fn quad_vertex(vertex_index: u32) -> QuadVertex {
    let x = (vertex_index & 1) as f32 * 2.0 - 1.0;
    let y = (vertex_index >> 1) as f32 * 2.0 - 1.0;
    QuadVertex {
        clip_position: [x, y, 0.0, 1.0],
        surface_coordinate: [x / 2.0 + 0.5, y / 2.0 + 0.5],
    }
}
