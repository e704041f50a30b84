//! The per-frame parameter block shared with `shader.wgsl`.

use bytemuck::{Pod, Zeroable};

use crate::escape::Complex;

/// Viewport bounds and iteration bound, uploaded once per frame (or on
/// viewport change) and read-only for the duration of a frame.
///
/// Field order and the trailing padding word are an ABI contract with the
/// uniform block in `shader.wgsl`; the f64 members need 8-byte alignment on
/// the GPU side.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct MandelbrotUniform {
    pub min_x: f64,
    pub min_y: f64,
    /// Vertical span of the viewport in complex-plane units. Must be > 0.
    pub height: f64,
    /// width / height, i.e. width = height * aspect_ratio. Must be > 0.
    pub aspect_ratio: f64,
    pub max_iterations: u32,
    pub _padding: u32,
}

/// Step used by the host when adjusting `max_iterations`, also its floor.
pub const ITERATION_STEP: u32 = 128;

impl MandelbrotUniform {
    /// Whole-set view: x in [-2, aspect_ratio * 2 - 2], y in [-1, 1].
    pub fn new(aspect_ratio: f64) -> Self {
        Self {
            min_x: -2.0,
            min_y: -1.0,
            height: 2.0,
            aspect_ratio,
            max_iterations: ITERATION_STEP,
            _padding: 0,
        }
    }

    /// Horizontal span, derived rather than stored.
    pub fn width(&self) -> f64 {
        self.aspect_ratio * self.height
    }

    /// Map a surface coordinate in [0,1]^2 to its complex-plane point.
    ///
    /// Mirror of the affine transform at the top of `fs_main`; kept in f64 so
    /// the CPU and GPU paths agree bit-for-bit.
    pub fn complex_at(&self, u: f64, v: f64) -> Complex {
        Complex {
            real: self.min_x + u * self.width(),
            imaginary: self.min_y + v * self.height,
        }
    }

    /// Translate the viewport by a drag delta in surface-coordinate units.
    ///
    /// `du` is positive when the cursor moves right, `dv` positive when it
    /// moves down; dragging the picture right moves the viewport left.
    pub fn pan(&mut self, du: f64, dv: f64) {
        self.min_x -= du * self.width();
        self.min_y += dv * self.height;
    }

    /// Scale `height` by `scale`, keeping the complex point under surface
    /// coordinate `(u, v)` fixed.
    pub fn zoom_about(&mut self, u: f64, v: f64, scale: f64) {
        let new_height = self.height * scale;
        let height_diff = new_height - self.height;
        self.min_x -= u * height_diff * self.aspect_ratio;
        self.min_y -= v * height_diff;
        self.height = new_height;
    }

    pub fn increase_iterations(&mut self) {
        self.max_iterations += ITERATION_STEP;
    }

    pub fn decrease_iterations(&mut self) {
        self.max_iterations = self
            .max_iterations
            .saturating_sub(ITERATION_STEP)
            .max(ITERATION_STEP);
    }
}
