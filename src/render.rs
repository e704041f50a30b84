//! CPU reference renderer.
//!
//! Runs the same two-stage semantics as the GPU pipeline (coordinate
//! mapping, escape-time evaluation, HSV colouring) as a parallel map over
//! the pixel grid. Every pixel is a pure function of (pixel coordinate,
//! parameter block), so the map needs no locking. This is how the fragment
//! path is tested without a device.

use log::trace;
use rayon::prelude::{IndexedParallelIterator, ParallelIterator, ParallelSliceMut};

use crate::{colour, escape, screen, uniform::MandelbrotUniform};

pub struct CpuRenderer {
    pool: rayon::ThreadPool,
}

impl CpuRenderer {
    /// Build a renderer with one worker per logical CPU.
    pub fn new() -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build()?;
        Ok(Self { pool })
    }

    /// Render one frame into an RGBA8 buffer of `size.pixel_count() * 4`
    /// bytes, row 0 at the top of the viewport.
    ///
    /// Each pixel is sampled at its centre, the same point the rasterizer
    /// hands the fragment stage. The buffer row order is top-down while
    /// surface coordinates grow bottom-up, hence the flipped `v`.
    pub fn render(&self, uniform: &MandelbrotUniform, size: screen::Size, frame: &mut [u8]) {
        assert_eq!(frame.len(), size.pixel_count() * 4);
        trace!("begin cpu render of {}x{}", size.width, size.height);

        let width = size.width as usize;
        let inv_width = 1.0 / size.width as f64;
        let inv_height = 1.0 / size.height as f64;
        self.pool.install(|| {
            frame
                .par_chunks_exact_mut(4)
                .enumerate()
                .for_each(|(index, pixel)| {
                    let x = (index % width) as f64;
                    let y = (index / width) as f64;
                    let u = (x + 0.5) * inv_width;
                    let v = 1.0 - (y + 0.5) * inv_height;
                    let c = uniform.complex_at(u, v);
                    let iterations = escape::escape_time(c, uniform.max_iterations);
                    let rgba =
                        colour::to_rgba8(colour::iteration_colour(iterations, uniform.max_iterations));
                    pixel.copy_from_slice(&rgba);
                });
        });

        trace!("end cpu render");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(uniform: &MandelbrotUniform, size: screen::Size) -> Vec<u8> {
        let renderer = CpuRenderer::new().unwrap();
        let mut frame = vec![0; size.pixel_count() * 4];
        renderer.render(uniform, size, &mut frame);
        frame
    }

    fn pixel(frame: &[u8], size: screen::Size, x: u32, y: u32) -> [u8; 4] {
        let index = (y as usize * size.width as usize + x as usize) * 4;
        frame[index..index + 4].try_into().unwrap()
    }

    #[test]
    fn interior_pixel_is_black() {
        let size = screen::Size {
            width: 9,
            height: 9,
        };
        let uniform = MandelbrotUniform::new(1.0);
        let frame = render(&uniform, size);
        // Centre pixel samples u = v = 0.5, i.e. c = (-1, 0), whose orbit
        // cycles between 0 and -1.
        assert_eq!(pixel(&frame, size, 4, 4), [0, 0, 0, 0]);
    }

    #[test]
    fn exterior_pixel_escapes_immediately_to_red() {
        let size = screen::Size {
            width: 4,
            height: 4,
        };
        // Viewport far outside the set: every orbit escapes on iteration 1,
        // giving hue 1/128.
        let uniform = MandelbrotUniform {
            min_x: 10.0,
            min_y: 10.0,
            height: 1.0,
            aspect_ratio: 1.0,
            max_iterations: 128,
            _padding: 0,
        };
        let frame = render(&uniform, size);
        let expected = colour::to_rgba8(colour::iteration_colour(1, 128));
        for chunk in frame.chunks_exact(4) {
            assert_eq!(chunk, expected);
        }
    }

    #[test]
    fn row_zero_is_the_top_of_the_viewport() {
        let size = screen::Size {
            width: 1,
            height: 2,
        };
        // One-pixel-wide viewport: the top pixel samples c = (0, 2), which
        // escapes, while the bottom pixel samples c = (0, 0), which never
        // does.
        let uniform = MandelbrotUniform {
            min_x: -0.5,
            min_y: -1.0,
            height: 4.0,
            aspect_ratio: 0.25,
            max_iterations: 256,
            _padding: 0,
        };
        let frame = render(&uniform, size);
        assert_ne!(pixel(&frame, size, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, size, 0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn rendering_is_deterministic_across_runs() {
        let size = screen::Size {
            width: 16,
            height: 12,
        };
        let uniform = MandelbrotUniform::new(size.aspect_ratio());
        assert_eq!(render(&uniform, size), render(&uniform, size));
    }

    #[test]
    #[should_panic]
    fn mismatched_frame_length_panics() {
        let renderer = CpuRenderer::new().unwrap();
        let uniform = MandelbrotUniform::new(1.0);
        let size = screen::Size {
            width: 2,
            height: 2,
        };
        let mut frame = vec![0; 3];
        renderer.render(&uniform, size, &mut frame);
    }
}
