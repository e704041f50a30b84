//! Colouring algorithms.
//!
//! Iteration counts are mapped through hue so that escape bands cycle through
//! the full spectrum; points that never escape are drawn black. Mirrors
//! `hsv_to_rgb` / `fs_main` in `shader.wgsl`.

/// Standard six-fold symmetric HSV to RGB conversion
/// ([glsl-hsv2rgb](https://github.com/hughsk/glsl-hsv2rgb)).
///
/// `hue` is expected in `[0, 1)`; saturation and value in `[0, 1]`.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [f32; 3] {
    let k = [1.0f32, 2.0 / 3.0, 1.0 / 3.0];
    k.map(|k| {
        let p = ((hue + k).fract() * 6.0 - 3.0).abs();
        let channel = (p - 1.0).clamp(0.0, 1.0);
        value * (1.0 + (channel - 1.0) * saturation)
    })
}

/// Colour for one pixel, as linear RGB plus alpha.
///
/// `iterations == max_iterations` means the point is treated as belonging to
/// the filled set and is drawn pure black. The alpha channel is fixed at 0.0
/// in both cases, matching the fragment stage output exactly.
pub fn iteration_colour(iterations: u32, max_iterations: u32) -> [f32; 4] {
    if iterations == max_iterations {
        return [0.0, 0.0, 0.0, 0.0];
    }
    let hue = iterations as f32 / max_iterations as f32;
    let value = (iterations < max_iterations) as u32 as f32;
    let [r, g, b] = hsv_to_rgb(hue, 1.0, value);
    [r, g, b, 0.0]
}

/// Quantize a linear colour to the renderer's RGBA8 output format.
pub fn to_rgba8(colour: [f32; 4]) -> [u8; 4] {
    colour.map(|channel| (channel.clamp(0.0, 1.0) * 255.0 + 0.5) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_set_is_transparent_black() {
        for max_iterations in [1, 4, 128, 4096] {
            assert_eq!(
                iteration_colour(max_iterations, max_iterations),
                [0.0, 0.0, 0.0, 0.0]
            );
        }
    }

    #[test]
    fn zero_iterations_is_pure_red() {
        assert_eq!(iteration_colour(0, 4), [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn quarter_hue() {
        // h = 1/4 lands halfway between red and green.
        assert_eq!(iteration_colour(1, 4), [0.5, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn escaped_pixels_are_full_brightness() {
        for iterations in 0..128 {
            let [r, g, b, a] = iteration_colour(iterations, 128);
            let max_channel = r.max(g).max(b);
            assert_eq!(max_channel, 1.0, "iterations = {}", iterations);
            assert_eq!(a, 0.0);
        }
    }

    #[test]
    fn hsv_primaries() {
        // f32 rounding in `hue + k` can leave the off channels within an ulp
        // or so of zero rather than exactly there (the red channel at hue
        // 2/3 comes out as 4.7e-7), so only the on channel is compared
        // exactly.
        for (hue, on) in [(0.0, 0), (1.0 / 3.0, 1), (2.0 / 3.0, 2)] {
            let rgb = hsv_to_rgb(hue, 1.0, 1.0);
            for (channel, component) in rgb.iter().enumerate() {
                if channel == on {
                    assert_eq!(*component, 1.0, "hue {}: {:?}", hue, rgb);
                } else {
                    assert!(component.abs() < 1e-6, "hue {}: {:?}", hue, rgb);
                }
            }
        }
    }

    #[test]
    fn zero_value_is_black() {
        assert_eq!(hsv_to_rgb(0.7, 1.0, 0.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn rgba8_quantization_rounds() {
        assert_eq!(to_rgba8([0.0, 1.0, 0.5, 0.0]), [0, 255, 128, 0]);
    }
}
