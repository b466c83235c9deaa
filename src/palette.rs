//! Packed RGBA colors (`0xRRGGBBAA`) shared by the backdrop and the GPU renderer.

/// Page background the backdrop starts from (`#0a0a19`).
pub const BACKGROUND: u32 = 0x0A0A19FF;

/// Dark navy painted over the previous frame each tick. Alpha is per section.
pub const FADE: u32 = 0x0A0A1900;

/// Bluish tint for ambient particles and node links, `rgb(100, 200, 255)`.
pub const TINT: u32 = 0x64C8FFFF;

/// Node colors: cyan, violet, emerald.
pub const NODE_COLORS: [u32; 3] = [
    0x00D9FFFF, // #00d9ff
    0xA855F7FF, // #a855f7
    0x10B981FF, // #10b981
];

/// Replace the alpha byte of a packed color. `alpha` is clamped to [0, 1].
pub fn with_alpha(color: u32, alpha: f32) -> u32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
    (color & 0xFFFFFF00) | a
}

/// Alpha channel as a fraction.
pub fn alpha(color: u32) -> f32 {
    (color & 0xFF) as f32 / 255.0
}

/// Unpack to premultiplied `[r, g, b, a]` floats.
pub fn premultiplied(color: u32) -> [f32; 4] {
    let r = ((color >> 24) & 0xFF) as f32 / 255.0;
    let g = ((color >> 16) & 0xFF) as f32 / 255.0;
    let b = ((color >> 8) & 0xFF) as f32 / 255.0;
    let a = alpha(color);
    [r * a, g * a, b * a, a]
}

/// Uniform pick from [`NODE_COLORS`].
pub fn random_node_color(rng: &mut fastrand::Rng) -> u32 {
    NODE_COLORS[rng.usize(0..NODE_COLORS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_is_replaced_not_blended() {
        assert_eq!(with_alpha(TINT, 0.0), 0x64C8FF00);
        assert_eq!(with_alpha(FADE, 1.0), 0x0A0A19FF);
        assert_eq!(with_alpha(TINT, 7.5), 0x64C8FFFF);
        assert_eq!(with_alpha(0x11223344, 0.2) & 0xFF, 51);
    }

    #[test]
    fn premultiplied_scales_channels() {
        let [r, g, b, a] = premultiplied(0xFF800080);
        assert!((a - 128.0 / 255.0).abs() < 1e-6);
        assert!((r - a).abs() < 1e-6);
        assert!((g - (128.0 / 255.0) * a).abs() < 1e-6);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn node_colors_come_from_palette() {
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..64 {
            assert!(NODE_COLORS.contains(&random_node_color(&mut rng)));
        }
    }
}
