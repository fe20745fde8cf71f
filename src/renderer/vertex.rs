//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Straight (non-premultiplied) RGBA, components in 0..=1
pub type Color = [f32; 4];

/// Simple 2D vertex with position and color
///
/// Positions are in viewport pixels until the pipeline maps them to NDC.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn at(p: Vec2, color: Color) -> Self {
        Self::new(p.x, p.y, color)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Color from 8-bit channels and a 0..=1 alpha
pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Color {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

pub const fn rgb(c: [u8; 3]) -> Color {
    rgba(c[0], c[1], c[2], 1.0)
}

pub fn with_alpha(c: Color, alpha: f32) -> Color {
    [c[0], c[1], c[2], alpha.clamp(0.0, 1.0)]
}

pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Shift every color channel by `amount` on the 0..=255 scale
pub fn adjust(c: Color, amount: i16) -> Color {
    let shift = amount as f32 / 255.0;
    [
        (c[0] + shift).clamp(0.0, 1.0),
        (c[1] + shift).clamp(0.0, 1.0),
        (c[2] + shift).clamp(0.0, 1.0),
        c[3],
    ]
}

/// Sample a piecewise-linear gradient; stops are (offset, color) sorted by offset
pub fn gradient_at(stops: &[(f32, Color)], t: f32) -> Color {
    let Some(&(first_t, first_c)) = stops.first() else {
        return colors::TRANSPARENT;
    };
    if t <= first_t {
        return first_c;
    }
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let span = t1 - t0;
            let u = if span > 0.0 { (t - t0) / span } else { 1.0 };
            return lerp_color(c0, c1, u);
        }
    }
    stops[stops.len() - 1].1
}

/// Scene palette
pub mod colors {
    use super::{Color, rgba};

    pub const TRANSPARENT: Color = [0.0; 4];
    pub const WHITE: Color = rgba(0xFF, 0xFF, 0xFF, 1.0);
    pub const BLACK: Color = rgba(0x00, 0x00, 0x00, 1.0);

    pub const SKY_TOP: Color = rgba(0x0B, 0x10, 0x26, 1.0);
    pub const SKY_BOTTOM: Color = rgba(0x1B, 0x29, 0x52, 1.0);
    pub const AURORA: Color = rgba(120, 230, 180, 0.2);
    pub const SNOWFLAKE: Color = rgba(0xFF, 0xFF, 0xFF, 0.8);
    pub const CLOUD: Color = rgba(0xEC, 0xF2, 0xFF, 1.0);
    pub const GROUND_TOP: Color = rgba(0xFF, 0xFF, 0xFF, 1.0);
    pub const GROUND_BOTTOM: Color = rgba(0xE3, 0xE3, 0xE3, 1.0);

    pub const SANTA_RED: Color = rgba(0xFF, 0x00, 0x00, 1.0);
    pub const SANTA_FACE: Color = rgba(0xFF, 0xE4, 0xC4, 1.0);

    pub const TRAIL: Color = rgba(255, 215, 0, 0.3);
    pub const PROJECTILE: Color = rgba(0xFF, 0xD7, 0x00, 1.0);

    pub const GIFT_SHADOW: Color = rgba(0, 0, 0, 0.2);
    pub const HEALTH_BADGE: Color = rgba(0, 0, 0, 0.6);
    pub const SHINE_EDGE: Color = rgba(255, 255, 255, 0.1);
    pub const SHINE_MID: Color = rgba(255, 255, 255, 0.2);
    pub const SHINE_END: Color = rgba(255, 255, 255, 0.0);

    pub const BURST_CORE: Color = rgba(255, 255, 255, 0.8);
    pub const BURST_MID: Color = rgba(255, 220, 0, 0.6);
    pub const BURST_EDGE: Color = rgba(255, 0, 0, 0.0);

    pub const COMBO_BADGE: Color = rgba(0, 0, 0, 0.45);
    pub const COMBO_TEXT: Color = rgba(0xFF, 0xD7, 0x00, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_sampling() {
        let stops = [(0.0, colors::WHITE), (1.0, colors::BLACK)];
        assert_eq!(gradient_at(&stops, -1.0), colors::WHITE);
        assert_eq!(gradient_at(&stops, 2.0), colors::BLACK);
        let mid = gradient_at(&stops, 0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert_eq!(gradient_at(&[], 0.5), colors::TRANSPARENT);
    }

    #[test]
    fn test_adjust_darkens_and_clamps() {
        let c = adjust(rgba(20, 100, 255, 1.0), -30);
        assert_eq!(c[0], 0.0);
        assert!((c[1] - 70.0 / 255.0).abs() < 1e-6);
        assert!((c[2] - 225.0 / 255.0).abs() < 1e-6);
    }
}
