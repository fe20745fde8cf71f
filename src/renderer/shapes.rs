//! Shape generation for 2D primitives
//!
//! Everything is tessellated into plain triangle lists with per-vertex
//! colors. Linear gradients are exact as long as every triangle lies inside
//! one gradient segment, which the helpers below arrange for.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::vertex::{Color, Vertex, gradient_at};

/// Two triangles for a quad given as top-left, top-right, bottom-left, bottom-right
fn push_quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], colors: [Color; 4]) {
    let [tl, tr, bl, br] = corners;
    let [ctl, ctr, cbl, cbr] = colors;
    out.push(Vertex::at(tl, ctl));
    out.push(Vertex::at(tr, ctr));
    out.push(Vertex::at(bl, cbl));

    out.push(Vertex::at(bl, cbl));
    out.push(Vertex::at(tr, ctr));
    out.push(Vertex::at(br, cbr));
}

/// Solid axis-aligned rectangle
pub fn rect(min: Vec2, size: Vec2, color: Color) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    let max = min + size;
    push_quad(
        &mut vertices,
        [min, Vec2::new(max.x, min.y), Vec2::new(min.x, max.y), max],
        [color; 4],
    );
    vertices
}

/// Rectangle with a top-to-bottom two-color gradient
pub fn vertical_gradient_rect(min: Vec2, size: Vec2, top: Color, bottom: Color) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    let max = min + size;
    push_quad(
        &mut vertices,
        [min, Vec2::new(max.x, min.y), Vec2::new(min.x, max.y), max],
        [top, top, bottom, bottom],
    );
    vertices
}

/// Rectangle with a gradient running from its top-left to its bottom-right corner
///
/// The quad is split along the other diagonal, where a square's gradient
/// reaches its midpoint, so a middle stop at 0.5 is reproduced exactly.
pub fn diagonal_gradient_rect(min: Vec2, size: Vec2, stops: &[(f32, Color)]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    let max = min + size;
    let len_sq = size.length_squared().max(f32::EPSILON);
    let t_tr = size.x * size.x / len_sq;
    let t_bl = size.y * size.y / len_sq;

    push_quad(
        &mut vertices,
        [min, Vec2::new(max.x, min.y), Vec2::new(min.x, max.y), max],
        [
            gradient_at(stops, 0.0),
            gradient_at(stops, t_tr),
            gradient_at(stops, t_bl),
            gradient_at(stops, 1.0),
        ],
    );
    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    ellipse(center, Vec2::splat(radius), 0.0, TAU, color, segments)
}

/// Filled ellipse (or a slice of one, closed by its chord through the center)
///
/// Angles follow screen space: 0 points right, PI/2 points down.
pub fn ellipse(
    center: Vec2,
    radii: Vec2,
    start: f32,
    end: f32,
    color: Color,
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let span = end - start;
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = start + (i as f32 / segments as f32) * span;
        let theta2 = start + ((i + 1) as f32 / segments as f32) * span;

        // Triangle from center to edge
        vertices.push(Vertex::at(center, color));
        vertices.push(Vertex::new(
            center.x + radii.x * theta1.cos(),
            center.y + radii.y * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radii.x * theta2.cos(),
            center.y + radii.y * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring with separate inner and outer colors
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    inner_color: Color,
    outer_color: Color,
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());

        push_quad(
            &mut vertices,
            [
                center + dir1 * inner_radius,
                center + dir1 * outer_radius,
                center + dir2 * inner_radius,
                center + dir2 * outer_radius,
            ],
            [inner_color, outer_color, inner_color, outer_color],
        );
    }

    vertices
}

/// Disc filled with a radial gradient; stops are (fraction of radius, color)
pub fn radial_gradient(
    center: Vec2,
    radius: f32,
    stops: &[(f32, Color)],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    if stops.is_empty() || radius <= 0.0 {
        return vertices;
    }

    let mut inner_t = 0.0;
    let mut inner_color = gradient_at(stops, 0.0);
    for &(t, color) in stops.iter().filter(|(t, _)| *t > 0.0) {
        let t = t.min(1.0);
        vertices.extend(ring(
            center,
            inner_t * radius,
            t * radius,
            inner_color,
            color,
            segments,
        ));
        inner_t = t;
        inner_color = color;
    }
    vertices
}

/// Thick open polyline with mitered joins
pub fn polyline(points: &[Vec2], width: f32, color: Color) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let half = width / 2.0;
    let normals: Vec<Vec2> = points
        .windows(2)
        .map(|w| (w[1] - w[0]).normalize_or_zero().perp())
        .collect();

    // Offset of each point: segment normal at the ends, miter in between
    let offsets: Vec<Vec2> = (0..points.len())
        .map(|i| {
            let n = if i == 0 {
                normals[0]
            } else if i == points.len() - 1 {
                normals[i - 1]
            } else {
                let miter = (normals[i - 1] + normals[i]).normalize_or_zero();
                let cos = miter.dot(normals[i]).max(0.25);
                return miter * (half / cos);
            };
            n * half
        })
        .collect();

    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);
    for i in 0..points.len() - 1 {
        push_quad(
            &mut vertices,
            [
                points[i] + offsets[i],
                points[i + 1] + offsets[i + 1],
                points[i] - offsets[i],
                points[i + 1] - offsets[i + 1],
            ],
            [color; 4],
        );
    }
    vertices
}

/// Points along a quadratic Bezier curve, endpoints included
pub fn quadratic_curve(p0: Vec2, control: Vec2, p1: Vec2, segments: u32) -> Vec<Vec2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            p0 * (u * u) + control * (2.0 * u * t) + p1 * (t * t)
        })
        .collect()
}

/// Fan-fill a convex outline
pub fn convex_fill(outline: &[Vec2], color: Color) -> Vec<Vertex> {
    if outline.len() < 3 {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity((outline.len() - 2) * 3);
    for pair in outline[1..].windows(2) {
        vertices.push(Vertex::at(outline[0], color));
        vertices.push(Vertex::at(pair[0], color));
        vertices.push(Vertex::at(pair[1], color));
    }
    vertices
}

/// Fill between a curve and a horizontal bottom edge, colored by height
pub fn fill_below(curve: &[Vec2], bottom: f32, color_at_y: impl Fn(f32) -> Color) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(curve.len().saturating_sub(1) * 6);
    let bottom_color = color_at_y(bottom);
    for pair in curve.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        push_quad(
            &mut vertices,
            [a, b, Vec2::new(a.x, bottom), Vec2::new(b.x, bottom)],
            [color_at_y(a.y), color_at_y(b.y), bottom_color, bottom_color],
        );
    }
    vertices
}

/// Strokes of a glyph in a 0.6 x 1.0 cell (y down)
fn glyph_strokes(c: char) -> Vec<(Vec2, Vec2)> {
    // Seven-segment layout
    const SEGMENTS: [(Vec2, Vec2); 7] = [
        (Vec2::new(0.0, 0.0), Vec2::new(0.6, 0.0)),
        (Vec2::new(0.6, 0.0), Vec2::new(0.6, 0.5)),
        (Vec2::new(0.6, 0.5), Vec2::new(0.6, 1.0)),
        (Vec2::new(0.0, 1.0), Vec2::new(0.6, 1.0)),
        (Vec2::new(0.0, 0.5), Vec2::new(0.0, 1.0)),
        (Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.5)),
        (Vec2::new(0.0, 0.5), Vec2::new(0.6, 0.5)),
    ];
    let mask: u8 = match c {
        '0' => 0b011_1111,
        '1' => 0b000_0110,
        '2' => 0b101_1011,
        '3' => 0b100_1111,
        '4' => 0b110_0110,
        '5' => 0b110_1101,
        '6' => 0b111_1101,
        '7' => 0b000_0111,
        '8' => 0b111_1111,
        '9' => 0b110_1111,
        '+' => {
            return vec![
                (Vec2::new(0.3, 0.2), Vec2::new(0.3, 0.8)),
                (Vec2::new(0.0, 0.5), Vec2::new(0.6, 0.5)),
            ];
        }
        'x' => {
            return vec![
                (Vec2::new(0.05, 0.35), Vec2::new(0.55, 1.0)),
                (Vec2::new(0.55, 0.35), Vec2::new(0.05, 1.0)),
            ];
        }
        _ => 0,
    };
    SEGMENTS
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, s)| *s)
        .collect()
}

/// Line-art text, horizontally centered on `baseline.x`, sitting on `baseline.y`
///
/// Only digits, '+' and 'x' have glyphs; anything else leaves a gap.
pub fn text(s: &str, baseline: Vec2, height: f32, color: Color) -> Vec<Vertex> {
    let cell = 0.6 * height;
    let gap = 0.25 * height;
    let thickness = (height * 0.16).max(1.0);
    let count = s.chars().count() as f32;
    if count == 0.0 {
        return Vec::new();
    }
    let total = count * cell + (count - 1.0) * gap;
    let origin = Vec2::new(baseline.x - total / 2.0, baseline.y - height);

    let mut vertices = Vec::new();
    for (i, c) in s.chars().enumerate() {
        let cell_origin = origin + Vec2::new(i as f32 * (cell + gap), 0.0);
        for (a, b) in glyph_strokes(c) {
            let a = cell_origin + a * height;
            let b = cell_origin + b * height;
            // Square caps
            let dir = (b - a).normalize_or_zero() * (thickness / 2.0);
            vertices.extend(polyline(&[a - dir, b + dir], thickness, color));
        }
    }
    vertices
}

/// Round-ended pill, used behind badges
pub fn pill(center: Vec2, size: Vec2, color: Color) -> Vec<Vertex> {
    let r = size.y / 2.0;
    let body = (size.x - size.y).max(0.0);
    let mut vertices = rect(
        Vec2::new(center.x - body / 2.0, center.y - r),
        Vec2::new(body, size.y),
        color,
    );
    vertices.extend(ellipse(
        Vec2::new(center.x - body / 2.0, center.y),
        Vec2::splat(r),
        PI / 2.0,
        PI * 1.5,
        color,
        12,
    ));
    vertices.extend(ellipse(
        Vec2::new(center.x + body / 2.0, center.y),
        Vec2::splat(r),
        -PI / 2.0,
        PI / 2.0,
        color,
        12,
    ));
    vertices
}
