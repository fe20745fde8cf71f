//! Frame builder
//!
//! Turns a read-only view of the game state into a triangle list in viewport
//! pixels. Layers are emitted back to front; alpha blending in the pipeline
//! does the compositing.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::PI;

use super::shapes;
use super::vertex::{Color, Vertex, adjust, colors, lerp_color, rgb, with_alpha};
use crate::consts::*;
use crate::settings::{QualityPreset, Settings};
use crate::sim::{
    Avatar, Facing, FallingGift, GameState, GiftState, Projectile, ScorePopup, SessionPhase,
};

/// Visual options that do not affect the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub quality: QualityPreset,
    pub trails: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            trails: true,
        }
    }
}

impl From<&Settings> for SceneOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            quality: settings.quality,
            trails: settings.trails,
        }
    }
}

/// Build one frame
///
/// `time_ms` is the wall-clock animation time (sky, snow); avatar animation,
/// popups and the combo badge use the session clock in `state`. The starfield
/// is drawn from `rng` every frame.
pub fn build_frame<R: Rng>(
    state: &GameState,
    time_ms: f64,
    options: &SceneOptions,
    rng: &mut R,
) -> Vec<Vertex> {
    let w = state.viewport.width;
    let h = state.viewport.height;
    let mut out = Vec::with_capacity(8192);

    // Sky
    out.extend(shapes::vertical_gradient_rect(
        Vec2::ZERO,
        Vec2::new(w, h),
        colors::SKY_TOP,
        colors::SKY_BOTTOM,
    ));

    push_aurora(&mut out, w, h, time_ms);
    push_stars(&mut out, w, h, options.quality.star_count(), rng);
    push_snow(&mut out, w, h, options.quality.snow_count(), time_ms);
    if state.phase == SessionPhase::Playing {
        push_clouds(&mut out, w, h, time_ms);
    }
    push_ground(&mut out, w, h);

    let anim_secs = (state.clock_ms / 1000.0) as f32;
    push_avatar(&mut out, &state.avatar, anim_secs);

    if options.trails {
        for projectile in &state.projectiles {
            push_trail(&mut out, projectile);
        }
    }
    for projectile in &state.projectiles {
        out.extend(shapes::circle(
            projectile.pos,
            PROJECTILE_RADIUS,
            colors::PROJECTILE,
            12,
        ));
    }

    for gift in &state.gifts {
        match gift.state {
            GiftState::Falling => push_gift(&mut out, gift),
            GiftState::Exploding { .. } => push_explosion(&mut out, gift),
        }
    }

    for popup in &state.popups {
        push_popup(&mut out, popup, state.clock_ms);
    }

    if state.combo.is_active(state.clock_ms) {
        push_combo_badge(&mut out, state.combo.combo, w);
    }

    out
}

/// Wavy translucent light band across the upper sky
fn push_aurora(out: &mut Vec<Vertex>, w: f32, h: f32, time_ms: f64) {
    let t = (time_ms / 2000.0) as f32;
    let points: Vec<Vec2> = (0..)
        .map(|i| i as f32 * 50.0)
        .take_while(|x| *x < w)
        .map(|x| Vec2::new(x, (x / 100.0 + t).sin() * 50.0 + h / 4.0))
        .collect();
    out.extend(shapes::polyline(&points, 30.0, colors::AURORA));
}

/// Fresh random stars every frame, in the top 70% of the sky
fn push_stars<R: Rng>(out: &mut Vec<Vertex>, w: f32, h: f32, count: usize, rng: &mut R) {
    for _ in 0..count {
        let x = rng.random_range(0.0..w);
        let y = rng.random_range(0.0..h * 0.7);
        let size = rng.random_range(0.0..2.0f32);
        if size < 0.1 {
            continue;
        }
        out.extend(shapes::circle(Vec2::new(x, y), size, colors::WHITE, 6));
    }
}

/// Snowflake `i` at `time_ms`: position, radius and alpha
///
/// Derived only from the index and the clock, so flakes loop smoothly.
pub fn snowflake(i: usize, w: f32, h: f32, time_ms: f64) -> (Vec2, f32, f32) {
    let i = i as f64;
    let (w, h) = (w as f64, h as f64);

    let x = (((i * 432.43).sin() + 1.0) * w) / 2.0;
    let speed = 0.2 + (i * 123.45).sin() * 0.1;
    let drift = (time_ms / 2000.0 + i).sin() * 2.0;
    let base_y = (time_ms * speed + i * 100.0).rem_euclid(h);
    let y = base_y + (time_ms / 1000.0 + i).sin() * 5.0;
    let size = 1.0 + ((i * 789.12).sin() + 1.0);
    let alpha = 0.5 + (time_ms / 1000.0 + i).sin() * 0.3;

    (
        Vec2::new((x + drift) as f32, y as f32),
        size as f32,
        alpha as f32,
    )
}

/// Cloud `i` at `time_ms`: top-left position, scale and opacity
///
/// Each cloud crosses the viewport left to right on its own period (30-50s)
/// and wraps around once fully off-screen.
pub fn cloud(i: usize, w: f32, h: f32, time_ms: f64) -> (Vec2, f32, f32) {
    let k = i as f64 + 1.0;
    let unit = |salt: f64| ((k * salt).sin() + 1.0) / 2.0;

    let scale = 0.5 + unit(12.9898) * 0.5;
    let period_ms = (30.0 + unit(78.233) * 20.0) * 1000.0;
    let alpha = 0.1 + unit(37.719) * 0.3;
    let top = unit(93.989) * 0.4 * h as f64;

    let span = w as f64 + 2.0 * CLOUD_WIDTH as f64;
    let progress = (time_ms / period_ms + unit(51.413)).rem_euclid(1.0);
    let x = progress * span - CLOUD_WIDTH as f64;

    (Vec2::new(x as f32, top as f32), scale as f32, alpha as f32)
}

fn push_clouds(out: &mut Vec<Vertex>, w: f32, h: f32, time_ms: f64) {
    for i in 0..CLOUD_COUNT {
        let (pos, scale, alpha) = cloud(i, w, h, time_ms);
        let width = CLOUD_WIDTH * scale;
        let color = with_alpha(colors::CLOUD, alpha);
        let base = pos + Vec2::new(width / 2.0, width * 0.3);

        out.extend(shapes::ellipse(
            base,
            Vec2::new(width / 2.0, width * 0.18),
            0.0,
            2.0 * PI,
            color,
            20,
        ));
        out.extend(shapes::circle(
            base + Vec2::new(-width * 0.15, -width * 0.1),
            width * 0.2,
            color,
            16,
        ));
        out.extend(shapes::circle(
            base + Vec2::new(width * 0.12, -width * 0.12),
            width * 0.24,
            color,
            16,
        ));
    }
}

fn push_snow(out: &mut Vec<Vertex>, w: f32, h: f32, count: usize, time_ms: f64) {
    for i in 0..count {
        let (pos, size, alpha) = snowflake(i, w, h, time_ms);
        let color = with_alpha(colors::SNOWFLAKE, colors::SNOWFLAKE[3] * alpha);
        out.extend(shapes::circle(pos, size, color, 8));
    }
}

/// Rolling snow bank along the bottom
fn push_ground(out: &mut Vec<Vertex>, w: f32, h: f32) {
    // Traced right to left, as two quadratic curves
    let mut curve = shapes::quadratic_curve(
        Vec2::new(w, h - 50.0),
        Vec2::new(w * 0.75, h - 70.0),
        Vec2::new(w * 0.5, h - 50.0),
        16,
    );
    curve.extend(
        shapes::quadratic_curve(
            Vec2::new(w * 0.5, h - 50.0),
            Vec2::new(w * 0.25, h - 30.0),
            Vec2::new(0.0, h - 60.0),
            16,
        )
        .into_iter()
        .skip(1),
    );

    let top = h - 100.0;
    out.extend(shapes::fill_below(&curve, h, |y| {
        lerp_color(colors::GROUND_TOP, colors::GROUND_BOTTOM, (y - top) / 100.0)
    }));
}

/// Santa: body, legs, face, beard, hat with trim and pom-pom
fn push_avatar(out: &mut Vec<Vertex>, avatar: &Avatar, secs: f32) {
    let (w, h) = (avatar.width, avatar.height);
    let flip = avatar.facing == Facing::Left;
    // Local (unflipped) coordinates to viewport pixels
    let at = |x: f32, y: f32| {
        let x = if flip { w - x } else { x };
        avatar.pos + Vec2::new(x, y)
    };

    let (leg, beard, bob) = if avatar.is_moving {
        (
            (secs * 10.0).sin() * 5.0,
            (secs * 8.0).sin() * 2.0,
            (secs * 10.0).sin() * 2.0,
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    out.extend(shapes::ellipse(
        at(w / 2.0, h / 2.0),
        Vec2::new(w / 2.2, h / 2.0),
        0.0,
        2.0 * PI,
        colors::SANTA_RED,
        24,
    ));

    for (x, offset) in [(w / 3.0, leg), (2.0 * w / 3.0, -leg)] {
        out.extend(shapes::ellipse(
            at(x, h - 10.0 + offset),
            Vec2::new(8.0, 12.0),
            0.0,
            2.0 * PI,
            colors::BLACK,
            12,
        ));
    }

    out.extend(shapes::circle(
        at(w / 2.0, h / 2.5),
        w / 3.5,
        colors::SANTA_FACE,
        20,
    ));

    out.extend(shapes::ellipse(
        at(w / 2.0, h / 1.8 + beard),
        Vec2::new(w / 3.0, h / 4.0),
        0.0,
        PI,
        colors::WHITE,
        16,
    ));

    let brim_y = h / 3.0 + bob;
    let hat: Vec<Vec2> = shapes::quadratic_curve(
        at(w / 4.0, brim_y),
        at(w / 2.0, bob),
        at(3.0 * w / 4.0, brim_y),
        12,
    );
    out.extend(shapes::convex_fill(&hat, colors::SANTA_RED));

    out.extend(shapes::ellipse(
        at(w / 2.0, brim_y),
        Vec2::new(w / 2.2, h / 8.0),
        0.0,
        PI,
        colors::WHITE,
        16,
    ));

    out.extend(shapes::circle(at(w / 2.0, bob), w / 6.0, colors::WHITE, 12));
}

fn push_trail(out: &mut Vec<Vertex>, projectile: &Projectile) {
    if projectile.trail.len() < 2 {
        return;
    }
    let points: Vec<Vec2> = projectile.trail.iter().map(|t| t.pos).collect();
    out.extend(shapes::polyline(&points, 2.0, colors::TRAIL));
}

/// Gift box with shadow, gradient, ribbon cross, bow, health badge and shine
fn push_gift(out: &mut Vec<Vertex>, gift: &FallingGift) {
    let origin = gift.pos;
    let size = Vec2::new(gift.width, gift.height);
    let center = gift.center();
    let base: Color = rgb(gift.color.rgb());
    const RIBBON: f32 = 6.0;

    out.extend(shapes::rect(
        origin + Vec2::splat(2.0),
        size,
        colors::GIFT_SHADOW,
    ));
    out.extend(shapes::diagonal_gradient_rect(
        origin,
        size,
        &[(0.0, base), (1.0, adjust(base, -30))],
    ));

    out.extend(shapes::rect(
        Vec2::new(center.x - RIBBON / 2.0, origin.y),
        Vec2::new(RIBBON, gift.height),
        colors::WHITE,
    ));
    out.extend(shapes::rect(
        Vec2::new(origin.x, center.y - RIBBON / 2.0),
        Vec2::new(gift.width, RIBBON),
        colors::WHITE,
    ));
    out.extend(shapes::circle(center, RIBBON * 1.5, colors::WHITE, 16));

    if gift.health > 1 {
        out.extend(shapes::circle(
            center,
            RIBBON * 1.2,
            colors::HEALTH_BADGE,
            16,
        ));
        let glyph_h = 8.0;
        out.extend(shapes::text(
            &gift.health.to_string(),
            center + Vec2::new(0.0, glyph_h / 2.0),
            glyph_h,
            colors::WHITE,
        ));
    }

    out.extend(shapes::diagonal_gradient_rect(
        origin,
        size,
        &[
            (0.0, colors::SHINE_EDGE),
            (0.5, colors::SHINE_MID),
            (1.0, colors::SHINE_END),
        ],
    ));
}

/// Radial burst that widens and fades out
fn push_explosion(out: &mut Vec<Vertex>, gift: &FallingGift) {
    let progress = gift.explosion_progress();
    let fade = 1.0 - progress;
    let radius = gift.width * (1.0 + 0.5 * progress);
    let faded = |c: Color| with_alpha(c, c[3] * fade);
    out.extend(shapes::radial_gradient(
        gift.center(),
        radius,
        &[
            (0.0, faded(colors::BURST_CORE)),
            (0.2, faded(colors::BURST_MID)),
            (1.0, faded(colors::BURST_EDGE)),
        ],
        24,
    ));
}

/// "+N" that rises and fades over its lifetime
fn push_popup(out: &mut Vec<Vertex>, popup: &ScorePopup, now_ms: f64) {
    let age = popup.age(now_ms);
    let alpha = 1.0 - age;
    if alpha <= 0.0 {
        return;
    }
    let pos = Vec2::new(popup.pos.x, popup.pos.y - age * POPUP_RISE);
    out.extend(shapes::text(
        &format!("+{}", popup.value),
        pos,
        14.0,
        with_alpha(colors::WHITE, alpha),
    ));
}

fn push_combo_badge(out: &mut Vec<Vertex>, combo: u32, w: f32) {
    let label = format!("x{combo}");
    let glyph_h = 22.0;
    let width = label.len() as f32 * glyph_h * 0.85 + glyph_h;
    let center = Vec2::new(w / 2.0, 48.0);
    out.extend(shapes::pill(
        center,
        Vec2::new(width, glyph_h * 1.7),
        colors::COMBO_BADGE,
    ));
    out.extend(shapes::text(
        &label,
        center + Vec2::new(0.0, glyph_h / 2.0),
        glyph_h,
        colors::COMBO_TEXT,
    ));
}
