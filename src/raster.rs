//! Anti-aliased rasterization of a draw plan into an RGBA frame.

use std::f64::consts::TAU;

use rusttype::{point, Font, PositionedGlyph, Scale};
use tracing::warn;

use crate::config::{Color, Theme};
use crate::error::{GaugeError, Result};
use crate::gauge::Renderer;
use crate::geometry::{DrawCommand, DrawPlan, PathCommand, Point, PrimitiveId, Rotation, SegmentArc};

const MARK_THICKNESS: f64 = 2.0;
const ARC_THICKNESS: f64 = 6.0;
/// Font sizes as fractions of the plan's smaller side.
const MARK_FONT: f32 = 0.06;
const LABEL_FONT: f32 = 0.09;

/// Borrowed RGBA8 frame.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    /// Blends `color` over the pixel at `(x, y)` with coverage `alpha`.
    fn blend(&mut self, x: i64, y: i64, color: Color, alpha: f64) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let Some(px) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let mix = |src: u8, dst: u8| (src as f64 * a + dst as f64 * (1.0 - a)).round() as u8;
        px[0] = mix(color.r, px[0]);
        px[1] = mix(color.g, px[1]);
        px[2] = mix(color.b, px[2]);
        px[3] = 0xff;
    }

    fn line(&mut self, from: Point, to: Point, thickness: f64, color: Color) {
        let pad = thickness.ceil() + 1.0;
        let (min_x, max_x) = (from.x.min(to.x) - pad, from.x.max(to.x) + pad);
        let (min_y, max_y) = (from.y.min(to.y) - pad, from.y.max(to.y) + pad);
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len_sq = (dx * dx + dy * dy).max(f64::EPSILON);
        for y in min_y.floor() as i64..=max_y.ceil() as i64 {
            for x in min_x.floor() as i64..=max_x.ceil() as i64 {
                let (px, py) = (x as f64 - from.x, y as f64 - from.y);
                let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
                let dist = ((px - t * dx).powi(2) + (py - t * dy).powi(2)).sqrt();
                let aa = 1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0);
                if aa > 0.01 {
                    self.blend(x, y, color, aa);
                }
            }
        }
    }

    /// Band of `thickness` centered on the arc's radius.
    fn arc(&mut self, arc: &SegmentArc, scale: f64, thickness: f64, color: Color) {
        let center = Point::new(arc.center.x * scale, arc.center.y * scale);
        let radius = arc.radius * scale;
        let outer = radius + thickness / 2.0 + 1.0;
        for y in (center.y - outer).floor() as i64..=(center.y + outer).ceil() as i64 {
            for x in (center.x - outer).floor() as i64..=(center.x + outer).ceil() as i64 {
                let (dx, dy) = (x as f64 - center.x, y as f64 - center.y);
                let dist = (dx * dx + dy * dy).sqrt();
                let radial = 1.0 - ((dist - radius).abs() - thickness / 2.0).clamp(0.0, 1.0);
                if radial <= 0.01 {
                    continue;
                }
                let angle = (-dx).atan2(dy).rem_euclid(TAU);
                let inside = |a: f64| a >= arc.start_angle && a <= arc.end_angle;
                if inside(angle) || inside(angle + TAU) {
                    self.blend(x, y, color, radial);
                }
            }
        }
    }

    fn triangle(&mut self, [a, b, c]: [Point; 3], color: Color) {
        let min_x = a.x.min(b.x).min(c.x).floor() as i64 - 1;
        let max_x = a.x.max(b.x).max(c.x).ceil() as i64 + 1;
        let min_y = a.y.min(b.y).min(c.y).floor() as i64 - 1;
        let max_y = a.y.max(b.y).max(c.y).ceil() as i64 + 1;
        let winding = ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).signum();
        let edge = |p: Point, q: Point, x: f64, y: f64| {
            let len = ((q.x - p.x).powi(2) + (q.y - p.y).powi(2)).sqrt().max(f64::EPSILON);
            winding * ((q.x - p.x) * (y - p.y) - (q.y - p.y) * (x - p.x)) / len
        };
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (fx, fy) = (x as f64, y as f64);
                let d = edge(a, b, fx, fy)
                    .min(edge(b, c, fx, fy))
                    .min(edge(c, a, fx, fy));
                let aa = (d + 0.5).clamp(0.0, 1.0);
                if aa > 0.01 {
                    self.blend(x, y, color, aa);
                }
            }
        }
    }

    /// Draws `text` centered on `at`.
    fn text(&mut self, at: Point, text: &str, font: &Font<'_>, scale: Scale, color: Color) {
        let v_metrics = font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> =
            font.layout(text, scale, point(0.0, v_metrics.ascent)).collect();
        let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
            (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
            |(min_x, max_x, min_y, max_y), bb| {
                (
                    min_x.min(bb.min.x),
                    max_x.max(bb.max.x),
                    min_y.min(bb.min.y),
                    max_y.max(bb.max.y),
                )
            },
        );
        if min_x >= max_x || min_y >= max_y {
            return;
        }
        let offset_x = at.x.round() as i64 - i64::from(max_x - min_x) / 2;
        let offset_y = at.y.round() as i64 - i64::from(max_y - min_y) / 2;
        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let px = offset_x + i64::from(gx as i32 + bb.min.x - min_x);
                    let py = offset_y + i64::from(gy as i32 + bb.min.y - min_y);
                    self.blend(px, py, color, f64::from(v));
                });
            }
        }
    }
}

/// Keeps the materialized plan and rasterizes it on demand.
pub struct PixelRenderer {
    theme: Theme,
    font: Option<Font<'static>>,
    plan: Option<DrawPlan>,
    rotations: Vec<Option<Rotation>>,
}

impl PixelRenderer {
    /// Without a font, mark labels and the caption are not drawn.
    pub fn new(theme: Theme, font: Option<Font<'static>>) -> Self {
        if font.is_none() {
            warn!("no font supplied, gauge text will not be rasterized");
        }
        Self {
            theme,
            font,
            plan: None,
            rotations: Vec::new(),
        }
    }

    pub fn load_font(data: Vec<u8>) -> Result<Font<'static>> {
        Font::try_from_vec(data).ok_or_else(|| GaugeError::Font("unsupported font data".into()))
    }

    /// Rasterizes the plan, scaled uniformly to fit the canvas.
    pub fn render(&self, canvas: &mut Canvas) {
        canvas.clear(self.theme.background);
        let Some(plan) = &self.plan else {
            return;
        };
        let scale = (canvas.width as f64 / plan.size.width)
            .min(canvas.height as f64 / plan.size.height);
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let at = |p: Point| Point::new(p.x * scale, p.y * scale);
        let min_side = (plan.size.width.min(plan.size.height) * scale) as f32;

        for (i, command) in plan.commands().iter().enumerate() {
            let rotation = self.rotations.get(i).copied().flatten();
            let place = |p: Point| at(rotation.map_or(p, |r| r.apply(p)));
            match command {
                DrawCommand::Marks(path) => {
                    let mut pen = None;
                    for command in path.commands() {
                        match *command {
                            PathCommand::MoveTo(p) => pen = Some(p),
                            PathCommand::LineTo(p) => {
                                if let Some(start) = pen {
                                    canvas.line(place(start), place(p), MARK_THICKNESS, self.theme.marks);
                                }
                                pen = Some(p);
                            }
                            PathCommand::ArcTo { .. } | PathCommand::Close => {}
                        }
                    }
                }
                DrawCommand::Segment(arc) => {
                    canvas.arc(arc, scale, ARC_THICKNESS, self.theme.segment_color(arc.index));
                }
                DrawCommand::Pointer(pointer) => {
                    canvas.triangle(pointer.vertices().map(place), self.theme.pointer);
                }
                DrawCommand::MarkText { at: pos, text, .. } => {
                    if let Some(font) = &self.font {
                        let size = Scale::uniform(min_side * MARK_FONT);
                        canvas.text(place(*pos), text, font, size, self.theme.text);
                    }
                }
                DrawCommand::Label { at: pos, text } => {
                    if let Some(font) = &self.font {
                        let size = Scale::uniform(min_side * LABEL_FONT);
                        canvas.text(place(*pos), text, font, size, self.theme.label);
                    }
                }
            }
        }
    }
}

impl Renderer for PixelRenderer {
    fn materialize(&mut self, plan: &DrawPlan) {
        self.rotations = vec![None; plan.commands().len()];
        self.plan = Some(plan.clone());
    }

    fn transform(&mut self, target: PrimitiveId, rotation: Rotation) {
        if let Some(slot) = self.rotations.get_mut(target.0) {
            *slot = Some(rotation);
        }
    }
}
