//! SVG output for a gauge.
//!
//! Writes the plan as an `<svg class="gauge">` document using the same class
//! names a stylesheet would target: `gauge-marks`, `gauge-marks-text`,
//! `gauge-arc gauge-segment-<i>`, `gauge-arrow` and `gauge-label`.

use std::fmt::Write as _;
use std::io;

use crate::config::Theme;
use crate::geometry::{DrawCommand, DrawPlan, PrimitiveId, Rotation, Size};
use crate::gauge::Renderer;

const MARK_WIDTH: f64 = 2.0;
const ARC_WIDTH: f64 = 6.0;

#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    theme: Theme,
    size: Size,
    commands: Vec<DrawCommand>,
    transforms: Vec<Option<Rotation>>,
}

impl SvgRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn transform_of(&self, id: PrimitiveId) -> Option<Rotation> {
        self.transforms.get(id.0).copied().flatten()
    }

    /// The materialized scene as a standalone SVG document.
    pub fn to_document(&self) -> String {
        let (w, h) = (self.size.width, self.size.height);
        let mut svg = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="gauge" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(
            svg,
            r#"  <rect width="{w}" height="{h}" fill="{}"/>"#,
            self.theme.background.to_hex()
        );

        for (i, command) in self.commands.iter().enumerate() {
            let style = self
                .transform_of(PrimitiveId(i))
                .map(|r| {
                    format!(
                        r#" style="transform: {r}; transform-origin: {}px {}px""#,
                        r.origin.x, r.origin.y
                    )
                })
                .unwrap_or_default();

            let _ = match command {
                DrawCommand::Marks(path) => writeln!(
                    svg,
                    r#"  <path class="gauge-marks" d="{path}" stroke="{}" stroke-width="{MARK_WIDTH}" fill="none"{style}/>"#,
                    self.theme.marks.to_hex()
                ),
                DrawCommand::MarkText { at, text, .. } => writeln!(
                    svg,
                    r#"  <text class="gauge-marks-text" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" fill="{}"{style}>{}</text>"#,
                    at.x,
                    at.y,
                    self.theme.text.to_hex(),
                    escape_xml(text)
                ),
                DrawCommand::Segment(arc) => writeln!(
                    svg,
                    r#"  <path class="gauge-arc gauge-segment-{}" d="{}" stroke="{}" stroke-width="{ARC_WIDTH}" fill="none"{style}/>"#,
                    arc.index,
                    arc.path(),
                    self.theme.segment_color(arc.index).to_hex()
                ),
                DrawCommand::Pointer(pointer) => writeln!(
                    svg,
                    r#"  <path class="gauge-arrow" stroke-linecap="round" d="{}" fill="{}"{style}/>"#,
                    pointer.path(),
                    self.theme.pointer.to_hex()
                ),
                DrawCommand::Label { at, text } => writeln!(
                    svg,
                    r#"  <text class="gauge-label" x="{}" y="{}" text-anchor="middle" fill="{}"{style}>{}</text>"#,
                    at.x,
                    at.y,
                    self.theme.label.to_hex(),
                    escape_xml(text)
                ),
            };
        }
        svg.push_str("</svg>\n");
        svg
    }

    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        out.write_all(self.to_document().as_bytes())
    }
}

impl Renderer for SvgRenderer {
    fn materialize(&mut self, plan: &DrawPlan) {
        self.size = plan.size;
        self.commands = plan.commands().to_vec();
        self.transforms = vec![None; self.commands.len()];
    }

    fn transform(&mut self, target: PrimitiveId, rotation: Rotation) {
        if let Some(slot) = self.transforms.get_mut(target.0) {
            *slot = Some(rotation);
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GaugeConfig;
    use crate::gauge::Gauge;

    fn document(config: GaugeConfig, value: f64) -> String {
        let mut gauge = Gauge::new(
            &Size::new(200.0, 200.0),
            config,
            SvgRenderer::new(Theme::default()),
        )
        .unwrap();
        gauge.set_value(value);
        gauge.renderer().to_document()
    }

    #[test]
    fn document_carries_every_part() {
        let svg = document(
            GaugeConfig::builder()
                .segments(vec![50.0])
                .label("RPM")
                .build(),
            50.0,
        );
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"class="gauge""#));
        assert_eq!(svg.matches("gauge-marks-text").count(), 6);
        assert_eq!(svg.matches(r#"class="gauge-marks""#).count(), 1);
        assert!(svg.contains("gauge-segment-1"));
        assert!(svg.contains("gauge-segment-2"));
        assert!(!svg.contains("gauge-segment-3"));
        assert!(svg.contains(r#"class="gauge-label""#));
        assert!(svg.contains(">RPM</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn only_the_pointer_is_rotated() {
        let svg = document(GaugeConfig::default(), 100.0);
        assert_eq!(svg.matches("transform:").count(), 1);
        let arrow = svg
            .lines()
            .find(|l| l.contains("gauge-arrow"))
            .unwrap();
        assert!(arrow.contains("transform: rotate(135deg)"));
        assert!(arrow.contains("transform-origin: 100px 100px"));
        assert!(arrow.contains(r#"stroke-linecap="round""#));
    }

    #[test]
    fn later_values_replace_the_rotation() {
        let mut gauge = Gauge::new(
            &Size::new(200.0, 200.0),
            GaugeConfig::default(),
            SvgRenderer::default(),
        )
        .unwrap();
        gauge.set_value(0.0);
        gauge.set_value(50.0);
        let pointer = gauge.plan().pointer_id();
        let rotation = gauge.renderer().transform_of(pointer).unwrap();
        assert_eq!(rotation.degrees, 0.0);
    }

    #[test]
    fn text_is_escaped() {
        let svg = document(GaugeConfig::builder().label("<a & b>").build(), 0.0);
        assert!(svg.contains("&lt;a &amp; b&gt;"));
    }
}
