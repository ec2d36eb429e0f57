use std::fmt;
use std::sync::Arc;

use bon::Builder;
use serde::Deserialize;

use crate::error::{FormatError, GaugeError, Result};
use crate::geometry::Direction;

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// `#rrggbb` form used in SVG attributes.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colors used by the bundled renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub marks: Color,
    pub text: Color,
    pub pointer: Color,
    pub label: Color,
    /// Segment colors, picked by 1-based segment index and cycled.
    pub segments: Vec<Color>,
}

impl Theme {
    /// Color for the segment with the given 1-based index.
    pub fn segment_color(&self, index: usize) -> Color {
        if self.segments.is_empty() {
            return self.marks;
        }
        self.segments[(index.max(1) - 1) % self.segments.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::new(0xff, 0xff, 0xff),
            marks: Color::new(0x33, 0x33, 0x33),
            text: Color::new(0x33, 0x33, 0x33),
            pointer: Color::new(0x00, 0x00, 0x00),
            label: Color::new(0x55, 0x55, 0x55),
            segments: vec![
                Color::new(0x4c, 0xaf, 0x50),
                Color::new(0xff, 0xc1, 0x07),
                Color::new(0xf4, 0x43, 0x36),
                Color::new(0x21, 0x96, 0xf3),
            ],
        }
    }
}

/// Formats a tick value into its label text.
#[derive(Clone)]
pub struct MarkFormat(Arc<dyn Fn(f64) -> std::result::Result<String, FormatError> + Send + Sync>);

impl MarkFormat {
    pub fn new(format: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |value| Ok(format(value))))
    }

    /// A formatter that may fail; the failure aborts gauge construction.
    pub fn fallible(
        format: impl Fn(f64) -> std::result::Result<String, FormatError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(format))
    }

    pub fn format(&self, value: f64) -> Result<String> {
        (self.0)(value).map_err(|source| GaugeError::FormatterFailure { value, source })
    }
}

impl fmt::Debug for MarkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MarkFormat(..)")
    }
}

/// Radii of the gauge parts, as fractions of half the container's smaller side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusProfile {
    pub arc: f64,
    pub inner: f64,
    pub outer: f64,
    pub text: f64,
}

impl RadiusProfile {
    /// Arc hugs the container edge, ticks sit just inside it.
    pub const INSET: Self = Self {
        arc: 0.97,
        inner: 0.93,
        outer: 0.95,
        text: 0.85,
    };

    /// Arc inside the container, ticks outside the arc.
    pub const STANDARD: Self = Self {
        arc: 0.75,
        inner: 0.78,
        outer: 0.8,
        text: 0.85,
    };

    pub const fn for_inset(inset: bool) -> Self {
        if inset {
            Self::INSET
        } else {
            Self::STANDARD
        }
    }
}

#[derive(Debug, Clone, Builder)]
pub struct GaugeConfig {
    #[builder(default = 0.0)]
    pub from: f64,
    #[builder(default = 100.0)]
    pub to: f64,
    /// Sweep of the gauge face in degrees.
    #[builder(default = 270.0)]
    pub angle: f64,
    /// Distance between scale marks; the sign is taken from the range.
    #[builder(default = 20.0)]
    pub step: f64,
    #[builder(default)]
    pub segments: Vec<f64>,
    #[builder(default = false)]
    pub inset: bool,
    pub mark_format: Option<MarkFormat>,
    #[builder(into)]
    pub label: Option<String>,
    pub value: Option<f64>,
    #[builder(default)]
    pub theme: Theme,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeConfig {
    pub fn delta(&self) -> f64 {
        self.to - self.from
    }

    pub fn radii(&self) -> RadiusProfile {
        RadiusProfile::for_inset(self.inset)
    }

    /// Value the pointer starts at; a missing or non-finite value means `from`.
    pub fn initial_value(&self) -> f64 {
        self.value.filter(|v| v.is_finite()).unwrap_or(self.from)
    }

    /// Checks the configuration and returns the scale direction.
    pub fn validate(&self) -> Result<Direction> {
        if !self.from.is_finite() || !self.to.is_finite() {
            return Err(GaugeError::InvalidConfiguration(format!(
                "range bounds must be finite (from={}, to={})",
                self.from, self.to
            )));
        }
        let direction = Direction::of(self.delta()).ok_or_else(|| {
            GaugeError::InvalidConfiguration("\"from\" and \"to\" values cannot be equal".into())
        })?;
        if !self.angle.is_finite() || self.angle <= 0.0 || self.angle > 360.0 {
            return Err(GaugeError::InvalidConfiguration(format!(
                "angle must be within (0, 360], got {}",
                self.angle
            )));
        }
        if !self.step.is_finite() || self.step == 0.0 {
            return Err(GaugeError::InvalidConfiguration(format!(
                "step must be finite and non-zero, got {}",
                self.step
            )));
        }
        if let Some(bad) = self.segments.iter().find(|s| !s.is_finite()) {
            return Err(GaugeError::InvalidConfiguration(format!(
                "segment boundary must be finite, got {bad}"
            )));
        }
        Ok(direction)
    }
}

/// Flat key-value options overlaid onto [`GaugeConfig`] defaults.
///
/// Unknown keys are ignored and missing keys keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaugeOptions {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub angle: Option<f64>,
    pub step: Option<f64>,
    pub segments: Option<Vec<f64>>,
    pub inset: Option<bool>,
    pub label: Option<String>,
    pub value: Option<f64>,
}

impl GaugeOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlays the present options onto `base`.
    pub fn overlay(self, mut base: GaugeConfig) -> GaugeConfig {
        if let Some(from) = self.from {
            base.from = from;
        }
        if let Some(to) = self.to {
            base.to = to;
        }
        if let Some(angle) = self.angle {
            base.angle = angle;
        }
        if let Some(step) = self.step {
            base.step = step;
        }
        if let Some(segments) = self.segments {
            base.segments = segments;
        }
        if let Some(inset) = self.inset {
            base.inset = inset;
        }
        if self.label.is_some() {
            base.label = self.label;
        }
        if self.value.is_some() {
            base.value = self.value;
        }
        base
    }

    pub fn into_config(self) -> GaugeConfig {
        self.overlay(GaugeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GaugeConfig::default();
        assert_eq!(config.from, 0.0);
        assert_eq!(config.to, 100.0);
        assert_eq!(config.angle, 270.0);
        assert_eq!(config.step, 20.0);
        assert!(config.segments.is_empty());
        assert!(!config.inset);
        assert!(config.label.is_none());
        assert_eq!(config.initial_value(), 0.0);
    }

    #[test]
    fn equal_bounds_are_rejected() {
        let config = GaugeConfig::builder().from(50.0).to(50.0).build();
        assert!(matches!(
            config.validate(),
            Err(GaugeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_step_and_bad_angle_are_rejected() {
        let zero_step = GaugeConfig::builder().step(0.0).build();
        assert!(zero_step.validate().is_err());

        let no_sweep = GaugeConfig::builder().angle(0.0).build();
        assert!(no_sweep.validate().is_err());

        let over_full_turn = GaugeConfig::builder().angle(400.0).build();
        assert!(over_full_turn.validate().is_err());
    }

    #[test]
    fn direction_follows_range_sign() {
        let ascending = GaugeConfig::default();
        assert_eq!(ascending.validate().ok(), Some(Direction::Ascending));

        let descending = GaugeConfig::builder().from(100.0).to(0.0).build();
        assert_eq!(descending.validate().ok(), Some(Direction::Descending));
    }

    #[test]
    fn non_finite_initial_value_falls_back_to_from() {
        let config = GaugeConfig::builder().from(10.0).value(f64::NAN).build();
        assert_eq!(config.initial_value(), 10.0);

        let config = GaugeConfig::builder().from(10.0).value(f64::INFINITY).build();
        assert_eq!(config.initial_value(), 10.0);

        let config = GaugeConfig::builder().from(10.0).value(42.0).build();
        assert_eq!(config.initial_value(), 42.0);
    }

    #[test]
    fn options_overlay_ignores_unknown_keys() {
        let options =
            GaugeOptions::from_json(r#"{"to": 200, "segments": [50, 150], "color": "red"}"#)
                .unwrap();
        let config = options.into_config();
        assert_eq!(config.from, 0.0);
        assert_eq!(config.to, 200.0);
        assert_eq!(config.segments, vec![50.0, 150.0]);
        assert_eq!(config.angle, 270.0);
    }

    #[test]
    fn malformed_options_are_reported() {
        let err = GaugeOptions::from_json(r#"{"to": "lots"}"#).unwrap_err();
        assert!(matches!(err, GaugeError::Options(_)));
    }

    #[test]
    fn mark_format_failure_carries_value() {
        let format = MarkFormat::fallible(|v| {
            if v > 50.0 {
                Err("too big".into())
            } else {
                Ok(format!("{v}"))
            }
        });
        assert_eq!(format.format(20.0).unwrap(), "20");
        match format.format(60.0) {
            Err(GaugeError::FormatterFailure { value, .. }) => assert_eq!(value, 60.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn segment_colors_cycle_from_one() {
        let theme = Theme::default();
        assert_eq!(theme.segment_color(1), theme.segments[0]);
        assert_eq!(
            theme.segment_color(theme.segments.len() + 1),
            theme.segments[0]
        );
    }

    #[test]
    fn hex_form() {
        assert_eq!(Color::new(0xff, 0x08, 0x00).to_hex(), "#ff0800");
    }
}
