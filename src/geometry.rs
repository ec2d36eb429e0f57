//! Gauge geometry.
//!
//! Turns a [`GaugeConfig`] and a container [`Size`] into a [`DrawPlan`]: the
//! tick path, mark labels, segment arcs, pointer glyph and caption, all in
//! container coordinates. Angles are measured from straight down and grow
//! clockwise on screen, so a face point at angle `a` is
//! `center + r * (-sin a, cos a)`.

use std::fmt;

use tracing::debug;

use crate::config::{GaugeConfig, RadiusProfile};
use crate::error::{GaugeError, Result};

/// Upper bound on generated ticks. Bounds memory for vanishingly small steps.
pub const MAX_TICKS: usize = 1_000_000;

/// Pointer length as a fraction of the container's smaller side.
const POINTER_LENGTH: f64 = 0.3;
/// Half the pointer base as a fraction of the container width.
const POINTER_HALF_BASE: f64 = 0.02;
/// Slack applied when deciding whether the last tick still fits the sweep.
const TICK_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Container dimensions in device-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn min_side(self) -> f64 {
        self.width.min(self.height)
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Whether the scale values grow or shrink along the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// Direction of a range with the given `to - from`; `None` for an empty range.
    pub fn of(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Ascending)
        } else if delta < 0.0 {
            Some(Self::Descending)
        } else {
            None
        }
    }

    pub fn signum(self) -> f64 {
        match self {
            Self::Ascending => 1.0,
            Self::Descending => -1.0,
        }
    }
}

/// A command in a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Circular arc to `to`.
    ArcTo {
        radius: f64,
        x_rotation: f64,
        large_arc: bool,
        /// Clockwise if true
        sweep: bool,
        to: Point,
    },
    Close,
}

/// Path data, displayed in SVG syntax.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, to: Point) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(to));
        self
    }

    pub fn line_to(&mut self, to: Point) -> &mut Self {
        self.commands.push(PathCommand::LineTo(to));
        self
    }

    pub fn arc_to(&mut self, radius: f64, large_arc: bool, sweep: bool, to: Point) -> &mut Self {
        self.commands.push(PathCommand::ArcTo {
            radius,
            x_rotation: 0.0,
            large_arc,
            sweep,
            to,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match command {
                PathCommand::MoveTo(p) => write!(f, "M{},{}", p.x, p.y)?,
                PathCommand::LineTo(p) => write!(f, "L{},{}", p.x, p.y)?,
                PathCommand::ArcTo {
                    radius,
                    x_rotation,
                    large_arc,
                    sweep,
                    to,
                } => write!(
                    f,
                    "A{radius},{radius} {x_rotation} {},{} {},{}",
                    u8::from(*large_arc),
                    u8::from(*sweep),
                    to.x,
                    to.y
                )?,
                PathCommand::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}

/// One colored band of the gauge face.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentArc {
    /// 1-based position of the band along the sweep.
    pub index: usize,
    pub from_value: f64,
    pub to_value: f64,
    pub center: Point,
    pub radius: f64,
    /// Radians, measured like every face angle.
    pub start_angle: f64,
    pub end_angle: f64,
    pub start: Point,
    pub end: Point,
    pub large_arc: bool,
}

impl SegmentArc {
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// `M sx,sy A r,r 0 large,1 ex,ey`
    pub fn path(&self) -> Path {
        let mut path = Path::new();
        path.move_to(self.start)
            .arc_to(self.radius, self.large_arc, true, self.end);
        path
    }
}

/// The pointer triangle in its unrotated, straight-up pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub pivot: Point,
    pub tip: Point,
    pub base_right: Point,
    pub base_left: Point,
}

impl Pointer {
    pub fn path(&self) -> Path {
        let mut path = Path::new();
        path.move_to(self.tip)
            .line_to(self.base_right)
            .line_to(self.base_left)
            .close();
        path
    }

    pub fn vertices(&self) -> [Point; 3] {
        [self.tip, self.base_right, self.base_left]
    }
}

/// Rotation in degrees around `origin`, clockwise on screen for positive values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub degrees: f64,
    pub origin: Point,
}

impl Rotation {
    pub fn apply(&self, p: Point) -> Point {
        let (sin, cos) = self.degrees.to_radians().sin_cos();
        let (dx, dy) = (p.x - self.origin.x, p.y - self.origin.y);
        Point::new(
            self.origin.x + dx * cos - dy * sin,
            self.origin.y + dx * sin + dy * cos,
        )
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rotate({}deg)", self.degrees)
    }
}

/// Handle to a primitive inside a [`DrawPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// All tick strokes as one path.
    Marks(Path),
    MarkText {
        value: f64,
        at: Point,
        text: String,
    },
    Segment(SegmentArc),
    Pointer(Pointer),
    Label {
        at: Point,
        text: String,
    },
}

/// Ordered drawing primitives for one gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPlan {
    pub size: Size,
    pub center: Point,
    commands: Vec<DrawCommand>,
    pointer: PrimitiveId,
}

impl DrawPlan {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn pointer_id(&self) -> PrimitiveId {
        self.pointer
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&DrawCommand> {
        self.commands.get(id.0)
    }

    pub fn pointer(&self) -> Option<&Pointer> {
        match self.get(self.pointer) {
            Some(DrawCommand::Pointer(pointer)) => Some(pointer),
            _ => None,
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &SegmentArc> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Segment(arc) => Some(arc),
            _ => None,
        })
    }

    /// `(value, text)` of every mark label in sweep order.
    pub fn mark_labels(&self) -> impl Iterator<Item = (f64, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::MarkText { value, text, .. } => Some((*value, text.as_str())),
            _ => None,
        })
    }

    pub fn marks_path(&self) -> Option<&Path> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::Marks(path) => Some(path),
            _ => None,
        })
    }
}

/// Orders the segment boundaries along `direction` and closes them with
/// `from` and `to`, so consecutive pairs tile the whole range.
pub fn normalize_segments(from: f64, to: f64, segments: &[f64], direction: Direction) -> Vec<f64> {
    let mut bounds = Vec::with_capacity(segments.len() + 2);
    bounds.extend_from_slice(segments);
    match direction {
        Direction::Ascending => bounds.sort_by(f64::total_cmp),
        Direction::Descending => bounds.sort_by(|a, b| b.total_cmp(a)),
    }
    if bounds.first() != Some(&from) {
        bounds.insert(0, from);
    }
    if bounds.last() != Some(&to) {
        bounds.push(to);
    }
    bounds
}

/// Clamps `value` into the closed interval spanned by `from` and `to`.
pub fn clamp_to_range(from: f64, to: f64, value: f64) -> f64 {
    value.clamp(from.min(to), from.max(to))
}

/// Pointer rotation in degrees for an already clamped `value`; zero at the
/// middle of the range, `-angle/2` at `from` and `+angle/2` at `to`.
pub fn pointer_rotation(from: f64, to: f64, angle: f64, value: f64) -> f64 {
    let fraction = ((value - from) / (to - from)).abs();
    (fraction - 0.5) * angle
}

fn face_point(center: Point, radius: f64, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    Point::new(center.x - radius * sin, center.y + radius * cos)
}

/// Builds the [`DrawPlan`] for one configuration and container size.
#[derive(Debug)]
pub struct GeometryBuilder<'a> {
    config: &'a GaugeConfig,
    direction: Direction,
    size: Size,
    center: Point,
    half_min: f64,
    radii: RadiusProfile,
    start_angle: f64,
    end_angle: f64,
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(config: &'a GaugeConfig, size: Size) -> Result<Self> {
        let direction = config.validate()?;
        let start_angle = ((360.0 - config.angle) / 2.0).to_radians();
        Ok(Self {
            config,
            direction,
            size,
            center: size.center(),
            half_min: size.min_side() / 2.0,
            radii: config.radii(),
            start_angle,
            end_angle: start_angle + config.angle.to_radians(),
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Radius of the segment arcs.
    pub fn face_radius(&self) -> f64 {
        self.half_min * self.radii.arc
    }

    pub fn build(&self) -> Result<DrawPlan> {
        let mut commands = Vec::new();

        let (marks, labels) = self.ticks()?;
        commands.push(DrawCommand::Marks(marks));
        commands.extend(labels);
        commands.extend(self.segment_arcs().into_iter().map(DrawCommand::Segment));

        let pointer = PrimitiveId(commands.len());
        commands.push(DrawCommand::Pointer(self.pointer()));

        if let Some(text) = &self.config.label {
            commands.push(DrawCommand::Label {
                at: self.label_position(),
                text: text.clone(),
            });
        }

        debug!(
            width = self.size.width,
            height = self.size.height,
            primitives = commands.len(),
            "built gauge draw plan"
        );

        Ok(DrawPlan {
            size: self.size,
            center: self.center,
            commands,
            pointer,
        })
    }

    fn tick_count(&self) -> Result<usize> {
        let config = self.config;
        let step_angle = (config.step.abs() / config.delta().abs() * config.angle).to_radians();
        let span = (self.end_angle - self.start_angle) / step_angle;
        let count = (span + TICK_EPSILON * span.max(1.0)).floor() + 1.0;
        if !count.is_finite() || count > MAX_TICKS as f64 {
            return Err(GaugeError::InvalidConfiguration(format!(
                "step {} yields more than {MAX_TICKS} marks",
                config.step
            )));
        }
        Ok(count as usize)
    }

    /// Combined tick path plus one text command per tick.
    pub fn ticks(&self) -> Result<(Path, Vec<DrawCommand>)> {
        let config = self.config;
        let count = self.tick_count()?;
        let step_angle = (config.step.abs() / config.delta().abs() * config.angle).to_radians();
        let step = config.step.abs() * self.direction.signum();

        let mut path = Path::new();
        let mut labels = Vec::with_capacity(count);
        for k in 0..count {
            let angle = self.start_angle + k as f64 * step_angle;
            let value = config.from + k as f64 * step;

            path.move_to(face_point(self.center, self.half_min * self.radii.inner, angle))
                .line_to(face_point(self.center, self.half_min * self.radii.outer, angle));

            let text = match &config.mark_format {
                Some(format) => format.format(value)?,
                None => value.to_string(),
            };
            labels.push(DrawCommand::MarkText {
                value,
                at: face_point(self.center, self.half_min * self.radii.text, angle),
                text,
            });
        }
        Ok((path, labels))
    }

    pub fn segment_arcs(&self) -> Vec<SegmentArc> {
        let config = self.config;
        let bounds = normalize_segments(config.from, config.to, &config.segments, self.direction);
        let radius = self.face_radius();
        let range = config.delta().abs();

        let mut angle = self.start_angle;
        let mut start = face_point(self.center, radius, angle);
        bounds
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let sweep = ((pair[1] - pair[0]).abs() * config.angle / range).to_radians();
                let end_angle = angle + sweep;
                let end = face_point(self.center, radius, end_angle);
                let arc = SegmentArc {
                    index: i + 1,
                    from_value: pair[0],
                    to_value: pair[1],
                    center: self.center,
                    radius,
                    start_angle: angle,
                    end_angle,
                    start,
                    end,
                    large_arc: sweep > std::f64::consts::PI,
                };
                angle = end_angle;
                start = end;
                arc
            })
            .collect()
    }

    pub fn pointer(&self) -> Pointer {
        let length = self.size.min_side() * POINTER_LENGTH;
        let half_base = self.size.width * POINTER_HALF_BASE;
        let c = self.center;
        Pointer {
            pivot: c,
            tip: Point::new(c.x, c.y - length),
            base_right: Point::new(c.x + half_base, c.y),
            base_left: Point::new(c.x - half_base, c.y),
        }
    }

    pub fn label_position(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 1.5)
    }
}
