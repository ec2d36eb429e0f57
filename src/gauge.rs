use tracing::{trace, warn};

use crate::config::GaugeConfig;
use crate::error::Result;
use crate::geometry::{
    clamp_to_range, pointer_rotation, DrawPlan, GeometryBuilder, PrimitiveId, Rotation, Size,
};

/// Measures the container a gauge is mounted in.
pub trait SizeProvider {
    fn size(&self) -> Size;
}

impl SizeProvider for Size {
    fn size(&self) -> Size {
        *self
    }
}

/// Materializes a [`DrawPlan`] and applies later pointer transforms to it.
pub trait Renderer {
    /// Receives the full plan once, in drawing order.
    fn materialize(&mut self, plan: &DrawPlan);

    /// Rotates a previously materialized primitive.
    fn transform(&mut self, target: PrimitiveId, rotation: Rotation);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn materialize(&mut self, plan: &DrawPlan) {
        (**self).materialize(plan);
    }

    fn transform(&mut self, target: PrimitiveId, rotation: Rotation) {
        (**self).transform(target, rotation);
    }
}

/// A gauge mounted in one container.
///
/// The geometry is built once; afterwards only [`Gauge::set_value`] changes
/// anything, and it only rotates the pointer.
#[derive(Debug)]
pub struct Gauge<R: Renderer> {
    config: GaugeConfig,
    size: Size,
    plan: DrawPlan,
    renderer: R,
    value: f64,
    rotation: Rotation,
}

impl<R: Renderer> Gauge<R> {
    /// Measures `container`, builds the plan, hands it to `renderer` and moves
    /// the pointer to the configured initial value.
    pub fn new(container: &impl SizeProvider, config: GaugeConfig, mut renderer: R) -> Result<Self> {
        let size = container.size();
        let plan = GeometryBuilder::new(&config, size)?.build()?;
        renderer.materialize(&plan);

        let initial = config.initial_value();
        let rotation = Rotation {
            degrees: 0.0,
            origin: plan.center,
        };
        let mut gauge = Self {
            value: config.from,
            config,
            size,
            plan,
            renderer,
            rotation,
        };
        gauge.set_value(initial);
        Ok(gauge)
    }

    /// Moves the pointer to `value`, clamped into the gauge range, and returns
    /// the value actually applied. NaN is ignored.
    pub fn set_value(&mut self, value: f64) -> f64 {
        if value.is_nan() {
            warn!("ignoring NaN gauge value");
            return self.value;
        }
        let (from, to) = (self.config.from, self.config.to);
        let value = clamp_to_range(from, to, value);
        self.rotation = Rotation {
            degrees: pointer_rotation(from, to, self.config.angle, value),
            origin: self.plan.center,
        };
        self.renderer.transform(self.plan.pointer_id(), self.rotation);
        self.value = value;
        trace!(value, degrees = self.rotation.degrees, "pointer moved");
        value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn plan(&self) -> &DrawPlan {
        &self.plan
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
