//! Host binding: picks an output at startup and keeps one gauge per container.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ffi::OsString;
use std::hash::Hash;

use tracing::{debug, info};

use crate::config::GaugeConfig;
use crate::error::Result;
use crate::gauge::{Gauge, Renderer, SizeProvider};

/// Where gauges are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Desktop window driven by winit.
    Window,
    /// Standalone SVG document.
    Svg,
}

impl Binding {
    /// Chooses the binding for this process from the environment.
    pub fn detect(prefer_svg: bool) -> Self {
        Self::detect_with(prefer_svg, |key| std::env::var_os(key))
    }

    pub fn detect_with(prefer_svg: bool, env: impl Fn(&str) -> Option<OsString>) -> Self {
        let binding = if prefer_svg || !display_available(env) {
            Self::Svg
        } else {
            Self::Window
        };
        info!(?binding, "gauge binding selected");
        binding
    }
}

fn display_available(env: impl Fn(&str) -> Option<OsString>) -> bool {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        return true;
    }
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .into_iter()
        .any(|key| env(key).is_some_and(|v| !v.is_empty()))
}

/// Argument of an attach call: options for a new gauge, or a value.
#[derive(Debug, Clone)]
pub enum Attach {
    Options(GaugeConfig),
    Value(f64),
}

/// One gauge per container key.
///
/// Attaching to a container that already has a gauge reuses it; options are
/// then ignored and values go to [`Gauge::set_value`].
pub struct GaugeRegistry<K, R: Renderer> {
    gauges: HashMap<K, Gauge<R>>,
}

impl<K, R: Renderer> Default for GaugeRegistry<K, R> {
    fn default() -> Self {
        Self {
            gauges: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, R: Renderer> GaugeRegistry<K, R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(
        &mut self,
        key: K,
        container: &impl SizeProvider,
        arg: Attach,
        renderer: impl FnOnce() -> R,
    ) -> Result<&mut Gauge<R>> {
        let gauge = match self.gauges.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let config = match &arg {
                    Attach::Options(config) => config.clone(),
                    Attach::Value(_) => GaugeConfig::default(),
                };
                debug!("mounting gauge on new container");
                entry.insert(Gauge::new(container, config, renderer())?)
            }
        };
        if let Attach::Value(value) = arg {
            gauge.set_value(value);
        }
        Ok(gauge)
    }

    pub fn get(&self, key: &K) -> Option<&Gauge<R>> {
        self.gauges.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut Gauge<R>> {
        self.gauges.get_mut(key)
    }

    /// Drops the container's gauge, handing it back.
    pub fn detach(&mut self, key: &K) -> Option<Gauge<R>> {
        self.gauges.remove(key)
    }

    pub fn len(&self) -> usize {
        self.gauges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::svg::SvgRenderer;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<OsString> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| OsString::from(v))
        }
    }

    #[test]
    fn svg_is_chosen_when_requested() {
        assert_eq!(Binding::detect_with(true, env_of(&[("DISPLAY", ":0")])), Binding::Svg);
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn display_variables_select_window() {
        assert_eq!(Binding::detect_with(false, env_of(&[("DISPLAY", ":0")])), Binding::Window);
        assert_eq!(
            Binding::detect_with(false, env_of(&[("WAYLAND_DISPLAY", "wayland-0")])),
            Binding::Window
        );
        assert_eq!(Binding::detect_with(false, env_of(&[])), Binding::Svg);
        assert_eq!(Binding::detect_with(false, env_of(&[("DISPLAY", "")])), Binding::Svg);
    }

    #[test]
    fn repeated_attach_reuses_gauge() {
        let mut registry: GaugeRegistry<&str, SvgRenderer> = GaugeRegistry::new();
        let container = Size::new(200.0, 200.0);
        let config = GaugeConfig::builder().from(0.0).to(10.0).build();

        registry
            .attach("speed", &container, Attach::Options(config), SvgRenderer::default)
            .unwrap();
        let gauge = registry
            .attach(
                "speed",
                &container,
                Attach::Options(GaugeConfig::default()),
                SvgRenderer::default,
            )
            .unwrap();
        assert_eq!(gauge.config().to, 10.0);

        let gauge = registry
            .attach("speed", &container, Attach::Value(7.5), SvgRenderer::default)
            .unwrap();
        assert_eq!(gauge.value(), 7.5);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn value_on_new_container_uses_defaults() {
        let mut registry: GaugeRegistry<u32, SvgRenderer> = GaugeRegistry::new();
        let gauge = registry
            .attach(1, &Size::new(100.0, 100.0), Attach::Value(250.0), SvgRenderer::default)
            .unwrap();
        assert_eq!(gauge.config().to, 100.0);
        assert_eq!(gauge.value(), 100.0);
    }

    #[test]
    fn failed_attach_registers_nothing() {
        let mut registry: GaugeRegistry<u32, SvgRenderer> = GaugeRegistry::new();
        let bad = GaugeConfig::builder().from(5.0).to(5.0).build();
        assert!(registry
            .attach(1, &Size::new(100.0, 100.0), Attach::Options(bad), SvgRenderer::default)
            .is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn detach_releases_the_gauge() {
        let mut registry: GaugeRegistry<u32, SvgRenderer> = GaugeRegistry::new();
        registry
            .attach(
                3,
                &Size::new(100.0, 100.0),
                Attach::Options(GaugeConfig::default()),
                SvgRenderer::default,
            )
            .unwrap();
        assert!(registry.detach(&3).is_some());
        assert!(registry.get(&3).is_none());
    }
}
