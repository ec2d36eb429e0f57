//! Desktop window hosting a single gauge.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use tracing::{debug, error, info};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::GaugeConfig;
use crate::error::{GaugeError, Result};
use crate::gauge::Gauge;
use crate::geometry::Size;
use crate::raster::{Canvas, PixelRenderer};

/// Updates delivered to a running viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeCommand {
    SetValue(f64),
}

#[derive(Debug, Clone, Builder)]
pub struct ViewerConfig {
    #[builder(into, default = "Gauge".to_string())]
    pub title: String,
    #[builder(default = 300)]
    pub width: u32,
    #[builder(default = 300)]
    pub height: u32,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
}

impl ViewerConfig {
    /// The window's logical size doubles as the gauge container.
    pub fn container(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

fn window_error(err: impl std::fmt::Display) -> GaugeError {
    GaugeError::Window(err.to_string())
}

/// Opens the window and blocks until it is closed.
///
/// Values received on `receiver` are applied with [`Gauge::set_value`] before
/// each frame. The plan is built once for the configured window size; a
/// resized window scales that plan to fit and never rebuilds the geometry.
pub fn run(
    gauge_config: GaugeConfig,
    viewer: ViewerConfig,
    font: Option<Font<'static>>,
    receiver: Option<Receiver<GaugeCommand>>,
) -> Result<()> {
    let renderer = PixelRenderer::new(gauge_config.theme.clone(), font);
    let mut gauge = Gauge::new(&viewer.container(), gauge_config, renderer)?;

    let event_loop = EventLoop::new().map_err(window_error)?;
    let window = WindowBuilder::new()
        .with_title(&viewer.title)
        .with_inner_size(LogicalSize::new(
            f64::from(viewer.width),
            f64::from(viewer.height),
        ))
        .with_resizable(true)
        .build(&event_loop)
        .map_err(window_error)?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let mut fb_width = size.width as usize;
    let mut fb_height = size.height as usize;
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(size.width, size.height, surface_texture).map_err(window_error)?;
    info!(title = %viewer.title, width = size.width, height = size.height, "viewer opened");

    let frame_duration = Duration::from_secs_f64(1.0 / viewer.max_framerate.max(1.0));
    let mut last_frame = Instant::now();
    let window_clone = window.clone();

    event_loop
        .run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => window_target.exit(),
                    WindowEvent::Resized(new_size) => {
                        if new_size.width == 0 || new_size.height == 0 {
                            return;
                        }
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let resized = pixels
                            .resize_buffer(new_size.width, new_size.height)
                            .and_then(|()| pixels.resize_surface(new_size.width, new_size.height));
                        if let Err(err) = resized {
                            error!(%err, "failed to resize pixel surface");
                            window_target.exit();
                        }
                        debug!(width = fb_width, height = fb_height, "viewer resized");
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(receiver) = &receiver {
                            while let Ok(GaugeCommand::SetValue(value)) = receiver.try_recv() {
                                gauge.set_value(value);
                            }
                        }
                        let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                        gauge.renderer().render(&mut canvas);
                        if let Err(err) = pixels.render() {
                            error!(%err, "failed to present frame");
                            window_target.exit();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })
        .map_err(window_error)
}
