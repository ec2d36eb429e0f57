use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use clap::Parser;
use rand::Rng;
use tracing::{info, warn};

use radial_gauge::{
    logging, Binding, Gauge, GaugeCommand, GaugeConfig, GaugeError, GaugeOptions, MarkFormat,
    PixelRenderer, Result, Size, SvgRenderer, ViewerConfig,
};

#[derive(Debug, Parser)]
#[command(name = "radial-gauge")]
#[command(about = "Draw a radial gauge and move its pointer with values read from stdin")]
#[command(version)]
struct Cli {
    /// JSON file with gauge options (from, to, angle, step, segments, inset, label, value)
    #[arg(long)]
    options: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    from: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    to: Option<f64>,

    /// Sweep of the gauge face in degrees
    #[arg(long)]
    angle: Option<f64>,

    /// Distance between scale marks
    #[arg(long)]
    step: Option<f64>,

    /// Comma separated segment boundaries
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    segments: Option<Vec<f64>>,

    /// Draw the face along the container edge
    #[arg(long)]
    inset: bool,

    #[arg(long)]
    label: Option<String>,

    /// Initial pointer value
    #[arg(long, allow_negative_numbers = true)]
    value: Option<f64>,

    /// Suffix appended to every mark label
    #[arg(long)]
    unit: Option<String>,

    #[arg(long, default_value_t = 300)]
    width: u32,

    #[arg(long, default_value_t = 300)]
    height: u32,

    #[arg(long, default_value = "Gauge")]
    title: String,

    /// TTF/OTF font used for mark labels in the window
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write an SVG document instead of opening a window ("-" for stdout)
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Feed random values instead of reading stdin
    #[arg(long)]
    demo: bool,
}

impl Cli {
    fn gauge_config(&self) -> Result<GaugeConfig> {
        let mut config = GaugeConfig::default();
        if let Some(path) = &self.options {
            config = GaugeOptions::from_json(&fs::read_to_string(path)?)?.overlay(config);
        }
        let flags = GaugeOptions {
            from: self.from,
            to: self.to,
            angle: self.angle,
            step: self.step,
            segments: self.segments.clone(),
            inset: self.inset.then_some(true),
            label: self.label.clone(),
            value: self.value,
        };
        let mut config = flags.overlay(config);
        if let Some(unit) = self.unit.clone() {
            config.mark_format = Some(MarkFormat::new(move |v| format!("{v}{unit}")));
        }
        config.validate()?;
        Ok(config)
    }
}

fn write_svg(config: GaugeConfig, container: Size, out: Option<&Path>) -> Result<()> {
    let renderer = SvgRenderer::new(config.theme.clone());
    let gauge = Gauge::new(&container, config, renderer)?;
    match out {
        Some(path) if path != Path::new("-") => {
            fs::write(path, gauge.renderer().to_document())?;
            info!(path = %path.display(), value = gauge.value(), "gauge written");
        }
        _ => gauge.renderer().write_to(io::stdout().lock())?,
    }
    Ok(())
}

fn feed_stdin(sender: Sender<GaugeCommand>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match line.trim().parse::<f64>() {
                Ok(value) => {
                    if sender.send(GaugeCommand::SetValue(value)).is_err() {
                        break;
                    }
                }
                Err(_) => warn!(input = %line.trim(), "ignoring non-numeric input"),
            }
        }
    });
}

fn feed_random(sender: Sender<GaugeCommand>, from: f64, to: f64) {
    let (low, high) = (from.min(to), from.max(to));
    thread::spawn(move || {
        let mut rng = rand::rng();
        loop {
            let value = rng.random_range(low..=high);
            if sender.send(GaugeCommand::SetValue(value)).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(500));
        }
    });
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = cli.gauge_config()?;
    let container = Size::new(f64::from(cli.width), f64::from(cli.height));

    match Binding::detect(cli.svg.is_some()) {
        Binding::Svg => write_svg(config, container, cli.svg.as_deref()),
        Binding::Window => {
            let font = cli
                .font
                .as_ref()
                .map(|path| fs::read(path).map_err(GaugeError::from).and_then(PixelRenderer::load_font))
                .transpose()?;
            let (sender, receiver) = mpsc::channel();
            if cli.demo {
                feed_random(sender, config.from, config.to);
            } else {
                feed_stdin(sender);
            }
            let viewer = ViewerConfig::builder()
                .title(cli.title)
                .width(cli.width)
                .height(cli.height)
                .build();
            radial_gauge::viewer::run(config, viewer, font, Some(receiver))
        }
    }
}
