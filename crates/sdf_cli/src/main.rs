use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use sdf_core::{Scene, ScenePreset};
use sdf_math::Vec3;
use sdf_renderer::{render, IntegratorKind, RenderConfig, SampleAccumulation};

#[derive(Parser, Debug)]
#[command(name = "sdf-render", about = "Render a signed distance scene to an image file")]
struct Args {
    /// Light transport model: "path" or "direct"; defaults to the config file, then "path"
    #[arg(long)]
    variant: Option<IntegratorKind>,

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "out.jpg")]
    output: PathBuf,

    /// Scene preset name or path to a JSON scene description
    #[arg(short, long, default_value = "room")]
    scene: String,

    /// JSON render configuration used as the base for the flags below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image width; defaults to 1024 for path, 2048 for direct
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Image height; defaults to 1024 for path, 2048 for direct
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Worker thread count
    #[arg(short, long)]
    threads: Option<u32>,

    /// Path samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Maximum bounce depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Seed to use for all the random stuff. Given a seed, the render is deterministic.
    #[arg(long)]
    seed: Option<u64>,

    /// Point light position for the direct variant, as "x,y,z"
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    light: Option<Vec3>,

    /// Sample accumulation for the path variant: "blend" or "mean"
    #[arg(long, value_parser = parse_accumulation)]
    accumulation: Option<SampleAccumulation>,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid component in '{s}': {e}"))?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected 3 comma separated values, got '{s}'")),
    }
}

fn parse_accumulation(s: &str) -> Result<SampleAccumulation, String> {
    match s.to_ascii_lowercase().as_str() {
        "blend" => Ok(SampleAccumulation::Blend),
        "mean" => Ok(SampleAccumulation::Mean),
        other => Err(format!("unknown accumulation '{other}' (expected 'blend' or 'mean')")),
    }
}

impl Args {
    /// Build the render configuration: variant defaults, then the config file, then flag overrides.
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                layered_config(&text, self.variant)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => RenderConfig::for_integrator(self.variant.unwrap_or_default()),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(light) = self.light {
            config.light = light;
        }
        if let Some(accumulation) = self.accumulation {
            config.accumulation = accumulation;
        }

        Ok(config)
    }
}

/// Overlay a JSON config on the defaults of its integrator.
///
/// The integrator is resolved first (explicit variant, then the file, then
/// path) so fields the file omits take that integrator's defaults.
fn layered_config(text: &str, variant: Option<IntegratorKind>) -> Result<RenderConfig> {
    let serde_json::Value::Object(overrides) = serde_json::from_str::<serde_json::Value>(text)? else {
        bail!("render config must be a JSON object");
    };

    let kind = match (variant, overrides.get("integrator")) {
        (Some(kind), _) => kind,
        (None, Some(value)) => serde_json::from_value(value.clone())?,
        (None, None) => IntegratorKind::default(),
    };

    let mut layered = serde_json::to_value(RenderConfig::for_integrator(kind))?;
    if let serde_json::Value::Object(base) = &mut layered {
        base.extend(overrides);
    }

    let mut config: RenderConfig = serde_json::from_value(layered)?;
    config.integrator = kind;
    Ok(config)
}

/// Resolve a preset name, falling back to a JSON scene file.
fn load_scene(name: &str) -> Result<Scene> {
    if let Ok(preset) = name.parse::<ScenePreset>() {
        log::info!("Using scene preset '{}'", preset);
        return Ok(Scene::preset(preset));
    }

    let path = Path::new(name);
    Scene::load(path).with_context(|| format!("loading scene {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    log::info!("Starting SDF renderer");

    let config = args.render_config()?;
    let scene = load_scene(&args.scene)?;
    log::info!("Scene has {} primitives", scene.len());

    let integrator = config.build_integrator();
    let image = render(&scene, integrator.as_ref(), &config).context("rendering frame")?;

    if let Err(e) = image.save(&args.output) {
        log::error!("encoding failed: {}", e);
        return Err(e).with_context(|| format!("writing {}", args.output.display()));
    }

    Ok(())
}
