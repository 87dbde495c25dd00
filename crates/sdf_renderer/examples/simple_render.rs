//! Simple ray marching example.
//!
//! Renders the single sphere with direct lighting and the room with the path
//! tracer at a small resolution, and saves each to PNG.

use sdf_core::{Scene, ScenePreset};
use sdf_renderer::{render, IntegratorKind, RenderConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("SDF Ray Marcher - Simple Example");
    println!("================================");

    let passes = [
        (IntegratorKind::Direct, ScenePreset::SingleSphere),
        (IntegratorKind::Path, ScenePreset::Room),
    ];

    for (kind, preset) in passes {
        let scene = Scene::preset(preset);
        let config = RenderConfig::for_integrator(kind)
            .with_resolution(256, 256)
            .with_quality(8, 6)
            .with_seed(42);
        let integrator = config.build_integrator();

        println!(
            "Rendering {} ({} primitives) at {}x{} with {} integrator...",
            preset,
            scene.len(),
            config.width,
            config.height,
            kind
        );

        let start = std::time::Instant::now();
        let image = render(&scene, integrator.as_ref(), &config)?;
        println!("Rendered in {:?}", start.elapsed());

        let filename = format!("simple_{}.png", kind);
        image.save(&filename)?;
        println!("Saved to {}", filename);
    }

    Ok(())
}
