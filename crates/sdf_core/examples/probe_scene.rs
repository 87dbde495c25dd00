//! Example: Load a scene and probe its distance field.
//!
//! Run with: cargo run --example probe_scene -- room
//!       or: cargo run --example probe_scene -- my_scene.json

use std::env;

use sdf_core::{Scene, ScenePreset, SceneResult};
use sdf_math::Vec3;

fn load(arg: &str) -> SceneResult<Scene> {
    match arg.parse::<ScenePreset>() {
        Ok(preset) => Ok(Scene::preset(preset)),
        Err(_) => Scene::load(arg),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: probe_scene <preset|path-to-scene.json>");
        println!("\nPresets:");
        for preset in ScenePreset::ALL {
            println!("  {}", preset);
        }
        return;
    }

    let scene = match load(&args[1]) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error loading scene: {}", e);
            return;
        }
    };

    println!("=== Scene: {} ({} primitives) ===", args[1], scene.len());
    for (i, prim) in scene.primitives().iter().enumerate() {
        println!("  [{}] {:?} - {:?}", i, prim.material, prim.shape);
    }

    println!("\n--- Field along the view axis ---");
    for step in 0..=12 {
        let p = Vec3::new(0.0, 0.0, 1.0 - step as f32 * 0.25);
        let sample = scene.sample(p);
        println!(
            "  ({:.2}, {:.2}, {:.2}) -> {:+.4}  reflectance {:?}",
            p.x, p.y, p.z, sample.distance, sample.material.reflectance
        );
    }

    if let Ok(json) = scene.to_json_pretty() {
        println!("\n--- JSON ---\n{}", json);
    }
}
