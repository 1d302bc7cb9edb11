//! Replays a scene script against the headless host.
//!
//! `choreo-studio [scene-file]`; without an argument the bundled demo runs.
//! Set `CHOREO_LOG=debug` (or `RUST_LOG`) to watch bindings and transitions.

mod scene;

use anyhow::{Context, Result};

use choreo_engine::logging::{init_logging, LoggingConfig};

use crate::scene::Scene;

const DEMO: &str = include_str!("../scenes/demo.scene");

fn main() -> Result<()> {
    init_logging(LoggingConfig::default().compact());

    let (name, src) = match std::env::args().nth(1) {
        Some(path) => {
            let src = std::fs::read_to_string(&path).with_context(|| format!("reading scene {path}"))?;
            (path, src)
        }
        None => ("demo.scene".to_string(), DEMO.to_string()),
    };
    let scene = Scene::parse(&src).with_context(|| format!("parsing {name}"))?;

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║            CHOREO STUDIO v0.1          ║");
    println!("  ║   headless host  ·  frame-by-frame     ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();
    println!("  scene: {name} ({} step(s))", scene.lines.len());
    println!();

    scene.play().with_context(|| format!("playing {name}"))?;
    log::info!("scene {name} finished");
    Ok(())
}
