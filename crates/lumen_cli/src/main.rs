//! Lumen command-line renderer.
//!
//! Builds the demonstration scene, renders it across the thread pool, and
//! writes the result as PNG or PPM.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use lumen_renderer::{encoder, render, RenderConfig};

mod cli;
mod scene;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.clone().into())
        .init();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the worker thread pool")?;
    }

    info!(
        "image {}x{}, {} samples per pixel, max depth {}",
        args.width, args.height, args.samples_per_pixel, args.max_depth
    );

    let scene_start = Instant::now();
    let world = scene::create_scene(args.seed);
    info!(
        "scene built in {:.2?} ({} primitives)",
        scene_start.elapsed(),
        world.len()
    );

    let mut camera = scene::create_camera(args.width, args.height);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: args.samples_per_pixel,
        max_depth: args.max_depth,
        seed: args.seed,
    };

    let render_start = Instant::now();
    let frame = render(&camera, &world, &config);
    info!("rendered in {:.2?}", render_start.elapsed());

    encoder::save(&frame, config.samples_per_pixel, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("saved {}", args.output.display());

    Ok(())
}
