use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::{vec2, Vec2};
use log::{debug, info};

use flurry::{
    preset::{EmitterPreset, PresetFile},
    render::SpriteBuffer,
    BlendMode, Color, Emitter, EmitterConfig, FloatRange, IntRange, ParticleSystem,
    SharedEmitter, TextureHandle,
};

/// Runs particle emitters headless at a fixed frame rate.
#[derive(Debug, Parser)]
#[command(name = "flurry", version)]
struct Args {
    /// Preset file with one emitter per line
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u32,

    #[arg(long, default_value_t = 60.)]
    fps: f32,

    /// Seed for reproducible runs; the clock is used otherwise
    #[arg(long)]
    seed: Option<u64>,

    /// Burst every N frames, 0 to disable
    #[arg(long, default_value_t = 60)]
    burst_every: u32,

    /// Moves every emitter's origin; presets keep their own otherwise
    #[arg(long, requires = "origin_y")]
    origin_x: Option<f32>,

    #[arg(long, requires = "origin_x")]
    origin_y: Option<f32>,

    /// Write the final emitter presets here
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    fn origin(&self) -> Option<Vec2> {
        Some(vec2(self.origin_x?, self.origin_y?))
    }
}

fn fountain() -> EmitterPreset {
    EmitterPreset {
        enabled: true,
        config: EmitterConfig {
            origin: vec2(320., 180.),
            direction: vec2(0., -1.),
            direction_angle: FloatRange::new(-20., 20.),
            velocity: FloatRange::new(80., 160.),
            external_acceleration: vec2(0., 98.),
            start_color: Color::rgba(255, 220, 80, 255),
            end_color: Color::rgba(255, 40, 0, 0),
            capacity: 500,
            burst: IntRange::new(20, 40),
            age: FloatRange::new(0.8, 1.6),
            ..Default::default()
        },
        texture_path: "particles/default.png".into(),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let presets = match &args.preset {
        Some(path) => PresetFile::load(path)
            .with_context(|| format!("Failed to load preset {}", path.display()))?
            .emitters,
        None => vec![fountain()],
    };

    // Texture loading belongs to the host; each emitter gets a placeholder handle.
    let mut emitters: Vec<SharedEmitter> = Vec::with_capacity(presets.len());
    for (index, preset) in presets.iter().enumerate() {
        let config = EmitterConfig {
            emission_rate: 120.,
            texture: TextureHandle::new(index as u64 + 1, 16, 16),
            ..Default::default()
        };
        let mut emitter = match args.seed {
            Some(seed) => Emitter::with_seed(config, seed.wrapping_add(index as u64)),
            None => Emitter::new(config),
        }
        .with_context(|| format!("Failed to create emitter #{}", index))?;
        preset
            .apply(&mut emitter)
            .with_context(|| format!("Failed to apply preset #{}", index))?;
        emitters.push(emitter.shared());
    }

    let mut system = ParticleSystem::new();
    for emitter in &emitters {
        system
            .register(emitter)
            .context("Failed to register emitter")?;
    }
    if let Some(origin) = args.origin() {
        system.set_origin(origin);
    }
    info!("Simulating {} emitters for {} frames", system.len(), args.frames);

    let dt = 1. / args.fps;
    let report_every = (args.fps.round() as u32).max(1);
    let mut canvas = SpriteBuffer::new();

    for frame in 0..args.frames {
        if args.burst_every > 0 && frame % args.burst_every == 0 {
            let emitted = system.burst();
            debug!("Frame {}: burst of {} particles", frame, emitted);
        }

        let active = system.update(dt);

        canvas.clear();
        system.draw(&mut canvas, BlendMode::Additive);

        if (frame + 1) % report_every == 0 {
            info!(
                "t={:.2}s particles={} sprites={} batches={} bytes={}",
                (frame + 1) as f32 * dt,
                active,
                canvas.sprite_count(),
                canvas.batches().len(),
                canvas.byte_len(),
            );
        }
    }

    if let Some(path) = &args.export {
        let file = PresetFile {
            emitters: emitters
                .iter()
                .zip(&presets)
                .map(|(emitter, preset)| {
                    EmitterPreset::from_emitter(&emitter.borrow(), preset.texture_path.clone())
                })
                .collect(),
        };
        file.save(path)
            .with_context(|| format!("Failed to export presets to {}", path.display()))?;
    }

    Ok(())
}
