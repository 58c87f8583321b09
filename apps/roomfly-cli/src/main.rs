use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use roomfly_bloom::{BloomPreset, BloomState, BlurKernels, half_resolution};
use roomfly_camera::FlyCamera;
use roomfly_config::AppConfig;
use roomfly_input::{InputState, Key};
use roomfly_render::{DebugTextRenderer, FrameContext, RenderView, Renderer};
use roomfly_scene::{Scene, StepTimer};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "roomfly", about = "Headless roomfly tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration summary
    Info {
        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the bloom presets
    Presets,
    /// Print the blur kernels for an output size
    Kernel {
        #[arg(short, long, default_value = "default")]
        preset: BloomPreset,
        /// Output width; kernels are built for half of it
        #[arg(long, default_value_t = 1600)]
        width: u32,
        /// Output height; kernels are built for half of it
        #[arg(long, default_value_t = 900)]
        height: u32,
        #[arg(short, long, default_value_t = roomfly_bloom::DEFAULT_TAPS)]
        taps: usize,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Fly the camera headlessly and print frame summaries
    Fly {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to simulate
        #[arg(short, long, default_value_t = 120)]
        frames: u32,
        /// Keys held for the whole run, comma separated (e.g. "w,d")
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,
        /// Pointer drag applied every frame, in pixels
        #[arg(long, num_args = 2, value_names = ["DX", "DY"], allow_negative_numbers = true)]
        look: Option<Vec<f32>>,
        /// Print every Nth frame
        #[arg(long, default_value_t = 30)]
        every: u32,
        #[arg(short, long)]
        preset: Option<BloomPreset>,
    },
    /// Config file helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Load and validate a config file
    Check { path: PathBuf },
    /// Write the default config to a file
    Init {
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { config } => {
            let config = roomfly_config::load(config.as_deref())?;
            print_info(&config);
        }
        Commands::Presets => print_presets(),
        Commands::Kernel {
            preset,
            width,
            height,
            taps,
            json,
        } => {
            let kernels = kernels_for(preset, width, height, taps)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&kernels)?);
            } else {
                print_kernels(&kernels);
            }
        }
        Commands::Fly {
            config,
            frames,
            keys,
            look,
            every,
            preset,
        } => {
            let mut config = roomfly_config::load(config.as_deref())?;
            if let Some(preset) = preset {
                config.bloom.preset = preset;
            }
            let keys = keys.iter().map(|k| parse_key(k)).collect::<Result<Vec<_>>>()?;
            let look = look.map(|v| (v[0], v[1]));
            tracing::debug!(frames, ?keys, ?look, "starting headless fly");
            let mut sim = Headless::new(&config, &keys, look)?;
            let renderer = DebugTextRenderer;
            for _ in 0..frames {
                sim.step();
                let frame = sim.frame_context();
                if every > 0 && frame.frame % u64::from(every) == 0 {
                    print!("{}", renderer.render(&frame));
                }
            }
            let p = sim.camera.position();
            println!(
                "Final: pos=({:.3}, {:.3}, {:.3}) yaw={:.3} pitch={:.3}",
                p.x,
                p.y,
                p.z,
                sim.camera.yaw(),
                sim.camera.pitch()
            );
        }
        Commands::Config { action } => match action {
            ConfigCommand::Check { path } => {
                let config = roomfly_config::load_from_path(&path)?;
                println!("{}: ok", path.display());
                print_info(&config);
            }
            ConfigCommand::Init { path, force } => init_config(&path, force)?,
        },
    }

    Ok(())
}

fn print_info(config: &AppConfig) {
    println!("roomfly v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Window: {}x{} vsync={}",
        config.window.width, config.window.height, config.window.vsync
    );
    let c = &config.camera;
    println!(
        "Camera: start={:?} fov={} near={} far={}",
        c.start_position.to_array(),
        c.fov_degrees,
        c.near,
        c.far
    );
    println!(
        "Room: extents={:?} confine={}",
        config.room.extents.to_array(),
        config.room.confine_camera
    );
    println!(
        "Bloom: enabled={} preset={} taps={}",
        config.bloom.enabled, config.bloom.preset, config.bloom.taps
    );
    println!(
        "Timer: fixed_step={} rate={}",
        config.timer.fixed_step, config.timer.target_rate
    );
}

fn print_presets() {
    println!(
        "{:<12} {:>9} {:>6} {:>6} {:>6} {:>9} {:>9}",
        "preset", "threshold", "blur", "bloom", "base", "bloom_sat", "base_sat"
    );
    for preset in BloomPreset::ALL {
        if preset.is_bypass() {
            println!("{:<12} (bypass)", preset.name());
            continue;
        }
        let p = preset.parameters();
        println!(
            "{:<12} {:>9.2} {:>6.2} {:>6.2} {:>6.2} {:>9.2} {:>9.2}",
            preset.name(),
            p.threshold,
            p.blur_amount,
            p.bloom_intensity,
            p.base_intensity,
            p.bloom_saturation,
            p.base_saturation
        );
    }
}

fn kernels_for(preset: BloomPreset, width: u32, height: u32, taps: usize) -> Result<BlurKernels> {
    if preset.is_bypass() {
        bail!("preset `{preset}` bypasses bloom and has no kernels");
    }
    let (w, h) = half_resolution(width, height);
    let theta = preset.parameters().blur_amount;
    BlurKernels::for_target(theta, taps, w, h)
        .with_context(|| format!("building kernels for {preset} at {w}x{h}"))
}

fn print_kernels(kernels: &BlurKernels) {
    for (label, kernel) in [("horizontal", &kernels.horizontal), ("vertical", &kernels.vertical)] {
        println!("{label} ({} taps, total {:.6}):", kernel.len(), kernel.total_weight());
        for (offset, weight) in kernel.offsets().iter().zip(kernel.weights()) {
            println!("  ({:>10.6}, {:>10.6})  {weight:.6}", offset[0], offset[1]);
        }
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    roomfly_config::write_to_path(&AppConfig::default(), path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn parse_key(name: &str) -> Result<Key> {
    let key = match name.trim().to_ascii_lowercase().as_str() {
        "w" => Key::W,
        "a" => Key::A,
        "s" => Key::S,
        "d" => Key::D,
        "x" => Key::X,
        "space" => Key::Space,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        other => bail!("unknown or non-movement key: {other}"),
    };
    Ok(key)
}

/// Camera, scene and bloom driven by a fixed 60 Hz clock.
struct Headless {
    camera: FlyCamera,
    scene: Scene,
    bloom: BloomState,
    input: InputState,
    timer: StepTimer,
    look: Option<(f32, f32)>,
}

impl Headless {
    const FRAME: Duration = Duration::from_micros(16_667);

    fn new(config: &AppConfig, keys: &[Key], look: Option<(f32, f32)>) -> Result<Self> {
        let mut camera = FlyCamera::new(config.camera, config.room.camera_bounds());
        camera.set_viewport(config.window.width, config.window.height);
        let bloom = BloomState::new(config.bloom, config.window.width, config.window.height)?;
        let mut input = InputState::new();
        for &key in keys {
            input.key(key, true);
        }
        if look.is_some() {
            input.pointer_button(true);
        }
        Ok(Self {
            camera,
            scene: Scene::new(config.room.bounds()),
            bloom,
            input,
            timer: StepTimer::new(config.timer),
            look,
        })
    }

    fn step(&mut self) {
        if let Some((dx, dy)) = self.look {
            self.input.pointer_motion(dx, dy);
        }
        let delta = self.input.take_pointer_delta();
        self.camera.rotate(delta.x, delta.y);

        let Self {
            camera,
            scene,
            input,
            timer,
            ..
        } = self;
        timer.tick_with(Self::FRAME, |time| {
            camera.step(input.move_intent().vector(), time.elapsed);
            scene.step(time);
        });
    }

    fn frame_context(&self) -> FrameContext<'_> {
        FrameContext {
            scene: &self.scene,
            view: RenderView::from_camera(&self.camera),
            bloom: &self.bloom,
            frame: self.timer.frame_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn parses_movement_keys_only() {
        assert_eq!(parse_key("W").unwrap(), Key::W);
        assert_eq!(parse_key(" pageup ").unwrap(), Key::PageUp);
        assert!(parse_key("home").is_err());
        assert!(parse_key("q").is_err());
    }

    #[test]
    fn forward_run_moves_along_z() {
        let mut sim = Headless::new(&AppConfig::default(), &[Key::W], None).unwrap();
        for _ in 0..10 {
            sim.step();
        }
        let p = sim.camera.position();
        assert!((p.z - 0.7).abs() < 1e-4, "z = {}", p.z);
        assert_eq!(p.x, 0.0);
        assert_eq!(sim.frame_context().frame, 10);
    }

    #[test]
    fn look_drag_turns_camera() {
        let mut sim = Headless::new(&AppConfig::default(), &[], Some((10.0, 0.0))).unwrap();
        sim.step();
        assert!(sim.camera.yaw() != 0.0);
        assert_eq!(sim.camera.position(), Vec3::new(0.0, -1.5, 0.0));
    }

    #[test]
    fn bypass_preset_has_no_kernels() {
        assert!(kernels_for(BloomPreset::None, 1600, 900, 15).is_err());
        let k = kernels_for(BloomPreset::Default, 1600, 900, 15).unwrap();
        assert!((k.horizontal.offsets()[1][0] - 1.5 / 800.0).abs() < 1e-7);
        assert!((k.vertical.offsets()[1][1] - 1.5 / 450.0).abs() < 1e-7);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roomfly.yaml");
        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
        assert_eq!(roomfly_config::load_from_path(&path).unwrap(), AppConfig::default());
    }
}
