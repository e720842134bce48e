//! ascii-surfaces: spinning shapes rendered as text
//!
//! Controls:
//! - Space: pause
//! - Q, Escape or Ctrl-C: quit
//!
//! Usage:
//!   ascii-surfaces --preset torus run
//!   ascii-surfaces --config shapes.yaml render --frames 10 --out frames

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ascii_surfaces::config::PRESETS;
use ascii_surfaces::glyph::ColorMode;
use ascii_surfaces::terminal::{parse_key_event, Action, TerminalDisplay};
use ascii_surfaces::{AppConfig, Renderer};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "ascii-surfaces")]
#[command(version = "0.1.0")]
#[command(about = "Render rotating spheres, tori and cubes as ASCII art")]
#[command(long_about = "
ascii-surfaces samples parametric surfaces, lights them and draws them
into the terminal with a z-buffered character grid.

Example usage:
  ascii-surfaces --preset torus run
  ascii-surfaces --preset cube-lit render --frames 5 --out frames
  ascii-surfaces list-presets --verbose
")]
struct Cli {
    /// Path to a YAML config file (takes precedence over --preset)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Built-in preset to use when no config file is given
    #[arg(short, long, global = true, default_value = "sphere")]
    preset: String,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct Overrides {
    /// Override grid width
    #[arg(long)]
    width: Option<usize>,
    /// Override grid height
    #[arg(long)]
    height: Option<usize>,
    /// Force truecolor output for uncolored configs
    #[arg(long)]
    color: bool,
    /// Sample points in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate in the terminal until interrupted
    Run {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Render frames without a terminal
    Render {
        /// Number of frames
        #[arg(short, long, default_value_t = 1)]
        frames: u64,
        /// Write frame_NNN.txt files here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },

    /// List the built-in presets
    ListPresets {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate configuration file or preset
    CheckConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { overrides } => {
            let config = load(cli.config.as_deref(), &cli.preset, &overrides)?;
            run_animation(&config)?;
        }
        Commands::Render {
            frames,
            out,
            overrides,
        } => {
            let config = load(cli.config.as_deref(), &cli.preset, &overrides)?;
            render_frames(&config, frames, out.as_deref())?;
        }
        Commands::ListPresets { verbose } => {
            list_presets(verbose)?;
        }
        Commands::CheckConfig => {
            check_config(cli.config.as_deref(), &cli.preset);
        }
    }

    Ok(())
}

/// Load the config file or preset and apply CLI overrides
fn load(path: Option<&Path>, preset: &str, overrides: &Overrides) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_preset(path, preset).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => format!("Failed to load preset '{preset}'"),
    })?;

    if let Some(width) = overrides.width {
        config.screen.width = width;
    }
    if let Some(height) = overrides.height {
        config.screen.height = height;
    }
    if overrides.color && config.glyphs.color == ColorMode::None {
        config.glyphs.color = ColorMode::green_shaded();
    }
    if overrides.parallel {
        config.render.parallel = true;
    }
    config.validate().context("Invalid configuration after overrides")?;
    config.warn_ignored();

    tracing::info!(
        name = %config.name,
        shape = config.shape.surface().name(),
        width = config.screen.width,
        height = config.screen.height,
        lights = config.lights.len(),
        parallel = config.render.parallel,
        "Scene configured"
    );
    Ok(config)
}

/// Interactive loop: render, show, then wait out the rest of the frame interval
fn run_animation(config: &AppConfig) -> Result<()> {
    let scene = config.scene();
    let (mut animator, mut state) = config.animation();
    let mut renderer = Renderer::new(config.render.parallel);
    let interval = config.frame_interval();

    let mut terminal = TerminalDisplay::new().context("Failed to initialize terminal")?;
    let mut paused = false;
    let mut fps = 0.0;

    'main_loop: loop {
        let started = Instant::now();

        if !paused {
            let frame = scene.glyphs.render(renderer.render(&scene, &state));
            let status = format!(
                "{:5.1} FPS | {} | frame {} | [SPACE] Pause  [Q]uit",
                fps, config.name, state.frame
            );
            if let Err(e) = terminal.render(&frame, &status) {
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    break;
                }
                tracing::warn!(error = %e, "Render error");
            }
            animator.advance(&mut state);
        }

        // Poll input until the frame interval is used up
        loop {
            let remaining = interval.saturating_sub(started.elapsed());
            match terminal.poll_input(remaining) {
                Ok(Some(key_event)) => match parse_key_event(key_event) {
                    Action::Quit => break 'main_loop,
                    Action::Pause => paused = !paused,
                    Action::None => {}
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Input error"),
            }
            if started.elapsed() >= interval {
                break;
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            fps = 1.0 / elapsed;
        }
    }

    drop(terminal);
    println!("Animation stopped.");
    tracing::info!(frames = state.frame, "Shut down");
    Ok(())
}

/// Headless mode: render `count` frames to stdout or to files in `out`
fn render_frames(config: &AppConfig, count: u64, out: Option<&Path>) -> Result<()> {
    let scene = config.scene();
    let (mut animator, mut state) = config.animation();
    let mut renderer = Renderer::new(config.render.parallel);

    if let Some(dir) = out {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    for _ in 0..count {
        let started = Instant::now();
        let frame = scene.glyphs.render(renderer.render(&scene, &state));
        tracing::trace!(frame = state.frame, elapsed = ?started.elapsed(), "Frame timing");

        match out {
            Some(dir) => {
                let filename = dir.join(format!("frame_{:03}.txt", state.frame));
                fs::write(&filename, &frame)
                    .with_context(|| format!("Failed to write {}", filename.display()))?;
            }
            None => println!("{frame}\n"),
        }
        animator.advance(&mut state);
    }

    if let Some(dir) = out {
        tracing::info!(frames = count, dir = %dir.display(), "Frames written");
    }
    Ok(())
}

fn list_presets(verbose: bool) -> Result<()> {
    println!("Available presets:\n");

    for (name, description) in PRESETS {
        if verbose {
            let config = AppConfig::preset(name)?;
            println!("  {}:", name);
            println!("    {}", description);
            println!("    Shape: {}", config.shape.surface().name());
            println!("    Screen: {}x{}", config.screen.width, config.screen.height);
            println!("    Lights: {}", config.lights.len());
            println!("    Color: {:?}", config.glyphs.color);
            println!();
        } else {
            println!("  {:14} - {}", name, description);
        }
    }

    if verbose {
        println!("\nTo customise a preset, copy config.yaml.default and edit it:");
        println!("  ascii-surfaces --config config.yaml run");
    }
    Ok(())
}

fn check_config(path: Option<&Path>, preset: &str) {
    match AppConfig::load_or_preset(path, preset) {
        Ok(config) => {
            println!("✓ Configuration is valid\n");
            println!("Name: {}", config.name);
            println!("Screen: {}x{}", config.screen.width, config.screen.height);
            println!("Shape: {:?}", config.shape);
            println!("Projection: {:?}", config.projection);
            println!("Lighting: {:?}", config.lighting);
            println!("Lights: {}", config.lights.len());
            for (i, rig) in config.lights.iter().enumerate() {
                println!(
                    "  [{}] {:?} intensity {} orbit {:?}",
                    i, rig.kind, rig.intensity, rig.orbit
                );
            }
            println!("Ramp: \"{}\"", config.glyphs.ramp);
            println!("Color: {:?}", config.glyphs.color);
            println!("Frame interval: {}ms", config.animation.frame_interval_ms);
            println!("Parallel: {}", config.render.parallel);
            config.warn_ignored();
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}
