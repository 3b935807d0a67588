//! sdf-rt: sphere-tracing renderer for an implicit SDF scene
//!
//! Interactive controls:
//! - Up/Down arrows: move the light
//! - [ / ]: dolly the camera
//! - N: toggle normal estimation (tetrahedron / central differences)
//! - R: reset, SPACE: pause, Q or Escape: quit
//!
//! Usage:
//!   sdf-rt                               - interactive terminal mode
//!   sdf-rt --output frame.png            - render one frame to a PNG
//!   sdf-rt --output frame.png -w 1024 -H 768

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use sdf_rt::march::NormalMode;
use sdf_rt::renderer::Renderer;
use sdf_rt::scene::Scene;
use sdf_rt::terminal::{parse_key_event, Action, TerminalDisplay};

#[derive(Parser)]
#[command(name = "sdf-rt")]
#[command(version)]
#[command(about = "Sphere-tracing renderer for an implicit SDF scene")]
struct Cli {
    /// Render a single frame to this PNG file instead of running
    /// interactively
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output image width (PNG mode)
    #[arg(short = 'w', long, default_value_t = 800)]
    width: u32,

    /// Output image height (PNG mode)
    #[arg(short = 'H', long, default_value_t = 600)]
    height: u32,

    /// Use six-tap central differences for normals instead of the four-tap
    /// tetrahedron scheme
    #[arg(long)]
    central_diff: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let normal_mode = if cli.central_diff {
        NormalMode::CentralDiff
    } else {
        NormalMode::Tetrahedron
    };

    match cli.output {
        Some(path) => render_to_png(&path, cli.width, cli.height, normal_mode),
        None => run_interactive(normal_mode),
    }
}

/// Render one frame of the demo scene and save it as a PNG.
fn render_to_png(
    path: &std::path::Path,
    width: u32,
    height: u32,
    normal_mode: NormalMode,
) -> anyhow::Result<()> {
    let scene = Scene::demo();
    let mut renderer = Renderer::new(width as usize, height as usize);
    renderer.config_mut().normal_mode = normal_mode;

    let start = Instant::now();
    renderer.render(&scene);
    info!(
        "rendered {}x{} frame in {:.1?}",
        width,
        height,
        start.elapsed()
    );

    let image = image::RgbaImage::from_raw(width, height, renderer.to_rgba8())
        .context("framebuffer size mismatch")?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Interactive terminal mode: render the demo scene to ANSI truecolor ASCII
/// and react to key input.
fn run_interactive(normal_mode: NormalMode) -> anyhow::Result<()> {
    let mut terminal = TerminalDisplay::new().context("failed to initialize terminal")?;

    let (width, height) = terminal.size();
    let mut renderer = Renderer::new(width.max(10), height.max(10));
    // Terminal cells are roughly twice as tall as wide
    renderer.set_pixel_aspect(0.5);
    renderer.config_mut().normal_mode = normal_mode;

    let mut scene = Scene::demo();
    let frame_time = Duration::from_millis(100);
    let mut last_frame = Instant::now() - frame_time;
    let mut paused = false;
    let mut dirty = true;

    loop {
        if terminal.check_resize() {
            let (width, height) = terminal.size();
            renderer.resize(width.max(10), height.max(10));
            renderer.set_pixel_aspect(0.5);
            dirty = true;
        }

        match terminal.poll_input(Duration::from_millis(16))? {
            Some(key_event) => {
                match parse_key_event(key_event) {
                    Action::Quit => break,
                    Action::LightUp => scene.adjust_light_height(0.1),
                    Action::LightDown => scene.adjust_light_height(-0.1),
                    Action::CameraForward => renderer.camera_mut().adjust_distance(0.2),
                    Action::CameraBack => renderer.camera_mut().adjust_distance(-0.2),
                    Action::ToggleNormalMode => {
                        let config = renderer.config_mut();
                        config.normal_mode = match config.normal_mode {
                            NormalMode::Tetrahedron => NormalMode::CentralDiff,
                            NormalMode::CentralDiff => NormalMode::Tetrahedron,
                        };
                    }
                    Action::Reset => {
                        scene = Scene::demo();
                        *renderer.camera_mut() = Default::default();
                        renderer.set_pixel_aspect(0.5);
                    }
                    Action::Pause => paused = !paused,
                    Action::None => continue,
                }
                dirty = true;
            }
            None => {}
        }

        // The scene only changes through input, so skip identical frames
        if paused || !dirty || last_frame.elapsed() < frame_time {
            continue;
        }
        last_frame = Instant::now();
        dirty = false;

        let start = Instant::now();
        renderer.render(&scene);
        debug!("frame rendered in {:.1?}", start.elapsed());

        let frame = renderer.to_ascii_colored();
        let status = format!(
            "Light Y: {:.2} | Normals: {:?} | [↑↓] Light  [[]] Zoom  [N]ormals  [R]eset  [SPACE] Pause  [Q]uit",
            scene.light.position.y,
            renderer.config().normal_mode,
        );

        if let Err(e) = terminal.draw(&frame, &status) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                break;
            }
            return Err(e).context("terminal draw failed");
        }
    }

    Ok(())
}
