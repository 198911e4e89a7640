use anyhow::Context;
use clap::{Parser, Subcommand};
use meshview_common::{ShaderVariant, ViewerConfig};
use meshview_input::{Movement, MovementFlags};
use meshview_render::{
    DebugTextRenderer, ManualClock, RenderLoop, Renderer, StopToken, TIME_PERIOD_MS,
};
use meshview_render_wgpu::{ShadersLoaded, Startup};
use meshview_scene::{
    CAMERA_ROT_SPEED, CAMERA_SPEED, GRID_X_RANGE, GRID_Y_OFFSET, GRID_Z_RANGE, MIN_DISTANCE,
    ROTATION_SPEED, SceneState,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshview-cli", about = "Headless tools for the mesh viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML viewer config; flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// OBJ file to load
    #[arg(long, global = true)]
    mesh: Option<PathBuf>,

    /// Shader variant: green-shift, wavy, cross or noisy
    #[arg(long, global = true)]
    shader: Option<ShaderVariant>,

    /// Read WGSL from this directory instead of the built-in sources
    #[arg(long, global = true)]
    shader_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, shader variants and motion constants
    Info,
    /// Load the mesh and print the vertex buffer layout
    Inspect {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the render loop without a window and print each frame
    Simulate {
        /// Number of frames to produce
        #[arg(short, long, default_value = "10")]
        frames: u64,
        /// Milliseconds between frames
        #[arg(long, default_value = "16")]
        dt: u64,
        /// Keys held for the whole run, e.g. "wa"
        #[arg(long, default_value = "")]
        hold: String,
        /// Raw effect value, as typed into the slider box
        #[arg(long)]
        effect: Option<String>,
    },
}

impl Cli {
    fn viewer_config(&self) -> anyhow::Result<ViewerConfig> {
        let mut config = ViewerConfig::load_or_default(self.config.as_deref())
            .context("failed to load viewer config")?;
        config.apply_overrides(self.mesh.clone(), self.shader, self.shader_dir.clone());
        Ok(config)
    }
}

fn load(config: &ViewerConfig) -> anyhow::Result<ShadersLoaded> {
    let loaded = Startup::load_mesh(&config.mesh)?
        .load_shaders(config.shader, config.shader_dir.as_deref())?;
    Ok(loaded)
}

fn print_info() {
    println!("meshview-cli v{}", env!("CARGO_PKG_VERSION"));
    println!("assets: {}", meshview_assets::crate_info());
    println!("input: {}", meshview_input::crate_info());
    println!("render: {}", meshview_render::crate_info());
    println!();
    println!("Shader variants:");
    for variant in ShaderVariant::ALL {
        let effect = variant.effect();
        println!(
            "  {:<12} {:<18} uniform={:<16} caption=\"{}\"",
            variant.name(),
            effect.fragment_file,
            effect.uniform_name,
            effect.caption
        );
    }
    println!();
    println!("Motion:");
    println!("  camera speed      {CAMERA_SPEED} units/ms");
    println!("  camera rotation   {CAMERA_ROT_SPEED} deg/ms");
    println!("  model rotation    {ROTATION_SPEED} deg/ms");
    println!("  min distance      {MIN_DISTANCE}");
    println!("  time period       {TIME_PERIOD_MS} ms");
    println!(
        "  grid              x=±{GRID_X_RANGE} z=±{GRID_Z_RANGE} y={GRID_Y_OFFSET}"
    );
    println!();
    println!("Keys:");
    for movement in Movement::ALL {
        println!("  {}  {:?}", movement.key().to_ascii_uppercase(), movement);
    }
}

fn inspect(config: &ViewerConfig, json: bool) -> anyhow::Result<()> {
    let loaded = load(config)?;
    let plan = loaded.prepare(config.grid_row_spacing, config.grid_col_spacing)?;
    let mesh = loaded.mesh();
    let bounds = mesh.bounds();
    let summary = plan.summary();

    if json {
        let value = serde_json::json!({
            "mesh": {
                "path": config.mesh,
                "vertices": mesh.vertex_count(),
                "triangles": mesh.triangle_count(),
                "bounds": bounds,
            },
            "shader": {
                "variant": config.shader,
                "fragment": config.shader.effect().fragment_file,
                "uniform": config.shader.effect().uniform_name,
            },
            "layout": summary,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Mesh: {}", config.mesh.display());
    println!(
        "  vertices={} triangles={}",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    if let Some((min, max)) = bounds {
        println!(
            "  bounds=({:.3}, {:.3}, {:.3})..({:.3}, {:.3}, {:.3})",
            min[0], min[1], min[2], max[0], max[1], max[2]
        );
    }
    println!(
        "Shader: {} (uniform {})",
        config.shader,
        config.shader.effect().uniform_name
    );
    println!(
        "Vertex buffer: {} floats, {} bytes",
        summary.floats, summary.bytes
    );
    println!(
        "  mesh vertices={} grid vertices={}",
        summary.mesh_vertices, summary.grid_vertices
    );
    for attr in &summary.attributes {
        println!(
            "  @location({}) {}: vec{} stride={} offset={}",
            attr.location, attr.name, attr.components, attr.stride, attr.offset
        );
    }
    Ok(())
}

fn simulate(
    config: &ViewerConfig,
    frames: u64,
    dt: u64,
    hold: &str,
    effect: Option<&str>,
) -> anyhow::Result<()> {
    let loaded = load(config)?;
    let plan = loaded.prepare(config.grid_row_spacing, config.grid_col_spacing)?;

    let mut flags = MovementFlags::new();
    for key in hold.chars() {
        if !flags.handle_key(key, true) {
            tracing::warn!(%key, "ignoring unmapped key");
        }
    }

    let mut scene = SceneState::new(config.shader, config.initial_effect);
    scene.set_aspect(config.width as f32 / config.height.max(1) as f32);
    if let Some(raw) = effect {
        scene.effect.set_from_input(raw);
    }

    let clock = ManualClock::stepping(0, dt);
    let mut render_loop = RenderLoop::new(plan);
    render_loop.start(&clock)?;

    let stop = StopToken::new();
    let mut printer = PrintingRenderer::default();
    let rendered = render_loop.run(&clock, &mut scene, &flags, &mut printer, &stop, Some(frames))?;

    println!(
        "{rendered} frames, {}: distance={:.3} angle={:.1} height={:.3}",
        scene.effect.label(),
        scene.camera.distance,
        scene.camera.angle,
        scene.camera.height
    );
    Ok(())
}

/// Prints each frame's text as it is produced.
#[derive(Default)]
struct PrintingRenderer {
    text: DebugTextRenderer,
}

impl Renderer for PrintingRenderer {
    type Output = ();

    fn render(&mut self, frame: &meshview_render::Frame) {
        print!("{}", self.text.render(frame));
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.viewer_config()?;

    match &cli.command {
        Commands::Info => print_info(),
        Commands::Inspect { json } => inspect(&config, *json)?,
        Commands::Simulate {
            frames,
            dt,
            hold,
            effect,
        } => simulate(&config, *frames, *dt, hold, effect.as_deref())?,
    }

    Ok(())
}
