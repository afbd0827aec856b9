use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use facade_core::cache::MeshCache;
use facade_core::scene::MemoryScene;
use facade_edit::session::{replay, Session};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "facade")]
#[command(about = "Replay and inspect facade editing sessions against an in-memory scene.")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a recorded event stream through the edit tool.
    Replay {
        session: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write the edited scene as JSON.
        #[arg(long)]
        scene_out: Option<PathBuf>,
        #[arg(long)]
        point_radius: Option<f64>,
        #[arg(long)]
        edge_tolerance: Option<f64>,
    },
    /// Summarize the mesh caches a scene would produce.
    Inspect {
        scene: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    match cli.cmd {
        Command::Replay {
            session,
            report,
            scene_out,
            point_radius,
            edge_tolerance,
        } => run_replay(
            &session,
            report.as_deref(),
            scene_out.as_deref(),
            point_radius,
            edge_tolerance,
        ),
        Command::Inspect { scene, report } => inspect(&scene, report.as_deref()),
    }
}

fn run_replay(
    input: &Path,
    report: Option<&Path>,
    scene_out: Option<&Path>,
    point_radius: Option<f64>,
    edge_tolerance: Option<f64>,
) -> Result<()> {
    ensure_input_file(input)?;
    let text = std::fs::read_to_string(input).with_context(|| format!("read session: {input:?}"))?;
    let mut session: Session =
        serde_json::from_str(&text).with_context(|| format!("parse session: {input:?}"))?;

    if let Some(radius) = point_radius {
        if radius <= 0.0 {
            bail!("--point-radius must be positive, got {radius}");
        }
        session.config.pick.point_radius = radius;
    }
    if let Some(tolerance) = edge_tolerance {
        if tolerance <= 0.0 {
            bail!("--edge-tolerance must be positive, got {tolerance}");
        }
        session.config.pick.edge_tolerance = tolerance;
    }

    info!("replaying {} events from {input:?}", session.events.len());
    let result = replay(session);

    if let Some(path) = scene_out {
        write_json(path, &result.scene, "scene")?;
    }
    emit(report, &result, "report")
}

fn inspect(input: &Path, report: Option<&Path>) -> Result<()> {
    ensure_input_file(input)?;
    let text = std::fs::read_to_string(input).with_context(|| format!("read scene: {input:?}"))?;
    let scene: MemoryScene =
        serde_json::from_str(&text).with_context(|| format!("parse scene: {input:?}"))?;

    let mut cache = MeshCache::new();
    let rebuild = cache.rebuild_all(&scene);
    let summary = facade_core::report::summarize(&cache, &rebuild);
    emit(report, &summary, "report")
}

fn emit<T: Serialize>(path: Option<&Path>, value: &T, what: &str) -> Result<()> {
    match path {
        Some(path) => write_json(path, value, what),
        None => {
            let json = serde_json::to_string_pretty(value)
                .with_context(|| format!("serialize {what}"))?;
            println!("{json}");
            Ok(())
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| format!("serialize {what}"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(path, &json).with_context(|| format!("write {what}: {path:?}"))
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
