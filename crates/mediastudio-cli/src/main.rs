//! Media Studio CLI
//!
//! Headless timeline editing: create a timeline snapshot, apply a JSON op
//! script to it, validate it, or print a summary.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use mediastudio_lib::{
    validate_timeline, SettingsManager, Snapshot, StudioSettings, TimelineOp, TimelineState,
    TimelineStore, TrackKind,
};

#[derive(Parser, Debug)]
#[command(name = "mediastudio-cli")]
#[command(about = "Headless timeline editing for Media Studio")]
#[command(version)]
struct Cli {
    /// Settings file (defaults are used when missing)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Directory for a daily rolling log file
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a fresh default timeline
    New {
        #[arg(short, long)]
        output: PathBuf,
        /// Extra track to append (video, audio or text); repeatable
        #[arg(long = "track", value_name = "TYPE")]
        tracks: Vec<TrackKind>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Apply a JSON array of ops to a timeline
    Apply {
        #[arg(short, long)]
        input: PathBuf,
        /// File holding the ops array
        #[arg(long)]
        ops: PathBuf,
        /// Where to write the result (defaults to the input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report overlaps and missing media
    Validate {
        #[arg(short, long)]
        input: PathBuf,
        /// Exit with an error when there are warnings
        #[arg(long)]
        strict: bool,
    },
    /// Print tracks and clips
    Show {
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// One line of `apply` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OpSummary {
    op: &'static str,
    changed: bool,
}

fn init_logging(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "mediastudio.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    Ok(guard)
}

fn load_settings(path: Option<&Path>) -> StudioSettings {
    match path {
        Some(path) => SettingsManager::with_file(path).load(),
        None => StudioSettings::default(),
    }
}

/// Parses an ops script. `duplicateClip` entries without an offset take the
/// configured one.
fn parse_ops(json: &str, duplicate_offset: f64) -> anyhow::Result<Vec<TimelineOp>> {
    let mut values: Vec<Value> =
        serde_json::from_str(json).context("Ops file must be a JSON array")?;

    for value in &mut values {
        if let Some(obj) = value.as_object_mut() {
            if obj.get("op").and_then(Value::as_str) == Some("duplicateClip") {
                obj.entry("offset").or_insert_with(|| duplicate_offset.into());
            }
        }
    }

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| serde_json::from_value(v).with_context(|| format!("Invalid op at index {}", i)))
        .collect()
}

fn summarize(state: &TimelineState) -> String {
    let mut out = format!(
        "Timeline: {:.2}s total, {} track(s), {} clip(s)\n",
        state.total_duration,
        state.tracks.len(),
        state.clip_count()
    );
    for track in &state.tracks {
        out.push_str(&format!(
            "  [{}] {} ({}), ends at {:.2}s\n",
            track.kind,
            track.name,
            track.id,
            track.end_time()
        ));
        for clip in &track.clips {
            let marker = if state.selected_clip_ids.contains(&clip.id) {
                "*"
            } else {
                " "
            };
            out.push_str(&format!(
                "   {} {:>8.2} - {:>8.2}  {} ({})\n",
                marker, clip.start_time, clip.end_time, clip.title, clip.id
            ));
        }
    }
    out
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.settings.as_deref());

    match cli.command {
        Command::New {
            output,
            tracks,
            force,
        } => {
            if Snapshot::exists(&output) && !force {
                bail!("{} already exists (use --force to overwrite)", output.display());
            }
            let store = TimelineStore::from_settings(&settings);
            for kind in tracks {
                store.dispatch(&TimelineOp::AddTrack { kind, name: None })?;
            }
            Snapshot::save(&output, &store.snapshot()?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Created timeline at {}", output.display());
        }
        Command::Apply { input, ops, output } => {
            let state = Snapshot::load(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            let script = std::fs::read_to_string(&ops)
                .with_context(|| format!("Failed to read {}", ops.display()))?;
            let ops = parse_ops(&script, settings.editor.duplicate_offset)?;

            let store =
                TimelineStore::new(state).with_max_history(settings.editor.history_limit);
            for op in &ops {
                let outcome = store.dispatch(op)?;
                if !outcome.changed {
                    warn!("{} had no effect", op.type_name());
                }
                let summary = OpSummary {
                    op: op.type_name(),
                    changed: outcome.changed,
                };
                println!("{}", serde_json::to_string(&summary)?);
            }

            let output = output.unwrap_or(input);
            Snapshot::save(&output, &store.snapshot()?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Applied {} op(s), wrote {}", ops.len(), output.display());
        }
        Command::Validate { input, strict } => {
            let state = Snapshot::load(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            let report = validate_timeline(&state);
            println!("{}", serde_json::to_string_pretty(&report)?);

            if !report.errors.is_empty() {
                bail!("{} validation error(s)", report.errors.len());
            }
            if strict && !report.warnings.is_empty() {
                bail!("{} validation warning(s)", report.warnings.len());
            }
        }
        Command::Show { input } => {
            let state = Snapshot::load(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            print!("{}", summarize(&state));
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_dir.as_deref())?;
    run(cli)
}
