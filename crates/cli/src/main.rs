use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod scenario;

use provenance::{header, write_sidecar, Payload};
use scenario::Scenario;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Scenario runner for spherical parcel-mesh advection")]
struct Cmd {
    /// Optional run label; propagated to outputs and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Advect a scenario and write per-step reports as JSON
    Run {
        /// Scenario file; the built-in default scenario when omitted
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Override the scenario's step count
        #[arg(long)]
        steps: Option<u64>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the default scenario, a starting point for editing
    Scenario,
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            scenario,
            steps,
            out,
        } => run(scenario.as_deref(), steps, &out, cmd.tag),
        Action::Scenario => {
            println!("{}", serde_json::to_string_pretty(&Scenario::default())?);
            Ok(())
        }
        Action::Report => report(cmd.tag),
    }
}

fn run(path: Option<&Path>, steps: Option<u64>, out: &Path, tag: Option<String>) -> Result<()> {
    let mut scenario = match path {
        Some(p) => Scenario::load(p)?,
        None => Scenario::default(),
    };
    if let Some(steps) = steps {
        scenario.steps = steps;
    }
    tracing::info!(
        scenario = ?path,
        steps = scenario.steps,
        dt = scenario.dt(),
        out = %out.display(),
        tag = ?tag,
        "run"
    );

    let summary = scenario.run()?;
    let last = summary.reports.last();
    let (edges_split, edges_merged, polygons_split) =
        summary.reports.iter().fold((0, 0, 0), |acc, r| {
            (
                acc.0 + r.guard.edges_split,
                acc.1 + r.guard.edges_merged,
                acc.2 + r.guard.polygons_split,
            )
        });
    tracing::info!(
        polygons = last.map(|r| r.polygons),
        edges_split,
        edges_merged,
        polygons_split,
        "done"
    );

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(out, serde_json::to_vec_pretty(&summary)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let payload = Payload::new(serde_json::to_value(&scenario)?)
        .with_tag(tag)
        .with_summary(serde_json::json!({
            "polygons": last.map(|r| r.polygons),
            "area_bias": last.map(|r| r.area_bias),
            "edges_split": edges_split,
            "edges_merged": edges_merged,
            "polygons_split": polygons_split,
            "initial_mass": summary.initial_mass,
            "final_mass": summary.final_mass,
        }));
    let prov = write_sidecar(out, payload)?;
    tracing::info!(provenance = %prov.display(), "wrote");
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let mut obj = header(tag.as_deref());
    obj["params"] = serde_json::to_value(Scenario::default())?;
    obj["outputs"] = serde_json::json!([]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
