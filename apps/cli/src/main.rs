// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! extract-walls - closes a room scan into a wall shell.
//!
//! Reads a PLY scan, segments it into planes, merges and extends the walls and
//! draws the ceiling and floor boundaries. The result is written as a colored
//! PLY:
//!
//! - group colors: merged walls
//! - blue: wall pieces that were merged into a group
//! - peach: patches bridging a piece to its merged wall
//! - green: ceiling and floor boundary lines
//!
//! ```text
//! extract-walls scan.ply --config config.yaml --output OutputData/6_AllPlanes.ply
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use roomshell_core::Headless;
use roomshell_processing::{Pipeline, PipelineOutput, ReconstructionConfig, SnapshotWriter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input scan (PLY)
    input: PathBuf,

    /// Reconstruction config (YAML)
    #[arg(short, long, default_value = "./config.yaml")]
    config: PathBuf,

    /// Output cloud (PLY)
    #[arg(short, long, default_value = "OutputData/6_AllPlanes.ply")]
    output: PathBuf,

    /// Write a PLY snapshot of every checkpoint into this directory
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Seed for RANSAC sampling and group colors
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "debug"
    } else {
        "info,roomshell_processing=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()))
        .init();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.unwrap_or_else(num_cpus::get))
        .build_global()
        .context("failed to initialize rayon thread pool")?;

    let config = ReconstructionConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    tracing::info!(
        config = %args.config.display(),
        point_pitch = config.point_pitch,
        min_plane_height = config.min_plane_height,
        "loaded config"
    );

    let scan = roomshell_pointcloud::read_ply(&args.input)?;
    tracing::info!(input = %args.input.display(), points = scan.len(), "loaded scan");

    let start = Instant::now();
    let pipeline = Pipeline::from_config(&config, args.seed);
    let output = match &args.snapshots {
        Some(dir) => {
            let mut writer = SnapshotWriter::new(dir)?;
            pipeline.run(&scan, &mut writer)?
        }
        None => pipeline.run(&scan, &mut Headless)?,
    };

    write_output(&args.output, &output)?;
    print_summary(&args.output, &output, start.elapsed().as_secs_f64());
    Ok(())
}

fn write_output(path: &Path, output: &PipelineOutput) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    roomshell_pointcloud::write_ply(path, &output.cloud)?;
    Ok(())
}

fn print_summary(path: &Path, output: &PipelineOutput, seconds: f64) {
    let stats = &output.stats;
    println!("Room height:      {:.2} m", output.room.height());
    println!(
        "Planes:           {} vertical, {} horizontal",
        stats.vertical_planes, stats.horizontal_planes
    );
    println!(
        "Walls kept:       {} of {} ({} short, {} isolated)",
        stats.filter.final_count,
        stats.filter.input_count,
        stats.filter.removed_short,
        stats.filter.removed_isolated
    );
    println!(
        "Groups:           {} ({} merged)",
        stats.groups, stats.merged_groups
    );
    println!(
        "Extended pieces:  {} ({} skipped)",
        stats.extension.extended, stats.extension.skipped
    );
    println!("Boundary points:  {}", stats.boundary_points);
    println!("Output:           {} points -> {}", stats.output_points, path.display());
    println!("Elapsed:          {seconds:.2} s");
}
