//! Benchmark harness for the clustering engine
//!
//! Samples a planted-partition graph, clusters it and prints the shape of the result together
//! with the time it took. The tree fingerprint makes runs with different thread counts or
//! builds easy to compare.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use serde::Serialize;

use thicket_common::ClusteringSettings;
use thicket_test::PlantedPartition;

#[derive(Parser)]
#[command(name = "thicket-bench")]
#[command(about = "Cluster a synthetic planted-partition graph and report timing and tree shape")]
#[command(version)]
struct Cli {
    /// Number of planted communities
    #[arg(long, default_value = "8")]
    communities: u32,

    /// Vertices per community
    #[arg(long, default_value = "250")]
    community_size: u32,

    /// Edge probability inside a community
    #[arg(long, default_value = "0.1")]
    p_in: f64,

    /// Edge probability across communities
    #[arg(long, default_value = "0.002")]
    p_out: f64,

    /// Random seed for the graph generator
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Clustering settings (TOML); defaults are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    vertices: usize,
    edge_entries: usize,
    build_ms: f64,
    cluster_ms: f64,
    clusters: usize,
    max_depth: usize,
    root_remainder: usize,
    fingerprint: String,
}

fn main() {
    if let Err(e) = run() {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let settings = match &cli.settings {
        Some(path) => ClusteringSettings::from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ClusteringSettings::default(),
    };

    let params = PlantedPartition {
        communities: cli.communities,
        community_size: cli.community_size,
        p_in: cli.p_in,
        p_out: cli.p_out,
        seed: cli.seed,
    };

    let start = Instant::now();
    let graph = params
        .generate()
        .build()
        .context("Failed to build the planted-partition graph")?;
    let build_time = start.elapsed();
    info!(
        "Sampled {} vertices / {} adjacency entries in {:?}",
        graph.order(),
        graph.storage().entries(),
        build_time
    );

    let start = Instant::now();
    let tree = thicket_cluster::run(&graph, &settings);
    let cluster_time = start.elapsed();

    let report = Report {
        vertices: graph.order(),
        edge_entries: graph.storage().entries(),
        build_ms: build_time.as_secs_f64() * 1000.0,
        cluster_ms: cluster_time.as_secs_f64() * 1000.0,
        clusters: tree.cluster_count(),
        max_depth: tree.max_depth(),
        root_remainder: tree.remainder(tree.root()).len(),
        fingerprint: format!("{:016x}", tree.fingerprint()),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{json}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!("Graph");
    println!("  vertices:        {}", report.vertices);
    println!("  edge entries:    {}", report.edge_entries);
    println!("  build:           {:.2} ms", report.build_ms);
    println!("Clustering");
    println!("  time:            {:.2} ms", report.cluster_ms);
    println!("  clusters:        {}", report.clusters);
    println!("  max depth:       {}", report.max_depth);
    println!("  root remainder:  {}", report.root_remainder);
    println!("  fingerprint:     {}", report.fingerprint);
}
