mod cleaning;
mod config;
mod error;
mod export;
mod graph_builder;
mod layout;
mod node_identification;
mod render;

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::export::{write_hubs_csv, write_layout_json};
use crate::graph_builder::build_graph_from_csvs;
use crate::render::{draw_di_graph, export_to_graphviz, highlight_important_nodes, SvgCanvas};

fn main() -> Result<()> {
    init_tracing();

    let config = match env::args().nth(1) {
        Some(path) => Config::load(Path::new(&path))
            .with_context(|| format!("loading config from {path}"))?,
        None => Config::default(),
    };

    let (graph, report) = build_graph_from_csvs(&config.data_dir, &config.ingest)
        .with_context(|| format!("building graph from {}", config.data_dir))?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        files = report.files_read,
        dropped = report.dropped_unresolved,
        malformed = report.malformed_skipped,
        "graph loaded"
    );

    if graph.node_count() == 0 {
        warn!("graph is empty, nothing to draw");
        return Ok(());
    }

    let render = &config.render;
    let mut canvas = SvgCanvas::new(render.width, render.height);
    let drawing = draw_di_graph(
        &graph,
        &mut canvas,
        None,
        render.scale_by_degree,
        &config.layout,
    )?;
    let hubs = highlight_important_nodes(&graph, &mut canvas, &drawing.layout, render.top_n_hubs)?;

    for (rank, hub) in hubs.iter().enumerate() {
        info!(rank = rank + 1, id = %hub.id, degree = hub.degree, "hub");
    }

    if let Some(path) = &render.svg_output {
        canvas.save(path)?;
    }
    if let Some(path) = &render.dot_output {
        export_to_graphviz(&graph, &hubs, path)?;
    }
    if let Some(path) = &render.hubs_output {
        write_hubs_csv(&hubs, path)?;
    }
    if let Some(path) = &render.layout_output {
        write_layout_json(&drawing.layout, path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TWEET_NETWORK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("tweet_network=info,warn"));

    let format = env::var("TWEET_NETWORK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}
