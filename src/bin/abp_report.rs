use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use abp_terminal::aggregate::{
    self, CountRow, DefensiveRanking, Kpis, ViewInput, ViewRequest, ViewResult,
};
use abp_terminal::config::{Config, arg_value, has_flag};
use abp_terminal::export;
use abp_terminal::filter::{self, Dimension, FilterSpec};
use abp_terminal::loader;
use abp_terminal::network::{self, ActorGraph, GraphLayout, SpringLayout};
use abp_terminal::sample;

const DEMO_ROWS: usize = 600;

#[derive(Debug, Serialize)]
struct NetworkSummary {
    graph: ActorGraph,
    positions: Vec<(f64, f64)>,
}

#[derive(Debug, Serialize)]
struct ReportFile {
    generated_at: String,
    source: String,
    filter: FilterSpec,
    kpis: Option<Kpis>,
    top_executors: Vec<CountRow>,
    defensive_ranking: Option<DefensiveRanking>,
    network: Option<NetworkSummary>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = Config::from_env();
    config.apply_args(&args);

    let demo = has_flag(&args, "--demo");
    let table = if demo {
        sample::sample_table(config.layout_seed, DEMO_ROWS)
    } else {
        loader::load_default(&config)
            .with_context(|| format!("failed loading {}", config.data_path.display()))?
    };

    let spec = match arg_value(&args, "--filter").map(PathBuf::from) {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed reading filter {}", path.display()))?;
            serde_json::from_str::<FilterSpec>(&raw)
                .with_context(|| format!("invalid filter spec in {}", path.display()))?
        }
        None => FilterSpec::new(),
    };

    let filtered = filter::apply(&table, &spec);
    info!(
        total = table.len(),
        filtered = filtered.len(),
        "filters applied"
    );
    let input = ViewInput {
        full: &table,
        filtered: &filtered,
        spec: &spec,
    };

    let kpis = match aggregate::compute(&input, &ViewRequest::Kpis) {
        Ok(ViewResult::Kpis(k)) => Some(k),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "kpis unavailable");
            None
        }
    };
    let top_request = ViewRequest::TopN {
        dimension: Dimension::ExecutingPlayer,
        n: config.top_n,
    };
    let top_executors = match aggregate::compute(&input, &top_request) {
        Ok(ViewResult::Counts(rows)) => rows,
        Ok(_) => Vec::new(),
        Err(err) => {
            warn!(error = %err, "top executors unavailable");
            Vec::new()
        }
    };
    let ranking_request = ViewRequest::DefensiveRanking {
        top_n: config.top_n,
    };
    let defensive_ranking = match aggregate::compute(&input, &ranking_request) {
        Ok(ViewResult::Ranking(ranking)) => Some(ranking),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "defensive ranking unavailable");
            None
        }
    };
    let network = match network::build_actor_graph(&filtered) {
        Ok(graph) => {
            let layout = SpringLayout {
                seed: config.layout_seed,
                ..SpringLayout::default()
            };
            let positions = layout.layout(&graph);
            Some(NetworkSummary { graph, positions })
        }
        Err(err) => {
            warn!(error = %err, "connections map unavailable");
            None
        }
    };

    println!("ABP report");
    if let Some(k) = &kpis {
        println!(
            "Actions: {}/{}  attacking teams: {}  defending teams: {}",
            k.filtered_actions, k.total_actions, k.attacking_teams, k.defending_teams
        );
        println!(
            "Shots: {} ({:.1}%)  goals: {}",
            k.shots,
            k.shot_pct,
            k.goals
                .map(|g| g.to_string())
                .unwrap_or_else(|| "n/a".to_string())
        );
    }

    if !top_executors.is_empty() {
        println!();
        println!("Top executors:");
        for row in &top_executors {
            println!("  {:<24} {}", row.key, row.count);
        }
    }

    if let Some(ranking) = &defensive_ranking {
        println!();
        println!("Defensive ranking (shots conceded per action):");
        for (pos, entry) in ranking.top().iter().enumerate() {
            println!(
                "  {:>2}. {:<20} actions={} shots={} ratio={:.3}",
                pos + 1,
                entry.team,
                entry.actions,
                entry.shots_received,
                entry.shots_per_action
            );
        }
    }

    if let Some(summary) = &network {
        println!();
        println!(
            "Connections map: {} players, {} links",
            summary.graph.nodes.len(),
            summary.graph.edges.len()
        );
        for (name, (x, y)) in summary
            .graph
            .nodes
            .iter()
            .zip(&summary.positions)
            .take(config.top_n)
        {
            println!("  {name:<24} ({x:+.2}, {y:+.2})");
        }
    }

    if arg_value(&args, "--out").is_some() {
        let report = export::export_filtered(&config.export_dir, &filtered)?;
        println!();
        println!("Exported {} rows x {} columns", report.rows, report.columns);
        println!("  {}", report.csv_path.display());
        println!("  {}", report.xlsx_path.display());
    }

    if let Some(path) = arg_value(&args, "--json").map(PathBuf::from) {
        let file = ReportFile {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: if demo {
                "demo".to_string()
            } else {
                config.data_path.display().to_string()
            },
            filter: spec.clone(),
            kpis,
            top_executors,
            defensive_ranking,
            network,
        };
        let raw = serde_json::to_string_pretty(&file).context("failed serialising report")?;
        fs::write(&path, raw)
            .with_context(|| format!("failed writing report to {}", path.display()))?;
        println!();
        println!("Report: {}", path.display());
    }

    Ok(())
}
