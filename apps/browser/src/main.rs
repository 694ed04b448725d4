use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_core::{ActiveView, CatalogCoordinator, CoordinatorState};
use clap::Parser;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_api_root};

/// Drives the catalog coordinator from the terminal and prints every state
/// snapshot as a JSON line.
#[derive(Parser, Debug)]
struct Args {
    /// Catalog endpoint, overriding browser.toml and the environment.
    #[arg(long)]
    api_root: Option<String>,
    /// Additional pages to load after the first.
    #[arg(long)]
    pages: Option<u32>,
    /// Entry name to search for once the list is loaded.
    #[arg(long, conflicts_with = "select")]
    search: Option<String>,
    /// Entry name to open as if picked from the list.
    #[arg(long)]
    select: Option<String>,
    /// Clear the filter again after searching.
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load browser settings")?;
    if let Some(root) = &args.api_root {
        settings.api_root = normalize_api_root(root).context("invalid --api-root")?;
    }
    if let Some(pages) = args.pages {
        settings.page_budget = pages;
    }
    info!(api_root = %settings.api_root, page_budget = settings.page_budget, "starting catalog browser");

    let coordinator = CatalogCoordinator::new(settings.api_root.clone());
    let mut snapshots = coordinator.subscribe_snapshots();

    coordinator.initialize().await;
    print_snapshots(&mut snapshots)?;

    for _ in 0..settings.page_budget {
        if !coordinator.snapshot().await.has_more_pages() {
            info!("catalog exhausted before page budget was spent");
            break;
        }
        coordinator.load_more().await;
        print_snapshots(&mut snapshots)?;
    }

    if let Some(query) = &args.search {
        coordinator.set_query(query.as_str()).await;
        if coordinator.snapshot().await.can_submit_query() {
            coordinator.search(query).await;
        } else {
            warn!("search query is blank, nothing to filter");
        }
        print_snapshots(&mut snapshots)?;
    } else if let Some(name) = &args.select {
        coordinator.select_entry(name).await;
        print_snapshots(&mut snapshots)?;
    }

    if args.clear {
        coordinator.clear_filter().await;
        print_snapshots(&mut snapshots)?;
    }

    summarize(&coordinator).await;
    Ok(())
}

fn print_snapshots(snapshots: &mut broadcast::Receiver<CoordinatorState>) -> Result<()> {
    loop {
        match snapshots.try_recv() {
            Ok(state) => println!(
                "{}",
                serde_json::to_string(&state).context("failed to encode snapshot")?
            ),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "snapshot printer fell behind");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return Ok(()),
        }
    }
}

async fn summarize(coordinator: &Arc<CatalogCoordinator>) {
    let state = coordinator.snapshot().await;
    if let Some(notice) = &state.notice {
        eprintln!("{notice}");
    }
    match state.view() {
        ActiveView::List => eprintln!(
            "{} entries listed{}",
            state.catalog.len(),
            if state.has_more_pages() {
                ", more available"
            } else {
                ""
            }
        ),
        ActiveView::Filtered => {
            if let Some(filter) = &state.filter_result {
                eprintln!("{}", filter.name());
                if let Some(artwork) = &filter.artwork_url {
                    eprintln!("  artwork: {artwork}");
                }
            }
            if let Some(detail) = &state.detail {
                eprintln!("  height: {}", detail.height);
                if let Some(experience) = detail.base_experience {
                    eprintln!("  base experience: {experience}");
                }
                if let Some(ability) = detail.primary_ability() {
                    eprintln!("  ability: {ability}");
                }
                if let Some(item) = detail.primary_held_item() {
                    eprintln!("  held item: {item}");
                }
            }
        }
    }
}
