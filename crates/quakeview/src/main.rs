mod app;
mod report;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use quake_core::{apply_selection, compute_page, FilterSelection, Page, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Earthquake feed explorer and view API", long_about = None)]
struct Cli {
    /// Feed URL
    #[arg(long, global = true, env = "QUAKEVIEW_FEED_URL")]
    feed_url: Option<String>,

    /// Local CSV copy of the feed; wins over the feed URL
    #[arg(long, global = true, env = "QUAKEVIEW_FEED_FILE")]
    feed_file: Option<PathBuf>,

    /// TOML continent map replacing the built-in one
    #[arg(long, global = true, env = "QUAKEVIEW_REGIONS_FILE")]
    regions_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the continents and their member regions
    Continents,
    /// Load the feed and summarize what was kept and dropped
    Load,
    /// Print the views of one page as JSON
    Views(ViewsArgs),
    /// Start the JSON API server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ViewsArgs {
    /// home or summary
    #[arg(long, default_value = "home")]
    page: Page,

    /// Continent to include; repeat for several. Defaults to every continent.
    #[arg(long = "continent")]
    continents: Vec<String>,

    /// Restrict to one normalized place instead of continent regions
    #[arg(long)]
    place: Option<String>,

    #[arg(long)]
    start: Option<NaiveDate>,

    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "QUAKEVIEW_BIND_ADDR")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let settings = settings(&cli)?;

    match cli.command {
        Command::Continents => {
            let regions = settings
                .load_regions()
                .context("failed to load continent map")?;
            println!("{}", report::continents_table(&regions));
            Ok(())
        }
        Command::Load => {
            let state = AppState::from_settings(&settings)?;
            let loaded = state
                .loader
                .load()
                .await
                .with_context(|| format!("failed to load feed from {}", state.loader.cache_key()))?;
            println!("{}", report::load_table(&loaded.report));
            if let Some(rejections) = report::rejections_table(&loaded.report) {
                println!("{rejections}");
            }
            Ok(())
        }
        Command::Views(args) => {
            let state = AppState::from_settings(&settings)?;
            let loaded = state
                .loader
                .load()
                .await
                .with_context(|| format!("failed to load feed from {}", state.loader.cache_key()))?;

            let selection = if args.continents.is_empty() {
                FilterSelection::all(&state.regions)
            } else {
                FilterSelection::default().with_continents(args.continents)
            };
            let selection = match args.place {
                Some(place) => selection.with_single_place(place),
                None => selection,
            };
            let selection = selection.with_dates(args.start, args.end);

            let view = apply_selection(&loaded.table, &state.regions, &selection)?;
            info!(page = %args.page, rows = view.height(), "computing page views");
            let views = compute_page(args.page, &view)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&views).context("failed to serialize page views")?
            );
            Ok(())
        }
        Command::Serve(args) => {
            let addr = args.bind.unwrap_or(settings.bind_addr);
            let state = AppState::from_settings(&settings)?;
            info!(%addr, feed = state.loader.cache_key(), "starting quakeview API server");
            server::serve(Arc::new(state), addr).await
        }
    }
}

/// Environment settings with the global flags (or their env fallbacks) applied on top.
fn settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::from_env().context("invalid QUAKEVIEW_* environment")?;
    if let Some(url) = &cli.feed_url {
        settings.feed_url = url.clone();
    }
    if let Some(path) = &cli.feed_file {
        settings.feed_file = Some(path.clone());
    }
    if let Some(path) = &cli.regions_file {
        settings.regions_file = Some(path.clone());
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "quakeview",
            "views",
            "--page",
            "summary",
            "--continent",
            "Asia",
            "--feed-file",
            "/tmp/all_month.csv",
            "--start",
            "2023-06-01",
        ])
        .unwrap();

        let settings = settings(&cli).unwrap();
        assert_eq!(settings.feed_file, Some(PathBuf::from("/tmp/all_month.csv")));
        match cli.command {
            Command::Views(args) => {
                assert_eq!(args.page, Page::Summary);
                assert_eq!(args.continents, vec!["Asia"]);
                assert_eq!(args.start, NaiveDate::from_ymd_opt(2023, 6, 1));
            }
            other => panic!("expected views, got {other:?}"),
        }
    }
}
