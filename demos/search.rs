//! Search a hub and download the matching products.
//!
//! ```text
//! HUBFETCH_HUBS=hubs.json cargo run --example search -- scihub "producttype:SL_2_LST___" ./products
//! HUBFETCH_HUBS=hubs.json cargo run --example search -- --list
//! ```
//!
//! `hubs.json` holds `{"hubs": [{"id": "...", "url": "...", "username": "...",
//! "password": "...", "dialect": "opensearch"}]}`. Without a destination the
//! matching titles are only listed.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use console::style;
use hubfetch::{DownloaderBuilder, HubRegistry, SearchRequest, Status};
use indicatif::HumanBytes;
use tracing_subscriber::EnvFilter;

fn load_registry() -> Result<HubRegistry> {
    let path = std::env::var("HUBFETCH_HUBS").unwrap_or_else(|_| "hubs.json".into());
    let raw = std::fs::read_to_string(&path).wrap_err_with(|| format!("cannot read {}", path))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("cannot parse {}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "hubfetch=info".into()))
        .init();

    let registry = load_registry()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("--list") {
        println!("Available hubs: {}", registry.describe(None));
        return Ok(());
    }

    let (hub_id, filter) = match (args.first(), args.get(1)) {
        (Some(hub), Some(filter)) => (hub.as_str(), filter.as_str()),
        _ => return Err(eyre!("usage: search <hub> <filter> [destination] | --list")),
    };
    let hub = registry.get(hub_id)?.clone();
    println!("Using hub {}", registry.describe(Some(hub_id)));

    let mut request = SearchRequest::new(filter);
    if let Some(destination) = args.get(2) {
        request = request.destination(destination);
    }

    let downloader = DownloaderBuilder::new(hub).concurrent_downloads(2).build()?;
    let report = downloader.search(request).await;

    if report.summaries.is_empty() {
        for title in &report.outcome.titles {
            println!(" ** {}", title);
        }
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Product", "Size", "Time", "Status"]);
        for summary in &report.summaries {
            let status = match summary.status() {
                Status::Success => style("done").green().to_string(),
                Status::Fail(msg) => style(format!("failed: {}", msg)).red().to_string(),
            };
            table.add_row(vec![
                summary.record().name.clone(),
                HumanBytes(summary.size()).to_string(),
                format!("{:.1}s", summary.elapsed().as_secs_f64()),
                status,
            ]);
        }
        println!("{table}");
    }

    println!(
        "{} products found, {} skipped as already downloaded, {} downloaded, {} failed",
        report.outcome.titles.len(),
        report.outcome.skipped,
        report.succeeded(),
        report.failed()
    );

    match report.outcome.error {
        Some(e) => Err(e).wrap_err("search aborted before the last page"),
        None => Ok(()),
    }
}
