use crate::config::Config;
use crate::error::Error;
use crate::load::{load, LoadReport};
use crate::stock::model::Company;
use crate::stock::nasdaq::{self, DirectorySource, ListingFile};
use crate::stock::sec::{enrich::enrich, CompanySource};
use crate::store::Store;
use crate::tui;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Download every listing file (other-listed, then NASDAQ-listed), normalize it, and load it
/// into `stocks`. A file that can't be downloaded ends the run.
pub async fn listings(
    source: &dyn DirectorySource,
    store: &dyn Store,
    config: &Config,
    tui: bool,
) -> anyhow::Result<LoadReport> {
    if tui {
        tui::banner("NASDAQ Symbol Directory");
    }

    let time = Instant::now();
    let mut report = LoadReport::default();
    for file in ListingFile::ALL {
        let time = Instant::now();
        let pb = tui::spinner(tui, format!("downloading {file} ..."));
        let text = source
            .fetch(file)
            .await
            .map_err(|err| Error::SourceUnreachable(format!("{file}: {err}")))?;

        pb.set_message(format!("normalizing {file} ..."));
        let stocks = nasdaq::parse(&text, file)?;

        pb.set_message(format!("loading {} stocks from {file} ...", stocks.len()));
        let loaded = load(store, &stocks, config.batch_size).await;
        pb.finish_and_clear();

        info!(
            "{file}: {} stocks, {loaded}, time elapsed: {:?}",
            stocks.len(),
            time.elapsed()
        );
        if tui {
            println!("{file} ... {loaded}");
        }
        report += loaded;
    }

    info!(
        "stock listings collected, {report}, time elapsed: {:?}",
        time.elapsed()
    );
    Ok(report)
}

/// Fetch the SEC ticker list, enrich the first `max_enrich` companies, and load every company
/// into `companies`. An unreachable ticker list ends the run; anything per-company does not.
pub async fn sec(
    source: Arc<dyn CompanySource>,
    store: &dyn Store,
    config: &Config,
    tui: bool,
) -> anyhow::Result<LoadReport> {
    if tui {
        tui::banner("SEC Companies");
    }

    let time = Instant::now();
    let pb = tui::spinner(tui, "fetching company tickers ...".to_string());
    let tickers = source.tickers().await.require("SEC company tickers")?;
    pb.finish_and_clear();

    let mut companies = tickers.into_companies();
    info!("{} companies listed by the SEC", companies.len());

    let cap = config
        .max_enrich
        .map_or(companies.len(), |n| n.min(companies.len()));
    let passthrough = companies.split_off(cap);
    if !passthrough.is_empty() {
        debug!(
            "enriching the first {cap} companies, {} pass through as listed",
            passthrough.len()
        );
    }

    let mut companies: Vec<Company> = enrich(source, companies, config.workers, tui)
        .await?
        .into_values()
        .chain(passthrough)
        .collect();
    companies.sort_by(|a, b| a.cik.cmp(&b.cik));

    let pb = tui::spinner(tui, format!("loading {} companies ...", companies.len()));
    let report = load(store, &companies, config.batch_size).await;
    pb.finish_and_clear();
    if tui {
        println!("companies ... {report}");
    }

    info!(
        "SEC companies collected, {report}, time elapsed: {:?}",
        time.elapsed()
    );
    Ok(report)
}
