use super::CompanySource;
use crate::error::Error;
use crate::fetch::Fetched;
use crate::stock::model::Company;
use crate::tui::Progress;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, trace};

/// Default number of companies enriched at once.
pub const WORKERS: usize = 2;

/// Upper bound on concurrent enrichment tasks, whatever is asked for.
pub const MAX_WORKERS: usize = 64;

// a progress line every so many completions when logging instead of drawing bars
const LOG_EVERY: usize = 100;

/// Submission and share counts for one company, merged into a copy of it.
///
/// A resource that comes back empty is logged and skipped; only a [`Fetched::Fatal`] outcome
/// is an error.
pub async fn enrich_one(source: &dyn CompanySource, company: &Company) -> Result<Company, Error> {
    let mut enriched = company.clone();

    match source.submission(&company.cik).await {
        Fetched::Data(submission) => enriched = enriched.with_submission(submission),
        Fetched::NoData(reason) => debug!(
            "no submission for [{}] {}, {reason}",
            company.symbol, company.cik
        ),
        Fetched::Fatal(err) => return Err(err),
    }

    match source.share_counts(&company.cik).await {
        Fetched::Data(counts) => enriched = enriched.with_share_counts(counts),
        Fetched::NoData(reason) => debug!(
            "no share counts for [{}] {}, {reason}",
            company.symbol, company.cik
        ),
        Fetched::Fatal(err) => return Err(err),
    }

    trace!("enriched [{}] {}", company.symbol, company.cik);
    Ok(enriched)
}

/// Enrich every company on at most `workers` concurrent tasks.
///
/// Results arrive in completion order and are keyed by CIK. A task that fails, or panics, hands
/// back the company it was given, so the output always holds one entry per input CIK.
pub async fn enrich(
    source: Arc<dyn CompanySource>,
    companies: Vec<Company>,
    workers: usize,
    tui: bool,
) -> anyhow::Result<HashMap<String, Company>> {
    let total = companies.len();
    let workers = workers.clamp(1, MAX_WORKERS);
    let progress = Progress::new(tui, total)?;
    debug!("enriching {total} companies on {workers} workers ...");

    let (tx, mut rx) = mpsc::channel::<(Company, Result<Company, String>)>(workers * 2);
    let semaphore = Arc::new(Semaphore::new(workers));

    // hand out companies as permits free up; the receiver below drains concurrently
    let dispatcher = tokio::spawn({
        let progress = progress.clone();
        async move {
            for company in companies {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let source = source.clone();
                let tx = tx.clone();
                let spinner = progress.worker(format!(
                    "enriching [{}] {}",
                    company.symbol, company.security_name
                ));

                tokio::spawn(async move {
                    let _permit = permit;
                    let outcome = AssertUnwindSafe(enrich_one(source.as_ref(), &company))
                        .catch_unwind()
                        .await;
                    spinner.finish_and_clear();

                    let result = match outcome {
                        Ok(Ok(enriched)) => Ok(enriched),
                        Ok(Err(err)) => Err(err.to_string()),
                        Err(panic) => Err(panic_message(panic)),
                    };
                    if tx.send((company, result)).await.is_err() {
                        error!("enrichment results channel closed early");
                    }
                });
            }
        }
    });

    let mut enriched = HashMap::with_capacity(total);
    let mut completed = 0;
    while let Some((company, result)) = rx.recv().await {
        completed += 1;
        match result {
            Ok(company) => {
                progress.record(true);
                enriched.insert(company.cik.clone(), company);
            }
            Err(reason) => {
                error!(
                    "failed to enrich [{}] {}, keeping the listed record, error({reason})",
                    company.symbol, company.cik
                );
                progress.record(false);
                enriched.insert(company.cik.clone(), company);
            }
        }

        if !tui && (completed % LOG_EVERY == 0 || completed == total) {
            info!("enriched {completed} / {total} companies");
        }
    }

    dispatcher.await?;
    progress.finish();
    Ok(enriched)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
