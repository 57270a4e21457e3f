use crate::cli::Source;
use std::sync::Arc;
use std::time::Instant;
use tickerdump_spider::fetch::ReqwestTransport;
use tickerdump_spider::pipeline;
use tickerdump_spider::rate_limit::RateLimiter;
use tickerdump_spider::stock::nasdaq::FtpDirectory;
use tickerdump_spider::stock::sec::enrich::MAX_WORKERS;
use tickerdump_spider::stock::sec::SecClient;
use tickerdump_spider::store::{self, MemoryStore, Store};
use tickerdump_spider::Config;
use tracing::{debug, info, trace};

/// Command line settings that take precedence over the environment.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub max_enrich: Option<usize>,
    pub workers: Option<usize>,
    pub dry_run: bool,
}

impl Overrides {
    fn apply(&self, mut config: Config) -> anyhow::Result<Config> {
        if let Some(max_enrich) = self.max_enrich {
            config.max_enrich = Some(max_enrich);
        }
        if let Some(workers) = self.workers {
            anyhow::ensure!(workers > 0, "--workers must be greater than zero");
            config.workers = workers.min(MAX_WORKERS);
        }
        Ok(config)
    }
}

/// Run every requested source against one store.
pub(crate) async fn run(
    sources: Vec<Source>,
    overrides: Overrides,
    tui: bool,
) -> anyhow::Result<()> {
    let config = overrides.apply(Config::from_env()?)?;
    trace!("configuration: {config:?}");

    let store: Box<dyn Store> = if overrides.dry_run {
        debug!("dry run, collecting into memory");
        Box::new(MemoryStore::new())
    } else {
        store::connect(&config)?
    };

    let time = Instant::now();
    for source in sources {
        match source {
            Source::Listings => {
                let directory = FtpDirectory::default();
                pipeline::listings(&directory, store.as_ref(), &config, tui).await?;
            }
            Source::Sec => {
                let transport = Arc::new(ReqwestTransport::with_user_agent(&config.user_agent)?);
                let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
                let client = Arc::new(SecClient::new(transport, limiter));
                pipeline::sec(client, store.as_ref(), &config, tui).await?;
            }
        }
    }

    info!(
        "tickerdump finished collecting data, time elapsed: {:?}",
        time.elapsed()
    );

    Ok(())
}
