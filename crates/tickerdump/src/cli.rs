use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    ///
    /// Without a level, progress is drawn to the terminal instead of logged.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect stock listings and SEC company data into the store (`STORE_URL`).
    Load {
        /// Specify the sources to collect.
        ///
        /// If no sources are provided, load will collect all.
        #[arg(short, long)]
        sources: Option<Vec<Source>>,

        /// Enrich only the first N SEC companies; the rest are loaded as listed.
        #[arg(long)]
        max_enrich: Option<usize>,

        /// Number of companies enriched at once.
        #[arg(short, long)]
        workers: Option<usize>,

        /// Collect into memory and discard, without connecting to a store.
        #[arg(long)]
        dry_run: bool,
    },

    /// Score how urgent a message reads.
    Urgency {
        /// The message to score.
        text: String,

        /// Score at or above which the message is urgent.
        #[arg(long, default_value_t = tickerdump_notify::urgency::DEFAULT_THRESHOLD)]
        threshold: f64,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// NASDAQ Trader symbol directory (`stocks`).
    Listings,

    /// SEC EDGAR companies, enriched with submissions and share counts (`companies`).
    Sec,
}
