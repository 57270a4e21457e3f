mod cli;
mod spider;

// remote imports
use crate::cli::Source::*;
use clap::Parser;
use cli::{Cli, TraceLevel};
use colored::Colorize;
use tickerdump_notify::UrgencyEvaluator;
use tracing::{subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preproccess the trace level
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        })?;
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    // read cli inputs
    use cli::Commands::*;
    match cli.command {
        // `tickerdump load <Option<Vec<Source>>>`: collect sources
        Load {
            sources,
            max_enrich,
            workers,
            dry_run,
        } => {
            let overrides = spider::Overrides {
                max_enrich,
                workers,
                dry_run,
            };

            // if no sources provided, collect all
            match sources {
                Some(sources) => spider::run(sources, overrides, tui).await?,
                None => spider::run(vec![Listings, Sec], overrides, tui).await?,
            }
        }

        // `tickerdump urgency <TEXT>`: score a message
        Urgency { text, threshold } => {
            let verdict = UrgencyEvaluator::new(threshold).evaluate(&text);
            let label = if verdict.urgent {
                "URGENT".red().bold()
            } else {
                "not urgent".green()
            };
            println!("{label} (score {:.2})", verdict.score);
            if !verdict.matched.is_empty() {
                println!("matched: {}", verdict.matched.join(", "));
            }
        }
    }

    Ok(())
}
