use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub(crate) fn banner(name: &str) {
    println!(
        "{bar}\n{name:^40}\n{bar}",
        bar = "=".repeat(40),
        name = name.bold()
    );
}

/// A single spinner for a sequential stage; hidden outside TUI mode.
pub(crate) fn spinner(tui: bool, msg: String) -> ProgressBar {
    if !tui {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::default_spinner()
        .template("{msg} {spinner:.magenta}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let pb = ProgressBar::new_spinner().with_message(msg).with_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Total / success / failure bars for a fan-out over `len` items.
///
/// Every bar is `None` outside TUI mode, so a headless run pays nothing for it.
#[derive(Clone, Default)]
pub(crate) struct Progress {
    multi: Option<MultiProgress>,
    total: Option<ProgressBar>,
    success: Option<ProgressBar>,
    fail: Option<ProgressBar>,
}

impl Progress {
    pub(crate) fn hidden() -> Self {
        Self::default()
    }

    pub(crate) fn new(tui: bool, len: usize) -> anyhow::Result<Self> {
        if tui {
            multi_progress(len)
        } else {
            Ok(Self::hidden())
        }
    }

    /// A spinner underneath the bars for one in-flight item.
    pub(crate) fn worker(&self, msg: String) -> ProgressBar {
        match &self.multi {
            Some(m) => {
                let style = ProgressStyle::default_spinner()
                    .template("\t   > {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner());
                let pb = m.add(ProgressBar::new_spinner().with_message(msg).with_style(style));
                pb.enable_steady_tick(Duration::from_millis(50));
                pb
            }
            None => ProgressBar::hidden(),
        }
    }

    pub(crate) fn record(&self, ok: bool) {
        let bar = if ok { &self.success } else { &self.fail };
        if let Some(bar) = bar {
            bar.inc(1);
        }
        if let Some(total) = &self.total {
            total.inc(1);
        }
    }

    pub(crate) fn finish(&self) {
        for bar in [&self.total, &self.success, &self.fail].into_iter().flatten() {
            bar.finish_and_clear();
        }
    }
}

fn multi_progress(len: usize) -> anyhow::Result<Progress> {
    // overall multi progress bar
    let multi = MultiProgress::new();

    // total number of companies to enrich
    let total = multi.add(
        ProgressBar::new(len as u64).with_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.magenta}\n \
                        {msg:>9.white} |{bar:57.white/grey}| {pos:<2} / {human_len} \
                        ({percent_precise}%) [Time: {elapsed}, Rate: {per_sec}, ETA: {eta}]",
                )?
                .progress_chars("## "),
        ),
    );
    total.set_message("total");
    total.enable_steady_tick(Duration::from_millis(100));

    // enriched
    let success = multi.insert_after(
        &total,
        ProgressBar::new(len as u64).with_style(
            ProgressStyle::default_bar()
                .template(" {msg:>9.green} |{bar:57.green}| {pos:<2.green}")?
                .progress_chars("## "),
        ),
    );
    success.set_message("enriched");

    // passed through unenriched
    let fail = multi.insert_after(
        &success,
        ProgressBar::new(len as u64).with_style(
            ProgressStyle::default_bar()
                .template(" {msg:>9.red} |{bar:57.red}| {pos:<2.red}")?
                .progress_chars("## "),
        ),
    );
    fail.set_message("failures");

    Ok(Progress {
        multi: Some(multi),
        total: Some(total),
        success: Some(success),
        fail: Some(fail),
    })
}
