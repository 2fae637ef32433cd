pub mod config_cmd;
pub mod export;
pub mod init;
pub mod show;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDateTime};
use tokio::runtime::Runtime;
use wptree::classify::Classifier;
use wptree::config::Config;
use wptree::fetch::{Fetcher, LOAD_FAILURE_BANNER, Source, SourceFailure};
use wptree::filter::{Interval, RowFilter};
use wptree::table::Table;

/// Source and filter choices shared by `show` and `export`
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub sources: Vec<String>,
    pub end: Option<Interval>,
    pub this_year: bool,
    pub progress: Option<Interval>,
    pub shallow: bool,
    pub all_statuses: bool,
}

impl TableOptions {
    /// Merge command-line choices over the configured defaults
    pub fn row_filter(&self, config: &Config, now: NaiveDateTime) -> Result<RowFilter> {
        let mut filter = config.row_filter()?;

        if let Some(end) = &self.end {
            end.check_dates().context("Invalid --end")?;
            filter.end_range = Some(end.clone());
        } else if self.this_year {
            filter.end_range = Some(Interval::calendar_year(now.year()));
        }
        if let Some(progress) = &self.progress {
            progress.check_numbers().context("Invalid --progress")?;
            filter.progress = Some(progress.clone());
        }
        if self.shallow {
            filter.descendants = false;
        }
        if self.all_statuses {
            filter.excluded_statuses.clear();
        }
        Ok(filter)
    }

    pub fn sources(&self, config: &Config) -> Vec<Source> {
        if self.sources.is_empty() {
            config.sources()
        } else {
            self.sources.iter().map(|s| Source::parse(s)).collect()
        }
    }
}

/// A filtered, highlighted table plus the sources that failed to load
pub struct LoadedTable {
    pub table: Table,
    pub classifier: Classifier,
    pub failures: Vec<SourceFailure>,
}

/// Fetch every source, reshape, filter and highlight.
pub fn load_table(dir: &Path, options: &TableOptions) -> Result<LoadedTable> {
    let config = Config::load(dir).context("Failed to load config")?;
    let sources = options.sources(&config);
    if sources.is_empty() {
        anyhow::bail!(
            "No sources configured. Pass --source or add urls under [sources] in {}",
            dir.join("config.toml").display()
        );
    }

    let now = Local::now().naive_local();
    let filter = options.row_filter(&config, now)?;
    let classifier = config.classifier(now)?;

    let fetcher = Fetcher::new(Duration::from_secs(config.sources.timeout_secs))
        .context("Failed to create HTTP client")?;
    let rt = Runtime::new().context("Failed to create async runtime")?;
    let report = rt.block_on(fetcher.fetch_all(&sources));

    let mut table = Table::new(report.records).with_date_format(config.display.date_format.clone());
    table.apply_filter(&filter);
    table.annotate(&classifier);

    Ok(LoadedTable {
        table,
        classifier,
        failures: report.failures,
    })
}

/// Tell the user once that some data is missing, with the reason per source
pub fn print_failure_banner(failures: &[SourceFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("{}", LOAD_FAILURE_BANNER);
    for failure in failures {
        eprintln!("  {}: {}", failure.source, failure.error);
    }
}
