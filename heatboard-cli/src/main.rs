mod reports;
mod settings;
mod source;
mod util;
mod views;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use heatboard_engine::{
    DayBreakdown, RankChart, Snapshot, SnapshotStore, last_n_dates, yesterday,
};
use reports::{LeaderRow, Report, SelectionSummary, StatsTable, WindowSummary};
use settings::Settings;
use source::{ArchiveSource, DirSource, HttpSource};
use views::{View, expand_views, list_views};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Dev server endpoint (`/leaderboard?date=`)
    Local,
    /// Static archive (`/<date>.json`)
    Remote,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Nice-number bins sized from the day's score range
    Adaptive,
    /// 100-point bins from 0 to 600 with under/overflow buckets
    Fixed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Name,
    Appearances,
    BestRank,
    BestRankDate,
}

#[derive(Debug, Parser)]
#[command(name = "heatboard", version = "0.1.0")]
#[command(about = "Daily leaderboard history: rank charts, score distributions and player stats")]
pub struct Args {
    /// Archive addressing scheme (overrides the config file)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Base URL for the selected mode
    #[arg(long)]
    base_url: Option<String>,

    /// Read snapshots from a local directory of `<date>.json` files instead of HTTP
    #[arg(long)]
    archive_dir: Option<PathBuf>,

    /// Day to show (YYYY-MM-DD, not after today); defaults to yesterday
    #[arg(long)]
    date: Option<String>,

    /// Move the selected day by this many days (never past today)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    step: i64,

    /// Override today's UTC date (YYYY-MM-DD)
    #[arg(long)]
    today: Option<String>,

    /// Number of days in the rank-history window, ending yesterday
    #[arg(long)]
    days: Option<usize>,

    /// Report sections to render (comma-separated, or `all`)
    #[arg(long, default_value = "leaders,ranks,scores,missions")]
    views: String,

    /// List all available views and exit
    #[arg(long)]
    list_views: bool,

    /// Score histogram binning policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Case-insensitive player name filter for the stats view
    #[arg(long, default_value = "")]
    search: String,

    /// Stats column to sort by
    #[arg(long, value_enum, default_value_t = SortArg::BestRank)]
    sort: SortArg,

    /// Flip the sort column's default direction
    #[arg(long)]
    reverse: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON config file with `chart` and `deployment` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_views(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let settings = Settings::resolve(&args)?;
    let (views, unknown) = expand_views(&args.views);
    for name in unknown {
        eprintln!("⚠️  Unknown view: {}", name.yellow());
    }

    let source = build_source(&settings)?;
    let report = build_report(&args, &settings, &views, source).await;
    write_reports(&args, &report, start_time)?;
    Ok(())
}

fn maybe_list_views(args: &Args) -> Result<bool> {
    if !args.list_views {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available views:")?;
    for (key, description) in list_views() {
        writeln!(output_target.writer(), "  {key:10} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    eprintln!("{}", "🔥 Heatboard".bright_cyan().bold());
    eprintln!("{}", "============".cyan());
}

fn build_source(settings: &Settings) -> Result<ArchiveSource> {
    match &settings.archive_dir {
        Some(dir) => Ok(ArchiveSource::Dir(DirSource::new(dir))),
        None => Ok(ArchiveSource::Http(HttpSource::new(
            settings.deployment.clone(),
        )?)),
    }
}

async fn build_report(
    args: &Args,
    settings: &Settings,
    views: &[View],
    source: ArchiveSource,
) -> Report {
    let description = source.describe();
    let mut store = SnapshotStore::new(source, settings.today);

    let window_dates = last_n_dates(yesterday(settings.today), settings.chart.window_days);
    let window = store.load_window(window_dates).await;
    let window_summary = WindowSummary {
        dates: window.dates().to_vec(),
        present: window.axis_dates(),
    };
    if args.verbose {
        for date in window.dates() {
            let status = if window.get(*date).is_some() {
                "loaded".green()
            } else {
                "absent".yellow()
            };
            eprintln!("   {date} {status}");
        }
    }
    let ranks = views
        .contains(&View::Ranks)
        .then(|| RankChart::build(store.window(), &settings.chart));

    let state = store.select_date(settings.selected).await.clone();
    let shown: Option<Arc<Snapshot>> = store.displayed_snapshot();
    let selection = SelectionSummary::new(
        settings.selected,
        store.displayed_date(),
        &state,
        shown.as_ref().map(|s| s.date),
    );
    if store.dismiss() {
        log::debug!("dismissed failed selection, back on {}", store.displayed_date());
    }

    let leaders = views.contains(&View::Leaders).then(|| {
        shown
            .as_ref()
            .map_or_else(Vec::new, |s| s.entries.iter().map(LeaderRow::from).collect())
    });
    let day = shown
        .as_ref()
        .filter(|_| views.contains(&View::Scores) || views.contains(&View::Missions))
        .map(|s| DayBreakdown::build(s, &settings.chart));
    let stats = if views.contains(&View::Stats) {
        load_stats(store.source(), args, settings).await
    } else {
        None
    };

    Report {
        today: settings.today,
        source: description,
        views: views.to_vec(),
        window: window_summary,
        selection,
        leaders,
        ranks,
        day,
        stats,
    }
}

async fn load_stats(source: &ArchiveSource, args: &Args, settings: &Settings) -> Option<StatsTable> {
    match source.fetch_stats().await {
        Ok(data) => Some(StatsTable {
            rows: data
                .rows(&args.search, settings.sort)
                .into_iter()
                .cloned()
                .collect(),
            last_updated: data.last_updated,
            query: args.search.clone(),
            sort: settings.sort,
        }),
        Err(e) => {
            eprintln!("⚠️  Stats unavailable: {e:#}");
            None
        }
    }
}

fn write_reports(args: &Args, report: &Report, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, report)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, report)?,
        "csv" => reports::generate_csv_report(&mut output_target, report)?,
        _ => {
            reports::generate_console_report(&mut output_target, report)?;
            let duration = start_time.elapsed();
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
