use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use heatboard_engine::{
    DayBreakdown, Entry, FetchRequestState, PlayerStat, RankChart, SegmentStyle, SortState,
};
use serde::Serialize;

use crate::util::{bar, csv_field, format_points};
use crate::views::View;

#[derive(Debug, Serialize)]
pub struct Report {
    pub today: NaiveDate,
    pub source: String,
    pub views: Vec<View>,
    pub window: WindowSummary,
    pub selection: SelectionSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaders: Option<Vec<LeaderRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranks: Option<RankChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<DayBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsTable>,
}

impl Report {
    fn wants(&self, view: View) -> bool {
        self.views.contains(&view)
    }
}

#[derive(Debug, Serialize)]
pub struct WindowSummary {
    pub dates: Vec<NaiveDate>,
    pub present: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStatus {
    Ready,
    NotCached,
    Error,
    Pending,
}

#[derive(Debug, Serialize)]
pub struct SelectionSummary {
    pub requested: NaiveDate,
    pub displayed: NaiveDate,
    pub status: SelectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Day the single-day views were computed from, if any.
    pub shown: Option<NaiveDate>,
}

impl SelectionSummary {
    pub fn new(
        requested: NaiveDate,
        displayed: NaiveDate,
        state: &FetchRequestState,
        shown: Option<NaiveDate>,
    ) -> Self {
        let (status, message) = match state {
            FetchRequestState::Ready(_) => (SelectionStatus::Ready, None),
            FetchRequestState::NotCached { date } => (
                SelectionStatus::NotCached,
                Some(format!("No cached leaderboard for {date}")),
            ),
            FetchRequestState::Error { message, .. } => {
                (SelectionStatus::Error, Some(message.clone()))
            }
            FetchRequestState::Idle | FetchRequestState::Loading { .. } => {
                (SelectionStatus::Pending, None)
            }
        };
        Self {
            requested,
            displayed,
            status,
            message,
            shown,
        }
    }
}

/// One row of the selected day's leaderboard with decoded details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderRow {
    pub rank: u32,
    pub name: String,
    pub score: i64,
    pub missions: Option<u8>,
    pub expenses: Option<i64>,
    pub time: Option<String>,
    pub style: Option<String>,
}

impl From<&Entry> for LeaderRow {
    fn from(entry: &Entry) -> Self {
        let details = entry.details().ok();
        Self {
            rank: entry.rank,
            name: entry.name.clone(),
            score: entry.score,
            missions: details.as_ref().map(|d| d.missions),
            expenses: details.as_ref().map(|d| d.expenses),
            time: details.as_ref().map(heatboard_engine::RunDetails::time_label),
            style: details.as_ref().map(heatboard_engine::RunDetails::style_label),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsTable {
    pub last_updated: String,
    pub query: String,
    pub sort: SortState,
    pub rows: Vec<PlayerStat>,
}

fn dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn view_keys(views: &[View]) -> String {
    views.iter().map(|v| v.key()).collect::<Vec<_>>().join(", ")
}

pub fn generate_console_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    writeln!(out, "{}", "📋 Heatboard Report".bright_cyan().bold())?;
    writeln!(out, "{}", "===================".cyan())?;
    writeln!(out, "Source: {}", report.source)?;
    writeln!(out, "Views: {}", view_keys(&report.views))?;
    writeln!(
        out,
        "Window: {} days, {} present",
        report.window.dates.len(),
        report.window.present.len()
    )?;
    let selection = &report.selection;
    match selection.status {
        SelectionStatus::Ready => {
            writeln!(out, "Selected: {} {}", selection.displayed, "ready".green())?;
        }
        _ => writeln!(
            out,
            "Selected: {} {} ({}); showing {}",
            selection.requested,
            dash(selection.message.as_deref()).yellow(),
            format!("{:?}", selection.status).to_lowercase(),
            selection
                .shown
                .map_or_else(|| "nothing".to_string(), |d| d.to_string())
        )?,
    }
    writeln!(out)?;

    if report.wants(View::Leaders) {
        write_console_leaders(out, report.leaders.as_deref())?;
    }
    if report.wants(View::Ranks) {
        if let Some(chart) = &report.ranks {
            write_console_ranks(out, chart)?;
        }
    }
    if report.wants(View::Scores) {
        write_console_scores(out, report.day.as_ref())?;
    }
    if report.wants(View::Missions) {
        write_console_missions(out, report.day.as_ref())?;
    }
    if report.wants(View::Stats) {
        write_console_stats(out, report.stats.as_ref())?;
    }
    Ok(())
}

fn write_console_leaders(out: &mut dyn Write, leaders: Option<&[LeaderRow]>) -> Result<()> {
    writeln!(out, "{}", "🏆 Leaderboard".bright_yellow().bold())?;
    let Some(rows) = leaders.filter(|rows| !rows.is_empty()) else {
        writeln!(out, "   No entries for the selected day.")?;
        writeln!(out)?;
        return Ok(());
    };
    for row in rows {
        writeln!(
            out,
            "   {:>3}. {:<24} {:>6}  missions {}  expenses {:>5}  time {:>5}  style {:>4}",
            row.rank,
            row.name,
            row.score,
            row.missions.map_or_else(|| "-".to_string(), |m| format!("{m}/3")),
            row.expenses.map_or_else(|| "-".to_string(), |e| e.to_string()),
            dash(row.time.as_deref()),
            dash(row.style.as_deref())
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_console_ranks(out: &mut dyn Write, chart: &RankChart) -> Result<()> {
    writeln!(out, "{}", "📈 Rank History".bright_yellow().bold())?;
    if chart.is_empty() {
        writeln!(out, "   No snapshots available in the window.")?;
        writeln!(out)?;
        return Ok(());
    }
    let axis: Vec<String> = chart.axis_labels.iter().map(|l| format!("{l:>3}")).collect();
    writeln!(out, "   {:<24} {}", "", axis.join(""))?;
    for series in &chart.series {
        let dashed = series
            .segments()
            .iter()
            .any(|s| s.style == SegmentStyle::Dashed);
        writeln!(
            out,
            "   {:<24} {}{}  {}",
            series.name,
            format_points(&series.points),
            if dashed { "  ┄" } else { "" },
            series.color.as_str().dimmed()
        )?;
    }
    for marker in &chart.overlaps {
        let colors: Vec<&str> = marker.colors.iter().map(|c| c.as_str()).collect();
        let day = chart
            .axis_labels
            .get(marker.key.day_index)
            .map_or("?", String::as_str);
        writeln!(
            out,
            "   ⚠️  shared rank {} on {day}: {}",
            marker.key.value,
            colors.join(", ")
        )?;
    }
    let legend: Vec<&str> = chart.legend().iter().map(|p| p.name.as_str()).collect();
    writeln!(out, "   Legend: {}", legend.join(", "))?;
    writeln!(out)?;
    Ok(())
}

fn write_console_scores(out: &mut dyn Write, day: Option<&DayBreakdown>) -> Result<()> {
    writeln!(out, "{}", "📊 Score Distribution".bright_yellow().bold())?;
    let Some(histogram) = day.and_then(|d| d.histogram.as_ref()) else {
        writeln!(out, "   No distribution available.")?;
        writeln!(out)?;
        return Ok(());
    };
    let max = histogram.buckets.iter().map(|b| b.count).max().unwrap_or(0);
    for bucket in &histogram.buckets {
        writeln!(
            out,
            "   {:>12} | {:<20} {}",
            bucket.label,
            bar(bucket.count, max, 20),
            bucket.count
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_console_missions(out: &mut dyn Write, day: Option<&DayBreakdown>) -> Result<()> {
    writeln!(out, "{}", "🎯 Missions Completed".bright_yellow().bold())?;
    let Some(day) = day else {
        writeln!(out, "   No snapshot for the selected day.")?;
        writeln!(out)?;
        return Ok(());
    };
    let max = day.missions.iter().map(|b| b.count).max().unwrap_or(0);
    for bucket in &day.missions {
        writeln!(
            out,
            "   {:>5} | {:<20} {}",
            bucket.label,
            bar(bucket.count, max, 20),
            bucket.count
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_console_stats(out: &mut dyn Write, stats: Option<&StatsTable>) -> Result<()> {
    writeln!(out, "{}", "👥 Player Stats".bright_yellow().bold())?;
    let Some(table) = stats else {
        writeln!(out, "   Stats unavailable.")?;
        writeln!(out)?;
        return Ok(());
    };
    writeln!(out, "   Last updated: {}", table.last_updated)?;
    if table.rows.is_empty() {
        writeln!(out, "   No players match {:?}.", table.query)?;
    }
    for row in &table.rows {
        writeln!(
            out,
            "   {:<24} {:>5} appearances  best #{:<3} on {}",
            row.name, row.appearances, row.best_rank, row.best_rank_date
        )?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    writeln!(out, "# Heatboard Report\n")?;
    writeln!(out, "- **Source**: {}", report.source)?;
    writeln!(out, "- **Views**: {}", view_keys(&report.views))?;
    writeln!(
        out,
        "- **Window**: {} days, {} present",
        report.window.dates.len(),
        report.window.present.len()
    )?;
    writeln!(
        out,
        "- **Selected**: {} ({})\n",
        report.selection.requested,
        dash(report.selection.message.as_deref())
    )?;

    if let Some(rows) = report.leaders.as_ref().filter(|_| report.wants(View::Leaders)) {
        writeln!(out, "## Leaderboard\n")?;
        writeln!(out, "| Rank | Player | Score | Missions | Expenses | Time | Style |")?;
        writeln!(out, "|---:|---|---:|---:|---:|---:|---:|")?;
        for row in rows {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} | {} |",
                row.rank,
                row.name,
                row.score,
                row.missions.map_or_else(|| "-".to_string(), |m| m.to_string()),
                row.expenses.map_or_else(|| "-".to_string(), |e| e.to_string()),
                dash(row.time.as_deref()),
                dash(row.style.as_deref())
            )?;
        }
        writeln!(out)?;
    }

    if let Some(chart) = report.ranks.as_ref().filter(|_| report.wants(View::Ranks)) {
        writeln!(out, "## Rank History\n")?;
        if chart.is_empty() {
            writeln!(out, "_No snapshots available in the window._\n")?;
        } else {
            writeln!(out, "| Player | {} |", chart.axis_labels.join(" | "))?;
            writeln!(out, "|---|{}", "---:|".repeat(chart.axis_labels.len()))?;
            for series in &chart.series {
                let cells: Vec<String> = series
                    .points
                    .iter()
                    .map(|p| p.map_or_else(|| "·".to_string(), |v| v.to_string()))
                    .collect();
                writeln!(out, "| {} | {} |", series.name, cells.join(" | "))?;
            }
            writeln!(out)?;
        }
    }

    if report.wants(View::Scores) {
        writeln!(out, "## Score Distribution\n")?;
        match report.day.as_ref().and_then(|d| d.histogram.as_ref()) {
            Some(histogram) => {
                writeln!(out, "| Bucket | Count |")?;
                writeln!(out, "|---|---:|")?;
                for bucket in &histogram.buckets {
                    writeln!(out, "| {} | {} |", bucket.label, bucket.count)?;
                }
                writeln!(out)?;
            }
            None => writeln!(out, "_No distribution available._\n")?,
        }
    }

    if let Some(day) = report.day.as_ref().filter(|_| report.wants(View::Missions)) {
        writeln!(out, "## Missions Completed\n")?;
        for bucket in &day.missions {
            writeln!(out, "- **{}**: {}", bucket.label, bucket.count)?;
        }
        writeln!(out)?;
    }

    if let Some(table) = report.stats.as_ref().filter(|_| report.wants(View::Stats)) {
        writeln!(out, "## Player Stats\n")?;
        writeln!(out, "_Last updated {}_\n", table.last_updated)?;
        writeln!(out, "| Player | Appearances | Best Rank | Best Rank Date |")?;
        writeln!(out, "|---|---:|---:|---|")?;
        for row in &table.rows {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                row.name, row.appearances, row.best_rank, row.best_rank_date
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Long-form rank rows (`date,steam_id,name,color,rank`), blank rank for a gap.
pub fn generate_csv_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    writeln!(out, "date,steam_id,name,color,rank")?;
    let Some(chart) = &report.ranks else {
        return Ok(());
    };
    for series in &chart.series {
        for (date, point) in chart.axis_dates.iter().zip(&series.points) {
            writeln!(
                out,
                "{date},{},{},{},{}",
                series.player_id,
                csv_field(&series.name),
                series.color,
                point.map_or_else(String::new, |v| v.to_string())
            )?;
        }
    }
    Ok(())
}
