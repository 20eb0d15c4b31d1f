//! Run settings: JSON config file merged under command-line flags.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use heatboard_engine::{
    BinningPolicy, ChartConfig, Deployment, DeploymentMode, SortKey, SortState, initial_date,
    parse_date_param, step_date, today_utc,
};
use serde::Deserialize;
use thiserror::Error;

use crate::{Args, ModeArg, PolicyArg, SortArg};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("--today must be YYYY-MM-DD (got {0:?})")]
    InvalidToday(String),
    #[error("--base-url cannot be combined with --archive-dir")]
    ConflictingSources,
}

/// Shape of the `--config` JSON file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub chart: ChartConfig,
    pub deployment: Deployment,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub chart: ChartConfig,
    pub deployment: Deployment,
    pub archive_dir: Option<PathBuf>,
    pub today: NaiveDate,
    pub selected: NaiveDate,
    pub sort: SortState,
}

impl Settings {
    pub fn resolve(args: &Args) -> Result<Self> {
        if args.base_url.is_some() && args.archive_dir.is_some() {
            return Err(SettingsError::ConflictingSources.into());
        }
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let mut chart = file.chart;
        if let Some(days) = args.days {
            chart.window_days = days;
        }
        if let Some(policy) = args.policy {
            chart.histogram = merge_policy(chart.histogram, policy);
        }
        chart.validate().context("invalid chart configuration")?;

        let mut deployment = file.deployment;
        if let Some(mode) = args.mode {
            deployment.mode = match mode {
                ModeArg::Local => DeploymentMode::Local,
                ModeArg::Remote => DeploymentMode::Remote,
            };
        }
        if let Some(base) = &args.base_url {
            match deployment.mode {
                DeploymentMode::Local => deployment.local_base.clone_from(base),
                DeploymentMode::Remote => deployment.remote_base.clone_from(base),
            }
        }

        let today = match &args.today {
            Some(raw) => {
                parse_date_param(raw).ok_or_else(|| SettingsError::InvalidToday(raw.clone()))?
            }
            None => today_utc(),
        };

        let selected = resolve_selected(args.date.as_deref(), args.step, today);

        Ok(Self {
            chart,
            deployment,
            archive_dir: args.archive_dir.clone(),
            today,
            selected,
            sort: resolve_sort(args.sort, args.reverse),
        })
    }
}

fn merge_policy(current: BinningPolicy, requested: PolicyArg) -> BinningPolicy {
    match (requested, current) {
        (PolicyArg::Adaptive, BinningPolicy::Adaptive { .. })
        | (PolicyArg::Fixed, BinningPolicy::Fixed { .. }) => current,
        (PolicyArg::Adaptive, BinningPolicy::Fixed { .. }) => BinningPolicy::default(),
        (PolicyArg::Fixed, BinningPolicy::Adaptive { .. }) => BinningPolicy::reference_fixed(),
    }
}

fn resolve_selected(param: Option<&str>, step: i64, today: NaiveDate) -> NaiveDate {
    let bootstrap = initial_date(param, today);
    if let Some(raw) = param {
        if parse_date_param(raw) != Some(bootstrap) {
            log::warn!("ignoring --date {raw:?}; using {bootstrap}");
        }
    }
    if step == 0 {
        return bootstrap;
    }
    step_date(bootstrap, step, today).unwrap_or_else(|| {
        log::warn!("cannot step {step} days from {bootstrap} past {today}");
        bootstrap
    })
}

fn resolve_sort(sort: SortArg, reverse: bool) -> SortState {
    let key = match sort {
        SortArg::Name => SortKey::Name,
        SortArg::Appearances => SortKey::Appearances,
        SortArg::BestRank => SortKey::BestRank,
        SortArg::BestRankDate => SortKey::BestRankDate,
    };
    let state = SortState::new(key);
    if reverse { state.toggle(key) } else { state }
}
