//! Snapshot sources: the HTTP archive and a local directory mirror.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use heatboard_engine::{Deployment, FetchError, Snapshot, SnapshotSource, StatsData};

pub struct HttpSource {
    client: reqwest::Client,
    deployment: Deployment,
}

impl HttpSource {
    pub fn new(deployment: Deployment) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("heatboard/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(deployment.timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, deployment })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        if let Some(err) = self.deployment.classify_status(response.status().as_u16()) {
            return Err(err);
        }
        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }

    pub async fn fetch_stats(&self) -> Result<StatsData> {
        let url = self.deployment.stats_url();
        let body = self
            .get_text(&url)
            .await
            .map_err(stats_error)
            .with_context(|| format!("fetching {url}"))?;
        StatsData::from_json(&body).context("parsing stats")
    }
}

/// The stats resource is not per-date, so a 404 is a plain status failure.
fn stats_error(err: FetchError) -> FetchError {
    match err {
        FetchError::NotCached => FetchError::Status(404),
        other => other,
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, FetchError> {
        let body = self.get_text(&self.deployment.snapshot_url(date)).await?;
        Ok(Snapshot::from_json(&body)?)
    }
}

/// Archive mirrored on disk as `<dir>/<YYYY-MM-DD>.json` plus `<dir>/stats.json`.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    pub async fn fetch_stats(&self) -> Result<StatsData> {
        let path = self.root.join("stats.json");
        let body = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        StatsData::from_json(&body).with_context(|| format!("parsing {}", path.display()))
    }
}

#[async_trait]
impl SnapshotSource for DirSource {
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, FetchError> {
        let path = self.snapshot_path(date);
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(FetchError::NotCached),
            Err(e) => return Err(FetchError::Transport(format!("{}: {e}", path.display()))),
        };
        Ok(Snapshot::from_json(&body)?)
    }
}

/// The source picked for this run.
pub enum ArchiveSource {
    Http(HttpSource),
    Dir(DirSource),
}

impl ArchiveSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Http(source) => match source.deployment.mode {
                heatboard_engine::DeploymentMode::Local => {
                    format!("local endpoint {}", source.deployment.local_base)
                }
                heatboard_engine::DeploymentMode::Remote => {
                    format!("remote archive {}", source.deployment.remote_base)
                }
            },
            Self::Dir(source) => format!("archive directory {}", source.root().display()),
        }
    }

    pub async fn fetch_stats(&self) -> Result<StatsData> {
        match self {
            Self::Http(source) => source.fetch_stats().await,
            Self::Dir(source) => source.fetch_stats().await,
        }
    }
}

#[async_trait]
impl SnapshotSource for ArchiveSource {
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, FetchError> {
        match self {
            Self::Http(source) => source.fetch_snapshot(date).await,
            Self::Dir(source) => source.fetch_snapshot(date).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "heatboard-source-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    #[test]
    fn dir_source_reads_and_classifies() {
        let dir = temp_dir("classify");
        std::fs::write(
            dir.join("2025-09-01.json"),
            r#"{"date":"2025-09-01","leaderboard":"daily","count":1,
                "entries":[{"rank":1,"displayScore":420,"details":"3:0:5:300","steamId":7,"name":"Ash"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.join("2025-09-02.json"), "{not json").unwrap();
        let source = DirSource::new(&dir);

        tokio_test::block_on(async {
            let snapshot = source.fetch_snapshot(ymd(1)).await.unwrap();
            assert_eq!(snapshot.entries[0].player_id, 7);
            assert!(matches!(
                source.fetch_snapshot(ymd(2)).await,
                Err(FetchError::Malformed(_))
            ));
            assert_eq!(
                source.fetch_snapshot(ymd(3)).await,
                Err(FetchError::NotCached)
            );
        });
    }

    #[test]
    fn dir_source_stats_missing_is_an_error() {
        let dir = temp_dir("stats");
        let source = ArchiveSource::Dir(DirSource::new(&dir));
        assert!(tokio_test::block_on(source.fetch_stats()).is_err());
        assert!(source.describe().contains("archive directory"));
    }

    #[test]
    fn stats_miss_is_not_reported_as_uncached_day() {
        let err = stats_error(FetchError::NotCached);
        assert_eq!(err, FetchError::Status(404));
        assert_eq!(err.to_string(), "Server error: 404");
        assert_eq!(
            stats_error(FetchError::Transport("reset".into())),
            FetchError::Transport("reset".into())
        );
    }

    #[test]
    fn http_source_builds_with_deployment_timeout() {
        let source = HttpSource::new(Deployment::default()).unwrap();
        assert!(ArchiveSource::Http(source).describe().contains("remote archive"));
    }
}
