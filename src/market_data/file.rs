use super::{normalize_bars, MarketDataSource};
use crate::error::{IndexError, Result};
use crate::models::PriceBar;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads bars from a JSON array on disk, e.g. a saved provider response.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl MarketDataSource for JsonFileSource {
    async fn fetch_daily_bars(&self) -> Result<Vec<PriceBar>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            IndexError::upstream(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let bars: Vec<PriceBar> = serde_json::from_str(&raw).map_err(|e| {
            IndexError::upstream(format!("invalid bar file {}: {}", self.path.display(), e))
        })?;

        debug!("Loaded {} bars from {}", bars.len(), self.path.display());

        if bars.is_empty() {
            return Err(IndexError::DataUnavailable);
        }
        Ok(normalize_bars(bars))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_bars() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"date":"2024-01-03","open":2.0,"high":2.0,"low":2.0,"close":2.0,"volume":10.0}},
                {{"date":"2024-01-02","open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":10.0}}
            ]"#
        )
        .unwrap();

        let bars = JsonFileSource::new(file.path()).fetch_daily_bars().await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 1.0);
        assert_eq!(bars[1].close, 2.0);
    }

    #[tokio::test]
    async fn test_empty_file_is_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();

        let result = JsonFileSource::new(file.path()).fetch_daily_bars().await;
        assert!(matches!(result, Err(IndexError::DataUnavailable)));
    }

    #[tokio::test]
    async fn test_missing_file_is_upstream_failure() {
        let result = JsonFileSource::new("/nonexistent/bars.json").fetch_daily_bars().await;
        assert!(matches!(result, Err(IndexError::UpstreamFailure(_))));
    }
}
