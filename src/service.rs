use std::convert::Infallible;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::{AuthConfig, ContentControllers, ScrapeConfig};
use crate::scraper::{ScrapeOutcome, VideoScraper};

/// スクレイピングリクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub target_url: String,
    pub video_selector: String,
    pub title_selector: String,
    pub video_extension: String,
    pub storage_dir: PathBuf,
    pub auth: Option<AuthConfig>,
    pub headless: bool,
}

impl ScrapeRequest {
    pub fn new(
        target_url: impl Into<String>,
        video_selector: impl Into<String>,
        title_selector: impl Into<String>,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            video_selector: video_selector.into(),
            title_selector: title_selector.into(),
            video_extension: ".mp4".to_string(),
            storage_dir: PathBuf::from("./downloads"),
            auth: None,
            headless: true,
        }
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.video_extension = extension.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

impl From<ScrapeRequest> for ScrapeConfig {
    fn from(req: ScrapeRequest) -> Self {
        let controllers = ContentControllers::new(req.video_selector, req.title_selector)
            .with_extension(req.video_extension);

        let mut config = ScrapeConfig::new(req.target_url, controllers)
            .with_storage_dir(req.storage_dir)
            .with_headless(req.headless);

        if let Some(auth) = req.auth {
            config = config.with_auth(auth);
        }
        config
    }
}

/// tower::Serviceを実装したスクレイパーサービス
///
/// `scrape()`が常に解決するため、Serviceとしてのエラーは発生しない
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    // 将来的な拡張用（レートリミット、キャッシュなど）
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeOutcome;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("Scrape request received: target={}", req.target_url);

        Box::pin(async move {
            let config: ScrapeConfig = req.into();
            let scraper = VideoScraper::new(config);
            let outcome = scraper.scrape().await;

            info!(
                "Scrape finished: success={}, path={:?}",
                outcome.success, outcome.file_path
            );
            Ok(outcome)
        })
    }
}
