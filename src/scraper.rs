use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, error, info, warn};

use crate::auth::Authenticator;
use crate::browser::BrowserSession;
use crate::config::{ContentControllers, ScrapeConfig};
use crate::downloader::Downloader;
use crate::error::{ScrapeError, ScrapeFailure, ScrapeStage};
use crate::traits::{MediaExtractor, MediaTarget, PageDriver};

/// 1回のスクレイプ実行の結果
///
/// `scrape()`は決して失敗を返さない。失敗はここに畳み込まれる
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub success: bool,
    /// 成功時の保存先パス
    pub file_path: Option<PathBuf>,
    /// 失敗時のステージ付きエラー
    pub failure: Option<ScrapeFailure>,
}

impl ScrapeOutcome {
    fn succeeded(file_path: PathBuf) -> Self {
        Self {
            success: true,
            file_path: Some(file_path),
            failure: None,
        }
    }

    fn failed(failure: ScrapeFailure) -> Self {
        Self {
            success: false,
            file_path: None,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// `<video>`要素とタイトル要素から抽出する標準戦略
pub struct VideoExtractor {
    video_selector: String,
    title_selector: String,
}

impl VideoExtractor {
    pub fn new(controllers: &ContentControllers) -> Self {
        Self {
            video_selector: controllers.video_selector.clone(),
            title_selector: controllers.title_selector.clone(),
        }
    }

    /// タイトル断片からファイル名の語幹を作る
    ///
    /// 各断片は内部の空白を除去し、断片同士は`_`で連結する
    fn derive_file_stem(fragments: &[String]) -> String {
        fragments
            .iter()
            .map(|fragment| fragment.split_whitespace().collect::<String>())
            .collect::<Vec<_>>()
            .join("_")
    }

    /// タイトルが取れなかったときの代替名
    fn generated_stem() -> String {
        format!("video_{}", Utc::now().format("%Y%m%d_%H%M%S"))
    }
}

#[async_trait]
impl MediaExtractor for VideoExtractor {
    fn ready_selectors(&self) -> Vec<String> {
        vec![self.video_selector.clone(), self.title_selector.clone()]
    }

    async fn extract(&self, driver: &dyn PageDriver) -> Result<MediaTarget, ScrapeError> {
        let source_url = driver
            .property(&self.video_selector, "src")
            .await?
            .filter(|src| !src.is_empty())
            .ok_or_else(|| {
                ScrapeError::Extraction(format!(
                    "動画ソースが取得できません: {}",
                    self.video_selector
                ))
            })?;

        // タイトル抽出の失敗は実行を止めず、生成名にフォールバックする
        let file_stem = match driver.inner_texts(&self.title_selector).await {
            Ok(fragments) if !fragments.is_empty() => Self::derive_file_stem(&fragments),
            Ok(_) => {
                warn!(
                    "No title fragments found for {}, using generated name",
                    self.title_selector
                );
                Self::generated_stem()
            }
            Err(e) => {
                warn!("Failed to read title fragments: {}, using generated name", e);
                Self::generated_stem()
            }
        };

        Ok(MediaTarget {
            source_url,
            file_stem,
        })
    }
}

/// 認証→特定→ダウンロードを束ねるオーケストレータ
///
/// ブラウザセッションのライフサイクルを所有し、
/// どの経路で終わっても必ず1回だけ閉じる
pub struct VideoScraper {
    config: ScrapeConfig,
    extractor: Box<dyn MediaExtractor>,
}

impl VideoScraper {
    pub fn new(config: ScrapeConfig) -> Self {
        let extractor = Box::new(VideoExtractor::new(&config.controllers));
        Self { config, extractor }
    }

    /// 抽出戦略を差し替えて作成
    pub fn with_extractor(config: ScrapeConfig, extractor: Box<dyn MediaExtractor>) -> Self {
        Self { config, extractor }
    }

    /// ターゲットURLが設定されているか
    pub fn is_scrapable(&self) -> bool {
        !self.config.target_url.is_empty()
    }

    /// 1回のスクレイプを実行する
    ///
    /// ブラウザの起動から終了まで面倒を見る。エラーは返さない
    pub async fn scrape(&self) -> ScrapeOutcome {
        if !self.is_scrapable() {
            return ScrapeOutcome::failed(ScrapeFailure::new(
                ScrapeStage::Init,
                ScrapeError::Configuration("ターゲットURLが設定されていません".into()),
            ));
        }

        let session = match BrowserSession::launch(&self.config).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to launch browser: {}", e);
                return ScrapeOutcome::failed(ScrapeFailure::new(ScrapeStage::Init, e));
            }
        };

        self.scrape_with(session).await
    }

    /// 呼び出し側が用意したセッションでスクレイプを実行する
    ///
    /// セッションは成功・失敗を問わずここで1回だけ閉じる
    pub async fn scrape_with<D: PageDriver>(&self, mut driver: D) -> ScrapeOutcome {
        let result = self.run(&driver).await;

        if let Err(e) = driver.close().await {
            debug!("Failed to close session: {}", e);
        }

        match result {
            Ok(file_path) => {
                info!("Scrape succeeded: {:?}", file_path);
                ScrapeOutcome::succeeded(file_path)
            }
            Err(failure) => {
                error!("Scrape failed: {}", failure);
                ScrapeOutcome::failed(failure)
            }
        }
    }

    async fn run(&self, driver: &dyn PageDriver) -> Result<PathBuf, ScrapeFailure> {
        if !self.is_scrapable() {
            return Err(ScrapeFailure::new(
                ScrapeStage::Init,
                ScrapeError::Configuration("ターゲットURLが設定されていません".into()),
            ));
        }

        if self.config.need_auth {
            self.authenticate(driver).await?;
        }

        let target = self.locate(driver).await?;
        self.download(&target).await
    }

    async fn authenticate(&self, driver: &dyn PageDriver) -> Result<(), ScrapeFailure> {
        info!("Authenticating...");

        let Some(auth) = self.config.auth.clone() else {
            return Err(ScrapeFailure::new(
                ScrapeStage::Authenticating,
                ScrapeError::Configuration("認証設定がありません".into()),
            ));
        };

        let authenticator = Authenticator::new(auth);
        if !authenticator.is_authenticable() {
            return Err(ScrapeFailure::new(
                ScrapeStage::Authenticating,
                ScrapeError::Configuration("ログインURLが設定されていません".into()),
            ));
        }

        if !authenticator.authenticate(driver).await {
            return Err(ScrapeFailure::new(
                ScrapeStage::Authenticating,
                ScrapeError::Authentication("ログインに失敗しました".into()),
            ));
        }

        // ログイン直後のリダイレクトや再描画を待つ安定待機
        info!(
            "Authentication succeeded, settling for {:?}",
            self.config.settle_delay
        );
        tokio::time::sleep(self.config.settle_delay).await;
        Ok(())
    }

    async fn locate(&self, driver: &dyn PageDriver) -> Result<MediaTarget, ScrapeFailure> {
        info!("Navigating to target: {}", self.config.target_url);

        // ナビゲーションと各セレクタの出現を同時に待つ
        let selectors = self.extractor.ready_selectors();
        let ready = try_join_all(selectors.iter().map(|s| driver.wait_for_element(s)));

        futures::try_join!(
            driver.goto(&self.config.target_url),
            driver.wait_for_navigation(),
            ready,
        )
        .map_err(|e| ScrapeFailure::new(ScrapeStage::Locating, e))?;

        let target = self
            .extractor
            .extract(driver)
            .await
            .map_err(|e| ScrapeFailure::new(ScrapeStage::Locating, e))?;

        info!(
            "Located media: source={}, stem={}",
            target.source_url, target.file_stem
        );
        Ok(target)
    }

    async fn download(&self, target: &MediaTarget) -> Result<PathBuf, ScrapeFailure> {
        std::fs::create_dir_all(&self.config.storage_dir)
            .map_err(|e| ScrapeFailure::new(ScrapeStage::Downloading, e.into()))?;

        let base = self.config.storage_dir.join(&target.file_stem);
        let downloader = Downloader::to_path(
            target.source_url.as_str(),
            base,
            &self.config.controllers.video_extension,
        );

        downloader
            .download()
            .await
            .map_err(|e| ScrapeFailure::new(ScrapeStage::Downloading, e))?;

        Ok(downloader.destination().to_path_buf())
    }
}
