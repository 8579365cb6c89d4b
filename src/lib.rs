//! 動画スクレイパーライブラリ
//!
//! - ヘッドレスブラウザで対象ページを開き、`<video>`要素のソースURLと
//!   タイトル由来のファイル名を特定してローカルへストリーミング保存する
//! - ログインが必要なページには認証シーケンス（遷移→入力→送信）を実行
//! - 保存先は既存ファイルを上書きせず、`name(1).ext`形式で空きを探す
//!
//! # 使用例
//!
//! ```rust,ignore
//! use video_scraper_service::{ContentControllers, ScrapeConfig, VideoScraper};
//!
//! #[tokio::main]
//! async fn main() {
//!     let controllers = ContentControllers::new("#player video", ".video-title");
//!     let config = ScrapeConfig::new("https://example.com/watch/1", controllers)
//!         .with_storage_dir("./videos");
//!
//!     let scraper = VideoScraper::new(config);
//!     let outcome = scraper.scrape().await;
//!     println!("success={}, path={:?}", outcome.success, outcome.file_path);
//! }
//! ```
//!
//! # 認証付きの使用例
//!
//! ```rust,ignore
//! use video_scraper_service::{
//!     AuthConfig, ContentControllers, Credentials, FormControllers, ScrapeConfig, VideoScraper,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let auth = AuthConfig::new(
//!         "https://example.com/login",
//!         Credentials::new("user", "pass"),
//!         FormControllers::new("#username", "#password", "#login"),
//!     );
//!
//!     let config = ScrapeConfig::new(
//!         "https://example.com/watch/1",
//!         ContentControllers::new("#player video", ".video-title"),
//!     )
//!     .with_auth(auth);
//!
//!     let outcome = VideoScraper::new(config).scrape().await;
//!     if let Some(failure) = &outcome.failure {
//!         eprintln!("failed at {}: {}", failure.stage, failure.error);
//!     }
//! }
//! ```

pub mod auth;
pub mod browser;
pub mod config;
pub mod downloader;
pub mod error;
pub mod scraper;
pub mod service;
pub mod traits;

// 主要な型をリエクスポート
pub use auth::Authenticator;
pub use browser::BrowserSession;
pub use config::{
    AuthConfig, ContentControllers, Credentials, FormControllers, ScrapeConfig,
};
pub use downloader::Downloader;
pub use error::{ScrapeError, ScrapeFailure, ScrapeStage};
pub use scraper::{ScrapeOutcome, VideoExtractor, VideoScraper};
pub use service::{ScrapeRequest, ScraperService};
pub use traits::{MediaExtractor, MediaTarget, PageDriver};
