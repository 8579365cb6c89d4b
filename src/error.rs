use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("設定エラー: {0}")]
    Configuration(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("ログインエラー: {0}")]
    Authentication(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("抽出エラー: {0}")]
    Extraction(String),

    #[error("ダウンロードエラー: {0}")]
    Download(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSONエラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// スクレイプ実行のステージ
///
/// 失敗時にどのステージで止まったかを呼び出し側に伝える
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStage {
    Init,
    Authenticating,
    Locating,
    Downloading,
}

impl fmt::Display for ScrapeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScrapeStage::Init => "init",
            ScrapeStage::Authenticating => "authenticating",
            ScrapeStage::Locating => "locating",
            ScrapeStage::Downloading => "downloading",
        };
        write!(f, "{}", name)
    }
}

/// ステージ付きの失敗情報
#[derive(Debug)]
pub struct ScrapeFailure {
    pub stage: ScrapeStage,
    pub error: ScrapeError,
}

impl ScrapeFailure {
    pub fn new(stage: ScrapeStage, error: ScrapeError) -> Self {
        Self { stage, error }
    }
}

impl fmt::Display for ScrapeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.error)
    }
}
