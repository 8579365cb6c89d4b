use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// ブラウザページ操作の抽象
///
/// 本番はchromiumoxideを使う`BrowserSession`が実装する。
/// テストではスクリプト化したドライバを注入できる
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// URLへナビゲート
    async fn goto(&self, url: &str) -> Result<(), ScrapeError>;

    /// ナビゲーション完了を待機
    async fn wait_for_navigation(&self) -> Result<(), ScrapeError>;

    /// セレクタの出現を待機
    async fn wait_for_element(&self, selector: &str) -> Result<(), ScrapeError>;

    /// セレクタの要素へ文字列を入力
    async fn type_into(&self, selector: &str, text: &str) -> Result<(), ScrapeError>;

    /// セレクタの要素をクリック
    async fn click(&self, selector: &str) -> Result<(), ScrapeError>;

    /// 要素のプロパティを読み取る（要素なしはOk(None)）
    async fn property(
        &self,
        selector: &str,
        property: &str,
    ) -> Result<Option<String>, ScrapeError>;

    /// セレクタにマッチする全要素のinnerTextを収集
    async fn inner_texts(&self, selector: &str) -> Result<Vec<String>, ScrapeError>;

    /// セッションを閉じる
    async fn close(&mut self) -> Result<(), ScrapeError>;
}

/// 抽出結果（ソースURLとファイル名の語幹）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTarget {
    pub source_url: String,
    pub file_stem: String,
}

/// ページからメディアを特定する戦略
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// ページ準備完了とみなすために出現を待つセレクタ
    fn ready_selectors(&self) -> Vec<String>;

    /// ソースURLと保存名を抽出
    async fn extract(&self, driver: &dyn PageDriver) -> Result<MediaTarget, ScrapeError>;
}
