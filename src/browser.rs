use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::{debug, info};

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::traits::PageDriver;

/// セレクタ出現待ちのポーリング間隔
const ELEMENT_POLL_INTERVAL_MS: u64 = 500;
/// CDPリクエストのタイムアウト
const CDP_REQUEST_TIMEOUT_SECS: u64 = 60;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36";

/// 1回のスクレイプ実行が所有するブラウザ+ページ
///
/// 実行をまたいで共有しない。closeは全ての終了経路で1回だけ呼ばれる
pub struct BrowserSession {
    browser: Option<Browser>,
    page: Option<Page>,
    wait_timeout: Duration,
}

impl BrowserSession {
    /// ブラウザを起動してページを1枚開く
    pub async fn launch(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        info!("Launching browser session...");

        // ユニークなユーザーデータディレクトリを生成
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("video-scraper-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .window_size(1280, 800)
            .user_data_dir(&user_data_dir);

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .request_timeout(Duration::from_secs(CDP_REQUEST_TIMEOUT_SECS))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        let browser_config = builder
            .build()
            .map_err(|e| ScrapeError::BrowserInit(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::BrowserInit(e.to_string()))?;

        let ua_params = SetUserAgentOverrideParams::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ScrapeError::BrowserInit)?;
        page.execute(ua_params)
            .await
            .map_err(|e| ScrapeError::BrowserInit(e.to_string()))?;

        info!("Browser session ready");
        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            wait_timeout: config.wait_timeout,
        })
    }

    fn page(&self) -> Result<&Page, ScrapeError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::BrowserInit("ブラウザが初期化されていません".into()))
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        let page = self.page()?;
        page.goto(url)
            .await
            .map_err(|e| ScrapeError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<(), ScrapeError> {
        let page = self.page()?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScrapeError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_element(&self, selector: &str) -> Result<(), ScrapeError> {
        let page = self.page()?;
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(ELEMENT_POLL_INTERVAL_MS);

        loop {
            if page.find_element(selector).await.is_ok() {
                debug!("Element present: {}", selector);
                return Ok(());
            }

            if start.elapsed() > self.wait_timeout {
                return Err(ScrapeError::Timeout(format!(
                    "要素 {} が{}秒以内に出現しませんでした",
                    selector,
                    self.wait_timeout.as_secs()
                )));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), ScrapeError> {
        let page = self.page()?;
        page.find_element(selector)
            .await
            .map_err(|e| ScrapeError::ElementNotFound(format!("{}: {}", selector, e)))?
            .type_str(text)
            .await
            .map_err(|e| ScrapeError::Authentication(format!("入力失敗 {}: {}", selector, e)))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), ScrapeError> {
        let page = self.page()?;
        page.find_element(selector)
            .await
            .map_err(|e| ScrapeError::ElementNotFound(format!("{}: {}", selector, e)))?
            .click()
            .await
            .map_err(|e| ScrapeError::Authentication(format!("クリック失敗 {}: {}", selector, e)))?;
        Ok(())
    }

    async fn property(
        &self,
        selector: &str,
        property: &str,
    ) -> Result<Option<String>, ScrapeError> {
        let page = self.page()?;

        // .src等はattributeではなくプロパティで読む（相対URLが絶対化されるため）
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return null;
                const value = el[{property}];
                return value === undefined || value === null ? null : String(value);
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
            property = serde_json::to_string(property)?,
        );

        let result = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScrapeError::Extraction(e.to_string()))?;

        result
            .into_value::<Option<String>>()
            .map_err(|e| ScrapeError::Extraction(e.to_string()))
    }

    async fn inner_texts(&self, selector: &str) -> Result<Vec<String>, ScrapeError> {
        let page = self.page()?;
        let elements = page
            .find_elements(selector)
            .await
            .map_err(|e| ScrapeError::ElementNotFound(format!("{}: {}", selector, e)))?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in &elements {
            let text = element
                .inner_text()
                .await
                .map_err(|e| ScrapeError::Extraction(e.to_string()))?;
            if let Some(text) = text {
                texts.push(text);
            }
        }
        Ok(texts)
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        info!("Closing browser session...");

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                debug!("Failed to close browser: {}", e);
            }
        }

        info!("Browser session closed");
        Ok(())
    }
}
