use tracing::{error, info, warn};

use crate::config::{AuthConfig, Credentials, FormControllers};
use crate::error::ScrapeError;
use crate::traits::PageDriver;

/// ログインフォームを操作する認証器
///
/// ページは呼び出し側が所有するものを必ず注入する。
/// 成功判定は「ログインボタンのクリックが例外なく完了した」こと。
/// `verified_selector`を設定した場合のみ、追加でその出現を確認する
pub struct Authenticator {
    login_url: Option<String>,
    credentials: Credentials,
    controllers: FormControllers,
    verified_selector: Option<String>,
}

impl Authenticator {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            login_url: config.login_url,
            credentials: config.credentials,
            controllers: config.controllers,
            verified_selector: config.verified_selector,
        }
    }

    /// ログインURLが設定されているか
    pub fn is_authenticable(&self) -> bool {
        self.login_url.is_some()
    }

    /// ログインを実行する
    ///
    /// エラーはログに出してfalseに変換する。例外は外へ出さない
    pub async fn authenticate(&self, driver: &dyn PageDriver) -> bool {
        let Some(login_url) = self.login_url.as_deref() else {
            warn!("Authenticator has no login URL configured");
            return false;
        };

        match self.run_login(driver, login_url).await {
            Ok(()) => {
                info!("Login sequence completed");
                true
            }
            Err(e) => {
                error!("Login failed: {}", e);
                false
            }
        }
    }

    async fn run_login(
        &self,
        driver: &dyn PageDriver,
        login_url: &str,
    ) -> Result<(), ScrapeError> {
        info!("Navigating to login page: {}", login_url);
        driver.goto(login_url).await?;

        driver
            .type_into(&self.controllers.username_input, &self.credentials.username)
            .await?;
        driver
            .type_into(&self.controllers.password_input, &self.credentials.password)
            .await?;
        driver.click(&self.controllers.login_button).await?;

        // 任意のログイン後確認
        if let Some(selector) = &self.verified_selector {
            driver.wait_for_element(selector).await?;
        }

        Ok(())
    }
}
