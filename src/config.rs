use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// ログインフォームの認証情報
///
/// 実行中のみメモリに保持する。ログには出さない
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// ログインフォームの操作対象セレクタ
#[derive(Debug, Clone)]
pub struct FormControllers {
    /// ユーザー名入力欄
    pub username_input: String,
    /// パスワード入力欄
    pub password_input: String,
    /// ログインボタン
    pub login_button: String,
}

impl FormControllers {
    pub fn new(
        username_input: impl Into<String>,
        password_input: impl Into<String>,
        login_button: impl Into<String>,
    ) -> Self {
        Self {
            username_input: username_input.into(),
            password_input: password_input.into(),
            login_button: login_button.into(),
        }
    }
}

/// 認証設定ブロック
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// ログインページURL（Noneなら認証不可）
    pub login_url: Option<String>,
    pub credentials: Credentials,
    pub controllers: FormControllers,
    /// ログイン後の確認用セレクタ（任意）
    ///
    /// 指定した場合のみ、クリック後にこのセレクタの出現を待つ。
    /// 未指定ならクリックが例外なく完了した時点で成功扱い
    pub verified_selector: Option<String>,
}

impl AuthConfig {
    pub fn new(
        login_url: impl Into<String>,
        credentials: Credentials,
        controllers: FormControllers,
    ) -> Self {
        Self {
            login_url: Some(login_url.into()),
            credentials,
            controllers,
            verified_selector: None,
        }
    }

    pub fn with_verified_selector(mut self, selector: impl Into<String>) -> Self {
        self.verified_selector = Some(selector.into());
        self
    }
}

/// ページ上のコンテンツ要素セレクタ
#[derive(Debug, Clone)]
pub struct ContentControllers {
    /// 動画要素のセレクタ
    pub video_selector: String,
    /// タイトル要素のセレクタ（複数マッチ可）
    pub title_selector: String,
    /// 保存時の拡張子（例: ".mp4"）
    pub video_extension: String,
}

impl ContentControllers {
    pub fn new(
        video_selector: impl Into<String>,
        title_selector: impl Into<String>,
    ) -> Self {
        Self {
            video_selector: video_selector.into(),
            title_selector: title_selector.into(),
            video_extension: ".mp4".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.video_extension = extension.into();
        self
    }
}

/// 1回のスクレイプ実行の設定
///
/// 実行開始後は変更しない
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub target_url: String,
    pub controllers: ContentControllers,
    pub storage_dir: PathBuf,
    pub need_auth: bool,
    pub auth: Option<AuthConfig>,
    pub headless: bool,
    /// Chrome実行ファイルのパス（未指定ならchromiumoxideの探索に任せる）
    pub chrome_executable: Option<PathBuf>,
    /// ログイン成功後の安定待機
    pub settle_delay: Duration,
    /// セレクタ出現待ちのタイムアウト
    pub wait_timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            controllers: ContentControllers::new("video", ".title"),
            storage_dir: PathBuf::from("./downloads"),
            need_auth: false,
            auth: None,
            headless: true,
            chrome_executable: None,
            settle_delay: Duration::from_secs(5),
            wait_timeout: Duration::from_secs(30),
        }
    }
}

impl ScrapeConfig {
    pub fn new(target_url: impl Into<String>, controllers: ContentControllers) -> Self {
        Self {
            target_url: target_url.into(),
            controllers,
            ..Default::default()
        }
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.need_auth = true;
        self.auth = Some(auth);
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let controllers = ContentControllers::new("#video", ".title").with_extension(".webm");
        let config = ScrapeConfig::new("https://example.com/watch", controllers)
            .with_storage_dir("/tmp/videos")
            .with_headless(false)
            .with_settle_delay(Duration::from_secs(1));

        assert_eq!(config.target_url, "https://example.com/watch");
        assert_eq!(config.controllers.video_extension, ".webm");
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/videos"));
        assert!(!config.headless);
        assert!(!config.need_auth);
        assert_eq!(config.settle_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_with_auth_sets_need_auth() {
        let auth = AuthConfig::new(
            "https://example.com/login",
            Credentials::new("user", "pass"),
            FormControllers::new("#user", "#pass", "#submit"),
        );
        let config =
            ScrapeConfig::new("https://example.com/watch", ContentControllers::new("v", "t"))
                .with_auth(auth);

        assert!(config.need_auth);
        assert!(config.auth.is_some());
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let creds = Credentials::new("user", "secret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("user"));
        assert!(!debug.contains("secret"));
    }
}
