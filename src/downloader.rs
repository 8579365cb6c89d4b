use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::ScrapeError;

/// 保存先未指定時の基準ディレクトリ
const DEFAULT_DOWNLOAD_DIR: &str = "./downloads";

/// 1ファイル分のダウンロードタスク
///
/// 保存先は転送開始前に確定する。既存ファイルは上書きせず、
/// `base.ext` → `base(1).ext` → `base(2).ext` … と空きを探す。
/// 転送失敗時のリトライや途中ファイルの削除は行わない
pub struct Downloader {
    source_url: String,
    destination: PathBuf,
}

impl Downloader {
    /// 保存先ベースと拡張子を指定して作成
    ///
    /// 衝突回避はこの時点で同期的に解決する
    pub fn to_path(
        source_url: impl Into<String>,
        destination_base: impl Into<PathBuf>,
        extension: &str,
    ) -> Self {
        let base = destination_base.into();
        let destination = resolve_collision_free(&base, extension);
        Self {
            source_url: source_url.into(),
            destination,
        }
    }

    /// 保存先未指定: ソースURLの最終パスセグメントをファイル名にする
    pub fn from_source(source_url: impl Into<String>) -> Self {
        let source_url = source_url.into();
        let filename = source_url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("download")
            .to_string();
        let destination = PathBuf::from(DEFAULT_DOWNLOAD_DIR).join(filename);
        Self {
            source_url,
            destination,
        }
    }

    /// 確定済みの保存先パス
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// ストリーミングGETで保存先へ書き込む
    ///
    /// 失敗時は途中まで書かれたファイルが残ることがある
    pub async fn download(&self) -> Result<(), ScrapeError> {
        info!("Downloading {} -> {:?}", self.source_url, self.destination);

        let response = reqwest::get(&self.source_url)
            .await?
            .error_for_status()
            .map_err(|e| ScrapeError::Download(e.to_string()))?;

        // 保存先ディレクトリがなければ作る
        if let Some(parent) = self.destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = File::create(&self.destination).await?;
        let mut stream = response.bytes_stream();

        let mut total: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ScrapeError::Download(e.to_string()))?;
            file.write_all(&chunk).await?;
            total += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Download finished: {} bytes", total);
        Ok(())
    }
}

/// 衝突しない保存先パスを決める
///
/// 存在確認は同期（転送前に1度だけ行う）
fn resolve_collision_free(base: &Path, extension: &str) -> PathBuf {
    let extension = normalize_extension(extension);
    let plain = candidate_path(base, None, &extension);
    if !plain.exists() {
        return plain;
    }

    let mut index = 1u32;
    loop {
        let candidate = candidate_path(base, Some(index), &extension);
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

fn candidate_path(base: &Path, index: Option<u32>, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    if let Some(i) = index {
        name.push(format!("({})", i));
    }
    name.push(extension);
    PathBuf::from(name)
}

fn normalize_extension(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_when_no_collision() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("My_Video");

        let downloader = Downloader::to_path("https://cdn.example/v1.mp4", &base, ".mp4");
        assert_eq!(downloader.destination(), dir.path().join("My_Video.mp4"));
    }

    #[test]
    fn test_collision_appends_next_free_index() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("My_Video");

        std::fs::write(dir.path().join("My_Video.mp4"), b"0").unwrap();
        std::fs::write(dir.path().join("My_Video(1).mp4"), b"1").unwrap();
        std::fs::write(dir.path().join("My_Video(2).mp4"), b"2").unwrap();

        let downloader = Downloader::to_path("https://cdn.example/v1.mp4", &base, ".mp4");
        assert_eq!(downloader.destination(), dir.path().join("My_Video(3).mp4"));
    }

    #[test]
    fn test_extension_without_dot_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("clip");

        let downloader = Downloader::to_path("https://cdn.example/v1.mp4", &base, "mp4");
        assert_eq!(downloader.destination(), dir.path().join("clip.mp4"));
    }

    #[test]
    fn test_from_source_uses_last_path_segment() {
        let downloader = Downloader::from_source("https://cdn.example/media/v1.mp4");
        assert_eq!(
            downloader.destination(),
            PathBuf::from(DEFAULT_DOWNLOAD_DIR).join("v1.mp4")
        );
    }

    #[tokio::test]
    async fn test_download_streams_body_to_destination() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1.mp4")
            .with_status(200)
            .with_body(b"video-bytes".to_vec())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("clip");
        let downloader = Downloader::to_path(format!("{}/v1.mp4", server.url()), &base, ".mp4");

        downloader.download().await.unwrap();

        mock.assert_async().await;
        let written = std::fs::read(downloader.destination()).unwrap();
        assert_eq!(written, b"video-bytes");
    }

    #[tokio::test]
    async fn test_download_creates_missing_destination_dir() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1.mp4")
            .with_status(200)
            .with_body(b"x".to_vec())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        // まだ存在しないサブディレクトリ配下を保存先にする
        let base = dir.path().join("nested").join("clip");
        let downloader = Downloader::to_path(format!("{}/v1.mp4", server.url()), &base, ".mp4");

        downloader.download().await.unwrap();
        assert!(downloader.destination().exists());
    }

    #[tokio::test]
    async fn test_download_rejects_on_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.mp4")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("gone");
        let downloader = Downloader::to_path(format!("{}/gone.mp4", server.url()), &base, ".mp4");

        let result = downloader.download().await;
        assert!(matches!(result, Err(ScrapeError::Download(_))));
    }
}
