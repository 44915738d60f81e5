use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// GitURL関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum GitUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Git URLの値オブジェクト
///
/// クローンにはここで保持した文字列をそのまま使用する（`.git`サフィックスの
/// 正規化は行わない）。ホスト部は資格情報の書き込みに使用される。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GitUrl {
    /// 与えられたままのURL文字列（前後の空白のみ除去）
    url: String,

    /// ホスト名（ポート番号を含む場合がある）
    netloc: String,
}

impl GitUrl {
    /// 新しいGitUrlインスタンスを作成
    pub fn new(url: &str) -> Result<Self, GitUrlError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(GitUrlError::InvalidFormat("Empty URL".to_string()));
        }

        let parsed =
            Url::parse(trimmed).map_err(|_| GitUrlError::InvalidFormat(trimmed.to_string()))?;

        // 資格情報ファイルはHTTP(S)ホストに対してのみ意味を持つ
        if !matches!(parsed.scheme(), "https" | "http") {
            return Err(GitUrlError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let host = parsed.host_str().ok_or(GitUrlError::MissingHost)?;
        let netloc = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            url: trimmed.to_string(),
            netloc,
        })
    }

    /// 元のURL文字列を取得
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// ホスト部（ポート番号付き）を取得
    pub fn netloc(&self) -> &str {
        &self.netloc
    }

    /// LFSのアクセスモードを指定するgit configキーを生成
    ///
    /// キーは `lfs.<repo-url>/info/lfs.access` の形になる。
    pub fn lfs_access_config_key(&self) -> String {
        format!("lfs.{}/info/lfs.access", self.url.trim_end_matches('/'))
    }
}

impl fmt::Display for GitUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl TryFrom<&str> for GitUrl {
    type Error = GitUrlError;

    fn try_from(url: &str) -> Result<Self, Self::Error> {
        GitUrl::new(url)
    }
}

impl TryFrom<String> for GitUrl {
    type Error = GitUrlError;

    fn try_from(url: String) -> Result<Self, Self::Error> {
        GitUrl::new(&url)
    }
}

impl From<GitUrl> for String {
    fn from(url: GitUrl) -> Self {
        url.url
    }
}
