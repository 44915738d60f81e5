use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::common::{CloneError, CloneResult};
use crate::domain::value_objects::git_url::GitUrl;
use crate::infrastructure::git::cli::GitCli;

fn commit_sha_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^[0-9a-fA-F]{7,40}$").expect("valid regex"))
}

fn validate_commit_sha(sha: &str) -> Result<(), ValidationError> {
    if commit_sha_regex().is_match(sha) {
        Ok(())
    } else {
        Err(ValidationError::new("commit_sha"))
    }
}

/// クローン対象リポジトリのワイヤー設定
///
/// 環境変数またはCLI引数で渡されるJSONリストの1要素。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RepositoryConfig {
    #[validate(length(min = 1))]
    pub namespace: String,

    #[validate(length(min = 1))]
    pub project: String,

    #[validate(length(min = 1))]
    pub branch: String,

    #[validate(custom(function = validate_commit_sha))]
    pub commit_sha: String,

    #[validate(url)]
    pub url: String,
}

/// クローン対象リポジトリのエンティティ
///
/// クローン先は常に `ワークスペースルート/<project>` となる。コマンドランナーは
/// 最初のアクセス時に生成され、以後このエンティティが所有する。
#[derive(Debug)]
pub struct Repository {
    /// リポジトリの名前空間（グループ/ユーザー名）
    pub namespace: String,

    /// プロジェクト名
    pub project: String,

    /// 対象ブランチ名
    pub branch: String,

    /// 固定するコミットSHA
    pub commit_sha: String,

    /// リモートリポジトリのURL
    pub url: GitUrl,

    /// ワークスペース内の絶対パス
    pub absolute_path: PathBuf,

    /// 遅延生成されるコマンドランナー
    git_cli: Option<GitCli>,

    /// ランナーが使用するgit実行ファイル
    git_executable: String,
}

impl Repository {
    /// ワイヤー設定からエンティティを構築
    pub fn from_config(
        config: &RepositoryConfig,
        workspace_mount_path: &Path,
    ) -> CloneResult<Self> {
        config
            .validate()
            .map_err(|e| CloneError::generic_with_source("invalid repository configuration", e))?;
        let url = GitUrl::new(&config.url)
            .map_err(|e| CloneError::generic_with_source("invalid repository url", e))?;

        Ok(Self {
            namespace: config.namespace.clone(),
            project: config.project.clone(),
            branch: config.branch.clone(),
            commit_sha: config.commit_sha.clone(),
            url,
            absolute_path: workspace_mount_path.join(&config.project),
            git_cli: None,
            git_executable: "git".to_string(),
        })
    }

    /// テスト用に別のgit実行ファイルを指定
    pub fn with_git_executable(mut self, executable: impl Into<String>) -> Self {
        self.git_executable = executable.into();
        self
    }

    /// コマンドランナーを取得（未生成なら生成する）
    ///
    /// 生成時、クローン先ディレクトリが存在しなければ作成する。
    pub fn git_cli(&mut self) -> CloneResult<&GitCli> {
        if self.git_cli.is_none() {
            if !self.absolute_path.exists() {
                info!(path = %self.absolute_path.display(), "Destination does not exist, creating it");
                std::fs::create_dir_all(&self.absolute_path)?;
            }
            self.git_cli = Some(GitCli::with_executable(
                &self.absolute_path,
                &self.git_executable,
            ));
        }
        Ok(self.git_cli.as_ref().expect("runner initialized above"))
    }

    /// クローン先が既にgitワークツリーかどうかを判定
    pub async fn exists(&mut self) -> CloneResult<bool> {
        let cli = self.git_cli()?;
        match cli.rev_parse("--is-inside-work-tree").await {
            Ok(output) => Ok(output.trim().eq_ignore_ascii_case("true")),
            Err(_) => Ok(false),
        }
    }
}
