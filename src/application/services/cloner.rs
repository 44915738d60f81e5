use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::common::{CloneError, CloneResult};
use crate::domain::entities::repository::{Repository, RepositoryConfig};
use crate::domain::entities::user::User;
use crate::infrastructure::filesystem::disk;
use crate::infrastructure::git::cli::GitCli;
use crate::infrastructure::git::credentials::{TempCredentials, DEFAULT_CREDENTIALS_PATH};

/// クローン実行の設定
///
/// サービス開始時に一度だけ構築され、1回の実行を駆動する。
#[derive(Debug, Clone)]
pub struct ClonerConfig {
    /// クローン対象リポジトリのリスト（順序どおりに処理される）
    pub repositories: Vec<RepositoryConfig>,

    /// ワークスペースのマウントパス
    pub workspace_mount_path: PathBuf,

    /// セッションユーザー
    pub user: User,

    /// 到達性プローブに使用するgitサーバーのURL
    pub repository_url: String,

    /// LFSコンテンツを自動取得するか
    pub lfs_auto_fetch: bool,

    /// プローブ全体のタイムアウト（Noneの場合は無期限）
    pub wait_timeout: Option<Duration>,

    /// 一時資格情報ファイルのパス
    pub credentials_file: PathBuf,

    /// 使用するgit実行ファイル
    pub git_executable: String,
}

impl ClonerConfig {
    pub fn new(
        repositories: Vec<RepositoryConfig>,
        workspace_mount_path: impl Into<PathBuf>,
        user: User,
        repository_url: impl Into<String>,
    ) -> Self {
        Self {
            repositories,
            workspace_mount_path: workspace_mount_path.into(),
            user,
            repository_url: repository_url.into(),
            lfs_auto_fetch: false,
            wait_timeout: None,
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            git_executable: "git".to_string(),
        }
    }

    pub fn with_lfs_auto_fetch(mut self, lfs_auto_fetch: bool) -> Self {
        self.lfs_auto_fetch = lfs_auto_fetch;
        self
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = Some(wait_timeout);
        self
    }

    pub fn with_credentials_file(mut self, credentials_file: impl Into<PathBuf>) -> Self {
        self.credentials_file = credentials_file.into();
        self
    }

    pub fn with_git_executable(mut self, git_executable: impl Into<String>) -> Self {
        self.git_executable = git_executable.into();
        self
    }
}

/// リポジトリ初期化サービス
///
/// セッションワークスペースへ各リポジトリを冪等に展開する。セッション再開時に
/// 再実行されるため、既存のワークツリーには決して手を付けない。
#[derive(Debug)]
pub struct GitCloner {
    repositories: Vec<Repository>,
    user: User,
    lfs_auto_fetch: bool,
    credentials_file: PathBuf,
}

impl GitCloner {
    /// フェッチに使用するリモート名
    pub const REMOTE_NAME: &'static str = "origin";

    /// セッション内gitトラフィックを中継するプロキシ
    pub const PROXY_URL: &'static str = "http://localhost:8080";

    /// 到達性プローブの再試行間隔
    const PROBE_INTERVAL: Duration = Duration::from_secs(5);

    /// サービスを構築する
    ///
    /// 対象リポジトリがある場合、gitサーバーが応答するまでブロックする。
    /// リポジトリが空の場合プローブは行わない。
    pub async fn new(config: ClonerConfig) -> CloneResult<Self> {
        let repositories = config
            .repositories
            .iter()
            .map(|repo_config| {
                Repository::from_config(repo_config, &config.workspace_mount_path)
                    .map(|repo| repo.with_git_executable(&config.git_executable))
            })
            .collect::<CloneResult<Vec<_>>>()?;

        if !repositories.is_empty() {
            Self::wait_for_server(&config.repository_url, config.wait_timeout).await?;
        }

        Ok(Self {
            repositories,
            user: config.user,
            lfs_auto_fetch: config.lfs_auto_fetch,
            credentials_file: config.credentials_file,
        })
    }

    /// gitサーバーが応答するまで待機する
    async fn wait_for_server(url: &str, timeout: Option<Duration>) -> CloneResult<()> {
        let probe_url = reqwest::Url::parse(url)
            .map_err(|e| CloneError::generic_with_source("invalid repository url", e))?;
        let start = Instant::now();

        loop {
            info!(url, timeout = ?timeout, "Waiting for git to become available");
            match reqwest::get(probe_url.clone()).await {
                Ok(response) if (200..400).contains(&response.status().as_u16()) => {
                    info!("Git is available");
                    return Ok(());
                }
                // Connection errors and non-2xx/3xx responses both mean
                // "not ready yet"; keep polling.
                Ok(_) | Err(_) => {}
            }

            if let Some(timeout) = timeout {
                if start.elapsed() > timeout {
                    return Err(CloneError::remote_unavailable(url, start.elapsed().as_secs()));
                }
            }
            tokio::time::sleep(Self::PROBE_INTERVAL).await;
        }
    }

    /// 全リポジトリを順番に初期化する
    ///
    /// いずれかのリポジトリで失敗した場合、残りは処理せず中断する。
    pub async fn run(&mut self, storage_mounts: &[PathBuf]) -> CloneResult<()> {
        let mut repositories = std::mem::take(&mut self.repositories);

        let mut outcome = Ok(());
        for repository in &mut repositories {
            outcome = self.run_helper(repository, storage_mounts).await;
            if outcome.is_err() {
                break;
            }
        }

        self.repositories = repositories;
        outcome
    }

    /// 1リポジトリ分の初期化・クローン処理
    async fn run_helper(
        &self,
        repository: &mut Repository,
        storage_mounts: &[PathBuf],
    ) -> CloneResult<()> {
        info!(project = %repository.project, "Checking if the repo already exists");
        if repository.exists().await? {
            // NOTE: This runs when a session is resumed; removing the repo
            // here would lose uncommitted work.
            info!("The repo already exists - exiting");
            return Ok(());
        }

        self.initialize_repo(repository).await?;

        if self.user.is_anonymous {
            self.clone_repository(repository).await?;
            // 匿名アクセスは公開リポジトリ前提。ブランチ先端が動いていても
            // 対象コミットに合わせるだけでよい。
            let commit_sha = repository.commit_sha.clone();
            repository.git_cli()?.reset_hard(&commit_sha).await?;
        } else {
            let oauth_token = self
                .user
                .oauth_token
                .clone()
                .ok_or_else(|| CloneError::generic("registered user has no oauth token"))?;
            let cli = repository.git_cli()?.clone();
            let url = repository.url.clone();
            let credentials =
                TempCredentials::acquire(&cli, &url, &oauth_token, &self.credentials_file).await?;
            let clone_result = self.clone_repository(repository).await;
            // NOTE: Temp credentials MUST be cleaned up on every exit path.
            credentials.release(&cli).await;
            clone_result?;
        }

        // NOTE: If a storage mount location already exists, mounting it would
        // overwrite the repo folder or another existing file, so crash here.
        for mount in storage_mounts {
            if mount.exists() {
                return Err(CloneError::cloud_storage_overwrites(mount.clone()));
            }
        }

        info!(?storage_mounts, project = %repository.project, "Excluding cloud storage from git");
        if !storage_mounts.is_empty() {
            Self::exclude_storages_from_git(repository, storage_mounts)?;
        }

        self.setup_proxy(repository).await?;

        Ok(())
    }

    /// クローン先をgitリポジトリとして初期化し、ユーザー情報を設定する
    async fn initialize_repo(&self, repository: &mut Repository) -> CloneResult<()> {
        info!("Initializing repo");
        let cli = repository.git_cli()?;

        cli.init().await?;

        // NOTE: For anonymous sessions email and name are not known.
        if let Some(email) = &self.user.email {
            info!(%email, "Setting email in git config");
            cli.config("user.email", email).await?;
        }
        if let Some(full_name) = &self.user.full_name {
            info!(%full_name, "Setting name in git config");
            cli.config("user.name", full_name).await?;
        }
        cli.config("push.default", "simple").await?;

        Ok(())
    }

    /// リポジトリの内容を取得し、対象ブランチをチェックアウトする
    async fn clone_repository(&self, repository: &mut Repository) -> CloneResult<()> {
        info!(branch = %repository.branch, "Cloning branch");
        let branch = repository.branch.clone();
        let url = repository.url.clone();
        let absolute_path = repository.absolute_path.clone();
        let cli = repository.git_cli()?.clone();

        if self.lfs_auto_fetch {
            cli.lfs(&["install", "--local"]).await?;
        } else {
            cli.lfs(&["install", "--skip-smudge", "--local"]).await?;
        }
        cli.remote_add(Self::REMOTE_NAME, url.as_str()).await?;
        cli.fetch(Self::REMOTE_NAME).await?;

        if let Err(err) = cli.checkout(&branch).await {
            // Some environments report checkout failure only through the exit
            // status, others only through stderr; classify on either.
            if err.exit_code != 0 || !err.stderr.is_empty() {
                if err.stderr.to_lowercase().contains("no space left on device") {
                    return Err(CloneError::no_disk_space_with_source(err));
                }
                return Err(CloneError::branch_does_not_exist(&branch, err));
            }
        }

        if self.lfs_auto_fetch {
            let total_lfs_size_bytes = Self::lfs_total_size_bytes(&cli).await;
            let free_space_bytes = disk::available_space(&absolute_path)?;
            if free_space_bytes < total_lfs_size_bytes {
                return Err(CloneError::no_disk_space());
            }
            cli.lfs(&["install", "--local"]).await?;
            cli.lfs(&["pull"]).await?;
        }

        info!("Dealing with submodules");
        let submodules = async {
            cli.submodule("init").await?;
            cli.submodule("update").await
        };
        if let Err(err) = submodules.await {
            // サブモジュールはベストエフォート。失敗しても実行は継続する。
            error!(error = %err, "Couldn't initialize submodules");
        }

        Ok(())
    }

    /// LFS管理対象ファイルの合計サイズをバイト単位で取得する
    ///
    /// これは安全側に倒すための概算であり、取得に失敗した場合は0を返す。
    async fn lfs_total_size_bytes(cli: &GitCli) -> u64 {
        let listing = match cli.lfs(&["ls-files", "--json"]).await {
            Ok(listing) => listing,
            Err(_) => return 0,
        };
        let parsed: serde_json::Value = match serde_json::from_str(&listing) {
            Ok(parsed) => parsed,
            Err(_) => return 0,
        };
        parsed
            .get("files")
            .and_then(serde_json::Value::as_array)
            .map(|files| {
                files
                    .iter()
                    .filter_map(|f| f.get("size").and_then(serde_json::Value::as_u64))
                    .sum()
            })
            .unwrap_or(0)
    }

    /// クラウドストレージのマウント先をバージョン管理から除外する
    fn exclude_storages_from_git(
        repository: &Repository,
        storage_mounts: &[PathBuf],
    ) -> CloneResult<()> {
        let exclude_path = repository
            .absolute_path
            .join(".git")
            .join("info")
            .join("exclude");
        let mut exclude_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(exclude_path)?;

        writeln!(exclude_file)?;
        for mount in storage_mounts {
            // リポジトリ外のマウント先はgitの管理外なので書く必要がない
            let relative = match mount.strip_prefix(&repository.absolute_path) {
                Ok(relative) if !relative.as_os_str().is_empty() => relative,
                _ => continue,
            };
            writeln!(exclude_file, "{}", relative.display())?;
        }

        Ok(())
    }

    /// セッション内のgit HTTP(S)トラフィックをローカルプロキシ経由にする
    ///
    /// TLS検証はプロキシ側で再確立されるため、ここでは無効にする。
    async fn setup_proxy(&self, repository: &mut Repository) -> CloneResult<()> {
        info!(proxy = Self::PROXY_URL, "Setting up git proxy");
        let cli = repository.git_cli()?;
        cli.config("http.proxy", Self::PROXY_URL).await?;
        cli.config("http.sslVerify", "false").await?;
        Ok(())
    }
}
