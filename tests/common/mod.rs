//! Test helper functions and utilities
//!
//! This module provides common helpers shared by the integration tests: a
//! fake `git` executable that records every invocation, and a minimal HTTP
//! responder for reachability-probe tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use gitseed::domain::entities::repository::RepositoryConfig;

/// A `git` stand-in that logs every invocation and can be steered through
/// control files placed next to the script.
pub struct FakeGit {
    ctrl_dir: PathBuf,
}

impl FakeGit {
    /// Install the fake executable into `dir` and return a handle to it.
    pub fn install(dir: &Path) -> Self {
        let script = dir.join("git");
        std::fs::write(
            &script,
            r#"#!/bin/sh
CTRL_DIR="$(dirname "$0")"
echo "$@" >> "$CTRL_DIR/invocations.log"
case "$*" in
  "init")
    mkdir -p .git/info
    ;;
  "rev-parse --is-inside-work-tree")
    if [ -f "$CTRL_DIR/worktree_exists" ]; then
      echo "true"
    else
      echo "fatal: not a git repository (or any of the parent directories): .git" >&2
      exit 128
    fi
    ;;
  checkout\ *)
    if [ -f "$CTRL_DIR/checkout_stderr" ]; then
      cat "$CTRL_DIR/checkout_stderr" >&2
      exit 1
    fi
    ;;
  "lfs ls-files --json")
    if [ -f "$CTRL_DIR/lfs_listing.json" ]; then
      cat "$CTRL_DIR/lfs_listing.json"
    fi
    ;;
  "submodule update")
    if [ -f "$CTRL_DIR/fail_submodule" ]; then
      echo "fatal: could not fetch submodule" >&2
      exit 1
    fi
    ;;
esac
exit 0
"#,
        )
        .expect("failed to write fake git script");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
                .expect("failed to mark fake git executable");
        }

        Self {
            ctrl_dir: dir.to_path_buf(),
        }
    }

    /// Absolute path of the fake executable.
    pub fn executable(&self) -> String {
        self.ctrl_dir.join("git").to_string_lossy().into_owned()
    }

    /// Every recorded invocation, one argument list per entry.
    pub fn invocations(&self) -> Vec<String> {
        match std::fs::read_to_string(self.ctrl_dir.join("invocations.log")) {
            Ok(log) => log.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Make `rev-parse --is-inside-work-tree` report an existing work tree.
    pub fn set_worktree_exists(&self) {
        std::fs::write(self.ctrl_dir.join("worktree_exists"), "").unwrap();
    }

    /// Make every `checkout` invocation fail with the given stderr text.
    pub fn fail_checkout_with(&self, stderr: &str) {
        std::fs::write(self.ctrl_dir.join("checkout_stderr"), stderr).unwrap();
    }

    /// Provide the JSON document returned by `lfs ls-files --json`.
    pub fn set_lfs_listing(&self, json: &str) {
        std::fs::write(self.ctrl_dir.join("lfs_listing.json"), json).unwrap();
    }

    /// Make `submodule update` fail.
    pub fn fail_submodule_update(&self) {
        std::fs::write(self.ctrl_dir.join("fail_submodule"), "").unwrap();
    }
}

/// Serve the given HTTP status line for every incoming connection.
///
/// Returns the bound address; the responder runs until the test ends.
pub async fn spawn_http_responder(status_line: &'static str) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    addr
}

/// Repository wire config pointing at the demo project.
pub fn demo_repository_config() -> RepositoryConfig {
    RepositoryConfig {
        namespace: "group".to_string(),
        project: "demo".to_string(),
        branch: "main".to_string(),
        commit_sha: "abc123f".to_string(),
        url: "https://git.example/group/demo.git".to_string(),
    }
}
