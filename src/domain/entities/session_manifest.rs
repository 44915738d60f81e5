use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// マニフェスト読み込みのエラー
#[derive(Debug, Error)]
pub enum SessionManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest document: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// ハイバネーション状態
///
/// マニフェストのアノテーションにJSON文字列として埋め込まれる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hibernation {
    /// 未コミットの変更があったかどうか
    #[serde(default)]
    pub dirty: bool,

    /// 休止時点のコミットSHA
    pub commit: Option<String>,

    /// 休止時点のブランチ名
    pub branch: Option<String>,
}

/// セッションのリソース要求値
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_request: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_request: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_request: Option<String>,

    #[serde(rename = "ephemeral-storage", skip_serializing_if = "Option::is_none")]
    pub ephemeral_storage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_request: Option<String>,
}

/// デプロイ済みセッションのマニフェストから表示用メタデータを抽出する
///
/// 欠けているフィールドはエラーにせず `None` を返す。マニフェストの構造は
/// デプロイ側の都合で変わり得るため、抽出は常に寛容に行う。
#[derive(Debug, Clone)]
pub struct SessionManifest {
    manifest: Value,
}

impl SessionManifest {
    pub fn new(manifest: Value) -> Self {
        Self { manifest }
    }

    /// YAMLまたはJSONの文字列からマニフェストを読み込む
    pub fn from_str(document: &str) -> Result<Self, SessionManifestError> {
        // YAMLはJSONの上位集合なのでどちらの形式も受け付ける
        let manifest: Value = serde_yaml::from_str(document)?;
        Ok(Self::new(manifest))
    }

    /// ファイルからマニフェストを読み込む
    pub fn from_file(path: &Path) -> Result<Self, SessionManifestError> {
        let document = std::fs::read_to_string(path)?;
        Self::from_str(&document)
    }

    fn str_at(&self, pointer: &str) -> Option<&str> {
        self.manifest.pointer(pointer).and_then(Value::as_str)
    }

    /// セッション名を取得
    pub fn name(&self) -> Option<&str> {
        self.str_at("/metadata/name")
    }

    /// セッションイメージを取得
    pub fn image(&self) -> Option<&str> {
        self.str_at("/spec/jupyterServer/image")
    }

    /// セッションのデフォルトURLパスを取得
    pub fn default_url(&self) -> Option<&str> {
        self.str_at("/spec/jupyterServer/defaultUrl")
    }

    /// アノテーションを取得
    pub fn annotations(&self) -> Option<&serde_json::Map<String, Value>> {
        self.manifest
            .pointer("/metadata/annotations")
            .and_then(Value::as_object)
    }

    /// ラベルを取得
    pub fn labels(&self) -> Option<&serde_json::Map<String, Value>> {
        self.manifest
            .pointer("/metadata/labels")
            .and_then(Value::as_object)
    }

    /// リソース要求値を取得
    pub fn resource_requests(&self) -> ResourceRequests {
        let mut requests = ResourceRequests::default();

        // Note: disk requests may arrive as a quantity string or a raw number.
        requests.disk_request = match self.manifest.pointer("/spec/storage/size") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        if let Some(resources) = self
            .manifest
            .pointer("/spec/jupyterServer/resources/requests")
            .and_then(Value::as_object)
        {
            let as_string = |v: &Value| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            };
            requests.cpu_request = resources.get("cpu").and_then(as_string);
            requests.mem_request = resources.get("memory").and_then(as_string);
            requests.gpu_request = resources.get("nvidia.com/gpu").and_then(as_string);
            requests.ephemeral_storage = resources.get("ephemeral-storage").and_then(as_string);
        }

        requests
    }

    /// LFS自動取得フラグを取得
    ///
    /// initコンテナのパッチに埋め込まれた環境変数から読み取る。
    pub fn lfs_auto_fetch(&self) -> bool {
        let patches = match self.manifest.pointer("/spec/patches").and_then(Value::as_array) {
            Some(patches) => patches,
            None => return false,
        };

        for patch_group in patches {
            let patch_list = match patch_group.get("patch").and_then(Value::as_array) {
                Some(list) => list,
                None => continue,
            };
            for patch in patch_list {
                if patch.get("path").and_then(Value::as_str)
                    != Some("/statefulset/spec/template/spec/initContainers/-")
                {
                    continue;
                }
                let env = match patch.pointer("/value/env").and_then(Value::as_array) {
                    Some(env) => env,
                    None => continue,
                };
                for entry in env {
                    if entry.get("name").and_then(Value::as_str) == Some("GIT_CLONE_LFS_AUTO_FETCH")
                    {
                        return entry.get("value").and_then(Value::as_str) == Some("1");
                    }
                }
            }
        }
        false
    }

    /// ハイバネーション状態を取得
    pub fn hibernation(&self) -> Option<Hibernation> {
        let raw = self
            .annotations()?
            .get("hibernation")
            .and_then(Value::as_str)?;
        if raw.is_empty() {
            return None;
        }
        serde_json::from_str(raw).ok()
    }

    /// 休止時点で未コミットの変更があったかどうか
    pub fn dirty(&self) -> bool {
        self.hibernation().map(|h| h.dirty).unwrap_or(false)
    }

    /// 休止時点のコミットSHAを取得
    pub fn hibernation_commit(&self) -> Option<String> {
        self.hibernation().and_then(|h| h.commit)
    }

    /// 休止時点のブランチ名を取得
    pub fn hibernation_branch(&self) -> Option<String> {
        self.hibernation().and_then(|h| h.branch)
    }

    /// セッションの公開URLを組み立てる
    pub fn url(&self) -> Option<String> {
        let host = self.str_at("/spec/routing/host")?;
        let path = self.str_at("/spec/routing/path")?.trim_end_matches('/');
        let mut url = format!("https://{host}{path}");
        if let Some(token) = self.str_at("/spec/auth/token") {
            if !token.is_empty() {
                url.push_str(&format!("?token={token}"));
            }
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demo_manifest() -> SessionManifest {
        SessionManifest::new(json!({
            "metadata": {
                "name": "demo-session",
                "annotations": {
                    "hibernation": "{\"dirty\": true, \"commit\": \"abc123\", \"branch\": \"main\"}"
                },
                "labels": {"app": "session"}
            },
            "spec": {
                "jupyterServer": {
                    "image": "registry.example/session:1.2.3",
                    "defaultUrl": "/lab",
                    "resources": {
                        "requests": {
                            "cpu": "500m",
                            "memory": "2G",
                            "nvidia.com/gpu": 1,
                            "ephemeral-storage": "10G"
                        }
                    }
                },
                "storage": {"size": "8G"},
                "routing": {"host": "sessions.example.com", "path": "/sessions/demo/"},
                "auth": {"token": "secret"},
                "patches": [
                    {
                        "patch": [
                            {
                                "path": "/statefulset/spec/template/spec/initContainers/-",
                                "value": {
                                    "env": [
                                        {"name": "GIT_CLONE_LFS_AUTO_FETCH", "value": "1"}
                                    ]
                                }
                            }
                        ]
                    }
                ]
            }
        }))
    }

    #[test]
    fn test_basic_metadata_extraction() {
        let manifest = demo_manifest();
        assert_eq!(manifest.name(), Some("demo-session"));
        assert_eq!(manifest.image(), Some("registry.example/session:1.2.3"));
        assert_eq!(manifest.default_url(), Some("/lab"));
        assert_eq!(
            manifest.labels().unwrap().get("app").unwrap(),
            &json!("session")
        );
    }

    #[test]
    fn test_resource_requests_extraction() {
        let requests = demo_manifest().resource_requests();
        assert_eq!(requests.cpu_request.as_deref(), Some("500m"));
        assert_eq!(requests.mem_request.as_deref(), Some("2G"));
        assert_eq!(requests.gpu_request.as_deref(), Some("1"));
        assert_eq!(requests.ephemeral_storage.as_deref(), Some("10G"));
        assert_eq!(requests.disk_request.as_deref(), Some("8G"));
    }

    #[test]
    fn test_lfs_auto_fetch_flag() {
        assert!(demo_manifest().lfs_auto_fetch());

        let manifest = SessionManifest::new(json!({"spec": {"patches": []}}));
        assert!(!manifest.lfs_auto_fetch());
    }

    #[test]
    fn test_hibernation_state() {
        let manifest = demo_manifest();
        assert!(manifest.dirty());
        assert_eq!(manifest.hibernation_commit().as_deref(), Some("abc123"));
        assert_eq!(manifest.hibernation_branch().as_deref(), Some("main"));

        let empty = SessionManifest::new(json!({"metadata": {"annotations": {}}}));
        assert!(empty.hibernation().is_none());
        assert!(!empty.dirty());
    }

    #[test]
    fn test_url_with_token() {
        assert_eq!(
            demo_manifest().url().as_deref(),
            Some("https://sessions.example.com/sessions/demo?token=secret")
        );
    }

    #[test]
    fn test_url_without_token() {
        let manifest = SessionManifest::new(json!({
            "spec": {"routing": {"host": "h.example", "path": "/s/x"}}
        }));
        assert_eq!(manifest.url().as_deref(), Some("https://h.example/s/x"));
    }

    #[test]
    fn test_missing_fields_yield_none() {
        let manifest = SessionManifest::new(json!({}));
        assert!(manifest.name().is_none());
        assert!(manifest.image().is_none());
        assert!(manifest.url().is_none());
        assert_eq!(manifest.resource_requests(), ResourceRequests::default());
    }

    #[test]
    fn test_from_yaml_document() {
        let yaml = r#"
metadata:
  name: demo
spec:
  jupyterServer:
    image: registry.example/session:1.0.0
"#;
        let manifest = SessionManifest::from_str(yaml).unwrap();
        assert_eq!(manifest.name(), Some("demo"));
        assert_eq!(manifest.image(), Some("registry.example/session:1.0.0"));
    }
}
