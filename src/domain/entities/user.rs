use serde::{Deserialize, Serialize};

/// セッションユーザーのエンティティ
///
/// 匿名セッションではメールアドレス・氏名・トークンは存在しない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// gitコミットに使用するメールアドレス
    pub email: Option<String>,

    /// gitコミットに使用する氏名
    pub full_name: Option<String>,

    /// 匿名セッションかどうか
    #[serde(default)]
    pub is_anonymous: bool,

    /// 認証クローンに使用するOAuthトークン（匿名以外）
    pub oauth_token: Option<String>,
}

impl User {
    /// 認証済みユーザーを作成
    pub fn registered(
        email: impl Into<String>,
        full_name: impl Into<String>,
        oauth_token: impl Into<String>,
    ) -> Self {
        Self {
            email: Some(email.into()),
            full_name: Some(full_name.into()),
            is_anonymous: false,
            oauth_token: Some(oauth_token.into()),
        }
    }

    /// 匿名ユーザーを作成
    pub fn anonymous() -> Self {
        Self {
            email: None,
            full_name: None,
            is_anonymous: true,
            oauth_token: None,
        }
    }
}
