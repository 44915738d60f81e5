use crate::common::error::CloneError;

/// gitseedプロジェクト全体で使用するResult型のエイリアス
///
/// このエイリアスにより、プロジェクト全体で一貫したエラーハンドリングが可能になる。
pub type CloneResult<T> = Result<T, CloneError>;
