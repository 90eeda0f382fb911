use crate::domain::LibraryError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LibraryApplicationError {
    /// ドメイン層のエラー（検証・NotFound・在庫切れ・二重返却・整合性違反）
    #[error(transparent)]
    Domain(#[from] LibraryError),

    /// SnapshotStoreのエラー
    #[error("Snapshot store error")]
    SnapshotStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LibraryApplicationError>;
