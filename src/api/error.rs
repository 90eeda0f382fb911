use crate::application::library::LibraryApplicationError;
use crate::domain::LibraryError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LibraryApplicationError);

impl From<LibraryApplicationError> for ApiError {
    fn from(err: LibraryApplicationError) -> Self {
        ApiError(err)
    }
}

/// リクエストの解釈段階で発生した検証エラー用
impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        ApiError(LibraryApplicationError::Domain(err))
    }
}

/// 抽出段階の失敗（JSONの型不一致、数値でないID等）はすべて検証エラー
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        LibraryError::Validation(rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        LibraryError::Validation(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        LibraryError::Validation(rejection.body_text()).into()
    }
}

fn domain_status(err: &LibraryError) -> StatusCode {
    match err {
        // 400 Bad Request - 入力が不正
        LibraryError::Validation(_) => StatusCode::BAD_REQUEST,

        // 404 Not Found - リクエストされたリソースが存在しない
        LibraryError::BookNotFound(_)
        | LibraryError::MemberNotFound(_)
        | LibraryError::LoanNotFound(_) => StatusCode::NOT_FOUND,

        // 422 Unprocessable Entity - 貸出ルール違反
        LibraryError::BookUnavailable(_) | LibraryError::AlreadyReturned(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }

        // 409 Conflict - 不変条件を破る変更
        LibraryError::Integrity(_) => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            LibraryApplicationError::Domain(ref e) => (domain_status(e), e.code(), e.to_string()),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LibraryApplicationError::SnapshotStoreError(ref e) => {
                tracing::error!("Snapshot store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SNAPSHOT_STORE_ERROR",
                    "Failed to persist library state".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
