use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

/// JSONボディ（型の不一致も検証エラーとして返す）
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// パスパラメータ（数値以外のIDは検証エラー）
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// クエリパラメータ
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);
