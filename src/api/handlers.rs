use crate::application::library::{self, ServiceDependencies};
use crate::domain::queries::{BookFilter, LoanDetails, MemberFilter};
use crate::domain::stats::LibraryStats;
use crate::domain::{Book, BookId, LoanId, Member, MemberId};
use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{
    error::ApiError,
    extract::{JsonBody, PathParam, QueryParams},
    types::{
        BookRequest, IssueLoanRequest, ListBooksQuery, ListLoansQuery, ListMembersQuery,
        MemberRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Books
// ============================================================================

/// GET /books - 書籍一覧（search: 書名・著者・ISBN、category: 完全一致）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<ListBooksQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let filter = BookFilter::from(query);
    let books = library::list_books(&state.service_deps, &filter).await?;
    Ok(Json(books))
}

/// GET /books/categories - 登録済みカテゴリ
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let categories = library::list_categories(&state.service_deps).await?;
    Ok(Json(categories))
}

/// POST /books - 書籍を登録
///
/// available は quantity と同じ値で作成される。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<BookRequest>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let fields = req.to_fields()?;
    let book = library::add_book(&state.service_deps, fields).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books/:id - 書籍詳細
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    PathParam(book_id): PathParam<u64>,
) -> Result<Json<Book>, ApiError> {
    let book = library::get_book(&state.service_deps, BookId::new(book_id)).await?;
    Ok(Json(book))
}

/// PUT /books/:id - 書籍を更新
///
/// 貸出中の冊数は保たれる。quantity を貸出中の冊数より減らすと409。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    PathParam(book_id): PathParam<u64>,
    JsonBody(req): JsonBody<BookRequest>,
) -> Result<Json<Book>, ApiError> {
    let fields = req.to_fields()?;
    let book = library::update_book(&state.service_deps, BookId::new(book_id), fields).await?;
    Ok(Json(book))
}

/// DELETE /books/:id - 書籍を削除（貸出中なら409）
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    PathParam(book_id): PathParam<u64>,
) -> Result<StatusCode, ApiError> {
    library::delete_book(&state.service_deps, BookId::new(book_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Members
// ============================================================================

/// GET /members - 会員一覧（search: 氏名・会員コード・メール・電話番号）
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<ListMembersQuery>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let filter = MemberFilter::from(query);
    let members = library::list_members(&state.service_deps, &filter).await?;
    Ok(Json(members))
}

/// POST /members - 会員を登録（会員コードは自動採番）
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<MemberRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    let fields = req.to_fields()?;
    let member = library::add_member(&state.service_deps, fields).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /members/:id - 会員詳細
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    PathParam(member_id): PathParam<u64>,
) -> Result<Json<Member>, ApiError> {
    let member = library::get_member(&state.service_deps, MemberId::new(member_id)).await?;
    Ok(Json(member))
}

/// PUT /members/:id - 会員情報を更新
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    PathParam(member_id): PathParam<u64>,
    JsonBody(req): JsonBody<MemberRequest>,
) -> Result<Json<Member>, ApiError> {
    let fields = req.to_fields()?;
    let member =
        library::update_member(&state.service_deps, MemberId::new(member_id), fields).await?;
    Ok(Json(member))
}

/// DELETE /members/:id - 会員を削除（貸出中なら409）
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    PathParam(member_id): PathParam<u64>,
) -> Result<StatusCode, ApiError> {
    library::delete_member(&state.service_deps, MemberId::new(member_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Loans
// ============================================================================

/// GET /loans - 貸出一覧
///
/// クエリパラメータ:
/// - search: 書名・著者・会員名・会員コード
/// - status: active, overdue, returned
/// - bookId, memberId
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<ListLoansQuery>,
) -> Result<Json<Vec<LoanDetails>>, ApiError> {
    let filter = query.to_filter()?;
    let loans = library::list_loans(&state.service_deps, &filter).await?;
    Ok(Json(loans))
}

/// POST /loans - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍と会員が存在すること
/// - 書籍の在庫が1冊以上あること
/// - 返却期限が今日以降であること
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<IssueLoanRequest>,
) -> Result<(StatusCode, Json<LoanDetails>), ApiError> {
    let book_id = req.book_id()?;
    let member_id = req.member_id()?;
    let due_date = req.due_date()?;

    let loan = library::issue_loan(&state.service_deps, book_id, member_id, due_date).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// GET /loans/:id - 貸出詳細
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    PathParam(loan_id): PathParam<u64>,
) -> Result<Json<LoanDetails>, ApiError> {
    let loan = library::get_loan(&state.service_deps, LoanId::new(loan_id)).await?;
    Ok(Json(loan))
}

/// POST /loans/:id/return - 書籍を返却
///
/// 延滞中の貸出も返却可能。返却済みの貸出は422。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    PathParam(loan_id): PathParam<u64>,
) -> Result<Json<LoanDetails>, ApiError> {
    let loan = library::return_loan(&state.service_deps, LoanId::new(loan_id)).await?;
    Ok(Json(loan))
}

// ============================================================================
// Stats / maintenance
// ============================================================================

/// GET /stats - 集計
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LibraryStats>, ApiError> {
    let stats = library::get_stats(&state.service_deps).await?;
    Ok(Json(stats))
}

/// POST /snapshot - 現在の状態を保存（失敗時は500）
pub async fn flush_snapshot(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    library::flush(&state.service_deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /snapshot - 全データを消去（空の状態を保存）
pub async fn clear_snapshot(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    library::clear_library(&state.service_deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
