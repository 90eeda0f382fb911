use crate::domain::queries::{BookFilter, LoanDetails, LoanFilter, MemberFilter};
use crate::domain::stats::LibraryStats;
use crate::domain::{Book, BookId, LoanId, Member, MemberId};

use super::errors::Result;
use super::library_service::ServiceDependencies;

// クエリはロックを短時間だけ取り、結果をクローンして返す。
// 状態を変えないのでスナップショットは保存しない。

pub async fn list_books(deps: &ServiceDependencies, filter: &BookFilter) -> Result<Vec<Book>> {
    let library = deps.library.lock().await;
    Ok(library.list_books(filter))
}

/// 登録済みカテゴリ（初出順）
pub async fn list_categories(deps: &ServiceDependencies) -> Result<Vec<String>> {
    let library = deps.library.lock().await;
    Ok(library.list_categories())
}

pub async fn list_members(
    deps: &ServiceDependencies,
    filter: &MemberFilter,
) -> Result<Vec<Member>> {
    let library = deps.library.lock().await;
    Ok(library.list_members(filter))
}

/// 貸出一覧（ステータスは今日の日付で導出）
pub async fn list_loans(
    deps: &ServiceDependencies,
    filter: &LoanFilter,
) -> Result<Vec<LoanDetails>> {
    let today = deps.clock.today();
    let library = deps.library.lock().await;
    Ok(library.list_loans(filter, today)?)
}

pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    let library = deps.library.lock().await;
    Ok(library.get_book(book_id)?)
}

pub async fn get_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    let library = deps.library.lock().await;
    Ok(library.get_member(member_id)?)
}

pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<LoanDetails> {
    let today = deps.clock.today();
    let library = deps.library.lock().await;
    Ok(library.get_loan(loan_id, today)?)
}

/// 集計（毎回現在の状態から計算する）
pub async fn get_stats(deps: &ServiceDependencies) -> Result<LibraryStats> {
    let today = deps.clock.today();
    let library = deps.library.lock().await;
    Ok(library.get_stats(today))
}
