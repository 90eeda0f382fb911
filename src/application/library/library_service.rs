use crate::domain::commands::{BookFields, IssueLoan, MemberFields};
use crate::domain::queries::LoanDetails;
use crate::domain::{self, Book, BookId, Library, LoanId, Member, MemberId, loan};
use crate::ports::{Clock, SnapshotStore};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::errors::{LibraryApplicationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、各関数に依存関係を渡す。
///
/// `library`のロックがコマンドを直列化する（単一ライター）。
/// ロックはスナップショット保存の完了まで保持するため、
/// ストアにはコマンドの実行順にスナップショットが届く。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub library: Arc<Mutex<Library>>,
    pub snapshot_store: Arc<dyn SnapshotStore>,
    pub clock: Arc<dyn Clock>,
}

/// 保存済みスナップショットからライブラリを起動する
///
/// スナップショットがなければ空の状態で起動する。
///
/// # エラー
/// - SnapshotStoreError: 読み込み・デコードに失敗
/// - Domain(Integrity): スナップショットが不整合（参照切れ、在庫数の不一致など）
pub async fn open_library(
    snapshot_store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
) -> Result<ServiceDependencies> {
    let snapshot = snapshot_store
        .load()
        .await
        .map_err(LibraryApplicationError::SnapshotStoreError)?;

    let library = match snapshot {
        Some(snapshot) => Library::from_snapshot(snapshot)?,
        None => Library::new(),
    };

    let stats = library.get_stats(clock.today());
    tracing::info!(
        total_books = stats.total_books,
        total_members = stats.total_members,
        issued = stats.issued_count,
        overdue = stats.overdue_count,
        "Library opened"
    );

    Ok(ServiceDependencies {
        library: Arc::new(Mutex::new(library)),
        snapshot_store,
        clock,
    })
}

/// コマンドを実行し、成功したらスナップショットを保存する
///
/// 1. ロックを取得（以降のコマンドはここで待つ）
/// 2. ドメインのコマンドを実行（失敗時は状態不変のままエラーを返す）
/// 3. スナップショットを保存
///
/// 保存の失敗はログに残すだけで、ドメインの状態は戻さない。
/// 次に成功したコマンドが全状態を保存し直す。
async fn execute<T>(
    deps: &ServiceDependencies,
    command: &'static str,
    apply: impl FnOnce(&mut Library, NaiveDate) -> domain::errors::Result<T>,
) -> Result<T> {
    let today = deps.clock.today();
    let mut library = deps.library.lock().await;

    let output = apply(&mut *library, today).inspect_err(|e| {
        tracing::warn!(command, error = %e, "Command rejected");
    })?;

    let snapshot = library.snapshot();
    if let Err(e) = deps.snapshot_store.save(&snapshot).await {
        tracing::error!(command, error = %e, "Failed to persist snapshot");
    }

    Ok(output)
}

/// 書籍を登録する
pub async fn add_book(deps: &ServiceDependencies, fields: BookFields) -> Result<Book> {
    let book = execute(deps, "add_book", |library, today| {
        library.add_book(&fields, today)
    })
    .await?;

    tracing::info!(book_id = %book.id, title = %book.title, "Book added");
    Ok(book)
}

/// 書籍を更新する
///
/// quantity を貸出中の冊数より少なくしようとした場合は Integrity エラー。
pub async fn update_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    fields: BookFields,
) -> Result<Book> {
    let book = execute(deps, "update_book", |library, today| {
        library.update_book(book_id, &fields, today)
    })
    .await?;

    tracing::info!(
        book_id = %book.id,
        quantity = book.quantity,
        available = book.available,
        "Book updated"
    );
    Ok(book)
}

/// 書籍を削除する（未返却の貸出があれば Integrity エラー）
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    let book = execute(deps, "delete_book", |library, _| library.delete_book(book_id)).await?;

    tracing::info!(book_id = %book.id, "Book deleted");
    Ok(book)
}

/// 会員を登録する（会員コードは自動採番）
pub async fn add_member(deps: &ServiceDependencies, fields: MemberFields) -> Result<Member> {
    let member = execute(deps, "add_member", |library, today| {
        library.add_member(&fields, today)
    })
    .await?;

    tracing::info!(member_id = %member.id, member_code = %member.member_code, "Member added");
    Ok(member)
}

/// 会員情報を更新する
pub async fn update_member(
    deps: &ServiceDependencies,
    member_id: MemberId,
    fields: MemberFields,
) -> Result<Member> {
    let member = execute(deps, "update_member", |library, _| {
        library.update_member(member_id, &fields)
    })
    .await?;

    tracing::info!(member_id = %member.id, "Member updated");
    Ok(member)
}

/// 会員を削除する（未返却の貸出があれば Integrity エラー）
pub async fn delete_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    let member = execute(deps, "delete_member", |library, _| {
        library.delete_member(member_id)
    })
    .await?;

    tracing::info!(member_id = %member.id, "Member deleted");
    Ok(member)
}

/// 書籍を貸し出す
///
/// 返却期限を省略した場合は今日から14日後。
///
/// # 戻り値
/// 作成された貸出（書名・会員名・ステータス付き）
pub async fn issue_loan(
    deps: &ServiceDependencies,
    book_id: BookId,
    member_id: MemberId,
    due_date: Option<NaiveDate>,
) -> Result<LoanDetails> {
    let details = execute(deps, "issue_loan", |library, today| {
        let cmd = IssueLoan {
            book_id,
            member_id,
            due_date: due_date.unwrap_or_else(|| loan::default_due_date(today)),
        };
        let (issued, _event) = library.issue_loan(&cmd, today)?;
        library.get_loan(issued.id, today)
    })
    .await?;

    tracing::info!(
        loan_id = %details.loan.id,
        book_id = %details.loan.book_id,
        member_id = %details.loan.member_id,
        due_date = %details.loan.due_date,
        "Loan issued"
    );
    Ok(details)
}

/// 書籍を返却する
///
/// 延滞していても返却は受け付ける。二重返却は AlreadyReturned エラー。
pub async fn return_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<LoanDetails> {
    let (details, was_overdue) = execute(deps, "return_loan", |library, today| {
        let (returned, event) = library.return_loan(loan_id, today)?;
        Ok((library.get_loan(returned.id, today)?, event.was_overdue))
    })
    .await?;

    tracing::info!(
        loan_id = %details.loan.id,
        book_id = %details.loan.book_id,
        was_overdue,
        "Loan returned"
    );
    Ok(details)
}

/// 全データを消去する
///
/// 空の状態をスナップショットとして保存する。
pub async fn clear_library(deps: &ServiceDependencies) -> Result<()> {
    let discarded = execute(deps, "clear_library", |library, _| Ok(library.clear())).await?;

    tracing::warn!(
        books = discarded.books.len(),
        members = discarded.members.len(),
        loans = discarded.loans.len(),
        "Library cleared"
    );
    Ok(())
}

/// 現在の状態を明示的に保存する
///
/// コマンド後の自動保存と違い、ストアのエラーを呼び出し側に返す。
pub async fn flush(deps: &ServiceDependencies) -> Result<()> {
    let library = deps.library.lock().await;
    deps.snapshot_store
        .save(&library.snapshot())
        .await
        .map_err(LibraryApplicationError::SnapshotStoreError)?;

    tracing::debug!("Snapshot flushed");
    Ok(())
}
