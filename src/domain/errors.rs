use thiserror::Error;

use super::{BookId, LoanId, MemberId};

/// 貸出エンジンのエラー
///
/// すべての操作は成功して不変条件を保つか、いずれかのエラーで失敗して
/// 状態を一切変更しない。メッセージの整形・翻訳は呼び出し側の責務。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// 入力が不正（必須項目の欠落、範囲外の値、メール形式など）
    #[error("validation failed: {0}")]
    Validation(String),

    /// 書籍が存在しない
    #[error("book {0} not found")]
    BookNotFound(BookId),

    /// 会員が存在しない
    #[error("member {0} not found")]
    MemberNotFound(MemberId),

    /// 貸出が存在しない
    #[error("loan {0} not found")]
    LoanNotFound(LoanId),

    /// 貸出可能な冊数が0
    #[error("book {0} has no copies available")]
    BookUnavailable(BookId),

    /// 既に返却済み
    #[error("loan {0} has already been returned")]
    AlreadyReturned(LoanId),

    /// 要求された変更が不変条件を破る
    #[error("integrity violation: {0}")]
    Integrity(String),
}

impl LibraryError {
    /// NotFound系のエラーか
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LibraryError::BookNotFound(_)
                | LibraryError::MemberNotFound(_)
                | LibraryError::LoanNotFound(_)
        )
    }

    /// 機械可読なエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            LibraryError::Validation(_) => "VALIDATION_ERROR",
            LibraryError::BookNotFound(_) => "BOOK_NOT_FOUND",
            LibraryError::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            LibraryError::LoanNotFound(_) => "LOAN_NOT_FOUND",
            LibraryError::BookUnavailable(_) => "BOOK_UNAVAILABLE",
            LibraryError::AlreadyReturned(_) => "ALREADY_RETURNED",
            LibraryError::Integrity(_) => "INTEGRITY_ERROR",
        }
    }
}

/// ドメイン層の Result型
pub type Result<T> = std::result::Result<T, LibraryError>;
