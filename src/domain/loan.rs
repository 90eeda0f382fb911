use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::commands::IssueLoan;
use super::errors::Result;
use super::{BookId, LibraryError, LoanId, LoanIssued, LoanReturned, MemberId};

/// 貸出期間の既定値（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出ステータス
///
/// 保存はせず、`status()`で (貸出, 今日) から毎回導出する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = LibraryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(LibraryError::Validation(format!(
                "invalid loan status: {s:?}"
            ))),
        }
    }
}

/// 貸出 - 1冊を1人の会員に期限付きで貸す記録
///
/// 状態遷移：Active → Returned、または Active →（期限超過）Overdue → Returned。
/// Overdue は保存される遷移ではなく、日付との比較で導出される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl Loan {
    /// 未返却か
    pub fn is_outstanding(&self) -> bool {
        self.return_date.is_none()
    }
}

/// 既定の返却期限（今日 + 14日）
pub fn default_due_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(LOAN_PERIOD_DAYS)
}

/// 純粋関数：延滞判定（日単位。時刻は見ない）
pub fn is_overdue(loan: &Loan, today: NaiveDate) -> bool {
    loan.return_date.is_none() && loan.due_date < today
}

/// 純粋関数：ステータス導出
pub fn status(loan: &Loan, today: NaiveDate) -> LoanStatus {
    if loan.return_date.is_some() {
        LoanStatus::Returned
    } else if is_overdue(loan, today) {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    }
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出日は今日
/// - 返却期限は今日以降
///
/// 書籍・会員の存在や在庫の確認は台帳側で行う。
/// 副作用なし。新しいLoanとイベントを返す。
pub fn issue_loan(id: LoanId, cmd: &IssueLoan, today: NaiveDate) -> Result<(Loan, LoanIssued)> {
    if cmd.due_date < today {
        return Err(LibraryError::Validation(format!(
            "due date {} is before issue date {}",
            cmd.due_date, today
        )));
    }

    let loan = Loan {
        id,
        book_id: cmd.book_id,
        member_id: cmd.member_id,
        issue_date: today,
        due_date: cmd.due_date,
        return_date: None,
    };

    let event = LoanIssued {
        loan_id: id,
        book_id: cmd.book_id,
        member_id: cmd.member_id,
        issue_date: today,
        due_date: cmd.due_date,
    };

    Ok((loan, event))
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 延滞していても返却は受け付ける
/// - 二重返却はエラー（黙って無視しない）
///
/// 副作用なし。新しいLoanとイベントを返す。
pub fn return_loan(loan: &Loan, today: NaiveDate) -> Result<(Loan, LoanReturned)> {
    if loan.return_date.is_some() {
        return Err(LibraryError::AlreadyReturned(loan.id));
    }

    let was_overdue = is_overdue(loan, today);

    let returned = Loan {
        return_date: Some(today),
        ..loan.clone()
    };

    let event = LoanReturned {
        loan_id: loan.id,
        book_id: loan.book_id,
        member_id: loan.member_id,
        return_date: today,
        was_overdue,
    };

    Ok((returned, event))
}
