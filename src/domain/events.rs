use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, MemberId};

/// イベント：書籍が貸し出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanIssued {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanReturned {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub return_date: NaiveDate,
    pub was_overdue: bool,
}
