use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::commands::{BookFields, MemberFields};
use crate::domain::queries::{BookFilter, LoanFilter, MemberFilter};
use crate::domain::{BookId, LibraryError, LoanStatus, MemberId};

/// 必須項目の取り出し（欠落は検証エラー）
fn required<T>(field: &str, value: Option<T>) -> Result<T, LibraryError> {
    value.ok_or_else(|| LibraryError::Validation(format!("{field} is required")))
}

/// 書籍の登録・更新リクエスト（POST /books, PUT /books/:id）
///
/// 欠落した項目はJSONの段階で弾かず、他の入力エラーと同じ
/// 検証エラー（400）として返す。
#[derive(Debug, Default, Deserialize)]
pub struct BookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub year: Option<i64>,
    pub quantity: Option<i64>,
}

impl BookRequest {
    pub fn to_fields(self) -> Result<BookFields, LibraryError> {
        Ok(BookFields {
            title: required("title", self.title)?,
            author: required("author", self.author)?,
            isbn: required("isbn", self.isbn)?,
            category: required("category", self.category)?,
            year: required("year", self.year)?,
            quantity: required("quantity", self.quantity)?,
        })
    }
}

/// 会員の登録・更新リクエスト（POST /members, PUT /members/:id）
///
/// 会員コードは自動採番のため受け付けない。
#[derive(Debug, Default, Deserialize)]
pub struct MemberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl MemberRequest {
    pub fn to_fields(self) -> Result<MemberFields, LibraryError> {
        Ok(MemberFields {
            name: required("name", self.name)?,
            email: required("email", self.email)?,
            phone: required("phone", self.phone)?,
        })
    }
}

/// 貸出リクエスト（POST /loans）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLoanRequest {
    pub book_id: Option<u64>,
    pub member_id: Option<u64>,
    /// YYYY-MM-DD。省略時は今日 + 14日
    pub due_date: Option<String>,
}

impl IssueLoanRequest {
    pub fn book_id(&self) -> Result<BookId, LibraryError> {
        required("bookId", self.book_id).map(BookId::new)
    }

    pub fn member_id(&self) -> Result<MemberId, LibraryError> {
        required("memberId", self.member_id).map(MemberId::new)
    }

    pub fn due_date(&self) -> Result<Option<NaiveDate>, LibraryError> {
        self.due_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_date)
            .transpose()
    }
}

/// 日付文字列（YYYY-MM-DD）のパース
pub fn parse_date(value: &str) -> Result<NaiveDate, LibraryError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        LibraryError::Validation(format!("invalid date {value:?}, expected YYYY-MM-DD"))
    })
}

/// 書籍一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl From<ListBooksQuery> for BookFilter {
    fn from(query: ListBooksQuery) -> Self {
        Self {
            search: query.search,
            category: query.category,
        }
    }
}

/// 会員一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListMembersQuery {
    pub search: Option<String>,
}

impl From<ListMembersQuery> for MemberFilter {
    fn from(query: ListMembersQuery) -> Self {
        Self {
            search: query.search,
        }
    }
}

/// 貸出一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLoansQuery {
    pub search: Option<String>,
    /// active, overdue, returned
    pub status: Option<String>,
    pub book_id: Option<u64>,
    pub member_id: Option<u64>,
}

impl ListLoansQuery {
    pub fn to_filter(self) -> Result<LoanFilter, LibraryError> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(parse_status_filter)
            .transpose()?;

        Ok(LoanFilter {
            search: self.search,
            status,
            book_id: self.book_id.map(BookId::new),
            member_id: self.member_id.map(MemberId::new),
        })
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<LoanStatus, LibraryError> {
    status.parse::<LoanStatus>()
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
