use serde::{Deserialize, Serialize};

use super::{Book, BookId, Loan, LoanStatus, Member, MemberCode, MemberId};

/// 大文字小文字を無視した部分一致
fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// 空白のみの検索語は「条件なし」として扱う
fn normalized_search(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// 書籍一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFilter {
    /// タイトル・著者・ISBN の部分一致（大文字小文字無視）
    pub search: Option<String>,
    /// カテゴリの完全一致
    pub category: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        let matches_search = normalized_search(&self.search).is_none_or(|term| {
            contains_ignore_case(&book.title, &term)
                || contains_ignore_case(&book.author, &term)
                || contains_ignore_case(&book.isbn, &term)
        });

        let matches_category = self
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .is_none_or(|c| book.category == c);

        matches_search && matches_category
    }
}

/// 会員一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFilter {
    /// 氏名・会員コード・メールの部分一致（大文字小文字無視）、電話番号の部分一致
    pub search: Option<String>,
}

impl MemberFilter {
    pub fn matches(&self, member: &Member) -> bool {
        let Some(term) = normalized_search(&self.search) else {
            return true;
        };
        let raw = self.search.as_deref().map(str::trim).unwrap_or_default();

        contains_ignore_case(&member.name, &term)
            || contains_ignore_case(member.member_code.as_str(), &term)
            || contains_ignore_case(member.email.as_str(), &term)
            || member.phone.contains(raw)
    }
}

/// 貸出一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanFilter {
    /// 書名・著者・会員名・会員コードの部分一致（大文字小文字無視）
    pub search: Option<String>,
    pub status: Option<LoanStatus>,
    pub book_id: Option<BookId>,
    pub member_id: Option<MemberId>,
}

impl LoanFilter {
    pub fn matches(&self, details: &LoanDetails) -> bool {
        let matches_search = normalized_search(&self.search).is_none_or(|term| {
            contains_ignore_case(&details.book_title, &term)
                || contains_ignore_case(&details.book_author, &term)
                || contains_ignore_case(&details.member_name, &term)
                || contains_ignore_case(details.member_code.as_str(), &term)
        });

        matches_search
            && self.status.is_none_or(|s| s == details.status)
            && self.book_id.is_none_or(|id| id == details.loan.book_id)
            && self.member_id.is_none_or(|id| id == details.loan.member_id)
    }
}

/// 貸出の表示用ビュー（書籍・会員の表示項目と導出ステータスを結合したもの）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    #[serde(flatten)]
    pub loan: Loan,
    pub book_title: String,
    pub book_author: String,
    pub member_name: String,
    pub member_code: MemberCode,
    pub status: LoanStatus,
}
