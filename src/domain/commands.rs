use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, LibraryError, MemberId};

/// コマンド入力：書籍の登録・更新
///
/// 数値項目は検証前の生の値として受け取り、`book::validate_book_fields`で
/// 型付きの値に変換する。暗黙の変換や切り捨ては行わない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub year: i64,
    pub quantity: i64,
}

/// コマンド入力：会員の登録・更新
///
/// 会員コードは登録時に自動採番され、更新では変更できないため含まない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFields {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLoan {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub due_date: NaiveDate,
}

/// 必須の文字列項目を検証する（前後の空白は除去）
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, LibraryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LibraryError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
