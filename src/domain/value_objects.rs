use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::LibraryError;

/// 会員コードの接頭辞
pub const MEMBER_CODE_PREFIX: &str = "MEM";

/// 会員コードの連番部分の最小桁数（ゼロ埋め）
pub const MEMBER_CODE_WIDTH: usize = 3;

/// 書籍ID - カタログ管理の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会員ID - 会員管理の集約ID（内部ID。表示用の会員コードとは別）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(u64);

impl MemberId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 貸出ID - 貸出台帳の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(u64);

impl LoanId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ID採番器
///
/// 書籍・会員・貸出で共通の単調増加カウンタ。
/// プロセス内で同じ値を二度返すことはない。
/// スナップショットから復元する場合は既存IDの最大値の次から採番する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// 新規作成（1から採番）
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// 既存IDの最大値の次から採番する
    ///
    /// 最大値が`u64::MAX`なら次の値がないため`LibraryError::Integrity`
    pub fn starting_after(max_issued: u64) -> Result<Self, LibraryError> {
        max_issued
            .checked_add(1)
            .map(|next| Self { next })
            .ok_or_else(Self::exhausted)
    }

    /// 次に払い出される値（払い出しはしない）
    pub fn peek(&self) -> u64 {
        self.next
    }

    fn exhausted() -> LibraryError {
        LibraryError::Integrity("identifier space exhausted".to_string())
    }

    fn next_value(&mut self) -> Result<u64, LibraryError> {
        let value = self.next;
        self.next = value.checked_add(1).ok_or_else(Self::exhausted)?;
        Ok(value)
    }

    pub fn next_book_id(&mut self) -> Result<BookId, LibraryError> {
        self.next_value().map(BookId)
    }

    pub fn next_member_id(&mut self) -> Result<MemberId, LibraryError> {
        self.next_value().map(MemberId)
    }

    pub fn next_loan_id(&mut self) -> Result<LoanId, LibraryError> {
        self.next_value().map(LoanId)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 会員コード（例: "MEM001"）
///
/// 不変条件：
/// - "MEM" + 1桁以上の数字
/// - 作成後は変更不可（更新系の操作を持たない）
///
/// 元の文字列表記を保持する（"MEM01" を "MEM001" に正規化しない）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberCode {
    code: String,
    sequence: u64,
}

impl MemberCode {
    /// 連番から会員コードを生成する（3桁ゼロ埋め、999を超えたら桁が増える）
    pub fn from_sequence(sequence: u64) -> Self {
        Self {
            code: format!(
                "{}{:0width$}",
                MEMBER_CODE_PREFIX,
                sequence,
                width = MEMBER_CODE_WIDTH
            ),
            sequence,
        }
    }

    /// 文字列から会員コードをパースする
    ///
    /// # エラー
    /// 形式が "MEM" + 数字でない場合は`LibraryError::Validation`
    pub fn parse(value: &str) -> Result<Self, LibraryError> {
        let digits = value
            .strip_prefix(MEMBER_CODE_PREFIX)
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| LibraryError::Validation(format!("invalid member code: {value:?}")))?;

        let sequence = digits
            .parse::<u64>()
            .map_err(|_| LibraryError::Validation(format!("member code out of range: {value:?}")))?;

        Ok(Self {
            code: value.to_string(),
            sequence,
        })
    }

    /// 既存コードの最大連番 + 1 で次のコードを導出する（空なら1）
    pub fn next_after<'a>(existing: impl IntoIterator<Item = &'a MemberCode>) -> Self {
        let max = existing.into_iter().map(|c| c.sequence).max().unwrap_or(0);
        Self::from_sequence(max.saturating_add(1))
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }
}

impl TryFrom<String> for MemberCode {
    type Error = LibraryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MemberCode> for String {
    fn from(code: MemberCode) -> Self {
        code.code
    }
}

impl fmt::Display for MemberCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

/// メールアドレス
///
/// 不変条件：`local@domain.tld` の形をしていること
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// # エラー
    /// 形式が不正な場合は`LibraryError::Validation`
    pub fn parse(value: &str) -> Result<Self, LibraryError> {
        let value = value.trim();
        if !EMAIL_PATTERN.is_match(value) {
            return Err(LibraryError::Validation(format!(
                "invalid email address: {value:?}"
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = LibraryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
