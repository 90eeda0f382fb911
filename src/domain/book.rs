use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::commands::{BookFields, required_text};
use super::errors::Result;
use super::{BookId, LibraryError};

/// 受け付ける最古の出版年
pub const EARLIEST_PUBLICATION_YEAR: i32 = 1000;

/// 書籍（蔵書タイトル単位。同一タイトルの複数冊を quantity で表す）
///
/// 不変条件：
/// - `0 <= available <= quantity`
/// - `quantity - available` は未返却の貸出数に等しい
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub year: i32,
    pub quantity: u32,
    pub available: u32,
}

impl Book {
    /// 貸出中の冊数
    pub fn outstanding(&self) -> u32 {
        self.quantity.saturating_sub(self.available)
    }

    pub fn is_available(&self) -> bool {
        self.available > 0
    }
}

/// 検証済みの書籍属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub year: i32,
    pub quantity: u32,
}

/// 純粋関数：書籍の入力項目を検証する
///
/// ビジネスルール：
/// - title, author, isbn, category は空白のみ不可
/// - year は 1000 以上、今年以下
/// - quantity は 1 以上
pub fn validate_book_fields(fields: &BookFields, today: NaiveDate) -> Result<BookDetails> {
    let title = required_text("title", &fields.title)?;
    let author = required_text("author", &fields.author)?;
    let isbn = required_text("isbn", &fields.isbn)?;
    let category = required_text("category", &fields.category)?;

    let year = i32::try_from(fields.year)
        .ok()
        .filter(|y| (EARLIEST_PUBLICATION_YEAR..=today.year()).contains(y))
        .ok_or_else(|| {
            LibraryError::Validation(format!(
                "year must be between {} and {}, got {}",
                EARLIEST_PUBLICATION_YEAR,
                today.year(),
                fields.year
            ))
        })?;

    let quantity = u32::try_from(fields.quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| {
            LibraryError::Validation(format!(
                "quantity must be a positive integer, got {}",
                fields.quantity
            ))
        })?;

    Ok(BookDetails {
        title,
        author,
        isbn,
        category,
        year,
        quantity,
    })
}

/// 純粋関数：書籍を登録する（全冊貸出可能）
pub fn create_book(id: BookId, details: BookDetails) -> Book {
    Book {
        id,
        title: details.title,
        author: details.author,
        isbn: details.isbn,
        category: details.category,
        year: details.year,
        quantity: details.quantity,
        available: details.quantity,
    }
}

/// 純粋関数：書籍の属性を更新する
///
/// 貸出中の冊数を保ったまま available を再計算する：
/// `new_available = new_quantity - (old_quantity - old_available)`
///
/// # エラー
/// 新しい冊数が貸出中の冊数を下回る場合は`LibraryError::Integrity`
pub fn revise_book(book: &Book, details: BookDetails) -> Result<Book> {
    let outstanding = book.outstanding();
    let available = details.quantity.checked_sub(outstanding).ok_or_else(|| {
        LibraryError::Integrity(format!(
            "book {} has {} copies on loan; quantity cannot be reduced to {}",
            book.id, outstanding, details.quantity
        ))
    })?;

    Ok(Book {
        id: book.id,
        title: details.title,
        author: details.author,
        isbn: details.isbn,
        category: details.category,
        year: details.year,
        quantity: details.quantity,
        available,
    })
}

/// 純粋関数：1冊を貸出に回す
///
/// # エラー
/// 貸出可能な冊数が0の場合は`LibraryError::BookUnavailable`
pub fn checkout_copy(book: &Book) -> Result<Book> {
    if !book.is_available() {
        return Err(LibraryError::BookUnavailable(book.id));
    }
    Ok(Book {
        available: book.available - 1,
        ..book.clone()
    })
}

/// 純粋関数：返却された1冊を戻す
///
/// # エラー
/// available が既に quantity に達している場合は`LibraryError::Integrity`
/// （過去の記帳誤りを示すため、上限を超えて増やさない）
pub fn return_copy(book: &Book) -> Result<Book> {
    if book.available >= book.quantity {
        return Err(LibraryError::Integrity(format!(
            "book {} already has all {} copies on the shelf",
            book.id, book.quantity
        )));
    }
    Ok(Book {
        available: book.available + 1,
        ..book.clone()
    })
}
