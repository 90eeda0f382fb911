use chrono::NaiveDate;
use std::collections::HashSet;

use super::book::{self, Book};
use super::commands::{BookFields, MemberFields};
use super::errors::Result;
use super::member::{self, Member};
use super::queries::{BookFilter, MemberFilter};
use super::{BookId, IdGenerator, LibraryError, MemberCode, MemberId};

/// 蔵書と会員のストア
///
/// 書籍・会員のコレクションを排他的に所有する。
/// 貸出台帳は在庫数（available）の増減を`reserve_copy` / `release_copy`経由で行い、
/// コレクションに直接触れない。
/// 各操作は検証がすべて通ってから書き込むため、失敗時に状態は変わらない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStore {
    books: Vec<Book>,
    members: Vec<Member>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// スナップショットの書籍・会員から復元する
    ///
    /// # エラー
    /// ID・会員コードの重複、`available > quantity` の場合は`LibraryError::Integrity`
    pub fn from_records(books: Vec<Book>, members: Vec<Member>) -> Result<Self> {
        ensure_consistent_records(&books, &members)?;
        Ok(Self { books, members })
    }

    // ------------------------------------------------------------------
    // 書籍
    // ------------------------------------------------------------------

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    fn book_index(&self, id: BookId) -> Result<usize> {
        self.books
            .iter()
            .position(|b| b.id == id)
            .ok_or(LibraryError::BookNotFound(id))
    }

    /// 書籍を登録する（available = quantity）
    pub fn add_book(
        &mut self,
        ids: &mut IdGenerator,
        fields: &BookFields,
        today: NaiveDate,
    ) -> Result<Book> {
        let details = book::validate_book_fields(fields, today)?;
        let created = book::create_book(ids.next_book_id()?, details);
        self.books.push(created.clone());
        Ok(created)
    }

    /// 書籍を更新する（貸出中の冊数を保って available を再計算）
    pub fn update_book(
        &mut self,
        id: BookId,
        fields: &BookFields,
        today: NaiveDate,
    ) -> Result<Book> {
        let index = self.book_index(id)?;
        let details = book::validate_book_fields(fields, today)?;
        let revised = book::revise_book(&self.books[index], details)?;
        self.books[index] = revised.clone();
        Ok(revised)
    }

    /// 書籍を削除する
    ///
    /// 貸出が残っているかどうかの判断は呼び出し側（`Library`）が台帳と合わせて行う。
    pub fn remove_book(&mut self, id: BookId) -> Result<Book> {
        let index = self.book_index(id)?;
        Ok(self.books.remove(index))
    }

    /// 1冊を貸出に回す（available - 1）
    pub fn reserve_copy(&mut self, id: BookId) -> Result<Book> {
        let index = self.book_index(id)?;
        let updated = book::checkout_copy(&self.books[index])?;
        self.books[index] = updated.clone();
        Ok(updated)
    }

    /// 返却された1冊を戻す（available + 1、quantity が上限）
    pub fn release_copy(&mut self, id: BookId) -> Result<Book> {
        let index = self.book_index(id)?;
        let updated = book::return_copy(&self.books[index])?;
        self.books[index] = updated.clone();
        Ok(updated)
    }

    pub fn find_books(&self, filter: &BookFilter) -> Vec<Book> {
        self.books
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect()
    }

    /// 登録済みカテゴリ（初出順、重複なし）
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.books
            .iter()
            .filter(|b| seen.insert(b.category.as_str()))
            .map(|b| b.category.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // 会員
    // ------------------------------------------------------------------

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    fn member_index(&self, id: MemberId) -> Result<usize> {
        self.members
            .iter()
            .position(|m| m.id == id)
            .ok_or(LibraryError::MemberNotFound(id))
    }

    /// 次に払い出す会員コード
    pub fn next_member_code(&self) -> MemberCode {
        MemberCode::next_after(self.members.iter().map(|m| &m.member_code))
    }

    /// 会員を登録する（会員コードは自動採番、入会日は今日）
    pub fn add_member(
        &mut self,
        ids: &mut IdGenerator,
        fields: &MemberFields,
        today: NaiveDate,
    ) -> Result<Member> {
        let details = member::validate_member_fields(fields)?;
        let code = self.next_member_code();
        let registered = member::register_member(ids.next_member_id()?, code, details, today);
        self.members.push(registered.clone());
        Ok(registered)
    }

    /// 会員情報を更新する（会員コードは変更不可）
    pub fn update_member(&mut self, id: MemberId, fields: &MemberFields) -> Result<Member> {
        let index = self.member_index(id)?;
        let details = member::validate_member_fields(fields)?;
        let revised = member::revise_member(&self.members[index], details);
        self.members[index] = revised.clone();
        Ok(revised)
    }

    pub fn remove_member(&mut self, id: MemberId) -> Result<Member> {
        let index = self.member_index(id)?;
        Ok(self.members.remove(index))
    }

    pub fn find_members(&self, filter: &MemberFilter) -> Vec<Member> {
        self.members
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect()
    }
}

fn ensure_consistent_records(books: &[Book], members: &[Member]) -> Result<()> {
    let mut book_ids = HashSet::new();
    for b in books {
        if !book_ids.insert(b.id) {
            return Err(LibraryError::Integrity(format!("duplicate book id {}", b.id)));
        }
        if b.available > b.quantity {
            return Err(LibraryError::Integrity(format!(
                "book {} has {} available but only {} copies",
                b.id, b.available, b.quantity
            )));
        }
    }

    let mut member_ids = HashSet::new();
    let mut member_codes = HashSet::new();
    for m in members {
        if !member_ids.insert(m.id) {
            return Err(LibraryError::Integrity(format!(
                "duplicate member id {}",
                m.id
            )));
        }
        if !member_codes.insert(m.member_code.as_str()) {
            return Err(LibraryError::Integrity(format!(
                "duplicate member code {}",
                m.member_code
            )));
        }
    }

    Ok(())
}
