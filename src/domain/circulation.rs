use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use super::catalog::CatalogStore;
use super::commands::IssueLoan;
use super::errors::Result;
use super::loan::{self, Loan, LoanStatus};
use super::queries::{LoanDetails, LoanFilter};
use super::{BookId, IdGenerator, LibraryError, LoanId, LoanIssued, LoanReturned, MemberId};

/// 貸出台帳
///
/// 貸出記録を排他的に所有し、貸出・返却のたびに`CatalogStore`の在庫数を
/// 同じ操作の中で更新する。
///
/// 不変条件（各書籍について）：
/// `book.available + 未返却の貸出数 == book.quantity`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CirculationLedger {
    loans: Vec<Loan>,
}

impl CirculationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// スナップショットの貸出記録から復元する
    ///
    /// # エラー
    /// 以下の場合は`LibraryError::Integrity`
    /// - 貸出IDの重複
    /// - 存在しない書籍・会員への参照
    /// - 返却日が貸出日より前
    /// - 書籍ごとの在庫数と未返却数の不一致
    pub fn from_records(loans: Vec<Loan>, catalog: &CatalogStore) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut outstanding: HashMap<BookId, u32> = HashMap::new();

        for l in &loans {
            if !ids.insert(l.id) {
                return Err(LibraryError::Integrity(format!("duplicate loan id {}", l.id)));
            }
            if catalog.book(l.book_id).is_none() {
                return Err(LibraryError::Integrity(format!(
                    "loan {} references missing book {}",
                    l.id, l.book_id
                )));
            }
            if catalog.member(l.member_id).is_none() {
                return Err(LibraryError::Integrity(format!(
                    "loan {} references missing member {}",
                    l.id, l.member_id
                )));
            }
            if l.return_date.is_some_and(|returned| returned < l.issue_date) {
                return Err(LibraryError::Integrity(format!(
                    "loan {} was returned before it was issued",
                    l.id
                )));
            }
            if l.is_outstanding() {
                *outstanding.entry(l.book_id).or_default() += 1;
            }
        }

        for book in catalog.books() {
            let on_loan = outstanding.get(&book.id).copied().unwrap_or(0);
            if book.outstanding() != on_loan {
                return Err(LibraryError::Integrity(format!(
                    "book {}: quantity {} - available {} does not match {} outstanding loans",
                    book.id, book.quantity, book.available, on_loan
                )));
            }
        }

        Ok(Self { loans })
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    /// 書籍の未返却の貸出数
    pub fn outstanding_for_book(&self, book_id: BookId) -> usize {
        self.loans
            .iter()
            .filter(|l| l.book_id == book_id && l.is_outstanding())
            .count()
    }

    /// 会員の未返却の貸出数
    pub fn outstanding_for_member(&self, member_id: MemberId) -> usize {
        self.loans
            .iter()
            .filter(|l| l.member_id == member_id && l.is_outstanding())
            .count()
    }

    /// 書籍を貸し出す
    ///
    /// 前提条件の確認順：書籍の存在 → 会員の存在 → 在庫 → 返却期限。
    /// いずれかで失敗した場合、台帳・ストアとも変更しない。
    pub fn issue_loan(
        &mut self,
        catalog: &mut CatalogStore,
        ids: &mut IdGenerator,
        cmd: &IssueLoan,
        today: NaiveDate,
    ) -> Result<(Loan, LoanIssued)> {
        let book = catalog
            .book(cmd.book_id)
            .ok_or(LibraryError::BookNotFound(cmd.book_id))?;
        if catalog.member(cmd.member_id).is_none() {
            return Err(LibraryError::MemberNotFound(cmd.member_id));
        }
        if !book.is_available() {
            return Err(LibraryError::BookUnavailable(cmd.book_id));
        }
        // 検証が済むまでIDは払い出さない
        let (issued, event) = loan::issue_loan(LoanId::new(ids.peek()), cmd, today)?;
        ids.next_loan_id()?;

        // ここから先は失敗しない（在庫は上で確認済み）
        catalog.reserve_copy(cmd.book_id)?;
        self.loans.push(issued.clone());

        Ok((issued, event))
    }

    /// 書籍を返却する
    ///
    /// # エラー
    /// - `LoanNotFound`: 貸出が存在しない
    /// - `AlreadyReturned`: 既に返却済み（二重返却は拒否する）
    /// - `Integrity`: 参照先の書籍がない、または在庫が quantity を超える
    pub fn return_loan(
        &mut self,
        catalog: &mut CatalogStore,
        loan_id: LoanId,
        today: NaiveDate,
    ) -> Result<(Loan, LoanReturned)> {
        let index = self
            .loans
            .iter()
            .position(|l| l.id == loan_id)
            .ok_or(LibraryError::LoanNotFound(loan_id))?;

        let (returned, event) = loan::return_loan(&self.loans[index], today)?;

        catalog
            .release_copy(returned.book_id)
            .map_err(|e| match e {
                LibraryError::BookNotFound(book_id) => LibraryError::Integrity(format!(
                    "loan {} references missing book {}",
                    loan_id, book_id
                )),
                other => other,
            })?;
        self.loans[index] = returned.clone();

        Ok((returned, event))
    }

    /// 書籍に紐づく返却済みの貸出記録を削除する（書籍削除時）
    pub fn purge_returned_for_book(&mut self, book_id: BookId) -> usize {
        let before = self.loans.len();
        self.loans
            .retain(|l| !(l.book_id == book_id && !l.is_outstanding()));
        before - self.loans.len()
    }

    /// 会員に紐づく返却済みの貸出記録を削除する（会員削除時）
    pub fn purge_returned_for_member(&mut self, member_id: MemberId) -> usize {
        let before = self.loans.len();
        self.loans
            .retain(|l| !(l.member_id == member_id && !l.is_outstanding()));
        before - self.loans.len()
    }

    /// ステータス付きの表示用ビューを構築する
    ///
    /// # エラー
    /// 参照先の書籍・会員がない場合は`LibraryError::Integrity`
    pub fn details(
        &self,
        loan: &Loan,
        catalog: &CatalogStore,
        today: NaiveDate,
    ) -> Result<LoanDetails> {
        let book = catalog.book(loan.book_id).ok_or_else(|| {
            LibraryError::Integrity(format!(
                "loan {} references missing book {}",
                loan.id, loan.book_id
            ))
        })?;
        let member = catalog.member(loan.member_id).ok_or_else(|| {
            LibraryError::Integrity(format!(
                "loan {} references missing member {}",
                loan.id, loan.member_id
            ))
        })?;

        Ok(LoanDetails {
            loan: loan.clone(),
            book_title: book.title.clone(),
            book_author: book.author.clone(),
            member_name: member.name.clone(),
            member_code: member.member_code.clone(),
            status: loan::status(loan, today),
        })
    }

    pub fn find_loans(
        &self,
        filter: &LoanFilter,
        catalog: &CatalogStore,
        today: NaiveDate,
    ) -> Result<Vec<LoanDetails>> {
        let mut found = Vec::new();
        for l in &self.loans {
            let details = self.details(l, catalog, today)?;
            if filter.matches(&details) {
                found.push(details);
            }
        }
        Ok(found)
    }

    /// 台帳全体のステータス集計
    pub fn count_by_status(&self, status: LoanStatus, today: NaiveDate) -> usize {
        self.loans
            .iter()
            .filter(|l| loan::status(l, today) == status)
            .count()
    }
}
