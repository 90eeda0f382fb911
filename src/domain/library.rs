use chrono::NaiveDate;

use super::catalog::CatalogStore;
use super::circulation::CirculationLedger;
use super::commands::{BookFields, IssueLoan, MemberFields};
use super::errors::Result;
use super::queries::{BookFilter, LoanDetails, LoanFilter, MemberFilter};
use super::snapshot::Snapshot;
use super::stats::{self, LibraryStats};
use super::{
    Book, BookId, IdGenerator, LibraryError, Loan, LoanId, LoanIssued, LoanReturned, Member,
    MemberId,
};

/// 貸出エンジンのファサード
///
/// 蔵書・会員・貸出の全状態を所有し、コマンドとクエリの唯一の入口になる。
/// 「今日」は常に呼び出し側から渡す（エンジン自身は時計を持たない）。
///
/// すべてのコマンドは、成功して不変条件を保つか、エラーで失敗して
/// 状態を一切変更しないかのどちらかである。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    catalog: CatalogStore,
    ledger: CirculationLedger,
    ids: IdGenerator,
}

impl Library {
    /// 空のライブラリ
    pub fn new() -> Self {
        Self::default()
    }

    /// スナップショットから状態を復元する
    ///
    /// # エラー
    /// 参照切れ・ID重複・在庫数の不整合、IDが採番の上限に達している場合は
    /// `LibraryError::Integrity`
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let ids = IdGenerator::starting_after(snapshot.max_id())?;
        let catalog = CatalogStore::from_records(snapshot.books, snapshot.members)?;
        let ledger = CirculationLedger::from_records(snapshot.loans, &catalog)?;

        Ok(Self {
            catalog,
            ledger,
            ids,
        })
    }

    /// 現在の状態のスナップショット
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            books: self.catalog.books().to_vec(),
            members: self.catalog.members().to_vec(),
            loans: self.ledger.loans().to_vec(),
        }
    }

    // ------------------------------------------------------------------
    // コマンド
    // ------------------------------------------------------------------

    pub fn add_book(&mut self, fields: &BookFields, today: NaiveDate) -> Result<Book> {
        self.catalog.add_book(&mut self.ids, fields, today)
    }

    pub fn update_book(
        &mut self,
        id: BookId,
        fields: &BookFields,
        today: NaiveDate,
    ) -> Result<Book> {
        self.catalog.update_book(id, fields, today)
    }

    /// 書籍を削除する
    ///
    /// 未返却の貸出があれば`LibraryError::Integrity`。
    /// 返却済みの貸出記録は書籍と一緒に削除する。
    pub fn delete_book(&mut self, id: BookId) -> Result<Book> {
        if self.catalog.book(id).is_none() {
            return Err(LibraryError::BookNotFound(id));
        }
        let outstanding = self.ledger.outstanding_for_book(id);
        if outstanding > 0 {
            return Err(LibraryError::Integrity(format!(
                "book {} has {} outstanding loan(s)",
                id, outstanding
            )));
        }

        let removed = self.catalog.remove_book(id)?;
        self.ledger.purge_returned_for_book(id);
        Ok(removed)
    }

    pub fn add_member(&mut self, fields: &MemberFields, today: NaiveDate) -> Result<Member> {
        self.catalog.add_member(&mut self.ids, fields, today)
    }

    pub fn update_member(&mut self, id: MemberId, fields: &MemberFields) -> Result<Member> {
        self.catalog.update_member(id, fields)
    }

    /// 会員を削除する
    ///
    /// 未返却の貸出があれば`LibraryError::Integrity`。
    /// 返却済みの貸出記録は会員と一緒に削除する。
    pub fn delete_member(&mut self, id: MemberId) -> Result<Member> {
        if self.catalog.member(id).is_none() {
            return Err(LibraryError::MemberNotFound(id));
        }
        let outstanding = self.ledger.outstanding_for_member(id);
        if outstanding > 0 {
            return Err(LibraryError::Integrity(format!(
                "member {} has {} outstanding loan(s)",
                id, outstanding
            )));
        }

        let removed = self.catalog.remove_member(id)?;
        self.ledger.purge_returned_for_member(id);
        Ok(removed)
    }

    pub fn issue_loan(&mut self, cmd: &IssueLoan, today: NaiveDate) -> Result<(Loan, LoanIssued)> {
        self.ledger
            .issue_loan(&mut self.catalog, &mut self.ids, cmd, today)
    }

    pub fn return_loan(
        &mut self,
        loan_id: LoanId,
        today: NaiveDate,
    ) -> Result<(Loan, LoanReturned)> {
        self.ledger.return_loan(&mut self.catalog, loan_id, today)
    }

    /// 全データを消去する
    ///
    /// 蔵書・会員・貸出をすべて削除し、採番も初期状態に戻す。
    /// 消去前の状態を返す。
    pub fn clear(&mut self) -> Snapshot {
        std::mem::take(self).snapshot()
    }

    // ------------------------------------------------------------------
    // クエリ
    // ------------------------------------------------------------------

    pub fn list_books(&self, filter: &BookFilter) -> Vec<Book> {
        self.catalog.find_books(filter)
    }

    pub fn list_categories(&self) -> Vec<String> {
        self.catalog.categories()
    }

    pub fn list_members(&self, filter: &MemberFilter) -> Vec<Member> {
        self.catalog.find_members(filter)
    }

    pub fn list_loans(&self, filter: &LoanFilter, today: NaiveDate) -> Result<Vec<LoanDetails>> {
        self.ledger.find_loans(filter, &self.catalog, today)
    }

    pub fn get_book(&self, id: BookId) -> Result<Book> {
        self.catalog
            .book(id)
            .cloned()
            .ok_or(LibraryError::BookNotFound(id))
    }

    pub fn get_member(&self, id: MemberId) -> Result<Member> {
        self.catalog
            .member(id)
            .cloned()
            .ok_or(LibraryError::MemberNotFound(id))
    }

    pub fn get_loan(&self, id: LoanId, today: NaiveDate) -> Result<LoanDetails> {
        let loan = self.ledger.loan(id).ok_or(LibraryError::LoanNotFound(id))?;
        self.ledger.details(loan, &self.catalog, today)
    }

    pub fn get_stats(&self, today: NaiveDate) -> LibraryStats {
        stats::compute_stats(&self.catalog, &self.ledger, today)
    }
}
