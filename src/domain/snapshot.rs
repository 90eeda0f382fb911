use serde::{Deserialize, Serialize};

use super::{Book, Loan, Member};

/// 永続化用スナップショット
///
/// 書籍・会員・貸出の3コレクションをそのままの項目名で保持する。
/// 読み込み時は旧キー`issuedBooks`も`loans`として受け付ける。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, alias = "issuedBooks")]
    pub loans: Vec<Loan>,
}

impl Snapshot {
    /// スナップショット内の最大ID（書籍・会員・貸出の全体で）
    pub fn max_id(&self) -> u64 {
        let books = self.books.iter().map(|b| b.id.value());
        let members = self.members.iter().map(|m| m.id.value());
        let loans = self.loans.iter().map(|l| l.id.value());
        books.chain(members).chain(loans).max().unwrap_or(0)
    }
}
