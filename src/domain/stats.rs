use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::CatalogStore;
use super::circulation::CirculationLedger;
use super::loan;

/// カテゴリ別の書籍数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// 集計ビュー
///
/// 保存もキャッシュもしない。`compute_stats`で毎回現在の状態から導出する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    /// 全書籍の quantity 合計
    pub total_books: u64,
    /// 全書籍の available 合計
    pub available_books: u64,
    /// 未返却の貸出数
    pub issued_count: usize,
    /// 延滞中の貸出数
    pub overdue_count: usize,
    /// 貸出可能率（%、四捨五入。蔵書0なら0）
    pub availability_rate: u32,
    pub total_members: usize,
    /// 件数の降順、同数は初出順
    pub category_histogram: Vec<CategoryCount>,
}

/// 純粋関数：集計を計算する
pub fn compute_stats(
    catalog: &CatalogStore,
    ledger: &CirculationLedger,
    today: NaiveDate,
) -> LibraryStats {
    let total_books: u64 = catalog.books().iter().map(|b| u64::from(b.quantity)).sum();
    let available_books: u64 = catalog.books().iter().map(|b| u64::from(b.available)).sum();

    let issued_count = ledger.loans().iter().filter(|l| l.is_outstanding()).count();
    let overdue_count = ledger
        .loans()
        .iter()
        .filter(|l| loan::is_overdue(l, today))
        .count();

    LibraryStats {
        total_books,
        available_books,
        issued_count,
        overdue_count,
        availability_rate: availability_rate(available_books, total_books),
        total_members: catalog.members().len(),
        category_histogram: category_histogram(catalog),
    }
}

/// round(available / total * 100)、total が0なら0
fn availability_rate(available: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    // 整数演算で四捨五入（0.5は切り上げ）
    let rate = (available * 200 + total) / (total * 2);
    u32::try_from(rate).unwrap_or(100)
}

fn category_histogram(catalog: &CatalogStore) -> Vec<CategoryCount> {
    let mut histogram: Vec<CategoryCount> = Vec::new();
    for book in catalog.books() {
        match histogram.iter_mut().find(|c| c.category == book.category) {
            Some(entry) => entry.count += 1,
            None => histogram.push(CategoryCount {
                category: book.category.clone(),
                count: 1,
            }),
        }
    }
    // 安定ソートなので同数は初出順のまま
    histogram.sort_by(|a, b| b.count.cmp(&a.count));
    histogram
}
