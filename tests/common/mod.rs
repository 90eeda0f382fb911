#![allow(dead_code)]

use chrono::NaiveDate;
use circulation_desk::adapters::mock::{FixedClock, InMemorySnapshotStore};
use circulation_desk::application::library::{ServiceDependencies, open_library};
use circulation_desk::domain::Snapshot;
use circulation_desk::domain::commands::{BookFields, MemberFields};
use std::sync::Arc;

/// テストの基準日
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// テスト用のサービス一式
///
/// インメモリのスナップショットストアと固定時計を使用します。
/// テスト側から保存内容の確認・日付の進行ができるよう、両方を返します。
pub struct TestContext {
    pub deps: ServiceDependencies,
    pub store: Arc<InMemorySnapshotStore>,
    pub clock: Arc<FixedClock>,
}

pub async fn setup() -> TestContext {
    setup_with(InMemorySnapshotStore::new()).await
}

pub async fn setup_with_snapshot(snapshot: Snapshot) -> TestContext {
    setup_with(InMemorySnapshotStore::with_snapshot(snapshot)).await
}

async fn setup_with(store: InMemorySnapshotStore) -> TestContext {
    let store = Arc::new(store);
    let clock = Arc::new(FixedClock::new(today()));
    let deps = open_library(store.clone(), clock.clone())
        .await
        .expect("Failed to open library");

    TestContext { deps, store, clock }
}

pub fn book_fields(title: &str, quantity: i64) -> BookFields {
    BookFields {
        title: title.to_string(),
        author: "George Orwell".to_string(),
        isbn: "9780451524935".to_string(),
        category: "Science Fiction".to_string(),
        year: 1949,
        quantity,
    }
}

pub fn member_fields(name: &str) -> MemberFields {
    MemberFields {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: "555-0101".to_string(),
    }
}
