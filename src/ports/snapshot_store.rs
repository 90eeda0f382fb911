use crate::domain::Snapshot;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// スナップショットストアポート
///
/// 貸出エンジンの全状態（書籍・会員・貸出）を丸ごと保存・読み込みする。
/// 保存先（ファイル、DBなど）はエンジンからは見えない。
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 保存済みのスナップショットを読み込む
    ///
    /// まだ一度も保存されていない場合は`None`を返す（空の状態で起動する）。
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// スナップショットを保存する
    ///
    /// 前回の内容は丸ごと置き換えられる。
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
