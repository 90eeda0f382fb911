use chrono::NaiveDate;

/// 時計ポート
///
/// 貸出日・返却日・延滞判定に使う「今日」を提供する。
/// 延滞判定は日単位なので日付だけを返す。
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
