use crate::ports::clock::Clock as ClockTrait;
use chrono::{Duration, NaiveDate};
use std::sync::Mutex;

/// Fixed implementation of Clock
///
/// Always reports the same day until moved with `set` or `advance_days`.
/// Lets tests walk a loan past its due date without waiting.
pub struct Clock {
    today: Mutex<NaiveDate>,
}

impl Clock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap() = today;
    }

    pub fn advance_days(&self, days: i64) {
        let mut today = self.today.lock().unwrap();
        *today += Duration::days(days);
    }
}

impl ClockTrait for Clock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}
