use crate::ports::clock::Clock as ClockTrait;
use chrono::{NaiveDate, Utc};

/// Wall clock implementation of Clock
///
/// Dates are taken in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock;

impl Clock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockTrait for Clock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
