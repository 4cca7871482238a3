// src/usage.rs
//! Per-day cap on generation requests, to keep API spend bounded

use crate::error::{PitchError, PitchResult};
use chrono::NaiveDate;
use std::sync::Mutex;
use tracing::warn;

pub const DEFAULT_DAILY_LIMIT: u32 = 250;
const LOW_REMAINING_THRESHOLD: u32 = 10;

#[derive(Debug)]
struct DailyCount {
    date: Option<NaiveDate>,
    count: u32,
}

#[derive(Debug)]
pub struct UsageMeter {
    limit: u32,
    state: Mutex<DailyCount>,
}

impl UsageMeter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            state: Mutex::new(DailyCount {
                date: None,
                count: 0,
            }),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one request on `today` and return how many are left.
    ///
    /// Fails with `UsageLimit` once the day's budget is spent; the counter
    /// starts over when the date changes.
    pub fn check_and_record(&self, today: NaiveDate) -> PitchResult<u32> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if state.date != Some(today) {
            state.date = Some(today);
            state.count = 0;
        }

        if state.count >= self.limit {
            warn!("Daily usage limit of {} reached", self.limit);
            return Err(PitchError::UsageLimit(self.limit));
        }

        state.count += 1;
        let remaining = self.limit - state.count;
        if Self::is_running_low(remaining) {
            warn!("{} requests remaining today", remaining);
        }
        Ok(remaining)
    }

    pub fn check_and_record_now(&self) -> PitchResult<u32> {
        self.check_and_record(chrono::Utc::now().date_naive())
    }

    pub fn is_running_low(remaining: u32) -> bool {
        remaining <= LOW_REMAINING_THRESHOLD
    }
}

impl Default for UsageMeter {
    fn default() -> Self {
        Self::new(DEFAULT_DAILY_LIMIT)
    }
}
