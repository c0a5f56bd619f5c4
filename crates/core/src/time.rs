use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Current wall-clock time in the local time zone.
    ///
    /// Backend timestamps carry no zone and are compared against this.
    #[must_use]
    pub fn local_now(&self) -> NaiveDateTime {
        match self {
            Clock::Default => Local::now().naive_local(),
            // Fixed clocks stay zone-independent so tests behave the same everywhere.
            Clock::Fixed(t) => t.naive_utc(),
        }
    }
}

/// Backend calendar timestamp encoded as `[yyyy, M, d, H, m, s?]`.
///
/// Components after the year are optional and default to the start of the
/// period. The value is local time without a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireTimestamp(Vec<i32>);

impl WireTimestamp {
    #[must_use]
    pub fn new(parts: Vec<i32>) -> Self {
        Self(parts)
    }

    #[must_use]
    pub fn parts(&self) -> &[i32] {
        &self.0
    }

    /// Calendar value when at least the year is present and every component
    /// is in range.
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let year = *self.0.first()?;
        let part = |idx: usize, default: i32| -> Option<u32> {
            u32::try_from(self.0.get(idx).copied().unwrap_or(default)).ok()
        };
        NaiveDate::from_ymd_opt(year, part(1, 1)?, part(2, 1)?)?.and_hms_opt(
            part(3, 0)?,
            part(4, 0)?,
            part(5, 0)?,
        )
    }

    /// Sort key used for newest-first lists.
    ///
    /// Requires the five components up to minutes; anything shorter or
    /// invalid sorts as zero.
    #[must_use]
    pub fn sort_key(&self) -> i64 {
        if self.0.len() < 5 {
            return 0;
        }
        self.to_naive()
            .map_or(0, |dt| dt.and_utc().timestamp_millis())
    }

    /// `yyyy-MM-dd HH:mm`, or an empty string when fewer than five parts.
    #[must_use]
    pub fn display(&self) -> String {
        match self.0.as_slice() {
            [y, m, d, hh, mm, ..] => format!("{y:04}-{m:02}-{d:02} {hh:02}:{mm:02}"),
            _ => String::new(),
        }
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
