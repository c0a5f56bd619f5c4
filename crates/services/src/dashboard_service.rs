use std::sync::Arc;

use crate::api::AccountApi;
use crate::error::ApiError;

/// Chart windows offered on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayWindow {
    Three,
    Five,
    #[default]
    Seven,
}

impl DayWindow {
    #[must_use]
    pub fn days(self) -> usize {
        match self {
            Self::Three => 3,
            Self::Five => 5,
            Self::Seven => 7,
        }
    }

    #[must_use]
    pub fn from_days(days: usize) -> Option<Self> {
        match days {
            3 => Some(Self::Three),
            5 => Some(Self::Five),
            7 => Some(Self::Seven),
            _ => None,
        }
    }
}

/// Daily accuracy fractions in `0.0..=1.0`, day 1 first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracySeries {
    rates: Vec<f64>,
}

impl AccuracySeries {
    #[must_use]
    pub fn new(rates: Vec<f64>) -> Self {
        Self { rates }
    }

    #[must_use]
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// The first `min(days, len)` points as `(day, percent)`, days counted
    /// from 1.
    #[must_use]
    pub fn window(&self, window: DayWindow) -> Vec<(usize, f64)> {
        self.rates
            .iter()
            .take(window.days())
            .enumerate()
            .map(|(i, rate)| (i + 1, rate * 100.0))
            .collect()
    }
}

#[derive(Clone)]
pub struct DashboardService {
    account: Arc<dyn AccountApi>,
}

impl DashboardService {
    #[must_use]
    pub fn new(account: Arc<dyn AccountApi>) -> Self {
        Self { account }
    }

    /// # Errors
    ///
    /// Returns `ApiError` when the dashboard cannot be fetched.
    pub async fn accuracy_rates(&self) -> Result<AccuracySeries, ApiError> {
        Ok(AccuracySeries::new(self.account.dashboard().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_capped_by_series_length() {
        let series = AccuracySeries::new(vec![0.5, 0.25, 1.0]);
        assert_eq!(
            series.window(DayWindow::Five),
            vec![(1, 50.0), (2, 25.0), (3, 100.0)]
        );
        assert_eq!(series.window(DayWindow::Three).len(), 3);
        assert!(AccuracySeries::default().window(DayWindow::Seven).is_empty());
    }

    #[test]
    fn window_takes_leading_days() {
        let series = AccuracySeries::new(vec![0.1; 10]);
        let points = series.window(DayWindow::Seven);
        assert_eq!(points.len(), 7);
        assert_eq!(points.last().map(|p| p.0), Some(7));
    }

    #[test]
    fn only_supported_windows_parse() {
        assert_eq!(DayWindow::from_days(5), Some(DayWindow::Five));
        assert_eq!(DayWindow::from_days(4), None);
    }
}
