use chrono::{Datelike, Utc};

use fipe_data::YearOption;

/// Oldest model year the cascade offers.
pub const MIN_YEAR: i32 = 1980;

/// Inclusive window of selectable model years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub min: i32,
    pub max: i32,
}

impl YearWindow {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// `[1980, current year + 1]`.
    pub fn current() -> Self {
        Self::ending_at(Utc::now().year() + 1)
    }

    pub fn ending_at(max: i32) -> Self {
        Self { min: MIN_YEAR, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Keeps options whose leading year falls inside the window.
    pub fn filter(&self, years: Vec<YearOption>) -> Vec<YearOption> {
        years
            .into_iter()
            .filter(|y| y.year().is_some_and(|n| self.contains(n)))
            .collect()
    }

    /// Bare-year candidates, newest first, offered before a model is chosen.
    pub fn candidates(&self) -> Vec<YearOption> {
        (self.min..=self.max)
            .rev()
            .map(|year| YearOption::new(year.to_string(), year.to_string()))
            .collect()
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self::current()
    }
}

/// Finds the model year matching a year picked before the model was known.
pub fn match_pending_year<'a>(years: &'a [YearOption], pending: &str) -> Option<&'a YearOption> {
    years.iter().find(|y| y.matches_raw_year(pending))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_newest_first_and_bounded() {
        let window = YearWindow::ending_at(2027);
        let candidates = window.candidates();
        assert_eq!(candidates.first().unwrap().code, "2027");
        assert_eq!(candidates.last().unwrap().code, "1980");
        assert_eq!(candidates.len(), (2027 - 1980 + 1) as usize);
    }

    #[test]
    fn test_filter_drops_out_of_window_and_zero_km() {
        let window = YearWindow::ending_at(2027);
        let years = vec![
            YearOption::new("32000-1", "Zero KM"),
            YearOption::new("2023-1", "2023 Gasolina"),
            YearOption::new("1975-1", "1975 Gasolina"),
            YearOption::new("abc", "broken"),
        ];
        let filtered = window.filter(years);
        assert_eq!(filtered, vec![YearOption::new("2023-1", "2023 Gasolina")]);
    }

    #[test]
    fn test_pending_prefers_first_prefix_match() {
        let years = vec![
            YearOption::new("2020-1", "2020 Gasolina"),
            YearOption::new("2020-3", "2020 Diesel"),
        ];
        assert_eq!(match_pending_year(&years, "2020").unwrap().code, "2020-1");
        assert_eq!(match_pending_year(&years, "2020-3").unwrap().code, "2020-3");
        assert!(match_pending_year(&years, "2019").is_none());
    }
}
