// In-memory session state and the daily refresh schedule.
//
// The state owns the unfiltered datasets; views are derived on demand so the
// full range can always be restored.
use crate::error::{Error, Result};
use crate::filter::filter_by_range;
use crate::loader::parse_platform;
use crate::source::SheetSource;
use crate::types::{CanonicalDataset, DateRange, Platform};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AppState {
    current: Platform,
    datasets: BTreeMap<Platform, CanonicalDataset>,
    date_filter: DateRange,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current: Platform::Summary,
            datasets: BTreeMap::new(),
            date_filter: DateRange::none(),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and parse every platform, then swap all datasets in at once.
    /// On error the previous datasets stay in place.
    pub fn refresh<S: SheetSource>(&mut self, source: &S) -> Result<()> {
        let mut fresh = BTreeMap::new();
        for platform in Platform::ALL {
            let text = source.fetch(platform)?;
            fresh.insert(platform, parse_platform(platform, &text));
        }
        self.datasets = fresh;
        info!("Data refreshed for {} platforms", self.datasets.len());
        Ok(())
    }

    pub fn set_dataset(&mut self, platform: Platform, dataset: CanonicalDataset) {
        self.datasets.insert(platform, dataset);
    }

    pub fn current(&self) -> Platform {
        self.current
    }

    pub fn switch_platform(&mut self, platform: Platform) {
        self.current = platform;
    }

    pub fn date_filter(&self) -> DateRange {
        self.date_filter
    }

    /// Set the date filter. A single date is used as both ends and reversed
    /// ends are swapped. The range is clamped to the current dataset's first
    /// and last dates. No date at all is rejected.
    pub fn apply_date_range(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRange> {
        let range = match (start, end) {
            (None, None) => return Err(Error::NoDateSelected),
            (Some(a), None) | (None, Some(a)) => DateRange::between(a, a),
            (Some(a), Some(b)) => DateRange::between(a, b),
        };
        let range = match self.dataset().and_then(CanonicalDataset::date_bounds) {
            Some((min, max)) => range.clamp_to(min, max),
            None => range,
        };
        self.date_filter = range;
        Ok(range)
    }

    pub fn clear_date_filter(&mut self) {
        self.date_filter = DateRange::none();
    }

    /// The unfiltered dataset of the current platform.
    pub fn dataset(&self) -> Option<&CanonicalDataset> {
        self.datasets.get(&self.current)
    }

    /// The current platform's dataset with the date filter applied.
    pub fn view(&self) -> Option<CanonicalDataset> {
        self.dataset().map(|d| filter_by_range(d, &self.date_filter))
    }
}

/// Once-a-day refresh at a fixed local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    at: NaiveTime,
}

impl RefreshSchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(|at| Self { at })
            .ok_or_else(|| Error::Config(format!("invalid refresh time {}:{:02}", hour, minute)))
    }

    /// Checked once a minute: due when the clock reads the refresh minute.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now.hour() == self.at.hour() && now.minute() == self.at.minute()
    }

    /// Today's refresh time, or tomorrow's once today's has passed.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if now >= today {
            today + Duration::days(1)
        } else {
            today
        }
    }

    /// Whole hours and minutes left until the next refresh.
    pub fn countdown(&self, now: NaiveDateTime) -> (i64, i64) {
        let left = self.next_after(now) - now;
        let minutes = left.num_minutes();
        (minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_time_series;
    use crate::source::sample_sheet;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        d(2026, 1, 5).and_hms_opt(h, m, 0).unwrap()
    }

    struct Samples;

    impl SheetSource for Samples {
        fn fetch(&self, platform: Platform) -> Result<String> {
            Ok(sample_sheet(platform).to_string())
        }
    }

    struct Broken;

    impl SheetSource for Broken {
        fn fetch(&self, _platform: Platform) -> Result<String> {
            Err(Error::Io(std::io::Error::other("offline")))
        }
    }

    #[test]
    fn date_range_applier_rules() {
        let mut state = AppState::new();
        assert!(matches!(state.apply_date_range(None, None), Err(Error::NoDateSelected)));

        let r = state.apply_date_range(Some(d(2026, 1, 3)), None).unwrap();
        assert_eq!(r, DateRange::between(d(2026, 1, 3), d(2026, 1, 3)));

        let r = state.apply_date_range(None, Some(d(2026, 1, 4))).unwrap();
        assert_eq!(r.start, Some(d(2026, 1, 4)));

        let r = state
            .apply_date_range(Some(d(2026, 1, 9)), Some(d(2026, 1, 2)))
            .unwrap();
        assert_eq!(r.start, Some(d(2026, 1, 2)));
        assert_eq!(r.end, Some(d(2026, 1, 9)));
        assert_eq!(state.date_filter(), r);

        state.clear_date_filter();
        assert!(!state.date_filter().is_active());
    }

    #[test]
    fn view_filters_without_losing_full_range() {
        let mut state = AppState::new();
        state.refresh(&Samples).unwrap();
        state.switch_platform(Platform::TikTok);
        let full = state.dataset().unwrap().clone();
        assert_eq!(full.records.len(), 5);

        state
            .apply_date_range(Some(d(2026, 1, 2)), Some(d(2026, 1, 3)))
            .unwrap();
        assert_eq!(state.view().unwrap().records.len(), 2);
        assert_eq!(state.dataset().unwrap(), &full);

        state.clear_date_filter();
        assert_eq!(state.view().unwrap(), full);
    }

    #[test]
    fn date_range_is_clamped_to_the_data() {
        let mut state = AppState::new();
        state.refresh(&Samples).unwrap();
        state.switch_platform(Platform::TikTok);
        assert_eq!(state.current(), Platform::TikTok);

        let r = state
            .apply_date_range(Some(d(2025, 12, 1)), Some(d(2026, 1, 3)))
            .unwrap();
        assert_eq!(r, DateRange::between(d(2026, 1, 1), d(2026, 1, 3)));
        assert_eq!(state.view().unwrap().records.len(), 3);

        let r = state
            .apply_date_range(Some(d(2027, 1, 1)), Some(d(2027, 1, 2)))
            .unwrap();
        assert_eq!(r.start, Some(d(2027, 1, 1)));
        assert!(state.view().unwrap().is_empty());
    }

    #[test]
    fn failed_refresh_keeps_previous_data() {
        let mut state = AppState::new();
        state.set_dataset(Platform::Summary, parse_time_series("Date,A\n2026-01-01,1"));
        assert!(state.refresh(&Broken).is_err());
        assert_eq!(state.dataset().unwrap().total, 1.0);
    }

    #[test]
    fn schedule_rolls_to_tomorrow() {
        let s = RefreshSchedule::new(12, 0).unwrap();
        assert_eq!(s.next_after(at(9, 30)), at(12, 0));
        assert_eq!(s.next_after(at(12, 0)), d(2026, 1, 6).and_hms_opt(12, 0, 0).unwrap());
        assert_eq!(s.countdown(at(9, 30)), (2, 30));
        assert_eq!(s.countdown(at(11, 55)), (0, 5));
        assert!(s.is_due(at(12, 0)));
        assert!(!s.is_due(at(12, 1)));
        assert!(RefreshSchedule::new(24, 0).is_err());
    }
}
