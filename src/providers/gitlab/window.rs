use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

/// One calendar day in a user's offset, expressed as UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn for_day(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let start =
            (local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc();

        Self {
            date,
            start,
            end: start + Duration::days(1),
        }
    }

    /// The day `now` falls on in the given offset.
    pub fn today(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::for_day(now.with_timezone(&offset).date_naive(), offset)
    }

    /// Exclusive on both ends, so an event on a day boundary belongs to neither day.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start < at && at < self.end
    }

    /// Date bounds for the events API, which filters by whole UTC dates, exclusively.
    /// Padded by a day on each side; events are filtered precisely afterwards.
    pub fn fetch_bounds(&self) -> (NaiveDate, NaiveDate) {
        (
            self.start.date_naive() - Duration::days(1),
            self.end.date_naive() + Duration::days(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn offset_minutes(minutes: i32) -> FixedOffset {
        FixedOffset::east_opt(minutes * 60).unwrap()
    }

    #[test]
    fn test_utc_day() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 5).unwrap();
        let window = ReportWindow::for_day(date, offset_minutes(0));

        assert_eq!(window.start, Utc.with_ymd_and_hms(2023, 10, 5, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2023, 10, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_positive_offset_shifts_day_back_in_utc() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 5).unwrap();
        let window = ReportWindow::for_day(date, offset_minutes(300));

        assert_eq!(window.start, Utc.with_ymd_and_hms(2023, 10, 4, 19, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2023, 10, 5, 19, 0, 0).unwrap());
    }

    #[test]
    fn test_today_uses_local_date() {
        // 22:30 UTC is already the next day at UTC+3
        let now = Utc.with_ymd_and_hms(2023, 10, 5, 22, 30, 0).unwrap();

        let window = ReportWindow::today(now, offset_minutes(180));
        assert_eq!(window.date, NaiveDate::from_ymd_opt(2023, 10, 6).unwrap());

        let window = ReportWindow::today(now, offset_minutes(-300));
        assert_eq!(window.date, NaiveDate::from_ymd_opt(2023, 10, 5).unwrap());
    }

    #[test]
    fn test_contains_excludes_boundaries() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 5).unwrap();
        let window = ReportWindow::for_day(date, offset_minutes(0));

        assert!(!window.contains(window.start));
        assert!(!window.contains(window.end));
        assert!(window.contains(window.start + Duration::seconds(1)));
        assert!(!window.contains(window.start - Duration::hours(2)));
    }

    #[test]
    fn test_fetch_bounds_cover_the_window() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 5).unwrap();
        let window = ReportWindow::for_day(date, offset_minutes(300));

        let (after, before) = window.fetch_bounds();
        assert_eq!(after, NaiveDate::from_ymd_opt(2023, 10, 3).unwrap());
        assert_eq!(before, NaiveDate::from_ymd_opt(2023, 10, 6).unwrap());
    }
}
