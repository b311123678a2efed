use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Calendar collaborator computing the number of working days in a month.
pub trait WorkingDays: Send + Sync {
    fn working_days(&self, month: NaiveDate, holidays: &[NaiveDate]) -> u32;
}

/// Monday to Friday calendar, minus the given holidays.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeekdayCalendar;

impl WorkingDays for WeekdayCalendar {
    fn working_days(&self, month: NaiveDate, holidays: &[NaiveDate]) -> u32 {
        days_of_month(month)
            .into_iter()
            .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
            .filter(|day| !holidays.contains(day))
            .count() as u32
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn next_month(month: NaiveDate) -> NaiveDate {
    let month = month_start(month);
    let (year, number) = if month.month() == 12 {
        (month.year() + 1, 1)
    } else {
        (month.year(), month.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, number, 1).unwrap_or(month)
}

/// `count` consecutive month starts beginning at `start`, wrapping across years.
pub fn month_sequence(start: NaiveDate, count: u32) -> Vec<NaiveDate> {
    let mut months = Vec::with_capacity(count as usize);
    let mut current = month_start(start);
    for _ in 0..count {
        months.push(current);
        current = next_month(current);
    }
    months
}

pub fn days_of_month(month: NaiveDate) -> Vec<NaiveDate> {
    let first = month_start(month);
    let end = next_month(first);
    let mut days = Vec::with_capacity(31);
    let mut day = first;
    while day < end {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn counts_weekdays_minus_holidays() {
        // March 2025 starts on a Saturday: 21 weekdays.
        let calendar = WeekdayCalendar;
        assert_eq!(calendar.working_days(date(2025, 3, 1), &[]), 21);

        let holidays = vec![date(2025, 3, 3), date(2025, 3, 8), date(2025, 4, 1)];
        assert_eq!(
            calendar.working_days(date(2025, 3, 1), &holidays),
            20,
            "weekend and out-of-month holidays are ignored"
        );
    }

    #[test]
    fn month_sequence_wraps_year() {
        let months = month_sequence(date(2024, 11, 17), 4);
        assert_eq!(
            months,
            vec![
                date(2024, 11, 1),
                date(2024, 12, 1),
                date(2025, 1, 1),
                date(2025, 2, 1)
            ]
        );
        assert!(month_sequence(date(2024, 11, 1), 0).is_empty());
    }

    #[test]
    fn days_of_month_handles_leap_years() {
        assert_eq!(days_of_month(date(2024, 2, 10)).len(), 29);
        assert_eq!(days_of_month(date(2025, 2, 1)).len(), 28);
        assert_eq!(days_of_month(date(2025, 12, 1)).last(), Some(&date(2025, 12, 31)));
    }
}
