use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Today's calendar date in UTC. All scheduling comparisons use UTC days.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Current UTC timestamp without offset, as stored in the database.
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Inclusive list of days from `start` to `end`. Empty when `start > end`.
pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            break;
        }
    }
    days
}

/// Start of the given day (00:00:00).
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
