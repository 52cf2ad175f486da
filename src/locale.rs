// File: ./src/locale.rs
//! Calendar and reminder text built from the `locales/` strings.
use crate::calendar::YearMonth;
use crate::model::{Appointment, AppointmentStatus};
use chrono::{Datelike, NaiveDate, Weekday};
use rust_i18n::t;

pub fn month_name(month0: u32) -> String {
    match month0 {
        0 => t!("month_01"),
        1 => t!("month_02"),
        2 => t!("month_03"),
        3 => t!("month_04"),
        4 => t!("month_05"),
        5 => t!("month_06"),
        6 => t!("month_07"),
        7 => t!("month_08"),
        8 => t!("month_09"),
        9 => t!("month_10"),
        10 => t!("month_11"),
        _ => t!("month_12"),
    }
    .to_string()
}

fn weekday_short(day: Weekday) -> String {
    match day {
        Weekday::Sun => t!("weekday_short_sun"),
        Weekday::Mon => t!("weekday_short_mon"),
        Weekday::Tue => t!("weekday_short_tue"),
        Weekday::Wed => t!("weekday_short_wed"),
        Weekday::Thu => t!("weekday_short_thu"),
        Weekday::Fri => t!("weekday_short_fri"),
        Weekday::Sat => t!("weekday_short_sat"),
    }
    .to_string()
}

fn weekday_name(day: Weekday) -> String {
    match day {
        Weekday::Sun => t!("weekday_sun"),
        Weekday::Mon => t!("weekday_mon"),
        Weekday::Tue => t!("weekday_tue"),
        Weekday::Wed => t!("weekday_wed"),
        Weekday::Thu => t!("weekday_thu"),
        Weekday::Fri => t!("weekday_fri"),
        Weekday::Sat => t!("weekday_sat"),
    }
    .to_string()
}

/// Sunday-first, matching the grid columns.
pub fn weekday_abbreviations() -> Vec<String> {
    [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ]
    .into_iter()
    .map(weekday_short)
    .collect()
}

/// "abril de 2025"
pub fn month_title(month: YearMonth) -> String {
    t!(
        "month_title",
        month = month_name(month.month0()),
        year = month.year()
    )
    .to_string()
}

/// "segunda-feira, 21 de abril de 2025"
pub fn long_date(date: NaiveDate) -> String {
    t!(
        "long_date",
        weekday = weekday_name(date.weekday()),
        day = date.day(),
        month = month_name(date.month0()),
        year = date.year()
    )
    .to_string()
}

pub fn reminder_message(a: &Appointment) -> String {
    t!(
        "reminder_message",
        title = a.title,
        time = a.time_string(),
        date = a.date_string()
    )
    .to_string()
}

pub fn status_label(status: AppointmentStatus) -> String {
    match status {
        AppointmentStatus::Overdue => t!("status_overdue"),
        AppointmentStatus::Today => t!("status_today"),
        AppointmentStatus::Future => t!("status_future"),
    }
    .to_string()
}

pub fn no_appointments() -> String {
    t!("no_appointments").to_string()
}
