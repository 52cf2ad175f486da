// File: ./src/calendar.rs
//! Month grid construction.
//!
//! A grid always covers whole Sunday-first weeks: the leading cells come from the
//! previous month, the trailing ones from the next, and the cell count is the
//! smallest multiple of 7 that holds every day of the target month.
use crate::locale;
use crate::model::{Appointment, AppointmentStatus, Holiday, holiday_on};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// A calendar month with a zero-based month index.
///
/// Construction normalizes out-of-range months the way a JS `Date` does, so
/// month navigation never has to special-case year boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month0: u32,
}

// Keeps every first-of-month inside chrono's representable range.
const MAX_ABS_YEAR: i64 = 200_000;

impl YearMonth {
    pub fn new(year: i32, month0: i32) -> Self {
        let total = (year as i64).clamp(-MAX_ABS_YEAR, MAX_ABS_YEAR) * 12 + month0 as i64;
        Self {
            year: total.div_euclid(12) as i32,
            month0: total.rem_euclid(12) as u32,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    /// Parses `YYYY-MM` (one-based month, as typed by people).
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        let year = y.parse::<i32>().ok()?;
        let month = m.parse::<u32>().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self::new(year, month as i32 - 1))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        (self.next_month().first_day() - self.first_day()).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    pub fn prev_month(&self) -> Self {
        Self::new(self.year, self.month0 as i32 - 1)
    }

    pub fn next_month(&self) -> Self {
        Self::new(self.year, self.month0 as i32 + 1)
    }

    pub fn prev_year(&self) -> Self {
        Self::new(self.year - 1, self.month0 as i32)
    }

    pub fn next_year(&self) -> Self {
        Self::new(self.year + 1, self.month0 as i32)
    }
}

#[derive(Debug, Clone)]
pub struct CalendarCell<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub holiday: Option<&'a Holiday>,
    /// Appointments on this date, in store order.
    pub appointments: Vec<&'a Appointment>,
}

impl CalendarCell<'_> {
    /// One classification per appointment, in the same order, for the grid dots.
    pub fn statuses(&self, now: NaiveDateTime) -> Vec<AppointmentStatus> {
        self.appointments.iter().map(|a| a.classify(now)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct MonthGrid<'a> {
    pub month: YearMonth,
    pub cells: Vec<CalendarCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    pub fn weeks(&self) -> std::slice::Chunks<'_, CalendarCell<'a>> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell<'a>> {
        self.cells.iter().find(|c| c.date == date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.cells.first().map(|c| c.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.cells.last().map(|c| c.date)
    }
}

pub fn build_grid<'a>(
    month: YearMonth,
    today: NaiveDate,
    holidays: &'a [Holiday],
    appointments: &'a [Appointment],
) -> MonthGrid<'a> {
    let first = month.first_day();
    let leading = first.weekday().num_days_from_sunday();
    let total = (leading + month.days_in_month()).div_ceil(7) * 7;
    let start = first - Duration::days(leading as i64);

    let cells = (0..total)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            let in_month = month.contains(date);
            CalendarCell {
                date,
                in_month,
                is_today: in_month && date == today,
                holiday: holiday_on(holidays, date),
                appointments: appointments.iter().filter(|a| a.date == date).collect(),
            }
        })
        .collect();

    MonthGrid { month, cells }
}

/// Plain-text grid for terminals without the TUI.
///
/// `[21]` marks today, `(30)` a day from an adjacent month, `*` a holiday and
/// `+` a day with appointments. Holidays and appointments of the month are
/// listed under the grid.
pub fn render_text(grid: &MonthGrid<'_>, now: NaiveDateTime) -> String {
    let mut out = String::new();
    let title = locale::month_title(grid.month);
    let width = 7 * 6;
    let _ = writeln!(out, "{:^width$}", title, width = width);

    for name in locale::weekday_abbreviations() {
        let _ = write!(out, "{:^6}", name);
    }
    out.push('\n');

    for week in grid.weeks() {
        for cell in week {
            let day = cell.date.day();
            let number = if cell.is_today {
                format!("[{:>2}]", day)
            } else if cell.in_month {
                format!(" {:>2} ", day)
            } else {
                format!("({:>2})", day)
            };
            let holiday = if cell.holiday.is_some() { '*' } else { ' ' };
            let busy = if cell.appointments.is_empty() { ' ' } else { '+' };
            let _ = write!(out, "{}{}{}", number, holiday, busy);
        }
        out.push('\n');
    }

    let in_month = || grid.cells.iter().filter(|c| c.in_month);

    let mut wrote_header = false;
    for cell in in_month() {
        if let Some(h) = cell.holiday {
            if !wrote_header {
                let _ = writeln!(out, "\n{}", rust_i18n::t!("holidays_header"));
                wrote_header = true;
            }
            let _ = writeln!(out, "  {}  {} ({})", h.date, h.name, h.scope);
        }
    }

    let mut wrote_header = false;
    for cell in in_month() {
        for a in &cell.appointments {
            if !wrote_header {
                let _ = writeln!(out, "\n{}", rust_i18n::t!("appointments_header"));
                wrote_header = true;
            }
            let _ = writeln!(
                out,
                "  {} {}  {} [{}]",
                a.date_string(),
                a.time_string(),
                a.title,
                locale::status_label(a.classify(now))
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HOLIDAYS;
    use chrono::Weekday;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_month_normalizes_like_js_date() {
        assert_eq!(YearMonth::new(2025, 12), YearMonth::new(2026, 0));
        assert_eq!(YearMonth::new(2025, -1), YearMonth::new(2024, 11));
        assert_eq!(YearMonth::new(2025, 0).prev_month(), YearMonth::new(2024, 11));
        assert_eq!(YearMonth::new(2025, 11).next_month(), YearMonth::new(2026, 0));
        assert_eq!(YearMonth::parse("2025-04"), Some(YearMonth::new(2025, 3)));
        assert_eq!(YearMonth::parse("2025-13"), None);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(YearMonth::new(2024, 1).days_in_month(), 29);
        assert_eq!(YearMonth::new(2025, 1).days_in_month(), 28);
        assert_eq!(YearMonth::new(2025, 3).days_in_month(), 30);
        assert_eq!(YearMonth::new(2025, 11).days_in_month(), 31);
    }

    #[test]
    fn test_april_2025_layout() {
        // April 1st 2025 is a Tuesday: two leading days, 35 cells.
        let grid = build_grid(YearMonth::new(2025, 3), ymd(2025, 4, 10), HOLIDAYS, &[]);
        assert_eq!(grid.cells.len(), 35);
        assert_eq!(grid.first_date(), Some(ymd(2025, 3, 30)));
        assert_eq!(grid.last_date(), Some(ymd(2025, 5, 3)));
        assert!(!grid.cells[1].in_month);
        assert!(grid.cells[2].in_month);

        let today: Vec<_> = grid.cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, ymd(2025, 4, 10));

        let names: Vec<_> = grid
            .cells
            .iter()
            .filter_map(|c| c.holiday.map(|h| h.name))
            .collect();
        assert_eq!(names, vec!["Paixão de Cristo", "Tiradentes", "Dia do Trabalho"]);
    }

    #[test]
    fn test_exact_four_weeks() {
        // February 2015 starts on Sunday and has 28 days.
        let grid = build_grid(YearMonth::new(2015, 1), ymd(2000, 1, 1), &[], &[]);
        assert_eq!(grid.cells.len(), 28);
        assert!(grid.cells.iter().all(|c| c.in_month));
    }

    #[test]
    fn test_six_week_month() {
        // August 2025 starts on Friday with 31 days: 5 + 31 = 36 -> 42.
        let grid = build_grid(YearMonth::new(2025, 7), ymd(2000, 1, 1), &[], &[]);
        assert_eq!(grid.cells.len(), 42);
        assert_eq!(grid.weeks().count(), 6);
    }

    #[test]
    fn test_all_months_are_whole_weeks() {
        for year in 1999..=2031 {
            for m in 0..12 {
                let month = YearMonth::new(year, m);
                let grid = build_grid(month, ymd(2000, 1, 1), &[], &[]);
                assert!(!grid.cells.is_empty());
                assert_eq!(grid.cells.len() % 7, 0);
                assert_eq!(grid.cells[0].date.weekday(), Weekday::Sun);

                for day in 1..=month.days_in_month() {
                    let date = ymd(year, m as u32 + 1, day);
                    let hits = grid
                        .cells
                        .iter()
                        .filter(|c| c.date == date && c.in_month)
                        .count();
                    assert_eq!(hits, 1, "{} appears {} times", date, hits);
                }
            }
        }
    }

    #[test]
    fn test_today_outside_displayed_month_is_not_flagged() {
        // April grid while "today" is March 30th, one of its leading cells.
        let grid = build_grid(YearMonth::new(2025, 3), ymd(2025, 3, 30), &[], &[]);
        assert_eq!(grid.cells[0].date, ymd(2025, 3, 30));
        assert!(grid.cells.iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_render_text_marks() {
        let grid = build_grid(YearMonth::new(2025, 3), ymd(2025, 4, 10), HOLIDAYS, &[]);
        let text = render_text(&grid, ymd(2025, 4, 10).and_hms_opt(8, 0, 0).unwrap());
        assert!(text.starts_with(&format!("{:^42}", "abril de 2025")));
        assert!(text.contains("[10]"));
        assert!(text.contains(" 21 *"));
        assert!(text.contains("(30)"));
        assert!(text.contains("Tiradentes (Nacional)"));
    }
}
