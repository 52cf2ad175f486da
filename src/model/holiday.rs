// File: ./src/model/holiday.rs
// Bundled, read-only holiday table.
use crate::model::appointment::DATE_FORMAT;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayScope {
    National,
    /// State holiday, tagged with the state code.
    State(&'static str),
}

impl fmt::Display for HolidayScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HolidayScope::National => write!(f, "{}", rust_i18n::t!("holiday_national")),
            HolidayScope::State(code) => {
                write!(f, "{}", rust_i18n::t!("holiday_state", code = code))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    /// ISO date, matched verbatim against the cell date.
    pub date: &'static str,
    pub name: &'static str,
    pub scope: HolidayScope,
}

impl Holiday {
    const fn national(date: &'static str, name: &'static str) -> Self {
        Self {
            date,
            name,
            scope: HolidayScope::National,
        }
    }

    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date, DATE_FORMAT).ok()
    }
}

pub const HOLIDAYS: &[Holiday] = &[
    Holiday::national("2025-01-01", "Confraternização Universal"),
    Holiday::national("2025-04-18", "Paixão de Cristo"),
    Holiday::national("2025-04-21", "Tiradentes"),
    Holiday::national("2025-05-01", "Dia do Trabalho"),
    Holiday::national("2025-09-07", "Independência do Brasil"),
    Holiday {
        date: "2025-09-20",
        name: "Revolução Farroupilha",
        scope: HolidayScope::State("RS"),
    },
    Holiday::national("2025-10-12", "Nossa Senhora Aparecida"),
    Holiday::national("2025-11-02", "Finados"),
    Holiday::national("2025-11-15", "Proclamação da República"),
    Holiday::national("2025-11-20", "Dia da Consciência Negra"),
    Holiday::national("2025-12-25", "Natal"),
];

pub fn holiday_on(holidays: &[Holiday], date: NaiveDate) -> Option<&Holiday> {
    let key = date.format(DATE_FORMAT).to_string();
    holidays.iter().find(|h| h.date == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bundled_date_parses() {
        for h in HOLIDAYS {
            assert!(h.naive_date().is_some(), "bad date in table: {}", h.date);
        }
    }

    #[test]
    fn test_lookup() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 21).unwrap();
        assert_eq!(holiday_on(HOLIDAYS, d).map(|h| h.name), Some("Tiradentes"));

        let d = NaiveDate::from_ymd_opt(2025, 9, 20).unwrap();
        let h = holiday_on(HOLIDAYS, d).unwrap();
        assert_eq!(h.scope.to_string(), "Estadual (RS)");

        // Fixed dataset: same day in another year is not a holiday
        let d = NaiveDate::from_ymd_opt(2026, 4, 21).unwrap();
        assert!(holiday_on(HOLIDAYS, d).is_none());
    }
}
