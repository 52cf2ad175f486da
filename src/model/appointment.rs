// File: ./src/model/appointment.rs
use crate::error::{AgendaError, AgendaResult};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, EnumString};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

// --- CATEGORY ---

/// Fixed set of appointment types offered by the form.
///
/// Stored as a lowercase ASCII slug. Unknown slugs read from disk collapse
/// into `Other` so a single odd record can't poison the whole file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, EnumString,
)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[strum(serialize = "reuniao", serialize = "reunião", serialize = "meeting")]
    Meeting,
    #[strum(serialize = "cliente", serialize = "client")]
    Client,
    #[strum(serialize = "pagamento", serialize = "payment")]
    Payment,
    #[strum(serialize = "pessoal", serialize = "personal")]
    Personal,
    #[default]
    #[strum(serialize = "outro", serialize = "other")]
    Other,
}

impl Category {
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Meeting => "reuniao",
            Category::Client => "cliente",
            Category::Payment => "pagamento",
            Category::Personal => "pessoal",
            Category::Other => "outro",
        }
    }

    /// Display name in the active locale.
    pub fn label(&self) -> String {
        match self {
            Category::Meeting => rust_i18n::t!("category_meeting"),
            Category::Client => rust_i18n::t!("category_client"),
            Category::Payment => rust_i18n::t!("category_payment"),
            Category::Personal => rust_i18n::t!("category_personal"),
            Category::Other => rust_i18n::t!("category_other"),
        }
        .to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::from_str(s.trim()).unwrap_or_default()
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.slug().to_string()
    }
}

// --- STATUS ---

/// Three-way classification of an appointment relative to "now".
/// Drives both list styling and the grid dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Overdue,
    Today,
    Future,
}

// --- APPOINTMENT ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub category: Category,
    /// Minutes before the start at which the reminder fires.
    #[serde(rename = "reminder", default, deserialize_with = "lenient_minutes::deserialize")]
    pub reminder_minutes: u32,
    #[serde(default)]
    pub notified: bool,
}

impl Appointment {
    pub fn new(id: String, fields: AppointmentFields) -> Self {
        Self {
            id,
            title: fields.title,
            date: fields.date,
            time: fields.time,
            description: fields.description,
            category: fields.category,
            reminder_minutes: fields.reminder_minutes,
            notified: false,
        }
    }

    /// Local wall-clock instant at which the appointment starts.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// `None` when the lead reaches past the earliest representable instant.
    pub fn reminder_at(&self) -> Option<NaiveDateTime> {
        self.starts_at()
            .checked_sub_signed(Duration::minutes(i64::from(self.reminder_minutes)))
    }

    pub fn classify(&self, now: NaiveDateTime) -> AppointmentStatus {
        if self.starts_at() < now {
            AppointmentStatus::Overdue
        } else if self.date == now.date() {
            AppointmentStatus::Today
        } else {
            AppointmentStatus::Future
        }
    }

    /// True when the schedule (and therefore the reminder window) differs.
    pub fn schedule_differs(&self, fields: &AppointmentFields) -> bool {
        self.date != fields.date
            || self.time != fields.time
            || self.reminder_minutes != fields.reminder_minutes
    }

    /// Replaces every mutable field. `id` and `notified` are left alone.
    pub fn apply(&mut self, fields: AppointmentFields) {
        self.title = fields.title;
        self.date = fields.date;
        self.time = fields.time;
        self.description = fields.description;
        self.category = fields.category;
        self.reminder_minutes = fields.reminder_minutes;
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn time_string(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

/// Free-function form used by renderers.
pub fn classify(appointment: &Appointment, now: NaiveDateTime) -> AppointmentStatus {
    appointment.classify(now)
}

// --- FORM INPUT ---

/// Validated, typed form content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentFields {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: String,
    pub category: Category,
    pub reminder_minutes: u32,
}

/// Raw form content, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub title: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub category: Category,
    pub reminder: String,
}

impl AppointmentDraft {
    /// Blank form preset for a clicked day.
    pub fn for_date(date: NaiveDate, default_time: NaiveTime, default_reminder: u32) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            time: default_time.format(TIME_FORMAT).to_string(),
            reminder: default_reminder.to_string(),
            ..Default::default()
        }
    }

    pub fn from_appointment(a: &Appointment) -> Self {
        Self {
            title: a.title.clone(),
            date: a.date_string(),
            time: a.time_string(),
            description: a.description.clone(),
            category: a.category,
            reminder: a.reminder_minutes.to_string(),
        }
    }

    pub fn validate(&self) -> AgendaResult<AppointmentFields> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AgendaError::missing("title"));
        }
        let date = parse_date(&self.date)?;
        let time = parse_time(&self.time)?;

        let reminder = self.reminder.trim();
        let reminder_minutes = if reminder.is_empty() {
            0
        } else {
            reminder
                .parse::<u32>()
                .map_err(|_| AgendaError::Validation {
                    field: "reminder",
                    reason: format!("'{}' is not a number of minutes", reminder),
                })?
        };

        Ok(AppointmentFields {
            title: title.to_string(),
            date,
            time,
            description: self.description.trim().to_string(),
            category: self.category,
            reminder_minutes,
        })
    }
}

pub fn parse_date(input: &str) -> AgendaResult<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AgendaError::missing("date"));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| AgendaError::Validation {
        field: "date",
        reason: format!("'{}' is not a YYYY-MM-DD date", s),
    })
}

pub fn parse_time(input: &str) -> AgendaResult<NaiveTime> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AgendaError::missing("time"));
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|_| AgendaError::Validation {
        field: "time",
        reason: format!("'{}' is not a HH:MM time", s),
    })
}

/// `HH:MM` on disk. `HH:MM:SS` is accepted when reading and the seconds are
/// dropped, so the loaded time is the one the next save writes.
mod hhmm {
    use super::TIME_FORMAT;
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map(|t| t.with_second(0).unwrap_or(t))
            .map_err(serde::de::Error::custom)
    }
}

/// Reminder lead as older files wrote it: a number, a numeric string or
/// `null`. Anything unusable reads as 0, which never fires.
mod lenient_minutes {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let minutes = match Option::<Raw>::deserialize(d)? {
            Some(Raw::Int(n)) => n,
            Some(Raw::Float(f)) if f.is_finite() => f as i64,
            Some(Raw::Text(s)) => leading_integer(&s),
            _ => 0,
        };
        Ok(minutes.clamp(0, i64::from(u32::MAX)) as u32)
    }

    /// Leading optionally signed digits, "15min" reads as 15.
    fn leading_integer(s: &str) -> i64 {
        let s = s.trim_start();
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if end == 0 {
            return 0;
        }
        let n = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
        if negative { -n } else { n }
    }
}
