// File: ./src/reminder.rs
//! One-shot reminder scan.
//!
//! An appointment is due when `now` lies in `[start - lead, start)` and its
//! reminder has not fired yet. Firing sets `notified`, which is never cleared
//! here. A window that passed while nothing was scanning is simply missed.
use crate::locale;
use crate::model::Appointment;
use crate::store::AppointmentStore;
use chrono::NaiveDateTime;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderNotice {
    pub id: String,
    pub title: String,
    pub message: String,
    pub starts_at: NaiveDateTime,
}

impl ReminderNotice {
    fn for_appointment(a: &Appointment) -> Self {
        Self {
            id: a.id.clone(),
            title: a.title.clone(),
            message: locale::reminder_message(a),
            starts_at: a.starts_at(),
        }
    }
}

/// A lead reaching before the earliest representable instant leaves the
/// window open from the start of time.
pub fn is_due(a: &Appointment, now: NaiveDateTime) -> bool {
    !a.notified && now < a.starts_at() && a.reminder_at().is_none_or(|at| now >= at)
}

/// Marks every due appointment as notified and returns one notice per
/// appointment, in store order. The caller persists when this is non-empty.
pub fn scan(store: &mut AppointmentStore, now: NaiveDateTime) -> Vec<ReminderNotice> {
    store
        .iter_mut()
        .filter(|a| is_due(a, now))
        .map(|a| {
            a.notified = true;
            log::info!("Reminder due for {} ({})", a.id, a.title);
            ReminderNotice::for_appointment(a)
        })
        .collect()
}

/// Receives fired reminders.
pub trait Notifier {
    fn notify(&self, notice: &ReminderNotice);
}

/// Keeps every message it is handed.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &ReminderNotice) {
        if let Ok(mut m) = self.messages.lock() {
            m.push(notice.message.clone());
        }
    }
}

/// Prints reminders on stdout, for `agenda remind`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, notice: &ReminderNotice) {
        println!("{}", notice.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AppointmentDraft;
    use chrono::{Duration, NaiveDate};

    fn store_with(title: &str, time: &str, lead: &str) -> AppointmentStore {
        let mut store = AppointmentStore::new();
        store
            .create_at(
                &AppointmentDraft {
                    title: title.to_string(),
                    date: "2025-04-21".to_string(),
                    time: time.to_string(),
                    reminder: lead.to_string(),
                    ..Default::default()
                },
                1,
            )
            .unwrap();
        store
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 21)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_fires_once_inside_window() {
        let mut store = store_with("Consulta", "10:00", "15");
        let start = at(10, 0);

        let fired = scan(&mut store, start - Duration::minutes(10));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].message, "Lembrete: Consulta às 10:00 em 2025-04-21");
        assert!(store.all()[0].notified);

        assert!(scan(&mut store, start - Duration::minutes(5)).is_empty());
    }

    #[test]
    fn test_window_bounds() {
        let mut store = store_with("Consulta", "10:00", "15");
        assert!(scan(&mut store, at(9, 44)).is_empty());
        assert!(scan(&mut store, at(10, 0)).is_empty(), "start is outside the window");
        assert_eq!(scan(&mut store, at(9, 45)).len(), 1, "window opens inclusively");
    }

    #[test]
    fn test_missed_window_is_not_caught_up() {
        let mut store = store_with("Late", "10:00", "15");
        assert!(scan(&mut store, at(10, 30)).is_empty());
        assert!(!store.all()[0].notified);
    }

    #[test]
    fn test_zero_lead_never_fires() {
        let mut store = store_with("Instant", "10:00", "0");
        assert!(scan(&mut store, at(10, 0)).is_empty());
        assert!(scan(&mut store, at(9, 59)).is_empty());
    }

    #[test]
    fn test_huge_lead_near_earliest_date() {
        let mut store = AppointmentStore::new();
        store
            .create_at(
                &AppointmentDraft {
                    title: "Antigo".to_string(),
                    date: "-262140-01-01".to_string(),
                    time: "10:00".to_string(),
                    reminder: "4294967295".to_string(),
                    ..Default::default()
                },
                1,
            )
            .unwrap();
        assert!(scan(&mut store, at(9, 0)).is_empty(), "already started");

        let start = store.all()[0].starts_at();
        let fired = scan(&mut store, start - Duration::minutes(1));
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        let mut store = store_with("Pagar boleto", "12:00", "60");
        for n in scan(&mut store, at(11, 30)) {
            notifier.notify(&n);
        }
        assert_eq!(
            notifier.messages(),
            vec!["Lembrete: Pagar boleto às 12:00 em 2025-04-21".to_string()]
        );
    }
}
