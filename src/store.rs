// File: src/store.rs
use crate::error::{AgendaError, AgendaResult};
use crate::model::{Appointment, AppointmentDraft};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What an edit does to an appointment whose reminder already fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifiedOnEdit {
    /// Every saved edit clears the flag, even a title-only one.
    #[default]
    Reset,
    /// Clear the flag only when date, time or reminder lead changed.
    Rearm,
    /// Keep the flag as is. A rescheduled appointment will not remind again.
    Preserve,
}

/// In-memory appointment list. Insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct AppointmentStore {
    appointments: Vec<Appointment>,
    last_issued: u64,
    pub notified_on_edit: NotifiedOnEdit,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: NotifiedOnEdit) -> Self {
        Self {
            notified_on_edit: policy,
            ..Self::default()
        }
    }

    /// Replaces the contents, typically with what was loaded at startup.
    /// Later records reusing an identifier are dropped.
    pub fn replace_all(&mut self, appointments: Vec<Appointment>) {
        let mut seen = HashSet::new();
        self.appointments = appointments
            .into_iter()
            .filter(|a| {
                let fresh = seen.insert(a.id.clone());
                if !fresh {
                    log::warn!("Dropping appointment with duplicate id {}", a.id);
                }
                fresh
            })
            .collect();
    }

    pub fn all(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Appointment> {
        self.appointments.iter_mut()
    }

    // --- Mutations ---

    pub fn create(&mut self, draft: &AppointmentDraft) -> AgendaResult<Appointment> {
        self.create_at(draft, Utc::now().timestamp_millis())
    }

    /// Same as `create` with an explicit clock reading (milliseconds) for the id.
    pub fn create_at(&mut self, draft: &AppointmentDraft, now_ms: i64) -> AgendaResult<Appointment> {
        let fields = draft.validate()?;
        let id = self.next_id(now_ms);
        let appointment = Appointment::new(id, fields);
        self.appointments.push(appointment.clone());
        Ok(appointment)
    }

    /// Millisecond-clock id, bumped past the last issued one and any id in use.
    fn next_id(&mut self, now_ms: i64) -> String {
        let mut candidate = (now_ms.max(0) as u64).max(self.last_issued + 1);
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        self.last_issued = candidate;
        candidate.to_string()
    }

    pub fn update(&mut self, id: &str, draft: &AppointmentDraft) -> AgendaResult<Appointment> {
        let policy = self.notified_on_edit;
        let Some(existing) = self.appointments.iter_mut().find(|a| a.id == id) else {
            return Err(AgendaError::NotFound(id.to_string()));
        };
        let fields = draft.validate()?;

        let rearm = match policy {
            NotifiedOnEdit::Reset => true,
            NotifiedOnEdit::Rearm => existing.schedule_differs(&fields),
            NotifiedOnEdit::Preserve => false,
        };
        if rearm {
            existing.notified = false;
        }
        existing.apply(fields);
        Ok(existing.clone())
    }

    /// Removes one appointment. An unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> Option<Appointment> {
        let idx = self.appointments.iter().position(|a| a.id == id)?;
        Some(self.appointments.remove(idx))
    }

    /// Removes every appointment whose id is listed; unknown ids are ignored.
    pub fn delete_many<I, S>(&mut self, ids: I) -> Vec<Appointment>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets: HashSet<String> = ids.into_iter().map(|s| s.as_ref().to_string()).collect();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.appointments)
            .into_iter()
            .partition(|a| targets.contains(&a.id));
        self.appointments = kept;
        removed
    }

    // --- Queries ---

    pub fn find_by_date(&self, date: NaiveDate) -> Vec<&Appointment> {
        self.appointments.iter().filter(|a| a.date == date).collect()
    }

    pub fn search(&self, term: &str) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.matches_search_term(term))
            .collect()
    }
}
