// File: src/controller.rs
//! Central logic controller for appointment operations.
//!
//! Every UI layer (the TUI, the subcommands) turns user intent into a
//! [`Command`] and hands it to [`AgendaController::dispatch`]. The controller owns
//! the store, the persistence backend, the displayed month and the selection set,
//! and it is the only place that saves.
use crate::calendar::{MonthGrid, YearMonth, build_grid};
use crate::error::{AgendaError, AgendaResult};
use crate::model::{Appointment, AppointmentDraft, HOLIDAYS, Holiday};
use crate::reminder::{self, Notifier, ReminderNotice};
use crate::selection::SelectionSet;
use crate::storage::Persistence;
use crate::store::{AppointmentStore, NotifiedOnEdit};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(AppointmentDraft),
    Update(String, AppointmentDraft),
    Delete(String),
    DeleteMany(Vec<String>),

    ToggleSelectionMode,
    ToggleSelected(String),
    /// Deletes everything selected and leaves selection mode.
    DeleteSelected,
    /// Leaves selection mode and yields the single selected appointment.
    EditSelected,

    PrevMonth,
    NextMonth,
    PrevYear,
    NextYear,
    ShowMonth(YearMonth),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(Appointment),
    Updated(Appointment),
    /// Removed records; empty when nothing matched.
    Deleted(Vec<Appointment>),
    SelectionChanged,
    MonthChanged(YearMonth),
    EditRequested(Appointment),
}

#[derive(Debug)]
pub struct AgendaController {
    store: AppointmentStore,
    persistence: Box<dyn Persistence>,
    selection: SelectionSet,
    displayed: YearMonth,
    holidays: &'static [Holiday],
}

impl AgendaController {
    /// Loads the stored appointments once. An unreadable store starts empty.
    pub fn open(
        persistence: Box<dyn Persistence>,
        policy: NotifiedOnEdit,
        today: NaiveDate,
    ) -> Self {
        let mut store = AppointmentStore::with_policy(policy);
        match persistence.load() {
            Ok(list) => {
                log::info!("Loaded {} appointments", list.len());
                store.replace_all(list);
            }
            Err(e) => log::warn!("Starting with an empty agenda: {:#}", e),
        }

        Self {
            store,
            persistence,
            selection: SelectionSet::default(),
            displayed: YearMonth::of(today),
            holidays: HOLIDAYS,
        }
    }

    pub fn store(&self) -> &AppointmentStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn displayed_month(&self) -> YearMonth {
        self.displayed
    }

    pub fn holidays(&self) -> &'static [Holiday] {
        self.holidays
    }

    /// Best effort: a failed save is logged and the in-memory state stands.
    fn persist(&self) {
        if let Err(e) = self.persistence.save(self.store.all()) {
            log::error!("Failed to save appointments: {:#}", e);
        }
    }

    pub fn dispatch(&mut self, command: Command) -> AgendaResult<Outcome> {
        log::debug!("dispatch {:?}", command);
        match command {
            Command::Create(draft) => {
                let created = self.store.create(&draft)?;
                self.persist();
                Ok(Outcome::Created(created))
            }
            Command::Update(id, draft) => {
                let updated = self.store.update(&id, &draft)?;
                self.persist();
                Ok(Outcome::Updated(updated))
            }
            Command::Delete(id) => {
                let removed: Vec<_> = self.store.delete(&id).into_iter().collect();
                Ok(self.after_delete(removed))
            }
            Command::DeleteMany(ids) => {
                let removed = self.store.delete_many(&ids);
                Ok(self.after_delete(removed))
            }

            Command::ToggleSelectionMode => {
                self.selection.toggle_mode();
                Ok(Outcome::SelectionChanged)
            }
            Command::ToggleSelected(id) => {
                if self.store.contains(&id) {
                    self.selection.toggle(&id);
                }
                Ok(Outcome::SelectionChanged)
            }
            Command::DeleteSelected => {
                if self.selection.is_empty() {
                    return Err(AgendaError::Selection(
                        "No appointments selected for deletion.".to_string(),
                    ));
                }
                let ids: Vec<String> = self.selection.ids().map(str::to_string).collect();
                self.selection.exit();
                let removed = self.store.delete_many(&ids);
                Ok(self.after_delete(removed))
            }
            Command::EditSelected => {
                let appointment = self
                    .selection
                    .single()
                    .and_then(|id| self.store.get(id))
                    .cloned()
                    .ok_or_else(|| {
                        AgendaError::Selection("Select exactly one appointment to edit.".to_string())
                    })?;
                self.selection.exit();
                Ok(Outcome::EditRequested(appointment))
            }

            Command::PrevMonth => Ok(self.show(self.displayed.prev_month())),
            Command::NextMonth => Ok(self.show(self.displayed.next_month())),
            Command::PrevYear => Ok(self.show(self.displayed.prev_year())),
            Command::NextYear => Ok(self.show(self.displayed.next_year())),
            Command::ShowMonth(month) => Ok(self.show(month)),
        }
    }

    fn after_delete(&mut self, removed: Vec<Appointment>) -> Outcome {
        if !removed.is_empty() {
            let store = &self.store;
            self.selection.retain(|id| store.contains(id));
            self.persist();
        }
        Outcome::Deleted(removed)
    }

    fn show(&mut self, month: YearMonth) -> Outcome {
        self.displayed = month;
        Outcome::MonthChanged(month)
    }

    // --- Queries ---

    /// Grid for the displayed month.
    pub fn grid(&self, today: NaiveDate) -> MonthGrid<'_> {
        build_grid(self.displayed, today, self.holidays, self.store.all())
    }

    /// Search results in store order; an empty term lists everything.
    pub fn filtered_appointments(&self, term: &str) -> Vec<&Appointment> {
        self.store.search(term)
    }

    /// Marks as notified whatever another process (`agenda remind`) has
    /// already fired and saved since this controller loaded. Nothing else is
    /// taken from disk.
    pub fn adopt_fired_reminders(&mut self) {
        let stored = match self.persistence.load() {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Could not re-read appointments: {:#}", e);
                return;
            }
        };
        let fired: HashSet<String> = stored
            .into_iter()
            .filter(|a| a.notified)
            .map(|a| a.id)
            .collect();
        for a in self.store.iter_mut() {
            if !a.notified && fired.contains(&a.id) {
                log::debug!("Reminder for {} already fired elsewhere", a.id);
                a.notified = true;
            }
        }
    }

    /// Runs one reminder scan, hands each notice to `notifier` and saves if
    /// anything fired.
    pub fn scan_reminders(
        &mut self,
        now: NaiveDateTime,
        notifier: &dyn Notifier,
    ) -> Vec<ReminderNotice> {
        let fired = reminder::scan(&mut self.store, now);
        if !fired.is_empty() {
            for notice in &fired {
                notifier.notify(notice);
            }
            self.persist();
        }
        fired
    }
}
