// File: ./src/tui/handlers.rs
// Handles key and timer events for the TUI.
use crate::controller::{Command, Outcome};
use crate::reminder::{Notifier, ReminderNotice};
use crate::system::{DesktopNotifier, SystemEvent};
use crate::tui::action::Action;
use crate::tui::state::{AppState, Focus, FormField, InputMode};
use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rust_i18n::t;
use std::cell::RefCell;

/// Queues reminders for the pop-up and optionally mirrors them to the desktop.
struct PopupNotifier {
    desktop: bool,
    queued: RefCell<Vec<ReminderNotice>>,
}

impl Notifier for PopupNotifier {
    fn notify(&self, notice: &ReminderNotice) {
        if self.desktop {
            DesktopNotifier.notify(notice);
        }
        self.queued.borrow_mut().push(notice.clone());
    }
}

pub fn handle_system_event(state: &mut AppState, event: SystemEvent, now: NaiveDateTime) {
    match event {
        SystemEvent::ReminderTick => run_reminder_scan(state, now),
        SystemEvent::TransitionElapsed(ids) => {
            for id in &ids {
                state.fading.remove(id);
            }
            match state.controller.dispatch(Command::DeleteMany(ids)) {
                Ok(Outcome::Deleted(removed)) if !removed.is_empty() => {
                    state.message = t!("appointments_deleted", count = removed.len()).to_string();
                }
                Ok(_) => {}
                Err(e) => state.message = e.to_string(),
            }
            state.refresh_filtered_view();
        }
    }
}

pub fn run_reminder_scan(state: &mut AppState, now: NaiveDateTime) {
    state.controller.adopt_fired_reminders();
    let notifier = PopupNotifier {
        desktop: state.config.desktop_notifications,
        queued: RefCell::new(vec![]),
    };
    state.controller.scan_reminders(now, &notifier);
    state.active_reminders.extend(notifier.queued.into_inner());
}

fn submit_form(state: &mut AppState) {
    let Some(form) = state.form.as_mut() else {
        return;
    };
    let command = match &form.editing {
        Some(id) => Command::Update(id.clone(), form.draft.clone()),
        None => Command::Create(form.draft.clone()),
    };
    match state.controller.dispatch(command) {
        Ok(outcome) => {
            state.message = match outcome {
                Outcome::Created(a) => t!("appointment_added", title = a.title).to_string(),
                Outcome::Updated(a) => t!("appointment_updated", title = a.title).to_string(),
                _ => String::new(),
            };
            state.close_form();
            state.refresh_filtered_view();
        }
        // Retrying can't bring back a record deleted while the form was open
        Err(e) if e.is_not_found() => {
            state.message = e.to_string();
            state.close_form();
            state.refresh_filtered_view();
        }
        Err(e) => form.error = Some(e.to_string()),
    }
}

fn handle_form_key(key: KeyEvent, state: &mut AppState) {
    if key.code == KeyCode::Enter {
        submit_form(state);
        return;
    }
    let Some(form) = state.form.as_mut() else {
        state.mode = InputMode::Normal;
        return;
    };
    match key.code {
        KeyCode::Esc => state.close_form(),
        KeyCode::Tab | KeyCode::Down => form.field = form.field.next(),
        KeyCode::BackTab | KeyCode::Up => form.field = form.field.previous(),
        KeyCode::Left if form.field == FormField::Category => form.cycle_category(false),
        KeyCode::Right if form.field == FormField::Category => form.cycle_category(true),
        KeyCode::Char(c) => {
            if let Some(text) = form.text_mut() {
                text.push(c);
            }
        }
        KeyCode::Backspace => {
            if let Some(text) = form.text_mut() {
                text.pop();
            }
        }
        _ => {}
    }
}

fn dispatch_and_report(state: &mut AppState, command: Command) -> Option<Outcome> {
    match state.controller.dispatch(command) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            state.message = e.to_string();
            None
        }
    }
}

pub fn handle_key_event(key: KeyEvent, state: &mut AppState, today: NaiveDate) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    // A reminder pop-up swallows the next key.
    if !state.active_reminders.is_empty() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ' | 'd')) {
            state.active_reminders.remove(0);
        }
        return None;
    }

    match state.mode {
        InputMode::Form => handle_form_key(key, state),
        InputMode::Searching => match key.code {
            KeyCode::Enter => {
                state.active_search_query = state.input_buffer.clone();
                state.mode = InputMode::Normal;
                state.reset_input();
                state.refresh_filtered_view();
            }
            KeyCode::Esc => {
                state.active_search_query.clear();
                state.mode = InputMode::Normal;
                state.reset_input();
                state.refresh_filtered_view();
            }
            KeyCode::Char(c) => {
                state.enter_char(c);
                state.refresh_filtered_view();
            }
            KeyCode::Backspace => {
                state.delete_char();
                state.refresh_filtered_view();
            }
            KeyCode::Left => state.move_cursor_left(),
            KeyCode::Right => state.move_cursor_right(),
            KeyCode::Down => state.next(),
            KeyCode::Up => state.previous(),
            _ => {}
        },
        InputMode::ConfirmDelete => match key.code {
            KeyCode::Char('y' | 'Y' | 's' | 'S') | KeyCode::Enter => {
                state.mode = InputMode::Normal;
                if let Some(id) = state.pending_delete.take() {
                    state.fading.insert(id.clone());
                    return Some(Action::ScheduleDelete(vec![id]));
                }
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                state.pending_delete = None;
                state.mode = InputMode::Normal;
            }
            _ => {}
        },
        InputMode::ConfirmBulkDelete => match key.code {
            KeyCode::Char('y' | 'Y' | 's' | 'S') | KeyCode::Enter => {
                state.mode = InputMode::Normal;
                if let Some(Outcome::Deleted(removed)) =
                    dispatch_and_report(state, Command::DeleteSelected)
                {
                    state.message = t!("appointments_deleted", count = removed.len()).to_string();
                }
                state.refresh_filtered_view();
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => state.mode = InputMode::Normal,
            _ => {}
        },
        InputMode::Normal => return handle_normal_key(key, state, today),
    }
    None
}

fn handle_normal_key(key: KeyEvent, state: &mut AppState, today: NaiveDate) -> Option<Action> {
    let selecting = state.controller.selection().is_active();

    match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('?') => state.show_full_help = !state.show_full_help,
        KeyCode::Tab => state.toggle_focus(),
        KeyCode::Esc => {
            if selecting {
                dispatch_and_report(state, Command::ToggleSelectionMode);
            } else if !state.active_search_query.is_empty() {
                state.active_search_query.clear();
                state.refresh_filtered_view();
            }
        }
        KeyCode::Char('/') => {
            state.mode = InputMode::Searching;
            state.input_buffer = state.active_search_query.clone();
            state.cursor_position = state.input_buffer.chars().count();
        }

        // Month navigation
        KeyCode::Char('[') | KeyCode::PageUp => {
            dispatch_and_report(state, Command::PrevMonth);
            state.clamp_cursor_to_month();
        }
        KeyCode::Char(']') | KeyCode::PageDown => {
            dispatch_and_report(state, Command::NextMonth);
            state.clamp_cursor_to_month();
        }
        KeyCode::Char('{') => {
            dispatch_and_report(state, Command::PrevYear);
            state.clamp_cursor_to_month();
        }
        KeyCode::Char('}') => {
            dispatch_and_report(state, Command::NextYear);
            state.clamp_cursor_to_month();
        }
        KeyCode::Char('t') => {
            state.cursor_date = today;
            dispatch_and_report(state, Command::ShowMonth(crate::calendar::YearMonth::of(today)));
        }

        // Selection mode
        KeyCode::Char('v') => {
            dispatch_and_report(state, Command::ToggleSelectionMode);
            state.message = if state.controller.selection().is_active() {
                t!("selection_started").to_string()
            } else {
                t!("selection_cancelled").to_string()
            };
        }
        KeyCode::Char(' ') if selecting => {
            if let Some(id) = state.get_selected_appointment().map(|a| a.id.clone()) {
                dispatch_and_report(state, Command::ToggleSelected(id));
            }
        }
        KeyCode::Char('D') if selecting => {
            if state.controller.selection().is_empty() {
                // Let the controller produce the message.
                dispatch_and_report(state, Command::DeleteSelected);
            } else {
                state.mode = InputMode::ConfirmBulkDelete;
            }
        }
        KeyCode::Char('E') if selecting => {
            if let Some(Outcome::EditRequested(a)) =
                dispatch_and_report(state, Command::EditSelected)
            {
                state.open_form_for_edit(&a);
            }
        }

        KeyCode::Char('a') => state.open_form_for_date(state.cursor_date),
        _ => match state.focus {
            Focus::Calendar => match key.code {
                KeyCode::Left | KeyCode::Char('h') => state.move_cursor_days(-1),
                KeyCode::Right | KeyCode::Char('l') => state.move_cursor_days(1),
                KeyCode::Up | KeyCode::Char('k') => state.move_cursor_days(-7),
                KeyCode::Down | KeyCode::Char('j') => state.move_cursor_days(7),
                KeyCode::Enter => state.open_form_for_date(state.cursor_date),
                _ => {}
            },
            Focus::List => match key.code {
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.previous(),
                KeyCode::Enter | KeyCode::Char('e') if !selecting => {
                    if let Some(a) = state.get_selected_appointment().cloned() {
                        state.open_form_for_edit(&a);
                    }
                }
                KeyCode::Char('d') | KeyCode::Delete if !selecting => {
                    if let Some(id) = state.get_selected_appointment().map(|a| a.id.clone())
                        && !state.fading.contains(&id)
                    {
                        state.pending_delete = Some(id);
                        state.mode = InputMode::ConfirmDelete;
                    }
                }
                _ => {}
            },
        },
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controller::AgendaController;
    use crate::model::AppointmentDraft;
    use crate::storage::MemoryStorage;
    use crate::store::NotifiedOnEdit;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(state: &mut AppState, s: &str) {
        for c in s.chars() {
            handle_key_event(key(KeyCode::Char(c)), state, today());
        }
    }

    fn new_state() -> AppState {
        let controller = AgendaController::open(
            Box::new(MemoryStorage::new()),
            NotifiedOnEdit::Preserve,
            today(),
        );
        let config = Config {
            desktop_notifications: false,
            ..Config::default()
        };
        AppState::new(controller, config, today())
    }

    #[test]
    fn test_add_via_form() {
        let mut state = new_state();
        handle_key_event(key(KeyCode::Char('a')), &mut state, today());
        assert_eq!(state.mode, InputMode::Form);
        type_str(&mut state, "Dentista");
        handle_key_event(key(KeyCode::Enter), &mut state, today());

        assert_eq!(state.mode, InputMode::Normal);
        assert_eq!(state.controller.store().len(), 1);
        let a = &state.controller.store().all()[0];
        assert_eq!(a.date, today());
        assert_eq!(a.time_string(), "09:00");
        assert_eq!(state.visible.len(), 1);
    }

    #[test]
    fn test_form_error_keeps_form_open() {
        let mut state = new_state();
        handle_key_event(key(KeyCode::Char('a')), &mut state, today());
        handle_key_event(key(KeyCode::Enter), &mut state, today());
        assert_eq!(state.mode, InputMode::Form);
        assert!(state.form.as_ref().unwrap().error.is_some());
        handle_key_event(key(KeyCode::Esc), &mut state, today());
        assert!(state.form.is_none());
        assert!(state.controller.store().is_empty());
    }

    #[test]
    fn test_delete_goes_through_transition() {
        let mut state = new_state();
        state
            .controller
            .dispatch(Command::Create(AppointmentDraft {
                title: "X".to_string(),
                date: "2025-04-12".to_string(),
                time: "08:00".to_string(),
                ..Default::default()
            }))
            .unwrap();
        state.refresh_filtered_view();
        state.focus = Focus::List;

        handle_key_event(key(KeyCode::Char('d')), &mut state, today());
        assert_eq!(state.mode, InputMode::ConfirmDelete);
        handle_key_event(key(KeyCode::Char('n')), &mut state, today());
        assert!(state.pending_delete.is_none());

        handle_key_event(key(KeyCode::Char('d')), &mut state, today());
        let action = handle_key_event(key(KeyCode::Char('y')), &mut state, today());
        let Some(Action::ScheduleDelete(ids)) = action else {
            panic!("expected ScheduleDelete");
        };
        assert_eq!(state.controller.store().len(), 1, "removal waits for the timer");
        assert!(state.fading.contains(&ids[0]));

        handle_system_event(
            &mut state,
            SystemEvent::TransitionElapsed(ids),
            today().and_hms_opt(12, 0, 0).unwrap(),
        );
        assert!(state.controller.store().is_empty());
        assert!(state.fading.is_empty());
    }

    #[test]
    fn test_reminder_tick_queues_popup() {
        let mut state = new_state();
        state
            .controller
            .dispatch(Command::Create(AppointmentDraft {
                title: "Consulta".to_string(),
                date: "2025-04-10".to_string(),
                time: "10:00".to_string(),
                reminder: "15".to_string(),
                ..Default::default()
            }))
            .unwrap();

        let now = today().and_hms_opt(9, 50, 0).unwrap();
        handle_system_event(&mut state, SystemEvent::ReminderTick, now);
        handle_system_event(&mut state, SystemEvent::ReminderTick, now);
        assert_eq!(state.active_reminders.len(), 1);

        // Popup eats the key
        assert!(handle_key_event(key(KeyCode::Char('q')), &mut state, today()).is_none());
        handle_key_event(key(KeyCode::Enter), &mut state, today());
        assert!(state.active_reminders.is_empty());
    }

    #[test]
    fn test_edit_of_deleted_appointment_closes_form() {
        let mut state = new_state();
        let Outcome::Created(a) = state
            .controller
            .dispatch(Command::Create(AppointmentDraft {
                title: "Consulta".to_string(),
                date: "2025-04-10".to_string(),
                time: "10:00".to_string(),
                ..Default::default()
            }))
            .unwrap()
        else {
            panic!("expected Created");
        };
        state.open_form_for_edit(&a);
        state.controller.dispatch(Command::Delete(a.id.clone())).unwrap();

        handle_key_event(key(KeyCode::Enter), &mut state, today());
        assert!(state.form.is_none());
        assert!(state.message.contains(&a.id));
    }

    #[test]
    fn test_month_keys() {
        let mut state = new_state();
        handle_key_event(key(KeyCode::Char(']')), &mut state, today());
        assert_eq!(state.cursor_date, NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());
        handle_key_event(key(KeyCode::Char('{')), &mut state, today());
        assert_eq!(state.cursor_date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        handle_key_event(key(KeyCode::Char('t')), &mut state, today());
        assert_eq!(state.cursor_date, today());
        assert_eq!(
            state.controller.displayed_month(),
            crate::calendar::YearMonth::of(today())
        );
    }
}
