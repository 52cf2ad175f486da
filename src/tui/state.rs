// File: ./src/tui/state.rs
// Manages the application state for the TUI.
use crate::calendar::YearMonth;
use crate::config::Config;
use crate::controller::{AgendaController, Command};
use crate::model::{Appointment, AppointmentDraft, Category};
use crate::reminder::ReminderNotice;
use chrono::{Datelike, Duration, NaiveDate};
use ratatui::widgets::ListState;
use rust_i18n::t;
use std::collections::HashSet;
use strum::IntoEnumIterator;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Focus {
    Calendar,
    List,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum InputMode {
    Normal,
    Searching,
    Form,
    ConfirmDelete,
    ConfirmBulkDelete,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FormField {
    Title,
    Date,
    Time,
    Category,
    Reminder,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Title,
        FormField::Date,
        FormField::Time,
        FormField::Category,
        FormField::Reminder,
        FormField::Description,
    ];

    pub fn label(&self) -> String {
        match self {
            FormField::Title => t!("field_title"),
            FormField::Date => t!("field_date"),
            FormField::Time => t!("field_time"),
            FormField::Category => t!("field_category"),
            FormField::Reminder => t!("field_reminder"),
            FormField::Description => t!("field_description"),
        }
        .to_string()
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The add/edit form.
#[derive(Debug, Clone)]
pub struct FormState {
    /// `Some(id)` when editing an existing appointment.
    pub editing: Option<String>,
    pub draft: AppointmentDraft,
    pub field: FormField,
    pub error: Option<String>,
}

impl FormState {
    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Title => Some(&mut self.draft.title),
            FormField::Date => Some(&mut self.draft.date),
            FormField::Time => Some(&mut self.draft.time),
            FormField::Reminder => Some(&mut self.draft.reminder),
            FormField::Description => Some(&mut self.draft.description),
            FormField::Category => None,
        }
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.draft.title.clone(),
            FormField::Date => self.draft.date.clone(),
            FormField::Time => self.draft.time.clone(),
            FormField::Category => self.draft.category.label(),
            FormField::Reminder => self.draft.reminder.clone(),
            FormField::Description => self.draft.description.clone(),
        }
    }

    pub fn cycle_category(&mut self, forward: bool) {
        let all: Vec<Category> = Category::iter().collect();
        let idx = all.iter().position(|c| *c == self.draft.category).unwrap_or(0);
        let next = if forward {
            (idx + 1) % all.len()
        } else {
            (idx + all.len() - 1) % all.len()
        };
        self.draft.category = all[next];
    }
}

pub struct AppState {
    pub controller: AgendaController,
    pub config: Config,

    // Ids shown in the list, in store order, after search filtering
    pub visible: Vec<String>,

    // UI State
    pub focus: Focus,
    pub mode: InputMode,
    pub cursor_date: NaiveDate,
    pub list_state: ListState,
    pub message: String,
    pub show_full_help: bool,

    // Input Buffers
    pub input_buffer: String,
    pub active_search_query: String,
    pub cursor_position: usize,

    pub form: Option<FormState>,
    pub pending_delete: Option<String>,
    /// Rows already confirmed for deletion, shown dimmed until removed.
    pub fading: HashSet<String>,
    /// Reminders waiting to be dismissed, oldest first.
    pub active_reminders: Vec<ReminderNotice>,
}

impl AppState {
    pub fn new(controller: AgendaController, config: Config, today: NaiveDate) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        let mut state = Self {
            controller,
            config,
            visible: vec![],
            focus: Focus::Calendar,
            mode: InputMode::Normal,
            cursor_date: today,
            list_state,
            message: t!("ready").to_string(),
            show_full_help: false,
            input_buffer: String::new(),
            active_search_query: String::new(),
            cursor_position: 0,
            form: None,
            pending_delete: None,
            fading: HashSet::new(),
            active_reminders: vec![],
        };
        state.refresh_filtered_view();
        state
    }

    /// Recomputes the list from the store and the search term, keeping the
    /// selection in range.
    pub fn refresh_filtered_view(&mut self) {
        let term = if self.mode == InputMode::Searching {
            self.input_buffer.clone()
        } else {
            self.active_search_query.clone()
        };
        self.visible = self
            .controller
            .filtered_appointments(&term)
            .into_iter()
            .map(|a| a.id.clone())
            .collect();

        let len = self.visible.len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn get_selected_appointment(&self) -> Option<&Appointment> {
        let id = self.visible.get(self.list_state.selected()?)?;
        self.controller.store().get(id)
    }

    // --- INPUT HELPERS ---
    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }
    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }
    pub fn enter_char(&mut self, new_char: char) {
        let byte_index = self
            .input_buffer
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.input_buffer.len());

        self.input_buffer.insert(byte_index, new_char);
        self.move_cursor_right();
    }
    pub fn delete_char(&mut self) {
        if self.cursor_position != 0 {
            let current_index = self.cursor_position;
            let before = self.input_buffer.chars().take(current_index - 1);
            let after = self.input_buffer.chars().skip(current_index);
            self.input_buffer = before.chain(after).collect();
            self.move_cursor_left();
        }
    }
    pub fn reset_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.min(self.input_buffer.chars().count())
    }

    // --- LIST NAVIGATION ---
    pub fn next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }
    pub fn previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    // --- CALENDAR NAVIGATION ---

    /// Moves the day cursor, following it into adjacent months.
    pub fn move_cursor_days(&mut self, days: i64) {
        if let Some(d) = self.cursor_date.checked_add_signed(Duration::days(days)) {
            self.cursor_date = d;
        }
        let month = YearMonth::of(self.cursor_date);
        if month != self.controller.displayed_month() {
            let _ = self.controller.dispatch(Command::ShowMonth(month));
        }
    }

    /// Keeps the day cursor inside the displayed month after a month jump.
    pub fn clamp_cursor_to_month(&mut self) {
        let month = self.controller.displayed_month();
        if month.contains(self.cursor_date) {
            return;
        }
        let day = self.cursor_date.day().min(month.days_in_month());
        self.cursor_date = month
            .first_day()
            .with_day(day)
            .unwrap_or_else(|| month.first_day());
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Calendar => Focus::List,
            Focus::List => Focus::Calendar,
        }
    }

    // --- FORM ---

    pub fn open_form_for_date(&mut self, date: NaiveDate) {
        self.form = Some(FormState {
            editing: None,
            draft: AppointmentDraft::for_date(
                date,
                self.config.default_time(),
                self.config.default_reminder_minutes,
            ),
            field: FormField::Title,
            error: None,
        });
        self.mode = InputMode::Form;
    }

    pub fn open_form_for_edit(&mut self, appointment: &Appointment) {
        self.form = Some(FormState {
            editing: Some(appointment.id.clone()),
            draft: AppointmentDraft::from_appointment(appointment),
            field: FormField::Title,
            error: None,
        });
        self.mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.mode = InputMode::Normal;
    }
}
