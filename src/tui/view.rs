// File: src/tui/view.rs
use crate::calendar::CalendarCell;
use crate::locale;
use crate::model::AppointmentStatus;
use crate::tui::state::{AppState, Focus, FormField, InputMode};
use chrono::{Datelike, Local, NaiveDateTime};
use rust_i18n::t;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

const CELL_WIDTH: usize = 6;

fn status_color(status: AppointmentStatus) -> Color {
    match status {
        AppointmentStatus::Overdue => Color::DarkGray,
        AppointmentStatus::Today => Color::Yellow,
        AppointmentStatus::Future => Color::Blue,
    }
}

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let now = Local::now().naive_local();

    let full_help_text = vec![
        Line::from(vec![
            Span::styled(
                t!("help_global").to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(t!("help_global_keys").to_string()),
        ]),
        Line::from(vec![
            Span::styled(
                t!("help_calendar").to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(t!("help_calendar_keys").to_string()),
        ]),
        Line::from(vec![
            Span::styled(
                t!("help_list").to_string(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(t!("help_list_keys").to_string()),
        ]),
        Line::from(vec![
            Span::styled(
                t!("help_selection").to_string(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(t!("help_selection_keys").to_string()),
        ]),
    ];

    let footer_height = if state.show_full_help {
        Constraint::Length(full_help_text.len() as u16 + 2)
    } else {
        Constraint::Length(3)
    };

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), footer_height])
        .split(f.area());

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((CELL_WIDTH * 7 + 2) as u16),
            Constraint::Min(0),
        ])
        .split(v_chunks[0]);

    let cal_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(h_chunks[0]);

    draw_calendar(f, state, cal_chunks[0], now);
    draw_day_details(f, state, cal_chunks[1], now);
    draw_list(f, state, h_chunks[1], now);
    draw_footer(f, state, v_chunks[1], full_help_text);

    match state.mode {
        InputMode::Form => draw_form(f, state),
        InputMode::ConfirmDelete => {
            let title = state
                .pending_delete
                .as_deref()
                .and_then(|id| state.controller.store().get(id))
                .map(|a| a.title.clone())
                .unwrap_or_default();
            draw_confirm(f, &t!("confirm_delete_one", title = title));
        }
        InputMode::ConfirmBulkDelete => {
            let n = state.controller.selection().len();
            draw_confirm(
                f,
                &t!("confirm_delete_many", count = n),
            );
        }
        _ => {}
    }

    if let Some(notice) = state.active_reminders.first() {
        draw_reminder(f, &notice.message, state.active_reminders.len());
    }
}

fn cell_spans(cell: &CalendarCell<'_>, cursor: bool, now: NaiveDateTime) -> Vec<Span<'static>> {
    let mut style = Style::default();
    if !cell.in_month {
        style = style.fg(Color::DarkGray);
    } else if cell.holiday.is_some() {
        style = style.fg(Color::Red);
    }
    if cell.is_today {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let mut spans = vec![Span::styled(format!("{:>3}", cell.date.day()), style)];
    let statuses = cell.statuses(now);
    let mut used = 3;
    for status in statuses.iter().take(2) {
        spans.push(Span::styled("•", Style::default().fg(status_color(*status))));
        used += 1;
    }
    spans.push(Span::raw(" ".repeat(CELL_WIDTH.saturating_sub(used))));
    spans
}

fn draw_calendar(f: &mut Frame, state: &AppState, area: Rect, now: NaiveDateTime) {
    let grid = state.controller.grid(now.date());
    let mut lines = vec![Line::from(
        locale::weekday_abbreviations()
            .iter()
            .map(|d| Span::styled(format!("{:>3}   ", d), Style::default().fg(Color::Cyan)))
            .collect::<Vec<_>>(),
    )];
    for week in grid.weeks() {
        let spans: Vec<Span> = week
            .iter()
            .flat_map(|cell| cell_spans(cell, cell.date == state.cursor_date, now))
            .collect();
        lines.push(Line::from(spans));
    }

    let mut title = format!(" {} ", locale::month_title(grid.month));
    if state.controller.selection().is_active() {
        let count = state.controller.selection().len();
        title.push_str(&t!("panel_selection", count = count));
    }
    let border = if state.focus == Focus::Calendar {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let p = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border),
    );
    f.render_widget(p, area);
}

fn draw_day_details(f: &mut Frame, state: &AppState, area: Rect, now: NaiveDateTime) {
    let date = state.cursor_date;
    let mut lines = vec![Line::from(Span::styled(
        locale::long_date(date),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if let Some(h) = crate::model::holiday_on(state.controller.holidays(), date) {
        lines.push(Line::from(Span::styled(
            format!("{} ({})", h.name, h.scope),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));

    let day = state.controller.store().find_by_date(date);
    if day.is_empty() {
        lines.push(Line::from(Span::styled(
            t!("no_appointments_today").to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for a in day {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", a.time_string()),
                Style::default().fg(status_color(a.classify(now))),
            ),
            Span::raw(a.title.clone()),
            Span::styled(
                format!("  {}", a.category),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        if !a.description.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("      {}", a.description),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(t!("panel_day").to_string()).borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_list(f: &mut Frame, state: &mut AppState, area: Rect, now: NaiveDateTime) {
    let selecting = state.controller.selection().is_active();
    let items: Vec<ListItem> = state
        .visible
        .iter()
        .filter_map(|id| state.controller.store().get(id))
        .map(|a| {
            let mut style = Style::default().fg(status_color(a.classify(now)));
            if state.fading.contains(&a.id) {
                style = style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
            }
            let mut spans = vec![];
            if selecting {
                let mark = if state.controller.selection().contains(&a.id) {
                    "[x] "
                } else {
                    "[ ] "
                };
                spans.push(Span::raw(mark));
            }
            spans.push(Span::styled(
                format!(
                    "{} {} - {}",
                    a.date.format("%d/%m/%Y"),
                    a.time_string(),
                    a.title
                ),
                style,
            ));
            spans.push(Span::styled(
                format!("  {}", a.category),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = if state.active_search_query.is_empty() {
        t!("panel_appointments").to_string()
    } else {
        t!("panel_appointments_filtered", query = state.active_search_query).to_string()
    };
    let border = if state.focus == Focus::List {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border);

    if items.is_empty() {
        let p = Paragraph::new(locale::no_appointments())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state.list_state);
}

fn draw_footer(f: &mut Frame, state: &AppState, area: Rect, help: Vec<Line<'static>>) {
    f.render_widget(Clear, area);
    if state.mode == InputMode::Searching {
        let p = Paragraph::new(state.input_buffer.as_str()).block(
            Block::default()
                .title(t!("panel_search").to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        f.render_widget(p, area);
        f.set_cursor_position((area.x + 1 + state.cursor_position as u16, area.y + 1));
        return;
    }

    if state.show_full_help {
        let p = Paragraph::new(help).block(
            Block::default()
                .title(t!("panel_help").to_string())
                .borders(Borders::ALL),
        );
        f.render_widget(p, area);
        return;
    }

    let p = Paragraph::new(Line::from(vec![
        Span::raw(state.message.clone()),
        Span::styled(t!("footer_help_hint").to_string(), Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_form(f: &mut Frame, state: &AppState) {
    let Some(form) = &state.form else {
        return;
    };
    let area = centered_rect(60, 50, f.area());
    let title = if form.editing.is_some() {
        t!("form_edit_title").to_string()
    } else {
        t!("form_add_title").to_string()
    };

    let mut lines = vec![Line::from("")];
    for field in FormField::ALL {
        let active = field == form.field;
        let label_style = if active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut value = form.value(field);
        if active {
            if field == FormField::Category {
                value = format!("< {} >", value);
            } else {
                value.push('▏');
            }
        }
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<15}", field.label()), label_style),
            Span::raw(value),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            format!(" {}", err),
            Style::default().fg(Color::LightRed),
        )));
    }
    lines.push(Line::from(Span::styled(
        t!("form_hint").to_string(),
        Style::default().fg(Color::DarkGray),
    )));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn draw_confirm(f: &mut Frame, question: &str) {
    let area = centered_rect(50, 20, f.area());
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(question.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                " [S] ",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(t!("confirm_yes").to_string()),
            Span::styled(
                " [N] ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(t!("confirm_no").to_string()),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(t!("confirm_title").to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::LightRed)),
    );
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn draw_reminder(f: &mut Frame, message: &str, pending: usize) {
    let area = centered_rect(60, 25, f.area());
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::White),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                " [Enter] ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(t!("reminder_dismiss").to_string()),
        ]),
    ];
    if pending > 1 {
        lines.push(Line::from(Span::styled(
            t!("reminder_more", count = pending - 1).to_string(),
            Style::default().fg(Color::Gray),
        )));
    }
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(t!("reminder_popup_title").to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed))
                .style(Style::default().bg(Color::DarkGray)),
        );
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
