// File: ./src/cli.rs
//! Command-line parsing and the non-interactive subcommands.
use crate::calendar::{YearMonth, render_text};
use crate::config::Config;
use crate::context::StandardContext;
use crate::controller::{AgendaController, Command, Outcome};
use crate::error::AgendaError;
use crate::locale;
use crate::logging;
use crate::model::{AppointmentDraft, Category};
use crate::reminder::{Notifier, ReminderNotice, StdoutNotifier};
use crate::storage::LocalStorage;
use crate::system::{DesktopNotifier, SystemEvent, spawn_reminder_clock};
use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::sync::mpsc;

/// Field overrides for `edit`; unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditArgs {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub category: Option<Category>,
    pub reminder: Option<String>,
    pub description: Option<String>,
}

impl EditArgs {
    fn apply_to(&self, draft: &mut AppointmentDraft) {
        if let Some(v) = &self.title {
            draft.title = v.clone();
        }
        if let Some(v) = &self.date {
            draft.date = v.clone();
        }
        if let Some(v) = &self.time {
            draft.time = v.clone();
        }
        if let Some(v) = self.category {
            draft.category = v;
        }
        if let Some(v) = &self.reminder {
            draft.reminder = v.clone();
        }
        if let Some(v) = &self.description {
            draft.description = v.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Tui,
    Help,
    Month(Option<YearMonth>),
    List(String),
    Add(AppointmentDraft),
    Edit(String, EditArgs),
    Delete(Vec<String>),
    Remind,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    pub command: CliCommand,
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> Result<String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| anyhow!("Missing value for {}", flag))
}

fn parse_category(s: &str) -> Result<Category> {
    Category::from_str(s.trim()).map_err(|_| {
        anyhow!(
            "Unknown type '{}'. Use reuniao, cliente, pagamento, pessoal or outro",
            s
        )
    })
}

/// Parses everything after the binary name.
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut root = None;
    let mut rest: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-r" | "--root" => root = Some(PathBuf::from(take_value(args, &mut i, "--root")?)),
            "-h" | "--help" | "help" if rest.is_empty() => {
                return Ok(CliArgs {
                    root,
                    command: CliCommand::Help,
                });
            }
            _ => rest.push(args[i].clone()),
        }
        i += 1;
    }

    let command = match rest.first().map(String::as_str) {
        None => CliCommand::Tui,
        Some("month") => match rest.get(1) {
            None => CliCommand::Month(None),
            Some(s) => CliCommand::Month(Some(
                YearMonth::parse(s).ok_or_else(|| anyhow!("Expected YYYY-MM, got '{}'", s))?,
            )),
        },
        Some("list") => CliCommand::List(rest[1..].join(" ")),
        Some("add") => CliCommand::Add(parse_add(&rest[1..])?),
        Some("edit") => {
            let id = rest.get(1).ok_or_else(|| anyhow!("edit needs an id"))?;
            CliCommand::Edit(id.clone(), parse_edit(&rest[2..])?)
        }
        Some("delete") => {
            if rest.len() < 2 {
                bail!("delete needs at least one id");
            }
            CliCommand::Delete(rest[1..].to_vec())
        }
        Some("remind") => CliCommand::Remind,
        Some("export") => CliCommand::Export,
        Some(other) => bail!("Unknown command '{}'. Try --help", other),
    };

    Ok(CliArgs { root, command })
}

fn parse_edit(args: &[String]) -> Result<EditArgs> {
    let mut edit = EditArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--title" => edit.title = Some(take_value(args, &mut i, "--title")?),
            "--date" => edit.date = Some(take_value(args, &mut i, "--date")?),
            "--time" => edit.time = Some(take_value(args, &mut i, "--time")?),
            "--type" => edit.category = Some(parse_category(&take_value(args, &mut i, "--type")?)?),
            "--reminder" => edit.reminder = Some(take_value(args, &mut i, "--reminder")?),
            "--desc" => edit.description = Some(take_value(args, &mut i, "--desc")?),
            other => bail!("Unexpected argument '{}'", other),
        }
        i += 1;
    }
    Ok(edit)
}

fn parse_add(args: &[String]) -> Result<AppointmentDraft> {
    let mut title_words = Vec::new();
    let mut edit = EditArgs::default();
    let mut i = 0;
    while i < args.len() {
        if args[i].starts_with("--") {
            let flag = args[i].clone();
            let value = take_value(args, &mut i, &flag)?;
            let parsed = parse_edit(&[flag, value])?;
            merge(&mut edit, parsed);
        } else {
            title_words.push(args[i].clone());
        }
        i += 1;
    }
    if title_words.is_empty() {
        bail!("add needs a title");
    }

    // Unset reminder stays empty here; the caller fills in the configured default.
    let mut draft = AppointmentDraft {
        title: title_words.join(" "),
        ..Default::default()
    };
    edit.apply_to(&mut draft);
    Ok(draft)
}

fn merge(into: &mut EditArgs, from: EditArgs) {
    into.title = from.title.or(into.title.take());
    into.date = from.date.or(into.date.take());
    into.time = from.time.or(into.time.take());
    into.category = from.category.or(into.category.take());
    into.reminder = from.reminder.or(into.reminder.take());
    into.description = from.description.or(into.description.take());
}

pub fn print_help(binary_name: &str) {
    println!(
        "Agenda v{} - appointment calendar for the terminal",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>]                     Start interactive TUI", binary_name);
    println!("    {} month [YYYY-MM]                     Print a month grid", binary_name);
    println!("    {} list [term]                         List appointments", binary_name);
    println!(
        "    {} add <title> --date D --time T [--type K] [--reminder N] [--desc S]",
        binary_name
    );
    println!(
        "    {} edit <id> [--title S] [--date D] [--time T] [--type K] [--reminder N] [--desc S]",
        binary_name
    );
    println!("    {} delete <id>...                      Delete appointments", binary_name);
    println!("    {} remind                              Run the reminder scanner", binary_name);
    println!("    {} export                              Print appointments as JSON", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("FORMATS:");
    println!("    D  YYYY-MM-DD    T  HH:MM    N  minutes before start");
    println!("    K  reuniao | cliente | pagamento | pessoal | outro");
    println!();
    println!("KEYBINDINGS:");
    println!("    Press '?' inside the app for full interactive help");
}

// --- Subcommands ---

struct Session {
    ctx: StandardContext,
    config: Config,
}

impl Session {
    fn start(root: Option<PathBuf>) -> Result<Self> {
        let ctx = StandardContext::new(root);
        let config = Config::load_or_default(&ctx)?;
        if let Err(e) = logging::init_term_logger(config.log_level()) {
            eprintln!("{:#}", e);
        }
        Ok(Self { ctx, config })
    }

    fn controller(&self) -> Result<AgendaController> {
        let storage = LocalStorage::new(&self.ctx)?;
        Ok(AgendaController::open(
            Box::new(storage),
            self.config.notified_on_edit,
            Local::now().date_naive(),
        ))
    }
}

/// Runs any command except `Tui` and `Help`.
pub async fn run(args: CliArgs) -> Result<()> {
    let session = Session::start(args.root)?;

    match args.command {
        CliCommand::Tui | CliCommand::Help => Ok(()),
        CliCommand::Month(month) => {
            let mut ctl = session.controller()?;
            if let Some(m) = month {
                ctl.dispatch(Command::ShowMonth(m))?;
            }
            let now = Local::now().naive_local();
            print!("{}", render_text(&ctl.grid(now.date()), now));
            Ok(())
        }
        CliCommand::List(term) => {
            let ctl = session.controller()?;
            let now = Local::now().naive_local();
            let found = ctl.filtered_appointments(&term);
            if found.is_empty() {
                println!("{}", locale::no_appointments());
            }
            for a in found {
                println!(
                    "{}  {} {}  {} ({}, {})",
                    a.id,
                    a.date_string(),
                    a.time_string(),
                    a.title,
                    a.category,
                    locale::status_label(a.classify(now))
                );
            }
            Ok(())
        }
        CliCommand::Add(mut draft) => {
            if draft.time.trim().is_empty() {
                draft.time = session.config.default_time.clone();
            }
            if draft.reminder.trim().is_empty() {
                draft.reminder = session.config.default_reminder_minutes.to_string();
            }
            let mut ctl = session.controller()?;
            if let Outcome::Created(a) = ctl.dispatch(Command::Create(draft))? {
                println!("{}", a.id);
            }
            Ok(())
        }
        CliCommand::Edit(id, edit) => {
            let mut ctl = session.controller()?;
            let existing = ctl
                .store()
                .get(&id)
                .ok_or_else(|| AgendaError::NotFound(id.clone()))?;
            let mut draft = AppointmentDraft::from_appointment(existing);
            edit.apply_to(&mut draft);
            ctl.dispatch(Command::Update(id, draft))?;
            Ok(())
        }
        CliCommand::Delete(ids) => {
            let mut ctl = session.controller()?;
            if let Outcome::Deleted(removed) = ctl.dispatch(Command::DeleteMany(ids))? {
                println!("Deleted {} appointment(s)", removed.len());
            }
            Ok(())
        }
        CliCommand::Remind => run_reminder_loop(&session).await,
        CliCommand::Export => {
            let ctl = session.controller()?;
            let json = serde_json::to_string_pretty(ctl.store().all())
                .context("Failed to serialize appointments")?;
            println!("{}", json);
            Ok(())
        }
    }
}

/// Prints every reminder and, when enabled, raises a desktop notification.
struct ConsoleNotifier {
    desktop: bool,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &ReminderNotice) {
        StdoutNotifier.notify(notice);
        if self.desktop {
            DesktopNotifier.notify(notice);
        }
    }
}

async fn run_reminder_loop(session: &Session) -> Result<()> {
    let notifier = ConsoleNotifier {
        desktop: session.config.desktop_notifications,
    };
    let (tx, mut rx) = mpsc::channel(8);
    let _clock = spawn_reminder_clock(session.config.reminder_interval(), tx);
    log::info!(
        "Watching reminders every {:?}",
        session.config.reminder_interval()
    );

    // Each scan starts from the file so edits made by the TUI are seen.
    let scan = |session: &Session| -> Result<()> {
        let mut ctl = session.controller()?;
        ctl.scan_reminders(Local::now().naive_local(), &notifier);
        Ok(())
    };

    scan(session)?;
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(SystemEvent::ReminderTick) => scan(session)?,
                Some(SystemEvent::TransitionElapsed(_)) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_no_args_is_tui() {
        let parsed = parse_args(&[]).unwrap();
        assert_eq!(parsed.command, CliCommand::Tui);
        assert_eq!(parsed.root, None);
    }

    #[test]
    fn test_root_and_month() {
        let parsed = parse_args(&args("--root /tmp/x month 2025-04")).unwrap();
        assert_eq!(parsed.root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(parsed.command, CliCommand::Month(Some(YearMonth::new(2025, 3))));
        assert!(parse_args(&args("month 2025-4x")).is_err());
    }

    #[test]
    fn test_add() {
        let parsed = parse_args(&args(
            "add Consulta médica --date 2025-04-21 --time 10:00 --type pessoal --reminder 30",
        ))
        .unwrap();
        let CliCommand::Add(draft) = parsed.command else {
            panic!("expected Add");
        };
        assert_eq!(draft.title, "Consulta médica");
        assert_eq!(draft.date, "2025-04-21");
        assert_eq!(draft.category, Category::Personal);
        assert_eq!(draft.reminder, "30");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_add_rejects_unknown_type() {
        assert!(parse_args(&args("add X --date 2025-01-01 --type feriado")).is_err());
        assert!(parse_args(&args("add --date 2025-01-01")).is_err());
    }

    #[test]
    fn test_edit_delete_list() {
        let parsed = parse_args(&args("edit 17 --time 11:30")).unwrap();
        assert_eq!(
            parsed.command,
            CliCommand::Edit(
                "17".to_string(),
                EditArgs {
                    time: Some("11:30".to_string()),
                    ..Default::default()
                }
            )
        );

        let parsed = parse_args(&args("delete 1 3")).unwrap();
        assert_eq!(
            parsed.command,
            CliCommand::Delete(vec!["1".to_string(), "3".to_string()])
        );
        assert!(parse_args(&args("delete")).is_err());

        let parsed = parse_args(&args("list reunião cliente")).unwrap();
        assert_eq!(parsed.command, CliCommand::List("reunião cliente".to_string()));
    }

    #[test]
    fn test_help_and_unknown() {
        assert_eq!(parse_args(&args("-h")).unwrap().command, CliCommand::Help);
        assert!(parse_args(&args("frobnicate")).is_err());
        assert!(parse_args(&args("--root")).is_err());
    }
}
