// File: tests/agenda_scenarios.rs
use agenda::calendar::YearMonth;
use agenda::controller::{AgendaController, Command, Outcome};
use agenda::error::AgendaError;
use agenda::model::{AppointmentDraft, AppointmentStatus, Category};
use agenda::reminder::RecordingNotifier;
use agenda::storage::MemoryStorage;
use agenda::store::NotifiedOnEdit;
use chrono::{Duration, NaiveDate, NaiveDateTime};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn draft(title: &str, date: &str, time: &str, reminder: &str) -> AppointmentDraft {
    AppointmentDraft {
        title: title.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        reminder: reminder.to_string(),
        ..Default::default()
    }
}

fn open(storage: &MemoryStorage, today: NaiveDate) -> AgendaController {
    AgendaController::open(Box::new(storage.clone()), NotifiedOnEdit::Preserve, today)
}

fn create(ctl: &mut AgendaController, d: AppointmentDraft) -> String {
    match ctl.dispatch(Command::Create(d)).unwrap() {
        Outcome::Created(a) => a.id,
        other => panic!("expected Created, got {:?}", other),
    }
}

// --- Grid + holiday ---
#[test]
fn test_consulta_on_tiradentes() {
    let storage = MemoryStorage::new();
    let mut ctl = open(&storage, ymd(2025, 4, 1));
    create(
        &mut ctl,
        AppointmentDraft {
            category: Category::Personal,
            ..draft("Consulta", "2025-04-21", "10:00", "30")
        },
    );

    ctl.dispatch(Command::ShowMonth(YearMonth::new(2025, 3))).unwrap();
    let grid = ctl.grid(ymd(2025, 4, 1));
    let cell = grid.cell(ymd(2025, 4, 21)).expect("April 21st is in the grid");

    assert!(cell.in_month);
    assert_eq!(cell.holiday.map(|h| h.name), Some("Tiradentes"));
    assert_eq!(cell.appointments.len(), 1);
    assert_eq!(cell.appointments[0].title, "Consulta");

    let morning = ymd(2025, 4, 21).and_hms_opt(8, 0, 0).unwrap();
    assert_eq!(cell.statuses(morning), vec![AppointmentStatus::Today]);
}

// --- Bulk delete ---
#[test]
fn test_delete_many_leaves_the_rest() {
    let storage = MemoryStorage::new();
    let mut ctl = open(&storage, ymd(2025, 4, 1));
    let id1 = create(&mut ctl, draft("one", "2025-04-02", "09:00", ""));
    let id2 = create(&mut ctl, draft("two", "2025-04-03", "09:00", ""));
    let id3 = create(&mut ctl, draft("three", "2025-04-04", "09:00", ""));

    ctl.dispatch(Command::DeleteMany(vec![id1, id3])).unwrap();

    let left: Vec<_> = ctl.store().all().iter().map(|a| a.id.clone()).collect();
    assert_eq!(left, vec![id2.clone()]);

    // And the saved copy agrees
    let reopened = open(&storage, ymd(2025, 4, 1));
    assert_eq!(reopened.store().all()[0].id, id2);
}

// --- Update on unknown id ---
#[test]
fn test_update_unknown_id_is_not_found() {
    let storage = MemoryStorage::new();
    let mut ctl = open(&storage, ymd(2025, 4, 1));
    create(&mut ctl, draft("kept", "2025-04-02", "09:00", "5"));
    let before = ctl.store().all().to_vec();
    let saves = storage.save_count();

    let err = ctl
        .dispatch(Command::Update(
            "does-not-exist".to_string(),
            draft("X", "2025-04-02", "09:00", "5"),
        ))
        .unwrap_err();

    assert_eq!(err, AgendaError::NotFound("does-not-exist".to_string()));
    assert_eq!(ctl.store().all(), before.as_slice());
    assert_eq!(storage.save_count(), saves);
}

// --- Reminder fires once ---
#[test]
fn test_reminder_fires_once() {
    let storage = MemoryStorage::new();
    let mut ctl = open(&storage, ymd(2025, 4, 1));
    create(&mut ctl, draft("Consulta", "2025-04-21", "10:00", "15"));
    let instant: NaiveDateTime = ymd(2025, 4, 21).and_hms_opt(10, 0, 0).unwrap();
    let notifier = RecordingNotifier::new();

    let first = ctl.scan_reminders(instant - Duration::minutes(10), &notifier);
    let second = ctl.scan_reminders(instant - Duration::minutes(5), &notifier);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(
        notifier.messages(),
        vec!["Lembrete: Consulta às 10:00 em 2025-04-21".to_string()]
    );

    // The flag survives a restart, so a new process won't fire it again.
    let mut reopened = open(&storage, ymd(2025, 4, 21));
    assert!(reopened
        .scan_reminders(instant - Duration::minutes(1), &notifier)
        .is_empty());
}

// --- Search ---
#[test]
fn test_search_matches_each_field() {
    let storage = MemoryStorage::new();
    let mut ctl = open(&storage, ymd(2025, 4, 1));
    create(
        &mut ctl,
        AppointmentDraft {
            category: Category::Meeting,
            ..draft("Planejamento", "2025-04-02", "09:00", "")
        },
    );
    create(
        &mut ctl,
        AppointmentDraft {
            description: "Levar exames".to_string(),
            category: Category::Personal,
            ..draft("Dentista", "2025-04-03", "14:00", "")
        },
    );
    create(
        &mut ctl,
        AppointmentDraft {
            category: Category::Payment,
            ..draft("Aluguel", "2025-04-05", "08:00", "")
        },
    );

    let titles = |term: &str| -> Vec<String> {
        ctl.filtered_appointments(term)
            .iter()
            .map(|a| a.title.clone())
            .collect()
    };

    assert_eq!(titles(""), vec!["Planejamento", "Dentista", "Aluguel"]);
    assert_eq!(titles("DENT"), vec!["Dentista"]);
    assert_eq!(titles("exames"), vec!["Dentista"]);
    assert_eq!(titles("pagamento"), vec!["Aluguel"]);
    assert_eq!(titles("reuni"), vec!["Planejamento"]);
    assert!(titles("nada disso").is_empty());
}

// --- Validation ---
#[test]
fn test_create_requires_title_date_time() {
    let storage = MemoryStorage::new();
    let mut ctl = open(&storage, ymd(2025, 4, 1));

    for (d, field) in [
        (draft("", "2025-04-02", "09:00", ""), "title"),
        (draft("A", "", "09:00", ""), "date"),
        (draft("A", "2025-04-02", "", ""), "time"),
        (draft("A", "2025-04-02", "09:00", "soon"), "reminder"),
    ] {
        match ctl.dispatch(Command::Create(d)).unwrap_err() {
            AgendaError::Validation { field: f, .. } => assert_eq!(f, field),
            other => panic!("expected Validation, got {:?}", other),
        }
    }
    assert!(ctl.store().is_empty());
    assert_eq!(storage.save_count(), 0);
}

// --- Classification is monotonic ---
#[test]
fn test_classification_over_a_day() {
    let storage = MemoryStorage::new();
    let mut ctl = open(&storage, ymd(2025, 4, 1));
    create(&mut ctl, draft("A", "2025-04-21", "10:00", ""));
    let a = ctl.store().all()[0].clone();

    let day_before = ymd(2025, 4, 20).and_hms_opt(23, 59, 0).unwrap();
    let morning = ymd(2025, 4, 21).and_hms_opt(9, 59, 0).unwrap();
    let start = ymd(2025, 4, 21).and_hms_opt(10, 0, 0).unwrap();
    let after = start + Duration::seconds(1);

    assert_eq!(a.classify(day_before), AppointmentStatus::Future);
    assert_eq!(a.classify(morning), AppointmentStatus::Today);
    assert_eq!(a.classify(start), AppointmentStatus::Today);
    assert_eq!(a.classify(after), AppointmentStatus::Overdue);
}
