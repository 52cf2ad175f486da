// File: ./src/system.rs
// Background timers and OS notifications. Timers never touch appointments;
// they only send events to whichever loop owns the controller.
use crate::reminder::{Notifier, ReminderNotice};
use notify_rust::Notification;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at, sleep};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    /// Time to run a reminder scan.
    ReminderTick,
    /// The dimming delay for these deleted rows is over.
    TransitionElapsed(Vec<String>),
}

/// Spawns the reminder clock. The first tick comes one full period after
/// start; the task ends once the receiver is dropped.
pub fn spawn_reminder_clock(period: Duration, tx: mpsc::Sender<SystemEvent>) -> JoinHandle<()> {
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        // A suspended laptop should produce one scan on wake, not a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.send(SystemEvent::ReminderTick).await.is_err() {
                log::debug!("Reminder clock stopped: receiver gone");
                break;
            }
        }
    })
}

/// Sends `TransitionElapsed(ids)` after `delay`.
pub fn schedule_transition(
    delay: Duration,
    ids: Vec<String>,
    tx: mpsc::Sender<SystemEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            sleep(delay).await;
        }
        let _ = tx.send(SystemEvent::TransitionElapsed(ids)).await;
    })
}

/// OS notification through notify-rust.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: &ReminderNotice) {
        let summary = notice.title.clone();
        let body = notice.message.clone();
        // D-Bus round trips can block; keep them off the owner loop.
        std::thread::spawn(move || {
            if let Err(e) = Notification::new()
                .summary(&summary)
                .body(&body)
                .appname("Agenda")
                .show()
            {
                log::warn!("Desktop notification failed: {}", e);
            }
        });
    }
}
