// Requests a key handler hands back to the main loop.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Dim these rows, then delete them once the transition delay elapses.
    ScheduleDelete(Vec<String>),
}
