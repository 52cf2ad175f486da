// File: ./src/selection.rs
// Transient selection for bulk edit/delete.
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    active: bool,
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enters or leaves selection mode. Both transitions start from an empty set.
    pub fn toggle_mode(&mut self) -> bool {
        self.active = !self.active;
        self.ids.clear();
        self.active
    }

    pub fn exit(&mut self) {
        self.active = false;
        self.ids.clear();
    }

    /// Flips membership of `id`. Ignored outside selection mode.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.active {
            return false;
        }
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
            return true;
        }
        false
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// The only selected id, when exactly one is selected.
    pub fn single(&self) -> Option<&str> {
        if self.ids.len() == 1 {
            self.ids.iter().next().map(String::as_str)
        } else {
            None
        }
    }

    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.ids.retain(|id| keep(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_switch_clears() {
        let mut s = SelectionSet::default();
        assert!(!s.toggle("1"), "no selection outside the mode");
        assert!(s.toggle_mode());
        assert!(s.toggle("1"));
        assert!(s.toggle("2"));
        assert!(!s.toggle("2"));
        assert_eq!(s.single(), Some("1"));
        assert!(!s.toggle_mode());
        assert!(s.is_empty());
    }
}
