// Logic for checking if appointments match the list search box.
//
// A term matches when it is a case-insensitive substring of the title, the
// description or the type (slug or label). The empty term matches everything.

use crate::model::appointment::Appointment;

impl Appointment {
    pub fn matches_search_term(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.category.slug().contains(&needle)
            || self.category.label().to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Appointment, Category};
    use chrono::{NaiveDate, NaiveTime};

    fn appt(title: &str, description: &str, category: Category) -> Appointment {
        Appointment {
            id: "x".to_string(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            description: description.to_string(),
            category,
            reminder_minutes: 0,
            notified: false,
        }
    }

    #[test]
    fn test_fields_match_independently() {
        let a = appt("Dentista", "levar exames", Category::Personal);
        assert!(a.matches_search_term("DENT"));
        assert!(a.matches_search_term("exames"));
        assert!(a.matches_search_term("pessoal"));
        assert!(!a.matches_search_term("reunião"));
    }

    #[test]
    fn test_label_with_accent_matches() {
        let a = appt("Sync", "", Category::Meeting);
        assert!(a.matches_search_term("Reunião"));
        assert!(a.matches_search_term("reuniao"));
    }

    #[test]
    fn test_empty_term_matches() {
        assert!(appt("a", "", Category::Other).matches_search_term(""));
    }
}
