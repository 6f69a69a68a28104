use std::sync::Arc;

use crate::models::{Difficulty, Note};

const PRELOADED: [(&str, &str, &str, &str, Difficulty, u32); 5] = [
    ("1", "Introduction to Machine Learning", "AI", "ML Basics", Difficulty::Beginner, 24),
    ("2", "Neural Networks Deep Dive", "AI", "Deep Learning", Difficulty::Advanced, 48),
    ("3", "Python Data Structures", "Programming", "Python", Difficulty::Intermediate, 32),
    ("4", "Organic Chemistry Fundamentals", "Chemistry", "Organic", Difficulty::Beginner, 56),
    ("5", "Thermodynamics Principles", "Mechanical", "Thermodynamics", Difficulty::Intermediate, 40),
];

/// Preloaded study notes that a session can be focused on.
#[derive(Clone)]
pub struct NoteCatalog {
    notes: Arc<[Note]>,
}

impl NoteCatalog {
    pub fn new() -> Self {
        let notes = PRELOADED
            .iter()
            .map(|&(id, title, subject, topic, difficulty, pages)| Note {
                id: id.to_string(),
                title: title.to_string(),
                subject: subject.to_string(),
                topic: topic.to_string(),
                difficulty,
                pages,
            })
            .collect();
        Self { notes }
    }

    pub fn find_all(&self) -> &[Note] {
        &self.notes
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Notes for one subject label; `None` keeps every note.
    pub fn filter_by_subject(&self, subject: Option<&str>) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|n| subject.map_or(true, |s| n.subject == s))
            .cloned()
            .collect()
    }

    /// Distinct subject labels in first-seen order.
    pub fn subjects(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for note in self.notes.iter() {
            if !seen.contains(&note.subject) {
                seen.push(note.subject.clone());
            }
        }
        seen
    }
}

impl Default for NoteCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn subjects_are_distinct_in_order() {
        assert_eq!(
            NoteCatalog::new().subjects(),
            vec!["AI", "Programming", "Chemistry", "Mechanical"]
        );
    }

    #[test]
    fn filter_without_subject_returns_everything() {
        let catalog = NoteCatalog::new();
        assert_eq!(catalog.filter_by_subject(None).len(), 5);
    }

    #[test]
    fn filter_by_subject_keeps_matching_notes() {
        let ai: Vec<_> = NoteCatalog::new()
            .filter_by_subject(Some("AI"))
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ai, vec!["1", "2"]);
        assert!(NoteCatalog::new().filter_by_subject(Some("Biology")).is_empty());
    }

    #[test]
    fn find_by_id() {
        let catalog = NoteCatalog::new();
        let note = catalog.find_by_id("5").unwrap();
        assert_eq!(note.title, "Thermodynamics Principles");
        assert_eq!(note.difficulty, Difficulty::Intermediate);
        assert_eq!(note.pages, 40);
        assert!(catalog.find_by_id("42").is_none());
    }
}
