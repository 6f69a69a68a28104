use std::time::Duration;

use tracing::debug;

use crate::catalog::subject_catalog::SubjectDescriptor;
use crate::models::Note;

/// Stand-in for a tutoring backend: answers every question with the
/// subject's canned reply after a fixed latency.
#[derive(Clone, Debug)]
pub struct SimulatedTutor {
    latency: Duration,
}

impl SimulatedTutor {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// How long a reply takes to "arrive".
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Builds the reply text. The question is not interpreted; a selected
    /// note is echoed back as context below the canned text.
    pub fn compose(
        &self,
        subject: &SubjectDescriptor,
        note: Option<&Note>,
        question: &str,
    ) -> String {
        debug!(subject = subject.id, question_len = question.len(), "composing simulated reply");

        match note {
            Some(note) => format!(
                "{}\n\nBased on your notes: {} ({}, {}, {} pages)",
                subject.reply, note.title, note.topic, note.difficulty, note.pages
            ),
            None => subject.reply.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::note_catalog::NoteCatalog;
    use crate::catalog::subject_catalog::SubjectCatalog;

    #[test]
    fn reply_without_note_is_the_canned_text() {
        let tutor = SimulatedTutor::new(Duration::from_millis(1500));
        let ai = SubjectCatalog::new().find_by_id("ai").unwrap();
        let reply = tutor.compose(ai, None, "What is a derivative?");
        assert_eq!(reply, ai.reply);
        assert!(reply.starts_with("Great question about AI!"));
    }

    #[test]
    fn reply_echoes_selected_note() {
        let tutor = SimulatedTutor::new(Duration::from_millis(1500));
        let chemistry = SubjectCatalog::new().find_by_id("chemistry").unwrap();
        let notes = NoteCatalog::new();
        let note = notes.find_by_id("4").unwrap();

        let reply = tutor.compose(chemistry, Some(note), "Explain this concept in simple terms");
        assert!(reply.starts_with(chemistry.reply));
        assert!(reply.ends_with(
            "\n\nBased on your notes: Organic Chemistry Fundamentals (Organic, Beginner, 56 pages)"
        ));
    }

    #[test]
    fn latency_is_configurable() {
        let tutor = SimulatedTutor::new(Duration::from_millis(250));
        assert_eq!(tutor.latency(), Duration::from_millis(250));
    }
}
