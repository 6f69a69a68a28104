use serde::Serialize;

/// Mock history entry shown in a subject's sidebar.
#[derive(Debug, Clone, Serialize)]
pub struct RecentSession {
    pub title: &'static str,
    pub last_message: &'static str,
    pub days_ago: u32,
}

/// Everything that distinguishes one subject's tutor from another.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectDescriptor {
    pub id: &'static str,
    /// Short name used by the subject switcher.
    pub name: &'static str,
    /// Title used on the subjects listing.
    pub title: &'static str,
    pub tutor_name: &'static str,
    pub headline: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub accent: &'static str,
    pub suggested_prompts: &'static [&'static str],
    pub reply: &'static str,
    pub recent_sessions: &'static [RecentSession],
    /// Notes-driven subjects render the notes panel next to the chat.
    pub uses_notes: bool,
}

const NOTES_PROMPTS: &[&str] = &[
    "Explain this concept in simple terms",
    "Give me practice questions",
    "What are the key takeaways?",
    "Create a study guide",
];

const NOTES_REPLY: &str = "I understand you're asking about this topic. Let me break it down for you in a way that's easy to understand...\n\nThis is a simulated response. In a real implementation, this would connect to an AI backend to provide intelligent tutoring assistance based on your selected notes.";

static SUBJECTS: [SubjectDescriptor; 4] = [
    SubjectDescriptor {
        id: "ai",
        name: "AI & ML",
        title: "AI",
        tutor_name: "AI Tutor",
        headline: "AI & Machine Learning Tutor",
        tagline: "Neural networks, deep learning & more",
        description: "Master machine learning, neural networks, and AI fundamentals.",
        icon: "🧠",
        accent: "purple",
        suggested_prompts: &[
            "Explain neural networks and how they learn",
            "What is the difference between supervised and unsupervised learning?",
            "How does deep learning work?",
            "Explain transformers and attention mechanism",
        ],
        reply: "Great question about AI! Let me explain this concept in detail...\n\nArtificial Intelligence encompasses various techniques that allow machines to mimic human intelligence. This includes machine learning, deep learning, natural language processing, and more.\n\nWould you like me to dive deeper into any specific aspect?",
        recent_sessions: &[
            RecentSession { title: "Neural Networks Basics", last_message: "A neural network consists of...", days_ago: 0 },
            RecentSession { title: "Machine Learning Types", last_message: "There are three main types...", days_ago: 1 },
            RecentSession { title: "GPT Architecture", last_message: "GPT uses transformer...", days_ago: 2 },
        ],
        uses_notes: false,
    },
    SubjectDescriptor {
        id: "python",
        name: "Python",
        title: "Python Programming",
        tutor_name: "Python Tutor",
        headline: "Python Programming Tutor",
        tagline: "Code, debug & problem-solve",
        description: "Build strong programming and problem-solving skills.",
        icon: "🐍",
        accent: "green",
        suggested_prompts: &[
            "Explain Python data structures: lists, dicts, sets",
            "How do I handle exceptions in Python?",
            "Explain object-oriented programming in Python",
            "What are decorators and how do I use them?",
        ],
        reply: "Great Python question! Let me help you understand this concept...\n\n```python\n# Here's an example:\ndef example_function():\n    return 'Hello, Python!'\n```\n\nPython is known for its clean syntax and readability. Would you like me to explain this further or show more examples?",
        recent_sessions: &[
            RecentSession { title: "Python Basics", last_message: "Variables in Python are...", days_ago: 0 },
            RecentSession { title: "Functions & Loops", last_message: "A for loop iterates...", days_ago: 1 },
            RecentSession { title: "File Handling", last_message: "To open a file use...", days_ago: 2 },
        ],
        uses_notes: false,
    },
    SubjectDescriptor {
        id: "chemistry",
        name: "Chemistry",
        title: "Chemistry",
        tutor_name: "Chemistry Tutor",
        headline: "Chemistry Tutor",
        tagline: "Based on your selected notes",
        description: "Organic, inorganic, and physical chemistry explained clearly.",
        icon: "🧪",
        accent: "cyan",
        suggested_prompts: NOTES_PROMPTS,
        reply: NOTES_REPLY,
        recent_sessions: &[],
        uses_notes: true,
    },
    SubjectDescriptor {
        id: "mechanical",
        name: "Mechanical",
        title: "Mechanical",
        tutor_name: "Mechanical Tutor",
        headline: "Mechanical Engineering Tutor",
        tagline: "Based on your selected notes",
        description: "Mechanics, thermodynamics, and engineering principles.",
        icon: "⚙️",
        accent: "orange",
        suggested_prompts: NOTES_PROMPTS,
        reply: NOTES_REPLY,
        recent_sessions: &[],
        uses_notes: true,
    },
];

/// Read-only lookup over the built-in subject descriptors.
#[derive(Clone, Copy, Default)]
pub struct SubjectCatalog;

impl SubjectCatalog {
    pub fn new() -> Self {
        Self
    }

    /// All subjects in listing order.
    pub fn find_all(&self) -> &'static [SubjectDescriptor] {
        &SUBJECTS
    }

    pub fn find_by_id(&self, id: &str) -> Option<&'static SubjectDescriptor> {
        SUBJECTS.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_order_is_stable() {
        let ids: Vec<_> = SubjectCatalog::new().find_all().iter().map(|s| s.id).collect();
        assert_eq!(ids, ["ai", "python", "chemistry", "mechanical"]);
    }

    #[test]
    fn lookup_by_id() {
        let catalog = SubjectCatalog::new();
        let python = catalog.find_by_id("python").unwrap();
        assert_eq!(python.tutor_name, "Python Tutor");
        assert_eq!(python.accent, "green");
        assert!(catalog.find_by_id("biology").is_none());
    }

    #[test]
    fn notes_driven_subjects_share_generic_prompts() {
        let catalog = SubjectCatalog::new();
        let chemistry = catalog.find_by_id("chemistry").unwrap();
        let mechanical = catalog.find_by_id("mechanical").unwrap();
        assert!(chemistry.uses_notes && mechanical.uses_notes);
        assert_eq!(chemistry.suggested_prompts, mechanical.suggested_prompts);
        assert_eq!(chemistry.suggested_prompts[0], "Explain this concept in simple terms");
    }

    #[test]
    fn every_subject_has_four_prompts() {
        for subject in SubjectCatalog::new().find_all() {
            assert_eq!(subject.suggested_prompts.len(), 4, "{}", subject.id);
            assert!(!subject.reply.is_empty());
        }
    }
}
