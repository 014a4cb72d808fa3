//! Static page content: the FAQ.
//!
//! Questions are compiled in; the FAQ page filters them by category and a
//! case-insensitive search over question and answer text.

/// FAQ section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaqCategory {
    Registration,
    Events,
    General,
}

impl FaqCategory {
    /// Query-string key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Events => "events",
            Self::General => "general",
        }
    }
}

/// Category tab selection; unknown keys fall back to `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaqFilter {
    #[default]
    All,
    Only(FaqCategory),
}

impl FaqFilter {
    /// Tabs in display order.
    pub const TABS: [Self; 4] = [
        Self::All,
        Self::Only(FaqCategory::Registration),
        Self::Only(FaqCategory::Events),
        Self::Only(FaqCategory::General),
    ];

    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("registration") => Self::Only(FaqCategory::Registration),
            Some("events") => Self::Only(FaqCategory::Events),
            Some("general") => Self::Only(FaqCategory::General),
            _ => Self::All,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(category) => category.key(),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Questions",
            Self::Only(FaqCategory::Registration) => "Registration",
            Self::Only(FaqCategory::Events) => "Events",
            Self::Only(FaqCategory::General) => "General",
        }
    }

    fn admits(self, category: FaqCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == category,
        }
    }
}

/// One question and its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaqEntry {
    pub category: FaqCategory,
    pub question: &'static str,
    pub answer: &'static str,
}

impl FaqEntry {
    /// Anchor id used by the page's disclosure widgets.
    #[must_use]
    pub fn anchor(&self, index: usize) -> String {
        format!("{}-{index}", self.category.key())
    }
}

const fn entry(category: FaqCategory, question: &'static str, answer: &'static str) -> FaqEntry {
    FaqEntry {
        category,
        question,
        answer,
    }
}

/// Every FAQ entry in display order.
pub const FAQ: &[FaqEntry] = &[
    entry(
        FaqCategory::Registration,
        "How do I register for an event?",
        "You can register for events by creating an account, logging in, and clicking the \"Register\" button on any upcoming event. You'll need to complete the registration form with your details and parent/guardian information.",
    ),
    entry(
        FaqCategory::Registration,
        "Is there a registration fee?",
        "Most of our events are free for teenagers. However, some special events or retreats may have a minimal fee to cover materials and refreshments. Any fees will be clearly stated during registration.",
    ),
    entry(
        FaqCategory::Registration,
        "Can I register for multiple events?",
        "Yes! You can register for as many events as you like. Each event requires a separate registration so we can plan appropriately.",
    ),
    entry(
        FaqCategory::Registration,
        "What information do I need for registration?",
        "You'll need your personal details (full name, address, phone), school information (if applicable), church details, and parent/guardian contact information including their phone number and occupation.",
    ),
    entry(
        FaqCategory::Events,
        "What types of events do you organize?",
        "We organize various events including weekly Bible studies, prayer meetings, youth conferences, leadership training, community service projects, fun fellowship activities, and annual retreats.",
    ),
    entry(
        FaqCategory::Events,
        "How often do events take place?",
        "We have regular weekly meetings every Sunday and Wednesday, plus special monthly events and quarterly major programs. Check the events calendar for the complete schedule.",
    ),
    entry(
        FaqCategory::Events,
        "Are parents allowed to attend events?",
        "While most events are specifically for teenagers, we occasionally have family events where parents are welcome. Regular teenage programs are designed to create a peer-to-peer learning environment.",
    ),
    entry(
        FaqCategory::Events,
        "What should I bring to events?",
        "We recommend bringing your Bible, a notebook, and a pen. For specific events, we may recommend additional items which will be communicated during registration.",
    ),
    entry(
        FaqCategory::General,
        "Who can join the Foursquare Sabo District Teenagers?",
        "Our program is open to all teenagers between ages 13-19, regardless of their church background. We welcome everyone who wants to grow spiritually and connect with other Christian youth.",
    ),
    entry(
        FaqCategory::General,
        "What are the meeting times?",
        "We meet every Sunday morning during the main service (8:00 AM - 10:00 AM) and Wednesday evenings for Bible study (5:00 PM - 6:30 PM). Additional event times vary.",
    ),
    entry(
        FaqCategory::General,
        "How can I get involved in leadership?",
        "We encourage interested teenagers to speak with our youth leaders. We provide leadership training and opportunities to serve in various capacities based on commitment and spiritual maturity.",
    ),
    entry(
        FaqCategory::General,
        "Is transportation provided?",
        "While we don't provide general transportation, we can help coordinate carpools for special events. Please contact us if you need transportation assistance.",
    ),
    entry(
        FaqCategory::General,
        "How can parents get involved?",
        "Parents can volunteer as chaperones for events, join the prayer team, or assist with administrative tasks. Contact our program director to discuss opportunities.",
    ),
];

/// Entries matching `filter` whose question or answer contains `search`.
#[must_use]
pub fn search_faq(filter: FaqFilter, search: &str) -> Vec<&'static FaqEntry> {
    let needle = search.trim().to_lowercase();
    FAQ.iter()
        .filter(|entry| filter.admits(entry.category))
        .filter(|entry| {
            needle.is_empty()
                || entry.question.to_lowercase().contains(&needle)
                || entry.answer.to_lowercase().contains(&needle)
        })
        .collect()
}
