//! Runtime types.

use serde::Serialize;

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Policy and service questions answered from the FAQ corpus.
    Faq,
    /// Order status lookups.
    Order,
    /// Product suggestions.
    Recommendation,
    /// Anything else, answered by the generative oracle.
    Fallback,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Faq,
        Intent::Order,
        Intent::Recommendation,
        Intent::Fallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Faq => "faq",
            Intent::Order => "order",
            Intent::Recommendation => "recommendation",
            Intent::Fallback => "fallback",
        }
    }

    /// Exact lowercase label, e.g. `"faq"`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == label)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The routed intent and the reply text for one user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportReply {
    pub intent: Intent,
    pub reply: String,
}

/// Position in the per-message routing pipeline.
/// `Start → Intent → Handler(intent) → End(reply)`; `End` is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteState {
    Start,
    Intent,
    Handler(Intent),
    End(SupportReply),
}
