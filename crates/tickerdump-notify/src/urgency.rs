use serde::Serialize;
use tracing::trace;

/// Score at or above which a message counts as urgent.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Matched as case-insensitive substrings.
pub const KEYWORDS: [&str; 16] = [
    "urgent",
    "emergency",
    "critical",
    "alert",
    "immediately",
    "asap",
    "failure",
    "error",
    "failed",
    "down",
    "outage",
    "broken",
    "crashed",
    "breach",
    "security",
    "incident",
];

// one keyword in three is already as urgent as it gets
const AMPLIFIER: f64 = 3.0;

/// The verdict on one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Urgency {
    pub urgent: bool,
    pub score: f64,
    pub matched: Vec<&'static str>,
}

/// Keyword based urgency scoring.
///
/// ```rust
/// use tickerdump_notify::UrgencyEvaluator;
///
/// let verdict = UrgencyEvaluator::default().evaluate("URGENT: critical database down, outage ongoing");
/// assert!(verdict.urgent);
/// assert_eq!(verdict.matched, vec!["urgent", "critical", "down", "outage"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrgencyEvaluator {
    threshold: f64,
}

impl Default for UrgencyEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl UrgencyEvaluator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `score = min(1, matches / keywords * 3)`; urgent when `score >= threshold`.
    pub fn evaluate(&self, text: &str) -> Urgency {
        if text.trim().is_empty() {
            return Urgency {
                urgent: false,
                score: 0.0,
                matched: Vec::new(),
            };
        }

        let text = text.to_lowercase();
        let matched: Vec<&'static str> = KEYWORDS
            .iter()
            .copied()
            .filter(|keyword| text.contains(keyword))
            .collect();

        let score = (matched.len() as f64 / KEYWORDS.len() as f64 * AMPLIFIER).min(1.0);
        trace!("urgency score {score:.2}, matched {matched:?}");

        Urgency {
            urgent: score >= self.threshold,
            score,
            matched,
        }
    }
}
