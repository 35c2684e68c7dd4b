//! Intent triage — decide whether a question is conversational chatter
//! before any oracle or database work happens.

/// Classification of an incoming question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Greeting, thanks, or farewell — short-circuit with the helper answer.
    Chatter,
    /// Anything else — run the full pipeline.
    DataQuestion,
}

/// Closed set of chatter keywords, matched against whitespace tokens.
///
/// "thank you" is a two-word entry and can never match a single token; the
/// single-word "thanks" covers the common case. Kept as-is rather than
/// phrase-matching, which would widen the triage surface.
const CHATTER_KEYWORDS: &[&str] = &["hello", "hi", "hey", "thanks", "thank you", "bye", "goodbye"];

/// Lower-cases the question, splits on whitespace, and reports chatter if
/// any token exact-matches the keyword set. No side effects.
pub fn classify(question: &str) -> Intent {
    let lowered = question.to_lowercase();
    if lowered
        .split_whitespace()
        .any(|token| CHATTER_KEYWORDS.contains(&token))
    {
        Intent::Chatter
    } else {
        Intent::DataQuestion
    }
}

/// Fixed helper answer returned for chatter, suggesting real questions.
pub const CHATTER_ANSWER: &str = "Hi! I'm here to help you analyze your tennis club data. \
    Try asking questions like: 'Which members have the highest cancellation rate?' \
    or 'How much revenue did we generate last month?'";
