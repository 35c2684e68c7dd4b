//! Core data types that flow through the question-answering pipeline.

use serde::{Deserialize, Serialize};

/// One prior question/answer exchange, supplied by the caller. The pipeline
/// keeps no conversation state of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

/// Materialized result of a synthesized statement. A `None` cell is an SQL
/// NULL and renders as the literal `NULL` marker, never as an empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Terminal state of one pipeline run.
///
/// The canned-answer short circuits are variants rather than nullable fields
/// threaded through every layer; [`AskResponse`] is a single render step
/// over this enum.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Greeting / thanks / farewell — answered with the fixed helper text.
    Chatter,
    /// The client hit the admission ceiling.
    RateLimited,
    /// The synthesized statement was rejected or failed to run.
    Failure,
    /// The full pipeline ran: statement, materialized rows, narrated answer.
    Answer {
        sql: String,
        results: QueryOutput,
        answer: String,
    },
}

/// Wire envelope returned by `POST /ask` and printed by `courtdesk ask`.
///
/// `sql` and `results` are both absent (canned paths) or both present
/// (data path); `answer` is always a non-empty human-readable string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub sql: Option<String>,
    pub answer: String,
    pub results: Option<QueryOutput>,
}
