//! Pipeline orchestration — admission, triage, synthesis, guard, execution,
//! narration, and the single render step that turns an [`Outcome`] into the
//! wire envelope.

use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tracing::warn;

use crate::config::Config;
use crate::executor;
use crate::models::{AskResponse, ConversationTurn, Outcome};
use crate::narrate;
use crate::oracle::Oracle;
use crate::rate_limit::RateLimiter;
use crate::synthesize;
use crate::triage::{self, Intent};

/// Canned answer for a synthesized statement that was rejected by the
/// read-only guard or failed to run. The underlying error is logged, never
/// shown to the user.
pub const FAILURE_ANSWER: &str = "I couldn't understand that question. Please ask about \
    members, bookings, coaches, courts, or revenue. For example: 'How many active members \
    do we have?' or 'What's our revenue this month?'";

pub struct Pipeline {
    pool: SqlitePool,
    oracle: Arc<dyn Oracle>,
    limiter: Arc<RateLimiter>,
    config: Config,
}

impl Pipeline {
    pub fn new(pool: SqlitePool, oracle: Arc<dyn Oracle>, config: Config) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window_secs,
        ));
        Self {
            pool,
            oracle,
            limiter,
            config,
        }
    }

    /// Run the full pipeline for one question.
    ///
    /// Stage order: admission → triage → synthesis → read-only guard →
    /// execution → narration. Guard and execution failures collapse to
    /// [`Outcome::Failure`]; an empty question or an oracle failure is a
    /// real `Err` for the caller to surface as an input or service error.
    pub async fn ask(
        &self,
        client_id: &str,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<Outcome> {
        let question = question.trim();
        if question.is_empty() {
            anyhow::bail!("No question provided");
        }

        if !self.limiter.admit(client_id, chrono::Utc::now()) {
            return Ok(Outcome::RateLimited);
        }

        if triage::classify(question) == Intent::Chatter {
            return Ok(Outcome::Chatter);
        }

        let sql = synthesize::synthesize(
            self.oracle.as_ref(),
            question,
            history,
            &self.config.context,
            self.config.oracle.max_output_tokens,
        )
        .await?;

        if !synthesize::is_read_only(&sql) {
            warn!(sql = %sql, "synthesized statement rejected by read-only guard");
            return Ok(Outcome::Failure);
        }

        let results = match executor::execute(&self.pool, &sql).await {
            Ok(results) => results,
            Err(e) => {
                warn!(sql = %sql, error = %e, "synthesized statement failed to execute");
                return Ok(Outcome::Failure);
            }
        };

        let answer = narrate::narrate(
            self.oracle.as_ref(),
            question,
            &sql,
            &results,
            self.config.oracle.max_output_tokens,
        )
        .await?;

        Ok(Outcome::Answer {
            sql,
            results,
            answer,
        })
    }

    /// Render an [`Outcome`] into the response envelope. The canned paths
    /// carry no statement and no results; the data path carries both.
    pub fn respond(&self, question: &str, outcome: Outcome) -> AskResponse {
        let (sql, answer, results) = match outcome {
            Outcome::Chatter => (None, triage::CHATTER_ANSWER.to_string(), None),
            Outcome::RateLimited => (None, self.limiter.limit_message(), None),
            Outcome::Failure => (None, FAILURE_ANSWER.to_string(), None),
            Outcome::Answer {
                sql,
                results,
                answer,
            } => (Some(sql), answer, Some(results)),
        };

        AskResponse {
            question: question.to_string(),
            sql,
            answer,
            results,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
