//! SQL synthesis — build the generation prompt, invoke the oracle once, and
//! extract a single executable statement from the raw completion.

use anyhow::Result;

use crate::config::ContextConfig;
use crate::models::ConversationTurn;
use crate::oracle::Oracle;
use crate::schema;

/// Render the trimmed conversation window as a prompt context block.
///
/// Takes the last `window_turns` exchanges in order, truncating each answer
/// to an `answer_prefix_chars` prefix. Truncation counts chars, not bytes,
/// so a multi-byte codepoint is never split. Returns an empty string for an
/// empty history.
pub fn render_context(history: &[ConversationTurn], context: &ContextConfig) -> String {
    if history.is_empty() {
        return String::new();
    }

    let start = history.len().saturating_sub(context.window_turns);
    let mut block =
        String::from("\n\nRecent conversation for context (maintain same formatting style):\n");
    for turn in &history[start..] {
        block.push_str(&format!("User asked: {}\n", turn.question));
        let prefix: String = turn.answer.chars().take(context.answer_prefix_chars).collect();
        block.push_str(&format!("Assistant answered: {}...\n", prefix));
    }
    block
}

/// Build the single bounded SQL-generation prompt.
pub fn build_sql_prompt(question: &str, history: &[ConversationTurn], context: &ContextConfig) -> String {
    format!(
        "You are a SQL expert for a tennis club database. Generate ONLY the SQL query \
         needed to answer the question. No explanation, no markdown, just the query.\n\n\
         {schema}{context_block}\n\
         Current question: {question}\n\n\
         IMPORTANT: If the previous response used a specific format (like a list), \
         maintain that same format for follow-up questions.\n\n\
         Return ONLY the SQL query.",
        schema = schema::schema_descriptor(),
        context_block = render_context(history, context),
        question = question,
    )
}

/// Strip markdown code-fence markup the oracle may wrap around the query:
/// drop the opening fence line and everything from the last fence onward.
pub fn strip_code_fence(completion: &str) -> String {
    let mut sql = completion.trim();
    if sql.starts_with("```") {
        sql = match sql.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        };
        if let Some(idx) = sql.rfind("```") {
            sql = &sql[..idx];
        }
    }
    sql.trim().to_string()
}

/// Synthesize one executable statement for `question`.
///
/// The returned text is fence-stripped and trimmed but otherwise taken on
/// trust: no syntax or shape validation happens here. The read-only guard
/// and the executor are the next lines of defense.
pub async fn synthesize(
    oracle: &dyn Oracle,
    question: &str,
    history: &[ConversationTurn],
    context: &ContextConfig,
    max_output_tokens: u32,
) -> Result<String> {
    let prompt = build_sql_prompt(question, history, context);
    let completion = oracle.complete(&prompt, max_output_tokens).await?;
    Ok(strip_code_fence(&completion))
}

/// First-keyword allow-list check, run as its own pipeline stage before
/// execution. Only `SELECT` and `WITH` statements pass.
pub fn is_read_only(sql: &str) -> bool {
    match sql.trim_start().split_whitespace().next() {
        Some(first) => {
            let first = first.to_ascii_uppercase();
            first == "SELECT" || first == "WITH"
        }
        None => false,
    }
}
