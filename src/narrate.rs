//! Result narration — render the result set as text and ask the oracle for
//! a spoken-style answer. Raw rows never reach the end user directly; every
//! successful pipeline run passes through this step.

use anyhow::Result;

use crate::models::QueryOutput;
use crate::oracle::Oracle;

/// Render a result set as a header row, a separator, and one line per row.
/// NULL cells render as the literal `NULL` marker, never as an empty field.
pub fn render_results(output: &QueryOutput) -> String {
    if output.rows.is_empty() {
        return "No results found.".to_string();
    }

    let header = output.columns.join(" | ");
    let mut text = format!("\n{}\n", header);
    text.push_str(&"-".repeat(header.len()));
    text.push('\n');

    for row in &output.rows {
        let line: Vec<&str> = row
            .iter()
            .map(|cell| cell.as_deref().unwrap_or("NULL"))
            .collect();
        text.push_str(&line.join(" | "));
        text.push('\n');
    }

    text
}

/// Build the answer-generation prompt from the question, the statement that
/// ran, and the rendered result set.
pub fn build_answer_prompt(question: &str, sql: &str, rendered: &str) -> String {
    format!(
        "Based on the SQL results, provide a clear answer to the user's question.\n\n\
         IMPORTANT:\n\
         - Respond in the SAME LANGUAGE the user asked their question in (English, Spanish, etc.).\n\
         - Use plain text only - NO markdown, NO asterisks, NO special formatting\n\
         - Write naturally without bold, italics, or other formatting symbols\n\n\
         User Question: {question}\n\n\
         SQL Query: {sql}\n\n\
         Results:\n{rendered}\n\n\
         Provide a conversational, natural answer in the user's language. Speak directly \
         and simply - avoid technical phrases.\n\n\
         If presenting multiple items, format it clearly as a bulleted list with line \
         breaks between items. Use proper spacing to make it easy to read.",
    )
}

/// Second oracle call of the pipeline: narrate the result set.
pub async fn narrate(
    oracle: &dyn Oracle,
    question: &str,
    sql: &str,
    output: &QueryOutput,
    max_output_tokens: u32,
) -> Result<String> {
    let rendered = render_results(output);
    let prompt = build_answer_prompt(question, sql, &rendered);
    let answer = oracle.complete(&prompt, max_output_tokens).await?;
    Ok(answer.trim().to_string())
}
