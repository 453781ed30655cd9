//! Single-prompt answer generation.

use crate::error::LlmError;
use crate::providers::traits::CompletionProvider;

/// Build one prompt from the candidate text and the question, call the
/// provider, and trim the reply. No retry, no backoff; failures carry a
/// structured [`LlmError`] for the caller to record.
pub async fn answer(
    provider: &(dyn CompletionProvider + Send + Sync),
    question: &str,
    text: &str,
) -> Result<String, LlmError> {
    let prompt = format!(
        "Here is the document content:\n\n{}\n\nQuestion: {}\nAnswer:",
        text, question
    );
    let reply = provider.complete(&prompt).await?;
    Ok(reply.trim().to_string())
}
