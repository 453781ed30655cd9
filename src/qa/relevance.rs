//! LLM-backed relevance gate with a strict yes/no contract.

use crate::providers::traits::CompletionProvider;

/// Ask the provider whether `document_text` pertains to `question`.
///
/// The prompt demands a one-token verdict and the reply is parsed
/// strictly; any other reply, and any call failure, classifies as not
/// relevant. This gate fails closed.
pub async fn is_relevant(
    provider: &(dyn CompletionProvider + Send + Sync),
    document_text: &str,
    question: &str,
) -> bool {
    let prompt = format!(
        "Does the following document contain information relevant to answering \
         the question? Reply with exactly \"yes\" or \"no\" and nothing else.\n\n\
         Document:\n{}\n\nQuestion: {}",
        document_text, question
    );

    match provider.complete(&prompt).await {
        Ok(reply) => parse_verdict(&reply).unwrap_or(false),
        Err(e) => {
            log::warn!("relevance check failed, treating document as not relevant: {}", e);
            false
        }
    }
}

/// Strict verdict parsing: trimmed, case-insensitive, a trailing period
/// tolerated. Anything else is no verdict.
fn parse_verdict(reply: &str) -> Option<bool> {
    match reply.trim().trim_end_matches('.').to_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => {
            log::warn!("classifier returned a non-verdict reply: {:?}", reply);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_verdicts() {
        assert_eq!(parse_verdict("yes"), Some(true));
        assert_eq!(parse_verdict("No"), Some(false));
        assert_eq!(parse_verdict("  YES.  "), Some(true));
    }

    #[test]
    fn rejects_free_text() {
        // "Yes, the document discusses revenue" is exactly the brittle
        // reply the strict contract exists to refuse.
        assert_eq!(parse_verdict("Yes, the document discusses revenue"), None);
        assert_eq!(parse_verdict("maybe"), None);
        assert_eq!(parse_verdict(""), None);
    }
}
