use crate::document::{Document, ExtractionCache, TextExtractor};
use crate::error::{LlmError, PipelineError};
use crate::providers::traits::CompletionProvider;
use crate::qa::chunker::chunk;
use crate::qa::generator;
use crate::qa::keywords::{extract_keywords, filter_by_keywords};
use crate::qa::relevance;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// What the LLM produced for one (question, document) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Answer {
    Text(String),
    Failed(LlmError),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text(text) => f.write_str(text),
            Answer::Failed(e) => write!(f, "Error occurred: {}", e),
        }
    }
}

/// Per-question result: a non-empty map from document index to answer, or
/// an explicit marker that no document produced one. An empty map is never
/// exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QuestionOutcome {
    Answered(BTreeMap<usize, Answer>),
    NoAnswer,
}

/// Answers for a question batch, in question input order. Document indices
/// follow upload order and are stable for the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerSet {
    pub entries: Vec<(String, QuestionOutcome)>,
}

/// How a document's text is narrowed before the generator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaMode {
    /// Prefilter lines by the question's keywords; a document with no
    /// matching line is skipped.
    Keyword,
    /// Walk fixed-size chunks in order; the first chunk whose call comes
    /// back non-empty (or fails) settles the document and the rest are
    /// skipped.
    Chunked,
    /// Ask the relevance classifier per document; only relevant documents
    /// reach the generator.
    RelevanceGated,
}

impl QaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QaMode::Keyword => "keyword",
            QaMode::Chunked => "chunked",
            QaMode::RelevanceGated => "relevance",
        }
    }
}

impl FromStr for QaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(QaMode::Keyword),
            "chunked" => Ok(QaMode::Chunked),
            "relevance" => Ok(QaMode::RelevanceGated),
            other => Err(format!(
                "unknown mode: {} (expected keyword, chunked, or relevance)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QaOptions {
    pub mode: QaMode,
    pub chunk_size: usize,
    /// Cap on in-flight LLM calls across the whole batch.
    pub max_concurrent_requests: usize,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self {
            mode: QaMode::Keyword,
            chunk_size: 5000,
            max_concurrent_requests: 4,
        }
    }
}

/// Split the question input into one question per line, dropping blanks.
pub fn parse_questions(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Runs the whole pipeline: extraction fan-out, then one task per
/// (question, document) pair through a bounded concurrency limiter,
/// merged into an [`AnswerSet`] by index.
pub struct Orchestrator {
    provider: Box<dyn CompletionProvider + Send + Sync>,
    extractor: TextExtractor,
    options: QaOptions,
}

impl Orchestrator {
    pub fn new(
        provider: Box<dyn CompletionProvider + Send + Sync>,
        extractor: TextExtractor,
        options: QaOptions,
    ) -> Self {
        Self {
            provider,
            extractor,
            options,
        }
    }

    pub fn mode(&self) -> QaMode {
        self.options.mode
    }

    pub fn set_mode(&mut self, mode: QaMode) {
        self.options.mode = mode;
    }

    /// Answer every question against every document.
    ///
    /// Returns [`PipelineError::NoQuestions`] before any extraction or LLM
    /// call when the batch is empty.
    pub async fn answer_all(
        &self,
        questions: &[String],
        documents: &[Document],
        cache: &ExtractionCache,
    ) -> Result<AnswerSet, PipelineError> {
        if questions.is_empty() {
            return Err(PipelineError::NoQuestions);
        }
        if documents.is_empty() {
            return Err(PipelineError::NoDocuments);
        }

        let texts = self.extractor.extract_all(documents, cache).await;
        Ok(self.answer_extracted(questions, &texts).await)
    }

    /// Answer against already-extracted text, one entry per document in
    /// upload order.
    pub async fn answer_extracted(
        &self,
        questions: &[String],
        texts: &[Arc<String>],
    ) -> AnswerSet {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_requests.max(1)));

        let mut tasks = Vec::new();
        for (question_index, question) in questions.iter().enumerate() {
            for (doc_index, text) in texts.iter().enumerate() {
                let semaphore = semaphore.clone();
                let provider = self.provider.clone_box();
                let options = self.options.clone();
                let question = question.clone();
                let text = text.clone();
                tasks.push(async move {
                    let _permit = semaphore.acquire().await.expect("semaphore closed");
                    let answer = answer_pair(provider.as_ref(), &options, &question, &text).await;
                    (question_index, doc_index, answer)
                });
            }
        }

        // Merge by index, never by arrival order.
        let mut per_question: Vec<BTreeMap<usize, Answer>> = vec![BTreeMap::new(); questions.len()];
        for (question_index, doc_index, answer) in futures::future::join_all(tasks).await {
            if let Some(answer) = answer {
                per_question[question_index].insert(doc_index, answer);
            }
        }

        let entries = questions
            .iter()
            .cloned()
            .zip(per_question.into_iter().map(|answers| {
                if answers.is_empty() {
                    QuestionOutcome::NoAnswer
                } else {
                    QuestionOutcome::Answered(answers)
                }
            }))
            .collect();

        AnswerSet { entries }
    }
}

/// One (question, document) pair. `None` means the document contributed
/// nothing for this question; failures are answers, not aborts.
async fn answer_pair(
    provider: &(dyn CompletionProvider + Send + Sync),
    options: &QaOptions,
    question: &str,
    text: &str,
) -> Option<Answer> {
    if text.trim().is_empty() {
        return None;
    }

    match options.mode {
        QaMode::Keyword => {
            let keywords = extract_keywords(question);
            let filtered = filter_by_keywords(text, &keywords);
            if filtered.is_empty() {
                return None;
            }
            generate(provider, question, &filtered).await
        }
        QaMode::Chunked => {
            for piece in chunk(text, options.chunk_size.max(1)) {
                if let Some(answer) = generate(provider, question, &piece).await {
                    return Some(answer);
                }
            }
            None
        }
        QaMode::RelevanceGated => {
            if !relevance::is_relevant(provider, text, question).await {
                return None;
            }
            generate(provider, question, text).await
        }
    }
}

async fn generate(
    provider: &(dyn CompletionProvider + Send + Sync),
    question: &str,
    text: &str,
) -> Option<Answer> {
    match generator::answer(provider, question, text).await {
        Ok(reply) if reply.is_empty() => None,
        Ok(reply) => Some(Answer::Text(reply)),
        Err(e) => Some(Answer::Failed(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Script = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

    #[derive(Clone)]
    struct MockProvider {
        api_key: String,
        script: Arc<Script>,
        calls: Arc<AtomicUsize>,
    }

    impl MockProvider {
        fn with(script: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static) -> Self {
            Self {
                api_key: "test-key".to_string(),
                script: Arc::new(script),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for MockProvider {
        async fn new(_api_key: String, _system_message: String) -> Result<Self> {
            Ok(Self::with(|_| Ok(String::new())))
        }

        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.script)(prompt)
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("mock".to_string())
        }

        fn get_system_message(&self) -> String {
            String::new()
        }

        fn get_api_key(&self) -> &String {
            &self.api_key
        }

        fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
            Box::new(self.clone())
        }
    }

    fn orchestrator(mock: &MockProvider, options: QaOptions) -> Orchestrator {
        Orchestrator::new(Box::new(mock.clone()), TextExtractor::default(), options)
    }

    fn texts(raw: &[&str]) -> Vec<Arc<String>> {
        raw.iter().map(|t| Arc::new(t.to_string())).collect()
    }

    #[tokio::test]
    async fn keyword_mode_answers_from_filtered_lines() {
        let mock = MockProvider::with(|prompt| {
            assert!(prompt.contains("Revenue grew 10% in 2023"));
            assert!(!prompt.contains("unrelated footer"));
            Ok("Revenue grew 10% in 2023.".to_string())
        });
        let orch = orchestrator(&mock, QaOptions::default());

        let set = orch
            .answer_extracted(
                &["What was the revenue growth?".to_string()],
                &texts(&["Annual report\nRevenue grew 10% in 2023\nunrelated footer"]),
            )
            .await;

        match &set.entries[0].1 {
            QuestionOutcome::Answered(answers) => {
                assert!(answers[&0].to_string().contains("10%"));
            }
            QuestionOutcome::NoAnswer => panic!("expected an answer"),
        }
    }

    #[tokio::test]
    async fn irrelevant_document_is_absent_from_the_map() {
        let mock = MockProvider::with(|_| Ok("the PDF has it".to_string()));
        let orch = orchestrator(&mock, QaOptions::default());

        // Document 0 has no line matching the question's keywords.
        let set = orch
            .answer_extracted(
                &["What was the revenue growth?".to_string()],
                &texts(&["meeting notes about staffing", "Revenue grew 10% in 2023"]),
            )
            .await;

        match &set.entries[0].1 {
            QuestionOutcome::Answered(answers) => {
                assert_eq!(answers.len(), 1);
                assert!(answers.contains_key(&1));
            }
            QuestionOutcome::NoAnswer => panic!("expected an answer"),
        }
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn a_failed_call_does_not_abort_the_batch() {
        let mock = MockProvider::with(|prompt| {
            if prompt.contains("alpha") {
                Err(LlmError::Network("request timed out".to_string()))
            } else {
                Ok("42".to_string())
            }
        });
        let orch = orchestrator(&mock, QaOptions::default());

        let set = orch
            .answer_extracted(
                &["budget total?".to_string()],
                &texts(&["budget alpha detail", "budget beta detail"]),
            )
            .await;

        match &set.entries[0].1 {
            QuestionOutcome::Answered(answers) => {
                assert_eq!(
                    answers[&0].to_string(),
                    "Error occurred: network failure: request timed out"
                );
                assert_eq!(answers[&1], Answer::Text("42".to_string()));
            }
            QuestionOutcome::NoAnswer => panic!("expected answers"),
        }
    }

    #[tokio::test]
    async fn no_usable_content_yields_an_explicit_marker() {
        let mock = MockProvider::with(|_| Ok("should never run".to_string()));
        let orch = orchestrator(&mock, QaOptions::default());

        let set = orch
            .answer_extracted(
                &["anything about zebras?".to_string()],
                &texts(&["a report on revenue", ""]),
            )
            .await;

        assert_eq!(set.entries[0].1, QuestionOutcome::NoAnswer);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_question_batch_is_rejected_before_any_call() {
        let mock = MockProvider::with(|_| Ok("nope".to_string()));
        let orch = orchestrator(&mock, QaOptions::default());
        let cache = ExtractionCache::default();
        let docs = vec![Document::new(
            "a.pdf",
            crate::document::MediaType::Pdf,
            b"garbage".to_vec(),
        )];

        let err = orch.answer_all(&[], &docs, &cache).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoQuestions));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn chunked_mode_stops_at_the_first_non_empty_answer() {
        let mock = MockProvider::with(|prompt| {
            if prompt.contains("bbbb") {
                Ok("found in the second chunk".to_string())
            } else {
                Ok(String::new())
            }
        });
        let options = QaOptions {
            mode: QaMode::Chunked,
            chunk_size: 4,
            ..QaOptions::default()
        };
        let orch = orchestrator(&mock, options);

        // Three chunks; the second one answers, the third is never sent.
        let set = orch
            .answer_extracted(&["where is it?".to_string()], &texts(&["aaaabbbbcccc"]))
            .await;

        match &set.entries[0].1 {
            QuestionOutcome::Answered(answers) => {
                assert_eq!(answers[&0], Answer::Text("found in the second chunk".to_string()));
            }
            QuestionOutcome::NoAnswer => panic!("expected an answer"),
        }
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn chunked_mode_settles_a_document_on_failure() {
        let mock = MockProvider::with(|_| Err(LlmError::Quota("billing".to_string())));
        let options = QaOptions {
            mode: QaMode::Chunked,
            chunk_size: 4,
            ..QaOptions::default()
        };
        let orch = orchestrator(&mock, options);

        let set = orch
            .answer_extracted(&["where is it?".to_string()], &texts(&["aaaabbbbcccc"]))
            .await;

        match &set.entries[0].1 {
            QuestionOutcome::Answered(answers) => {
                assert!(matches!(answers[&0], Answer::Failed(LlmError::Quota(_))));
            }
            QuestionOutcome::NoAnswer => panic!("expected a recorded failure"),
        }
        // The failure settles the document; chunks two and three are skipped.
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn relevance_mode_gates_documents() {
        let mock = MockProvider::with(|prompt| {
            if prompt.contains("Reply with exactly") {
                if prompt.contains("the second document") {
                    Ok("yes".to_string())
                } else {
                    Ok("no".to_string())
                }
            } else {
                Ok("answered from the second document".to_string())
            }
        });
        let options = QaOptions {
            mode: QaMode::RelevanceGated,
            ..QaOptions::default()
        };
        let orch = orchestrator(&mock, options);

        let set = orch
            .answer_extracted(
                &["what does it say?".to_string()],
                &texts(&["the first document", "the second document"]),
            )
            .await;

        match &set.entries[0].1 {
            QuestionOutcome::Answered(answers) => {
                assert_eq!(answers.len(), 1);
                assert!(answers.contains_key(&1));
            }
            QuestionOutcome::NoAnswer => panic!("expected an answer"),
        }
        // Two classifier calls, one generation.
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn parse_questions_drops_blank_lines() {
        assert_eq!(
            parse_questions("first?\n\n  second?  \n\t\n"),
            vec!["first?".to_string(), "second?".to_string()]
        );
        assert!(parse_questions("\n  \n").is_empty());
    }

    #[test]
    fn mode_round_trips_through_from_str() {
        for mode in [QaMode::Keyword, QaMode::Chunked, QaMode::RelevanceGated] {
            assert_eq!(mode.as_str().parse::<QaMode>().unwrap(), mode);
        }
        assert!("verbose".parse::<QaMode>().is_err());
    }
}
