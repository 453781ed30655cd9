//! Plain-text rendering of an [`AnswerSet`]: a flat list, or a
//! three-column (document, question, answer) table.

use crate::qa::orchestrator::{AnswerSet, QuestionOutcome};

pub const NO_ANSWER_TEXT: &str = "No relevant answers found.";

pub fn render_list(set: &AnswerSet, names: &[String]) -> String {
    let mut out = String::new();
    for (question, outcome) in &set.entries {
        out.push_str("Question: ");
        out.push_str(question);
        out.push('\n');
        match outcome {
            QuestionOutcome::Answered(answers) => {
                for (doc_index, answer) in answers {
                    let name = names.get(*doc_index).map(String::as_str).unwrap_or("?");
                    out.push_str(&format!("  [{}] {}\n", name, answer));
                }
            }
            QuestionOutcome::NoAnswer => {
                out.push_str("  ");
                out.push_str(NO_ANSWER_TEXT);
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_table(set: &AnswerSet, names: &[String]) -> String {
    let total = term_size::dimensions().map(|(w, _)| w).unwrap_or(100).max(60);

    let doc_width = names
        .iter()
        .map(|n| n.chars().count())
        .chain(std::iter::once("Document".len()))
        .max()
        .unwrap_or(8)
        .min(24);
    let question_width = set
        .entries
        .iter()
        .map(|(q, _)| q.chars().count())
        .chain(std::iter::once("Question".len()))
        .max()
        .unwrap_or(8)
        .min(40);
    // 10 = three column separators plus padding
    let answer_width = total
        .saturating_sub(doc_width + question_width + 10)
        .max(16);

    let rule = format!(
        "+{}+{}+{}+\n",
        "-".repeat(doc_width + 2),
        "-".repeat(question_width + 2),
        "-".repeat(answer_width + 2)
    );

    let mut out = String::new();
    out.push_str(&rule);
    push_row(&mut out, "Document", "Question", "Answer", doc_width, question_width, answer_width);
    out.push_str(&rule);

    for (question, outcome) in &set.entries {
        match outcome {
            QuestionOutcome::Answered(answers) => {
                for (doc_index, answer) in answers {
                    let name = names.get(*doc_index).map(String::as_str).unwrap_or("?");
                    let flat = answer.to_string().replace('\n', " ");
                    push_row(&mut out, name, question, &flat, doc_width, question_width, answer_width);
                }
            }
            QuestionOutcome::NoAnswer => {
                push_row(&mut out, "-", question, NO_ANSWER_TEXT, doc_width, question_width, answer_width);
            }
        }
    }
    out.push_str(&rule);
    out
}

fn push_row(
    out: &mut String,
    doc: &str,
    question: &str,
    answer: &str,
    doc_width: usize,
    question_width: usize,
    answer_width: usize,
) {
    out.push_str(&format!(
        "| {:<dw$} | {:<qw$} | {:<aw$} |\n",
        clip(doc, doc_width),
        clip(question, question_width),
        clip(answer, answer_width),
        dw = doc_width,
        qw = question_width,
        aw = answer_width,
    ));
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa::orchestrator::Answer;
    use std::collections::BTreeMap;

    fn sample() -> (AnswerSet, Vec<String>) {
        let mut answers = BTreeMap::new();
        answers.insert(1usize, Answer::Text("Revenue grew 10%.".to_string()));
        let set = AnswerSet {
            entries: vec![
                ("What was the revenue growth?".to_string(), QuestionOutcome::Answered(answers)),
                ("Anything about zebras?".to_string(), QuestionOutcome::NoAnswer),
            ],
        };
        let names = vec!["notes.docx".to_string(), "report.pdf".to_string()];
        (set, names)
    }

    #[test]
    fn list_shows_answers_and_absence() {
        let (set, names) = sample();
        let rendered = render_list(&set, &names);
        assert!(rendered.contains("[report.pdf] Revenue grew 10%."));
        assert!(rendered.contains(NO_ANSWER_TEXT));
    }

    #[test]
    fn table_has_three_columns_and_all_rows() {
        let (set, names) = sample();
        let rendered = render_table(&set, &names);
        assert!(rendered.contains("Document"));
        assert!(rendered.contains("Question"));
        assert!(rendered.contains("Answer"));
        assert!(rendered.contains("report.pdf"));
        assert!(rendered.contains(NO_ANSWER_TEXT));
    }

    #[test]
    fn clip_is_char_safe() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefgh", 4), "abc…");
        assert_eq!(clip("ééééé", 3), "éé…");
    }
}
