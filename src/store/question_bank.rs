use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use rust_embed::Embed;
use tracing::{info, warn};

use crate::question::{Question, RawQuestion};

#[derive(Embed)]
#[folder = "assets/questions/"]
struct BankAssets;

const SAMPLE_BANK: &str = "sample.json";

/// Normalized questions ready for the practice pool, in source order.
#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
    questions: Vec<Rc<Question>>,
    rejected: usize,
}

impl QuestionBank {
    /// Parse a JSON array of raw records. Records the normalizer rejects,
    /// and repeated ids, are logged and skipped; a document that is not an
    /// array of records is an error.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawQuestion> =
            serde_json::from_str(json).context("question bank is not a list of questions")?;

        let mut bank = QuestionBank::default();
        let mut ids = HashSet::new();
        for record in raw {
            let id = record.id;
            match Question::try_from(record) {
                Ok(question) if ids.insert(id) => bank.questions.push(Rc::new(question)),
                Ok(_) => {
                    warn!(id, "duplicate question id, skipping");
                    bank.rejected += 1;
                }
                Err(e) => {
                    warn!(error = %e, "skipping malformed question");
                    bank.rejected += 1;
                }
            }
        }
        info!(
            loaded = bank.questions.len(),
            rejected = bank.rejected,
            "question bank loaded"
        );
        Ok(bank)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading question bank {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("loading {}", path.display()))
    }

    pub fn bundled() -> Result<Self> {
        let Some(file) = BankAssets::get(SAMPLE_BANK) else {
            bail!("bundled question bank {SAMPLE_BANK} is missing");
        };
        let content = std::str::from_utf8(file.data.as_ref())
            .context("bundled question bank is not UTF-8")?;
        Self::from_json(content)
    }

    /// The file at `path` if given, the bundled sample bank otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => Self::bundled(),
        }
    }

    pub fn questions(&self) -> &[Rc<Question>] {
        &self.questions
    }

    pub fn into_questions(self) -> Vec<Rc<Question>> {
        self.questions
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::AnswerFormat;

    #[test]
    fn test_bundled_bank_loads_every_format() {
        let bank = QuestionBank::bundled().unwrap();
        assert!(!bank.is_empty());
        assert_eq!(bank.rejected(), 0);
        for format in crate::question::ALL_FORMATS {
            assert!(
                bank.questions().iter().any(|q| q.format == format),
                "no {format:?} question in sample bank"
            );
        }
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let json = r#"[
            {"id": 1, "question_text": "Q1", "category": "MATH", "question_type": "TOSSUP",
             "question_style": "SHORT_ANSWER", "correct_answer": "4"},
            {"id": 2, "question_text": "Q2", "category": "MATH", "question_type": "TOSSUP",
             "question_style": "MULTIPLE_CHOICE", "correct_answer": "W"},
            {"id": 1, "question_text": "dup", "category": "MATH", "question_type": "TOSSUP",
             "question_style": "SHORT_ANSWER", "correct_answer": "4"},
            {"id": 3, "question_text": "Q3", "category": "BIOLOGY", "question_type": "BONUS",
             "question_style": "RANK", "correct_answer": "1, 2",
             "option_1": "a", "option_2": "b"}
        ]"#;
        let bank = QuestionBank::from_json(json).unwrap();
        let ids: Vec<u64> = bank.questions().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(bank.rejected(), 2);
        assert_eq!(bank.questions()[1].format, AnswerFormat::Rank);
    }

    #[test]
    fn test_not_a_list_is_an_error() {
        assert!(QuestionBank::from_json("{\"id\": 1}").is_err());
        assert!(QuestionBank::from_json("not json").is_err());
    }

    #[test]
    fn test_load_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        fs::write(
            &path,
            r#"[{"id": 9, "question_text": "Q", "category": "OTHER", "question_type": "TOSSUP",
                "question_style": "SHORT_ANSWER", "correct_answer": "A"}]"#,
        )
        .unwrap();
        let bank = QuestionBank::load(Some(&path)).unwrap();
        assert_eq!(bank.len(), 1);
        assert!(QuestionBank::load(Some(&dir.path().join("missing.json"))).is_err());
    }
}
