use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::question::{AnswerFormat, Category, Choice, Question, QuestionType};

const CHOICE_LABELS: [char; 4] = ['W', 'X', 'Y', 'Z'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawCategory {
    Physics,
    Chemistry,
    Biology,
    Math,
    EarthSpace,
    Energy,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawQuestionType {
    Tossup,
    Bonus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionStyle {
    ShortAnswer,
    MultipleChoice,
    IdentifyAll,
    Rank,
}

/// A question record as served by the question API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawQuestion {
    pub id: u64,
    pub question_text: String,
    pub category: RawCategory,
    pub question_type: RawQuestionType,
    pub question_style: QuestionStyle,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub option_1: Option<String>,
    #[serde(default)]
    pub option_2: Option<String>,
    #[serde(default)]
    pub option_3: Option<String>,
    #[serde(default)]
    pub option_4: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question {id}: multiple choice question has no choices")]
    MissingChoices { id: u64 },
    #[error("question {id}: {format:?} question has no attributes")]
    MissingAttributes { id: u64, format: AnswerFormat },
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        match raw {
            RawCategory::Physics => Category::Physics,
            RawCategory::Chemistry => Category::Chemistry,
            RawCategory::Biology => Category::Biology,
            RawCategory::Math => Category::Math,
            RawCategory::EarthSpace => Category::EarthSpace,
            RawCategory::Energy => Category::Energy,
            RawCategory::Other => Category::Other,
        }
    }
}

impl From<RawQuestionType> for QuestionType {
    fn from(raw: RawQuestionType) -> Self {
        match raw {
            RawQuestionType::Tossup => QuestionType::Tossup,
            RawQuestionType::Bonus => QuestionType::Bonus,
        }
    }
}

impl From<QuestionStyle> for AnswerFormat {
    fn from(style: QuestionStyle) -> Self {
        match style {
            QuestionStyle::ShortAnswer => AnswerFormat::ShortAnswer,
            QuestionStyle::MultipleChoice => AnswerFormat::MultipleChoice,
            QuestionStyle::IdentifyAll => AnswerFormat::IdentifyAll,
            QuestionStyle::Rank => AnswerFormat::Rank,
        }
    }
}

impl RawQuestion {
    fn option_slots(&self) -> [Option<&str>; 4] {
        [
            self.option_1.as_deref(),
            self.option_2.as_deref(),
            self.option_3.as_deref(),
            self.option_4.as_deref(),
        ]
    }
}

fn present(option: Option<&str>) -> Option<&str> {
    option.filter(|s| !s.is_empty())
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuestionError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let format = AnswerFormat::from(raw.question_style);
        let slots = raw.option_slots();

        let mut choices = Vec::new();
        let mut attributes = Vec::new();
        match format {
            AnswerFormat::MultipleChoice => {
                // Labels follow the slot, so a gap in option_2 still leaves option_3 as Y.
                choices = slots
                    .iter()
                    .zip(CHOICE_LABELS)
                    .filter_map(|(slot, label)| {
                        present(*slot).map(|text| Choice {
                            label,
                            text: text.to_string(),
                        })
                    })
                    .collect();
                if choices.is_empty() {
                    return Err(QuestionError::MissingChoices { id: raw.id });
                }
            }
            AnswerFormat::IdentifyAll | AnswerFormat::Rank => {
                attributes = slots
                    .iter()
                    .filter_map(|slot| present(*slot).map(str::to_string))
                    .collect();
                if attributes.is_empty() {
                    return Err(QuestionError::MissingAttributes { id: raw.id, format });
                }
            }
            AnswerFormat::ShortAnswer => {}
        }

        Ok(Question {
            id: raw.id,
            category: raw.category.into(),
            kind: raw.question_type.into(),
            format,
            text: raw.question_text,
            choices,
            attributes,
            answer: raw.correct_answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(style: &str, options: [&str; 4]) -> RawQuestion {
        let opts: Vec<String> = options
            .iter()
            .map(|o| {
                if o.is_empty() {
                    "null".to_string()
                } else {
                    format!("\"{o}\"")
                }
            })
            .collect();
        let json = format!(
            r#"{{
                "id": 7,
                "question_text": "Which?",
                "category": "EARTH_SPACE",
                "question_type": "BONUS",
                "question_style": "{style}",
                "correct_answer": "X",
                "option_1": {},
                "option_2": {},
                "option_3": {},
                "option_4": {}
            }}"#,
            opts[0], opts[1], opts[2], opts[3]
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_multiple_choice_labels_follow_slots() {
        let q = Question::try_from(raw("MULTIPLE_CHOICE", ["Iron", "", "Neon", "Argon"])).unwrap();
        assert_eq!(q.format, AnswerFormat::MultipleChoice);
        let labels: Vec<char> = q.choices.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!['W', 'Y', 'Z']);
        assert!(q.attributes.is_empty());
        assert_eq!(q.category, Category::EarthSpace);
        assert_eq!(q.kind, QuestionType::Bonus);
    }

    #[test]
    fn test_rank_collects_attributes() {
        let q = Question::try_from(raw("RANK", ["a", "b", "c", ""])).unwrap();
        assert_eq!(q.attributes, vec!["a", "b", "c"]);
        assert!(q.choices.is_empty());
    }

    #[test]
    fn test_short_answer_ignores_options() {
        let q = Question::try_from(raw("SHORT_ANSWER", ["a", "", "", ""])).unwrap();
        assert!(q.choices.is_empty());
        assert!(q.attributes.is_empty());
    }

    #[test]
    fn test_missing_choices_rejected() {
        let err = Question::try_from(raw("MULTIPLE_CHOICE", ["", "", "", ""])).unwrap_err();
        assert_eq!(err, QuestionError::MissingChoices { id: 7 });
    }

    #[test]
    fn test_missing_attributes_rejected() {
        let err = Question::try_from(raw("IDENTIFY_ALL", ["", "", "", ""])).unwrap_err();
        assert!(matches!(err, QuestionError::MissingAttributes { id: 7, .. }));
    }
}
