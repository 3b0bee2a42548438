pub mod compose;
pub mod normalize;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use compose::ComposedText;
pub use normalize::{QuestionError, RawQuestion};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Physics,
    Chemistry,
    Biology,
    Math,
    Energy,
    #[serde(rename = "ESS", alias = "Earth", alias = "Space")]
    EarthSpace,
    Other,
}

pub const ALL_CATEGORIES: [Category; 7] = [
    Category::Physics,
    Category::Chemistry,
    Category::Biology,
    Category::Math,
    Category::Energy,
    Category::EarthSpace,
    Category::Other,
];

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Physics => "Physics",
            Category::Chemistry => "Chemistry",
            Category::Biology => "Biology",
            Category::Math => "Math",
            Category::Energy => "Energy",
            Category::EarthSpace => "ESS",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        ALL_CATEGORIES
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Tossup,
    Bonus,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Tossup => "Tossup",
            QuestionType::Bonus => "Bonus",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerFormat {
    ShortAnswer,
    MultipleChoice,
    IdentifyAll,
    Rank,
}

pub const ALL_FORMATS: [AnswerFormat; 4] = [
    AnswerFormat::ShortAnswer,
    AnswerFormat::MultipleChoice,
    AnswerFormat::IdentifyAll,
    AnswerFormat::Rank,
];

impl AnswerFormat {
    pub fn label(self) -> &'static str {
        match self {
            AnswerFormat::ShortAnswer => "Short Answer",
            AnswerFormat::MultipleChoice => "Multiple Choice",
            AnswerFormat::IdentifyAll => "Identify All",
            AnswerFormat::Rank => "Rank",
        }
    }

    /// Formats whose options are numbered attributes rather than lettered choices.
    pub fn uses_attributes(self) -> bool {
        matches!(self, AnswerFormat::IdentifyAll | AnswerFormat::Rank)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub label: char,
    pub text: String,
}

/// A practice question in its normalized in-memory shape. Immutable for the
/// lifetime of a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: u64,
    pub category: Category,
    pub kind: QuestionType,
    pub format: AnswerFormat,
    pub text: String,
    /// Only populated for multiple choice.
    pub choices: Vec<Choice>,
    /// Only populated for identify-all and rank.
    pub attributes: Vec<String>,
    /// A choice label for multiple choice, an index expression such as
    /// `1 AND 3` or `2, 1, 3` for identify-all and rank.
    pub answer: String,
}

impl Question {
    /// Number of selectable options: choices for multiple choice, attributes
    /// for identify-all and rank, zero for short answer.
    pub fn option_count(&self) -> usize {
        match self.format {
            AnswerFormat::ShortAnswer => 0,
            AnswerFormat::MultipleChoice => self.choices.len(),
            AnswerFormat::IdentifyAll | AnswerFormat::Rank => self.attributes.len(),
        }
    }

    pub fn choice(&self, label: char) -> Option<&Choice> {
        self.choices.iter().find(|c| c.label == label)
    }
}

/// Display form of the canonical answer. Multiple choice labels resolve to
/// `"W. text"`; everything else is shown verbatim.
pub fn format_answer(question: &Question) -> String {
    if question.format == AnswerFormat::MultipleChoice {
        let mut chars = question.answer.trim().chars();
        if let (Some(label), None) = (chars.next(), chars.next())
            && let Some(choice) = question.choice(label.to_ascii_uppercase())
        {
            return format!("{}. {}", choice.label, choice.text);
        }
    }
    question.answer.clone()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn short_answer(id: u64, text: &str, answer: &str) -> Question {
        Question {
            id,
            category: Category::Physics,
            kind: QuestionType::Tossup,
            format: AnswerFormat::ShortAnswer,
            text: text.to_string(),
            choices: Vec::new(),
            attributes: Vec::new(),
            answer: answer.to_string(),
        }
    }

    pub fn multiple_choice(id: u64, text: &str, choices: &[&str], answer: &str) -> Question {
        let labels = ['W', 'X', 'Y', 'Z'];
        Question {
            id,
            category: Category::Chemistry,
            kind: QuestionType::Tossup,
            format: AnswerFormat::MultipleChoice,
            text: text.to_string(),
            choices: choices
                .iter()
                .zip(labels)
                .map(|(t, label)| Choice {
                    label,
                    text: t.to_string(),
                })
                .collect(),
            attributes: Vec::new(),
            answer: answer.to_string(),
        }
    }

    pub fn with_attributes(
        id: u64,
        format: AnswerFormat,
        text: &str,
        attributes: &[&str],
        answer: &str,
    ) -> Question {
        Question {
            id,
            category: Category::Biology,
            kind: QuestionType::Bonus,
            format,
            text: text.to_string(),
            choices: Vec::new(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            answer: answer.to_string(),
        }
    }
}
