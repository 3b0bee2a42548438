use std::collections::BTreeSet;

use icu_normalizer::ComposingNormalizerBorrowed;

use crate::question::{AnswerFormat, Question};
use crate::ui::line_input::{LineEdit, LineInput};

/// The answer being built after a buzz. One variant per answer format, so a
/// number key has exactly one meaning for any given question.
#[derive(Clone, Debug)]
pub enum AnswerInput {
    ShortAnswer(LineInput),
    MultipleChoice {
        labels: Vec<char>,
        selected: Option<char>,
    },
    IdentifyAll {
        count: usize,
        selected: BTreeSet<usize>,
    },
    Rank {
        count: usize,
        order: Vec<usize>,
    },
}

impl AnswerInput {
    pub fn for_question(question: &Question) -> Self {
        match question.format {
            AnswerFormat::ShortAnswer => AnswerInput::ShortAnswer(LineInput::default()),
            AnswerFormat::MultipleChoice => AnswerInput::MultipleChoice {
                labels: question.choices.iter().map(|c| c.label).collect(),
                selected: None,
            },
            AnswerFormat::IdentifyAll => AnswerInput::IdentifyAll {
                count: question.attributes.len(),
                selected: BTreeSet::new(),
            },
            AnswerFormat::Rank => AnswerInput::Rank {
                count: question.attributes.len(),
                order: Vec::new(),
            },
        }
    }

    pub fn format(&self) -> AnswerFormat {
        match self {
            AnswerInput::ShortAnswer(_) => AnswerFormat::ShortAnswer,
            AnswerInput::MultipleChoice { .. } => AnswerFormat::MultipleChoice,
            AnswerInput::IdentifyAll { .. } => AnswerFormat::IdentifyAll,
            AnswerInput::Rank { .. } => AnswerFormat::Rank,
        }
    }

    pub fn option_count(&self) -> usize {
        match self {
            AnswerInput::ShortAnswer(_) => 0,
            AnswerInput::MultipleChoice { labels, .. } => labels.len(),
            AnswerInput::IdentifyAll { count, .. } | AnswerInput::Rank { count, .. } => *count,
        }
    }

    /// Apply option `number` (1-based): pick a choice, toggle membership, or
    /// toggle a rank position depending on the format. Returns false when
    /// the number is out of range or the format has no options.
    pub fn select(&mut self, number: usize) -> bool {
        if number == 0 || number > self.option_count() {
            return false;
        }
        match self {
            AnswerInput::ShortAnswer(_) => return false,
            AnswerInput::MultipleChoice { labels, selected } => {
                *selected = Some(labels[number - 1]);
            }
            AnswerInput::IdentifyAll { selected, .. } => {
                if !selected.remove(&number) {
                    selected.insert(number);
                }
            }
            AnswerInput::Rank { order, .. } => {
                if let Some(pos) = order.iter().position(|&n| n == number) {
                    order.remove(pos);
                } else {
                    order.push(number);
                }
            }
        }
        true
    }

    pub fn edit(&mut self, edit: LineEdit) -> bool {
        match self {
            AnswerInput::ShortAnswer(input) => {
                input.apply(edit);
                true
            }
            _ => false,
        }
    }

    pub fn text_input(&self) -> Option<&LineInput> {
        match self {
            AnswerInput::ShortAnswer(input) => Some(input),
            _ => None,
        }
    }

    /// Whether option `number` is currently part of the answer.
    pub fn is_selected(&self, number: usize) -> bool {
        match self {
            AnswerInput::ShortAnswer(_) => false,
            AnswerInput::MultipleChoice { labels, selected } => number
                .checked_sub(1)
                .and_then(|i| labels.get(i))
                .is_some_and(|label| Some(*label) == *selected),
            AnswerInput::IdentifyAll { selected, .. } => selected.contains(&number),
            AnswerInput::Rank { order, .. } => order.contains(&number),
        }
    }

    /// 1-based position of `number` in a rank answer.
    pub fn rank_of(&self, number: usize) -> Option<usize> {
        match self {
            AnswerInput::Rank { order, .. } => {
                order.iter().position(|&n| n == number).map(|p| p + 1)
            }
            _ => None,
        }
    }

    /// The stored answer string this input represents.
    pub fn value(&self) -> String {
        match self {
            AnswerInput::ShortAnswer(input) => input.value().to_string(),
            AnswerInput::MultipleChoice { selected, .. } => {
                selected.map(String::from).unwrap_or_default()
            }
            AnswerInput::IdentifyAll { selected, .. } => format_identify_all(selected),
            AnswerInput::Rank { order, .. } => format_rank(order),
        }
    }

    pub fn is_submittable(&self) -> bool {
        !self.value().trim().is_empty()
    }
}

/// `{2}` → `"2 ONLY"`, `{1, 3}` → `"1 AND 3"`, empty → `""`.
pub fn format_identify_all(selected: &BTreeSet<usize>) -> String {
    match selected.len() {
        0 => String::new(),
        1 => format!("{} ONLY", selected.iter().next().copied().unwrap_or_default()),
        _ => selected
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(" AND "),
    }
}

pub fn format_rank(order: &[usize]) -> String {
    order
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn normalize(s: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    nfc.normalize(s.trim()).to_lowercase()
}

/// Case-insensitive, whitespace-trimmed, NFC-normalized equality. An empty
/// answer is never correct.
pub fn answers_match(given: &str, canonical: &str) -> bool {
    let given = normalize(given);
    !given.is_empty() && given == normalize(canonical)
}
