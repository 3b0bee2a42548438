use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::question::{AnswerFormat, Category, Question, QuestionType};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Tossup,
    Bonus,
}

impl TypeFilter {
    pub fn accepts(self, kind: QuestionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Tossup => kind == QuestionType::Tossup,
            TypeFilter::Bonus => kind == QuestionType::Bonus,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            TypeFilter::All => TypeFilter::Tossup,
            TypeFilter::Tossup => TypeFilter::Bonus,
            TypeFilter::Bonus => TypeFilter::All,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "all" => Some(TypeFilter::All),
            "tossup" => Some(TypeFilter::Tossup),
            "bonus" => Some(TypeFilter::Bonus),
            _ => None,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeFilter::All => "all",
            TypeFilter::Tossup => "tossup",
            TypeFilter::Bonus => "bonus",
        })
    }
}

/// Which questions are eligible for practice. Empty category or format
/// lists mean "no restriction".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolFilter {
    pub categories: Vec<Category>,
    pub question_type: TypeFilter,
    pub formats: Vec<AnswerFormat>,
}

impl PoolFilter {
    pub fn accepts(&self, question: &Question) -> bool {
        let category_ok =
            self.categories.is_empty() || self.categories.contains(&question.category);
        let format_ok = self.formats.is_empty() || self.formats.contains(&question.format);
        category_ok && self.question_type.accepts(question.kind) && format_ok
    }

    pub fn toggle_category(&mut self, category: Category) {
        toggle(&mut self.categories, category);
    }

    pub fn toggle_format(&mut self, format: AnswerFormat) {
        toggle(&mut self.formats, format);
    }
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(pos) = items.iter().position(|x| *x == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
}

/// Ordered subsequence of `all` that passes `filter`. Source order is kept.
pub fn build_practice_pool<Q>(all: &[Q], filter: &PoolFilter) -> Vec<Q>
where
    Q: Borrow<Question> + Clone,
{
    all.iter()
        .filter(|q| {
            let question: &Question = (*q).borrow();
            filter.accepts(question)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::fixtures::*;

    fn sample() -> Vec<Question> {
        let mut bonus = short_answer(2, "b", "b");
        bonus.kind = QuestionType::Bonus;
        vec![
            short_answer(1, "a", "a"),
            bonus,
            multiple_choice(3, "c", &["x", "y"], "W"),
            with_attributes(4, AnswerFormat::Rank, "d", &["p", "q"], "1, 2"),
        ]
    }

    fn ids(pool: &[Question]) -> Vec<u64> {
        pool.iter().map(|q| q.id).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let pool = build_practice_pool(&sample(), &PoolFilter::default());
        assert_eq!(ids(&pool), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_category_filter() {
        let filter = PoolFilter {
            categories: vec![Category::Physics],
            ..Default::default()
        };
        let pool = build_practice_pool(&sample(), &filter);
        assert_eq!(ids(&pool), vec![1, 2]);
    }

    #[test]
    fn test_type_filter() {
        let filter = PoolFilter {
            question_type: TypeFilter::Bonus,
            ..Default::default()
        };
        let pool = build_practice_pool(&sample(), &filter);
        assert_eq!(ids(&pool), vec![2, 4]);
    }

    #[test]
    fn test_format_filter_combines_with_category() {
        let filter = PoolFilter {
            categories: vec![Category::Physics, Category::Chemistry],
            formats: vec![AnswerFormat::MultipleChoice],
            ..Default::default()
        };
        let pool = build_practice_pool(&sample(), &filter);
        assert_eq!(ids(&pool), vec![3]);
    }

    #[test]
    fn test_works_over_shared_questions() {
        let shared: Vec<std::rc::Rc<Question>> =
            sample().into_iter().map(std::rc::Rc::new).collect();
        let filter = PoolFilter {
            question_type: TypeFilter::Tossup,
            ..Default::default()
        };
        let pool = build_practice_pool(&shared, &filter);
        assert_eq!(pool.len(), 2);
        assert!(std::rc::Rc::ptr_eq(&pool[0], &shared[0]));
    }

    #[test]
    fn test_toggle_category() {
        let mut filter = PoolFilter::default();
        filter.toggle_category(Category::Math);
        assert_eq!(filter.categories, vec![Category::Math]);
        filter.toggle_category(Category::Math);
        assert!(filter.categories.is_empty());
    }

    #[test]
    fn test_type_filter_cycle_and_names() {
        assert_eq!(TypeFilter::All.cycle(), TypeFilter::Tossup);
        assert_eq!(TypeFilter::Bonus.cycle(), TypeFilter::All);
        assert_eq!(TypeFilter::from_name("BONUS"), Some(TypeFilter::Bonus));
        assert_eq!(TypeFilter::from_name("lightning"), None);
    }
}
