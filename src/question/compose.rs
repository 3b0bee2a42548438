use crate::question::{AnswerFormat, Question};

/// Char range of one option's text (label prefix excluded) inside the composed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The single string the reveal clock walks over: body, then a blank line,
/// then one line per choice (`W) text`) or attribute (`1. text`).
///
/// Segment offsets are recorded while the text is written, so the partial
/// reveal of an option can never drift from what was actually rendered.
#[derive(Clone, Debug)]
pub struct ComposedText {
    text: String,
    /// Byte offset of every char boundary, `len + 1` entries.
    boundaries: Vec<usize>,
    body_len: usize,
    segments: Vec<Segment>,
}

pub fn choice_prefix(label: char) -> String {
    format!("{label}) ")
}

pub fn attribute_prefix(number: usize) -> String {
    format!("{number}. ")
}

struct Composer {
    text: String,
    chars: usize,
}

impl Composer {
    fn push(&mut self, s: &str) {
        self.text.push_str(s);
        self.chars += s.chars().count();
    }

    fn push_item(&mut self, prefix: &str, item: &str) -> Segment {
        self.push(prefix);
        let start = self.chars;
        self.push(item);
        let segment = Segment {
            start,
            end: self.chars,
        };
        self.push("\n");
        segment
    }
}

impl ComposedText {
    pub fn new(question: &Question) -> Self {
        let mut composer = Composer {
            text: String::with_capacity(question.text.len() + 64),
            chars: 0,
        };
        composer.push(&question.text);
        let body_len = composer.chars;

        let mut segments = Vec::new();
        match question.format {
            AnswerFormat::MultipleChoice if !question.choices.is_empty() => {
                composer.push("\n\n");
                for choice in &question.choices {
                    segments.push(composer.push_item(&choice_prefix(choice.label), &choice.text));
                }
            }
            format if format.uses_attributes() && !question.attributes.is_empty() => {
                composer.push("\n\n");
                for (i, attr) in question.attributes.iter().enumerate() {
                    segments.push(composer.push_item(&attribute_prefix(i + 1), attr));
                }
            }
            _ => {}
        }

        let text = composer.text;
        let boundaries = text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(text.len()))
            .collect();

        Self {
            text,
            boundaries,
            body_len,
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn body_len(&self) -> usize {
        self.body_len
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.len());
        let start = start.min(end);
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }

    /// Everything revealed so far.
    pub fn revealed(&self, cursor: usize) -> &str {
        self.slice(0, cursor)
    }

    /// Revealed part of the question body only, without the option lines.
    pub fn revealed_body(&self, cursor: usize) -> &str {
        self.slice(0, cursor.min(self.body_len))
    }

    pub fn segment_text(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(|s| self.slice(s.start, s.end))
    }

    /// Visible part of one option's text at `cursor`: empty until the cursor
    /// passes the segment start, whole once it reaches the end.
    pub fn revealed_segment(&self, index: usize, cursor: usize) -> &str {
        match self.segments.get(index) {
            Some(seg) if cursor > seg.start => self.slice(seg.start, cursor.min(seg.end)),
            _ => "",
        }
    }

    /// Per-option visible texts at `cursor`, in option order.
    pub fn snapshot(&self, cursor: usize) -> Vec<String> {
        (0..self.segments.len())
            .map(|i| self.revealed_segment(i, cursor).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::fixtures::*;

    #[test]
    fn test_short_answer_composes_body_only() {
        let q = short_answer(1, "What gas makes up most of the Sun?", "Hydrogen");
        let composed = ComposedText::new(&q);
        assert_eq!(composed.as_str(), "What gas makes up most of the Sun?");
        assert!(composed.segments().is_empty());
        assert_eq!(composed.body_len(), composed.len());
    }

    #[test]
    fn test_multiple_choice_layout() {
        let q = multiple_choice(1, "Pick", &["Iron", "Neon"], "X");
        let composed = ComposedText::new(&q);
        assert_eq!(composed.as_str(), "Pick\n\nW) Iron\nX) Neon\n");
        assert_eq!(composed.segment_text(0), Some("Iron"));
        assert_eq!(composed.segment_text(1), Some("Neon"));
    }

    #[test]
    fn test_attribute_layout_uses_numbers() {
        let q = with_attributes(
            1,
            AnswerFormat::IdentifyAll,
            "Which",
            &["alpha", "beta"],
            "1 ONLY",
        );
        let composed = ComposedText::new(&q);
        assert_eq!(composed.as_str(), "Which\n\n1. alpha\n2. beta\n");
    }

    #[test]
    fn test_segment_bounds_give_empty_and_full() {
        let q = multiple_choice(1, "Pick one", &["Iron", "Neon", "Argon", "Xenon"], "X");
        let composed = ComposedText::new(&q);
        for (i, seg) in composed.segments().iter().enumerate() {
            assert_eq!(composed.revealed_segment(i, seg.start), "");
            assert_eq!(
                composed.revealed_segment(i, seg.end),
                q.choices[i].text.as_str()
            );
            assert_eq!(
                composed.revealed_segment(i, composed.len()),
                q.choices[i].text.as_str()
            );
        }
    }

    #[test]
    fn test_partial_reveal_is_prefix() {
        let q = multiple_choice(1, "Q", &["Iron"], "W");
        let composed = ComposedText::new(&q);
        let seg = composed.segments()[0];
        assert_eq!(composed.revealed_segment(0, seg.start + 2), "Ir");
        assert_eq!(composed.revealed_segment(0, 0), "");
    }

    #[test]
    fn test_attribute_offsets_with_two_digit_labels() {
        let attrs: Vec<String> = (0..11).map(|i| format!("item{i}")).collect();
        let refs: Vec<&str> = attrs.iter().map(String::as_str).collect();
        let q = with_attributes(1, AnswerFormat::Rank, "Rank these", &refs, "1, 2");
        let composed = ComposedText::new(&q);
        for (i, seg) in composed.segments().iter().enumerate() {
            assert_eq!(composed.revealed_segment(i, seg.end), attrs[i]);
            assert_eq!(composed.revealed_segment(i, seg.start), "");
        }
        assert!(composed.as_str().contains("11. item10\n"));
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        let q = multiple_choice(1, "Δ énergie?", &["été", "ça"], "W");
        let composed = ComposedText::new(&q);
        assert_eq!(composed.revealed_segment(0, composed.segments()[0].start + 1), "é");
        assert_eq!(composed.revealed_body(3), "Δ é");
        assert_eq!(composed.segment_text(1), Some("ça"));
    }

    #[test]
    fn test_recompose_is_identical() {
        let q = multiple_choice(1, "Q", &["a", "b"], "W");
        let a = ComposedText::new(&q);
        let b = ComposedText::new(&q);
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.segments(), b.segments());
    }

    #[test]
    fn test_revealed_body_stops_at_body() {
        let q = multiple_choice(1, "Body", &["a"], "W");
        let composed = ComposedText::new(&q);
        assert_eq!(composed.revealed_body(composed.len()), "Body");
        assert_eq!(composed.revealed(composed.len() + 10), composed.as_str());
    }

    #[test]
    fn test_snapshot_at_cursor() {
        let q = multiple_choice(1, "Q", &["abc", "def"], "W");
        let composed = ComposedText::new(&q);
        let second = composed.segments()[1];
        let snap = composed.snapshot(second.start + 1);
        assert_eq!(snap, vec!["abc".to_string(), "d".to_string()]);
    }
}
