use crate::layout::aspect::AspectRatio;
use crate::text::font::FontSpec;

/// Capability for measuring the advance width of a single line of text.
///
/// Implementations must be deterministic: the same `(text, font)` always measures the same.
pub trait TextMeasurer {
    /// Advance width of `text` set in `font`, in canvas pixels.
    fn measure_width(&mut self, text: &str, font: &FontSpec) -> f64;
}

/// Headline lines ready for a template, after wrapping and truncation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrappedTitle {
    /// Lines in reading order.
    pub lines: Vec<String>,
    /// Words lost to the line cap.
    pub dropped_words: usize,
}

impl WrappedTitle {
    /// Return `true` when the line cap removed any text.
    pub fn is_truncated(&self) -> bool {
        self.dropped_words > 0
    }
}

/// Greedy word-wrap of `text` into lines no wider than `max_width`.
///
/// Words are split on whitespace and rejoined with single spaces. A word is appended to the
/// current line while `current + " " + word` measures within `max_width`; otherwise the current
/// line is committed and the word starts the next one. A word wider than `max_width` occupies a
/// line of its own. The final line is always committed, so empty input yields one empty line.
pub fn wrap_words(
    text: &str,
    max_width: f64,
    font: &FontSpec,
    measurer: &mut dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measurer.measure_width(&candidate, font) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    lines.push(line);
    lines
}

/// Wrap a headline and drop lines past the cap for `aspect` (2 for 16:9, otherwise 4).
///
/// Excess trailing lines are dropped as-is; there is no ellipsis and no font shrinking.
pub fn wrap_title(
    text: &str,
    max_width: f64,
    font: &FontSpec,
    aspect: AspectRatio,
    measurer: &mut dyn TextMeasurer,
) -> WrappedTitle {
    let mut lines = wrap_words(text, max_width, font, measurer);
    let cap = aspect.max_title_lines();
    let dropped_words = lines
        .iter()
        .skip(cap)
        .map(|l| l.split_whitespace().count())
        .sum();
    lines.truncate(cap);
    if dropped_words > 0 {
        tracing::warn!(
            kept_lines = lines.len(),
            dropped_words,
            aspect = %aspect,
            "headline truncated to line cap"
        );
    }
    WrappedTitle {
        lines,
        dropped_words,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
