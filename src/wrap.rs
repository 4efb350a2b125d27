//! Greedy word wrap against a pixel width.
//!
//! The wrapper never measures glyphs itself; callers pass a `measure` closure so the
//! same break logic runs against real font metrics in the renderer and against fixed
//! widths in tests.

/// One output line with its measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width: f32,
}

/// A wrapped line anchored on the canvas. `y` is the text baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Breaks `text` into lines no wider than `max_width`.
///
/// Words are packed greedily. A word that does not fit on an empty line is split
/// character by character; a single character wider than `max_width` still gets a
/// line of its own, so every iteration consumes input.
pub fn wrap<F>(text: &str, max_width: f32, measure: F) -> Vec<WrappedLine>
where
    F: Fn(&str) -> f32,
{
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };

        if measure(&candidate) <= max_width {
            line = candidate;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            // the word gets re-checked on its own line
            if measure(word) <= max_width {
                line = word.to_string();
                continue;
            }
        }

        split_word(word, max_width, &measure, &mut lines);
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
        .into_iter()
        .map(|text| {
            let width = measure(&text);
            WrappedLine { text, width }
        })
        .collect()
}

// Character-level fallback for a word wider than the whole line.
fn split_word<F>(word: &str, max_width: f32, measure: &F, lines: &mut Vec<String>)
where
    F: Fn(&str) -> f32,
{
    let mut chunk = String::new();
    for ch in word.chars() {
        chunk.push(ch);
        if measure(&chunk) > max_width && chunk.chars().count() > 1 {
            chunk.pop();
            lines.push(std::mem::take(&mut chunk));
            chunk.push(ch);
        }
    }
    if !chunk.is_empty() {
        lines.push(chunk);
    }
}

/// Centers each line on `center_x` using its own width and stacks them from `start_y`.
pub fn place(lines: &[WrappedLine], center_x: f32, start_y: f32, line_height: f32) -> Vec<PlacedLine> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| PlacedLine {
            text: line.text.clone(),
            x: center_x - line.width / 2.0,
            y: start_y + i as f32 * line_height,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10px per character, spaces included
    fn mono(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn empty_text_yields_no_lines() {
        assert!(wrap("", 100.0, mono).is_empty());
        assert!(wrap("   ", 100.0, mono).is_empty());
    }

    #[test]
    fn single_fitting_word_is_one_line() {
        let lines = wrap("Hello", 100.0, mono);
        assert_eq!(texts(&lines), vec!["Hello"]);
        assert_eq!(lines[0].width, 50.0);
    }

    #[test]
    fn hello_world_breaks_only_when_forced() {
        assert_eq!(texts(&wrap("Hello world", 110.0, mono)), vec!["Hello world"]);
        assert_eq!(texts(&wrap("Hello world", 100.0, mono)), vec!["Hello", "world"]);
    }

    #[test]
    fn greedy_packing() {
        let lines = wrap("aa bb cc dd ee", 50.0, mono);
        assert_eq!(texts(&lines), vec!["aa bb", "cc dd", "ee"]);
    }

    #[test]
    fn oversized_word_is_split_by_characters() {
        let lines = wrap("abcdefghij", 40.0, mono);
        assert_eq!(texts(&lines), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn oversized_word_after_a_line_is_split_too() {
        let lines = wrap("hi abcdefghij ok", 40.0, mono);
        assert_eq!(texts(&lines), vec!["hi", "abcd", "efgh", "ij", "ok"]);
    }

    #[test]
    fn character_wider_than_limit_gets_its_own_line() {
        let lines = wrap("abc", 5.0, mono);
        assert_eq!(texts(&lines), vec!["a", "b", "c"]);
        assert!(lines.iter().all(|l| !l.text.is_empty()));
    }

    #[test]
    fn lines_never_exceed_width_and_rebuild_input() {
        let input = "Ini  adalah kalimat yang cukup panjang untuk dibungkus supercalifragilistic ya";
        for max in [30.0, 55.0, 80.0, 200.0] {
            let lines = wrap(input, max, mono);
            for l in &lines {
                assert!(
                    l.width <= max || l.text.chars().count() == 1,
                    "line {:?} is {} wide at max {max}",
                    l.text,
                    l.width
                );
            }
            let collapsed: String = input.split_whitespace().collect();
            let rebuilt: String = lines.iter().map(|l| l.text.replace(' ', "")).collect();
            assert_eq!(rebuilt, collapsed);
        }
    }

    #[test]
    fn wrap_is_deterministic() {
        let text = "satu dua tiga empat lima enam tujuh";
        assert_eq!(wrap(text, 70.0, mono), wrap(text, 70.0, mono));
    }

    #[test]
    fn place_centers_each_line_by_its_own_width() {
        let lines = wrap("Hello world!", 60.0, mono);
        let placed = place(&lines, 277.0, 120.0, 35.0);

        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].x, 277.0 - 25.0);
        assert_eq!(placed[0].y, 120.0);
        assert_eq!(placed[1].x, 277.0 - 30.0);
        assert_eq!(placed[1].y, 155.0);
    }
}
