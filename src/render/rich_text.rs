/// 8-bit RGB colour as written on the setup sheets (`#434343`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub color: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
}

impl Style {
    pub const PLAIN: Style = Style {
        color: None,
        bold: false,
        italic: false,
        strikethrough: false,
        underline: false,
    };

    pub const fn colored(color: Rgb) -> Self {
        Style {
            color: Some(color),
            ..Self::PLAIN
        }
    }

    pub const fn bold(self) -> Self {
        Style { bold: true, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

/// One line of a block: spans separated by a single space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn push(&mut self, text: impl Into<String>, style: Style) {
        self.spans.push(Span {
            text: text.into(),
            style,
        });
    }

    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Style change starting at `start`, counted in UTF-16 code units. A run lasts
/// until the next run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub style: Style,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    pub text: String,
    pub runs: Vec<Run>,
}

/// Join lines with `\n` and compute the style runs of the joined text.
///
/// Separators carry the plain style so that a styled span never bleeds into
/// the next one. Runs of equal style are merged and empty runs dropped.
pub fn compose(lines: &[Line]) -> StyledText {
    let mut text = String::new();
    let mut raw: Vec<Run> = Vec::new();
    let mut offset = 0usize;

    let mut append = |text: &mut String, raw: &mut Vec<Run>, s: &str, style: Style| {
        raw.push(Run { start: offset, style });
        text.push_str(s);
        offset += s.encode_utf16().count();
    };

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            append(&mut text, &mut raw, "\n", Style::PLAIN);
        }
        for (j, span) in line.spans.iter().enumerate() {
            if j > 0 {
                append(&mut text, &mut raw, " ", Style::PLAIN);
            }
            append(&mut text, &mut raw, &span.text, span.style);
        }
    }

    StyledText {
        text,
        runs: normalize(raw),
    }
}

fn normalize(raw: Vec<Run>) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::with_capacity(raw.len());
    for run in raw {
        // A later run at the same offset supersedes an empty one.
        while runs.last().is_some_and(|last| last.start == run.start) {
            runs.pop();
        }
        if runs.last().is_some_and(|last| last.style == run.style) {
            continue;
        }
        runs.push(run);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Style = Style::colored(Rgb(255, 0, 0));
    const BLUE: Style = Style::colored(Rgb(0, 0, 255));

    fn line(spans: &[(&str, Style)]) -> Line {
        let mut l = Line::default();
        for (text, style) in spans {
            l.push(*text, *style);
        }
        l
    }

    #[test]
    fn single_line_offsets() {
        let out = compose(&[line(&[("abc", RED.bold()), ("de", BLUE)])]);
        assert_eq!(out.text, "abc de");
        assert_eq!(
            out.runs,
            vec![
                Run { start: 0, style: RED.bold() },
                Run { start: 3, style: Style::PLAIN },
                Run { start: 4, style: BLUE },
            ]
        );
    }

    #[test]
    fn offsets_include_line_breaks() {
        let out = compose(&[line(&[("ab", RED)]), line(&[("cd", BLUE)])]);
        assert_eq!(out.text, "ab\ncd");
        let starts: Vec<_> = out.runs.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![0, 2, 3]);
    }

    #[test]
    fn equal_adjacent_styles_merge() {
        let out = compose(&[line(&[("a", Style::PLAIN), ("b", Style::PLAIN)])]);
        assert_eq!(out.runs, vec![Run { start: 0, style: Style::PLAIN }]);
    }

    #[test]
    fn empty_span_dropped() {
        let out = compose(&[line(&[("a", RED), ("", BLUE), ("b", RED)])]);
        assert_eq!(out.text, "a  b");
        // The separators around the empty span collapse into one plain run
        assert_eq!(
            out.runs,
            vec![
                Run { start: 0, style: RED },
                Run { start: 1, style: Style::PLAIN },
                Run { start: 3, style: RED },
            ]
        );
    }

    #[test]
    fn offsets_count_utf16_units() {
        // U+26A0 U+FE0F is two UTF-16 units but six UTF-8 bytes
        let out = compose(&[line(&[("\u{26A0}\u{FE0F}x", RED), ("y", BLUE)])]);
        assert_eq!(out.runs[1].start, 3);
        assert_eq!(out.runs[2].start, 4);

        // Astral characters count as a surrogate pair
        let out = compose(&[line(&[("\u{1F600}", RED), ("y", BLUE)])]);
        assert_eq!(out.runs[1].start, 2);
    }

    #[test]
    fn empty_block() {
        let out = compose(&[]);
        assert!(out.text.is_empty());
        assert!(out.runs.is_empty());
    }
}
