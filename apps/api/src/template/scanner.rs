//! Directive Scanner — lexes an HTML string for comment directives.
//!
//! The scanner is a lazy iterator over one byte range of the source. Calling
//! [`scan`] again restarts from scratch; nothing is cached between calls.
//!
//! Closing markers are paired by searching for the first literal closer after
//! the opener inside the scanned range. Nesting depth is not tracked, so two
//! sibling blocks with the same command and key can pair with the wrong closer.

use crate::template::directive::{
    closing_marker, split_key, Command, Directive, MalformedMarker, Span, CLOSE_SENTINEL,
    MARKER_TERMINATOR, OPEN_SENTINEL,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanItem {
    Directive(Directive),
    Malformed(MalformedMarker),
}

pub struct Scanner<'a> {
    src: &'a str,
    range: Span,
    cursor: usize,
}

/// Scans the whole source.
pub fn scan(src: &str) -> Scanner<'_> {
    scan_range(src, Span::new(0, src.len()))
}

/// Scans only `range`; closers outside it are never paired.
pub fn scan_range(src: &str, range: Span) -> Scanner<'_> {
    Scanner {
        src,
        range,
        cursor: range.start,
    }
}

impl Iterator for Scanner<'_> {
    type Item = ScanItem;

    fn next(&mut self) -> Option<ScanItem> {
        loop {
            let window = &self.src[self.cursor..self.range.end];
            let at = self.cursor + window.find(OPEN_SENTINEL)?;
            // Resume right after this occurrence, not after its block.
            self.cursor = at + 1;

            let rest = &self.src[at..self.range.end];
            if rest.starts_with(CLOSE_SENTINEL) {
                continue;
            }

            return Some(match parse_opening(self.src, at, self.range.end) {
                Some(directive) => ScanItem::Directive(directive),
                None => ScanItem::Malformed(MalformedMarker {
                    start_index: at,
                    text: rest.lines().next().unwrap_or_default().to_string(),
                }),
            });
        }
    }
}

/// Parses the opening marker at `at` and pairs its closer before `limit`.
fn parse_opening(src: &str, at: usize, limit: usize) -> Option<Directive> {
    let after_sentinel = at + OPEN_SENTINEL.len();
    let line = src[after_sentinel..limit].lines().next()?;
    let inner_len = line.find(MARKER_TERMINATOR)?;
    let (command, key) = line[..inner_len].split_once(':')?;
    if command.is_empty() || key.is_empty() {
        return None;
    }

    let opening_end = after_sentinel + inner_len + MARKER_TERMINATOR.len();
    let (form_key, field_key) = split_key(key);
    let closer = closing_marker(command, field_key.as_deref().unwrap_or(&form_key));

    let paired = src[opening_end..limit]
        .find(&closer)
        .map(|rel| opening_end + rel);

    let (end_index, closing, body) = match paired {
        Some(closer_start) => (
            closer_start + closer.len(),
            Some(closer),
            Some(Span::new(opening_end, closer_start)),
        ),
        None => (opening_end, None, None),
    };

    Some(Directive {
        command: Command::parse(command),
        target_key: key.to_string(),
        form_key,
        field_key,
        start_index: at,
        end_index,
        opening_marker: Span::new(at, opening_end).slice(src).to_string(),
        closing_marker: closing,
        body,
    })
}
