//! Top-level splitting of argument text.
//!
//! A [`Scanner`] walks the text one character at a time, keeping a stack of
//! open brackets and the currently open quote. A character is "top level"
//! when the stack is empty and no quote is open; only top-level separators
//! cut the text into segments.

use crate::error::{ParseError, Result};
use crate::parser::datetime_prefix_len;

/// The three bracket families that can nest inside an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// `[` … `]`, a list
    Square,
    /// `(` … `)`, a tuple
    Round,
    /// `{` … `}`, a set or a mapping
    Curly,
}

impl Bracket {
    pub fn from_open(ch: char) -> Option<Self> {
        match ch {
            '[' => Some(Bracket::Square),
            '(' => Some(Bracket::Round),
            '{' => Some(Bracket::Curly),
            _ => None,
        }
    }

    pub fn from_close(ch: char) -> Option<Self> {
        match ch {
            ']' => Some(Bracket::Square),
            ')' => Some(Bracket::Round),
            '}' => Some(Bracket::Curly),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            Bracket::Square => '[',
            Bracket::Round => '(',
            Bracket::Curly => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            Bracket::Square => ']',
            Bracket::Round => ')',
            Bracket::Curly => '}',
        }
    }
}

/// Decide whether a quote character that matches the open quote ends the
/// string, given the text that follows it.
///
/// A same-character quote only terminates the string when the next
/// non-blank character could legally follow a complete argument: a
/// separator, a closing bracket, a mapping colon, or the end of input.
/// Anything else means the quote is embedded, so `'django's unicorn'` stays
/// a single string. A string whose content itself contains `', ` or `'}`
/// cannot be expressed this way and is reported as malformed.
pub fn closes_quote(rest: &str) -> bool {
    match rest.trim_start().chars().next() {
        None => true,
        Some(ch) => matches!(ch, ',' | ':' | ']' | ')' | '}'),
    }
}

struct Scanner<'a> {
    text: &'a str,
    open: Vec<(Bracket, usize)>,
    quote: Option<(char, usize)>,
    escaped: bool,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            open: Vec::new(),
            quote: None,
            escaped: false,
        }
    }

    fn depth(&self) -> usize {
        self.open.len()
    }

    /// Consume `ch` found at byte offset `pos`.
    ///
    /// Returns true when `ch` is an ordinary character sitting at top level.
    fn step(&mut self, pos: usize, ch: char) -> Result<bool> {
        if let Some((quote, _)) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == quote && closes_quote(&self.text[pos + ch.len_utf8()..]) {
                self.quote = None;
            }
            return Ok(false);
        }

        if let Some(bracket) = Bracket::from_open(ch) {
            self.open.push((bracket, pos));
            return Ok(false);
        }

        if let Some(found) = Bracket::from_close(ch) {
            return match self.open.pop() {
                None => Err(ParseError::UnexpectedClosing { found: ch, offset: pos }),
                Some((bracket, _)) if bracket != found => Err(ParseError::MismatchedBracket {
                    expected: bracket.close(),
                    found: ch,
                    offset: pos,
                }),
                Some(_) => Ok(false),
            };
        }

        if matches!(ch, '\'' | '"') {
            self.quote = Some((ch, pos));
            return Ok(false);
        }

        Ok(self.open.is_empty())
    }

    fn finish(self) -> Result<()> {
        if let Some((quote, offset)) = self.quote {
            return Err(ParseError::UnterminatedQuote { quote, offset });
        }
        if let Some((bracket, offset)) = self.open.last() {
            return Err(ParseError::UnclosedBracket {
                bracket: bracket.open(),
                offset: *offset,
            });
        }
        Ok(())
    }
}

fn push_segment<'a>(segments: &mut Vec<&'a str>, raw: &'a str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed);
    }
}

/// Split `text` at every top-level `separator`.
///
/// Segments are trimmed and empty ones are dropped, so an empty or blank
/// input yields no segments at all.
pub fn split_top_level(text: &str, separator: char) -> Result<Vec<&str>> {
    let mut scanner = Scanner::new(text);
    let mut segments = Vec::new();
    let mut start = 0;

    for (pos, ch) in text.char_indices() {
        if scanner.step(pos, ch)? && ch == separator {
            push_segment(&mut segments, &text[start..pos]);
            start = pos + ch.len_utf8();
        }
    }

    scanner.finish()?;
    push_segment(&mut segments, &text[start..]);
    Ok(segments)
}

/// Split a mapping entry at its first top-level `:`.
///
/// Colons inside a leading date-time token such as `2020-09-12T01:01:01`
/// belong to the token, so the split happens at the first colon after it.
/// Both halves are trimmed. Returns `None` when the entry has no top-level
/// colon, which marks it as a set member.
pub fn split_entry(entry: &str) -> Result<Option<(&str, &str)>> {
    let mut scanner = Scanner::new(entry);
    let body = entry.trim_start();
    let token_end = entry.len() - body.len() + datetime_prefix_len(body).unwrap_or(0);

    for (pos, ch) in entry.char_indices() {
        if scanner.step(pos, ch)? && ch == ':' && pos >= token_end {
            let key = entry[..pos].trim();
            let value = entry[pos + 1..].trim();
            return Ok(Some((key, value)));
        }
    }

    scanner.finish().map(|()| None)
}

/// If `segment` is a single bracketed structure, return its bracket kind and
/// the text between the outer brackets.
///
/// A segment that opens a bracket but continues after the matching close,
/// such as `[1] 2`, is malformed.
pub fn enclosed(segment: &str) -> Result<Option<(Bracket, &str)>> {
    let Some(bracket) = segment.chars().next().and_then(Bracket::from_open) else {
        return Ok(None);
    };

    let mut scanner = Scanner::new(segment);
    for (pos, ch) in segment.char_indices() {
        scanner.step(pos, ch)?;
        if scanner.depth() == 0 {
            let end = pos + ch.len_utf8();
            if end != segment.len() {
                return Err(ParseError::TrailingCharacters {
                    bracket: bracket.close(),
                    segment: segment.to_owned(),
                });
            }
            return Ok(Some((bracket, &segment[1..pos])));
        }
    }

    scanner.finish().map(|()| None)
}

/// If `segment` is wrapped in a matching pair of quotes, return the text
/// between them untouched.
pub fn unquote(segment: &str) -> Option<&str> {
    let first = segment.chars().next()?;
    if !matches!(first, '\'' | '"') || segment.len() < 2 || !segment.ends_with(first) {
        return None;
    }
    Some(&segment[1..segment.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        assert_eq!(split_top_level("1, 2", ',').unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_top_level("", ',').unwrap().is_empty());
        assert!(split_top_level("   ", ',').unwrap().is_empty());
    }

    #[test]
    fn test_split_respects_nesting() {
        let segments = split_top_level("[1, ['2', '3'], 4], 9", ',').unwrap();
        assert_eq!(segments, vec!["[1, ['2', '3'], 4]", "9"]);

        let segments = split_top_level("1, {'2': { '3': 4 }}", ',').unwrap();
        assert_eq!(segments, vec!["1", "{'2': { '3': 4 }}"]);
    }

    #[test]
    fn test_split_respects_quotes() {
        let segments = split_top_level("'a, b', \"c, d\"", ',').unwrap();
        assert_eq!(segments, vec!["'a, b'", "\"c, d\""]);
    }

    #[test]
    fn test_embedded_same_quote() {
        let segments = split_top_level("'django's unicorn', 2", ',').unwrap();
        assert_eq!(segments, vec!["'django's unicorn'", "2"]);
    }

    #[test]
    fn test_escaped_quote() {
        let segments = split_top_level(r"'it\', b', 2", ',').unwrap();
        assert_eq!(segments, vec![r"'it\', b'", "2"]);
    }

    #[test]
    fn test_closes_quote() {
        assert!(closes_quote(""));
        assert!(closes_quote("  , 2"));
        assert!(closes_quote("]"));
        assert!(closes_quote(": 1"));
        assert!(!closes_quote("s unicorn'"));
        assert!(!closes_quote(" b'"));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = split_top_level("'abc", ',').unwrap_err();
        assert_eq!(err, ParseError::UnterminatedQuote { quote: '\'', offset: 0 });
        assert!(err.is_quote_error());
    }

    #[test]
    fn test_comma_then_quote_is_rejected() {
        // `'a', b'` cannot mean the single string "a', b"
        let err = split_top_level("'a', b'", ',').unwrap_err();
        assert!(err.is_quote_error());
    }

    #[test]
    fn test_stop_character_is_rejected() {
        let err = split_top_level("'a'} b'", ',').unwrap_err();
        assert_eq!(err, ParseError::UnexpectedClosing { found: '}', offset: 3 });
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert_eq!(
            split_top_level("[1, 2", ',').unwrap_err(),
            ParseError::UnclosedBracket { bracket: '[', offset: 0 }
        );
        assert_eq!(
            split_top_level("1, 2]", ',').unwrap_err(),
            ParseError::UnexpectedClosing { found: ']', offset: 4 }
        );
        assert_eq!(
            split_top_level("[1, (2])", ',').unwrap_err(),
            ParseError::MismatchedBracket { expected: ')', found: ']', offset: 6 }
        );
    }

    #[test]
    fn test_split_entry() {
        assert_eq!(split_entry("'2': 3").unwrap(), Some(("'2'", "3")));
        assert_eq!(split_entry("'a:b' : {'c': 1}").unwrap(), Some(("'a:b'", "{'c': 1}")));
        assert_eq!(split_entry("5").unwrap(), None);
    }

    #[test]
    fn test_split_entry_skips_datetime_colons() {
        assert_eq!(
            split_entry("2020-09-12T01:01:01: 'x'").unwrap(),
            Some(("2020-09-12T01:01:01", "'x'"))
        );
        assert_eq!(
            split_entry("2020-09-12 01:01+05:30 : 1").unwrap(),
            Some(("2020-09-12 01:01+05:30", "1"))
        );
        assert_eq!(split_entry("2020-09-12T01:01:01").unwrap(), None);
        assert_eq!(
            split_entry("'at': 2020-09-12T01:01:01").unwrap(),
            Some(("'at'", "2020-09-12T01:01:01"))
        );
        assert_eq!(split_entry("1:2").unwrap(), Some(("1", "2")));
    }

    #[test]
    fn test_bracket_families() {
        for bracket in [Bracket::Square, Bracket::Round, Bracket::Curly] {
            assert_eq!(Bracket::from_open(bracket.open()), Some(bracket));
            assert_eq!(Bracket::from_close(bracket.close()), Some(bracket));
            assert_eq!(Bracket::from_open(bracket.close()), None);
        }
        assert_eq!(split_top_level("{[(1)]}, 2", ',').unwrap(), vec!["{[(1)]}", "2"]);
    }

    #[test]
    fn test_enclosed() {
        assert_eq!(enclosed("[1, 2]").unwrap(), Some((Bracket::Square, "1, 2")));
        assert_eq!(enclosed("(1, ')')").unwrap(), Some((Bracket::Round, "1, ')'")));
        assert_eq!(enclosed("{}").unwrap(), Some((Bracket::Curly, "")));
        assert_eq!(enclosed("12").unwrap(), None);
        assert!(matches!(
            enclosed("[1] 2").unwrap_err(),
            ParseError::TrailingCharacters { bracket: ']', .. }
        ));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'1'"), Some("1"));
        assert_eq!(unquote("\"django \"unicorn\"\""), Some("django \"unicorn\""));
        assert_eq!(unquote("'django \"unicorn\"'"), Some("django \"unicorn\""));
        assert_eq!(unquote("'"), None);
        assert_eq!(unquote("'a\""), None);
        assert_eq!(unquote("abc"), None);
    }
}
