use crate::ast::Literal;
use crate::error::{ParseError, Result};
use crate::parser::{cast_time, coerce_scalar};
use crate::splitter::{self, Bracket};

/// Knobs for [`ArgParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest container nesting accepted. `None` leaves nesting bounded
    /// only by the stack.
    pub max_depth: Option<usize>,
}

/// Converts argument text into literals: split at top-level commas, then
/// run each segment through the coercion chain, recursing into brackets.
#[derive(Debug, Clone, Default)]
pub struct ArgParser {
    options: ParseOptions,
}

impl ArgParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a comma-separated argument list (main entry point)
    pub fn parse(&self, input: &str) -> Result<Vec<Literal>> {
        tracing::debug!(input, "parsing arguments");
        let args = self.parse_sequence(input, 0)?;
        tracing::debug!(count = args.len(), "parsed arguments");
        Ok(args)
    }

    fn parse_sequence(&self, content: &str, depth: usize) -> Result<Vec<Literal>> {
        splitter::split_top_level(content, ',')?
            .into_iter()
            .map(|segment| self.coerce(segment, depth))
            .collect()
    }

    /// Coercion chain for one segment: quoted string, then bracketed
    /// structure, then the scalar casters with the bare-string fallback.
    fn coerce(&self, segment: &str, depth: usize) -> Result<Literal> {
        tracing::trace!(segment, depth, "coercing segment");

        if let Some(inner) = splitter::unquote(segment) {
            return Ok(Literal::String(inner.to_owned()));
        }

        if let Some((bracket, inner)) = splitter::enclosed(segment)? {
            return self.build(bracket, inner, depth + 1);
        }

        Ok(coerce_scalar(segment))
    }

    /// Recursive structure builder for the content between a bracket pair
    fn build(&self, bracket: Bracket, inner: &str, depth: usize) -> Result<Literal> {
        if let Some(max_depth) = self.options.max_depth {
            if depth > max_depth {
                return Err(ParseError::DepthExceeded { max_depth });
            }
        }

        match bracket {
            Bracket::Square => Ok(Literal::List(self.parse_sequence(inner, depth)?)),
            Bracket::Round => Ok(Literal::Tuple(self.parse_sequence(inner, depth)?)),
            Bracket::Curly => self.build_braced(inner, depth),
        }
    }

    /// `{}` content is a mapping when any entry has a top-level `:`,
    /// otherwise a set. Empty braces are an empty mapping.
    fn build_braced(&self, inner: &str, depth: usize) -> Result<Literal> {
        let entries = splitter::split_top_level(inner, ',')?;

        let mut pairs = Vec::with_capacity(entries.len());
        for entry in &entries {
            pairs.push(splitter::split_entry(entry)?);
        }

        if entries.is_empty() || pairs.iter().any(Option::is_some) {
            let mut map: Vec<(Literal, Literal)> = Vec::with_capacity(entries.len());
            for (entry, pair) in entries.iter().zip(pairs) {
                let Some((key, value)) = pair else {
                    return Err(ParseError::MissingColon {
                        entry: (*entry).to_owned(),
                    });
                };
                if key.is_empty() || value.is_empty() {
                    return Err(ParseError::IncompleteEntry {
                        entry: (*entry).to_owned(),
                    });
                }
                // A bare time value keeps its colons; any other leftover
                // colon means the entry cannot be read one way only.
                if cast_time(value).is_none() && splitter::split_entry(value)?.is_some() {
                    return Err(ParseError::AmbiguousColon {
                        entry: (*entry).to_owned(),
                    });
                }

                let key = hashable(self.coerce(key, depth)?, "mapping key")?;
                let value = self.coerce(value, depth)?;
                match map.iter_mut().find(|(existing, _)| *existing == key) {
                    Some(slot) => slot.1 = value,
                    None => map.push((key, value)),
                }
            }
            return Ok(Literal::Map(map));
        }

        let mut members: Vec<Literal> = Vec::with_capacity(entries.len());
        for entry in entries {
            let member = hashable(self.coerce(entry, depth)?, "set member")?;
            if !members.contains(&member) {
                members.push(member);
            }
        }
        Ok(Literal::Set(members))
    }
}

fn hashable(value: Literal, role: &'static str) -> Result<Literal> {
    if value.is_hashable() {
        Ok(value)
    } else {
        Err(ParseError::Unhashable {
            kind: value.kind(),
            role,
        })
    }
}
