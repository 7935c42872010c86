//! Pattern text compiler
//!
//! Turns declarations such as `//Envelope/Body/GetItemsResponse`,
//! `item[@type='book']/title` or `item/@id` into [`Pattern`]s.

use super::chain::PathChain;
use super::local_name;
use super::step::PathStep;

/// A pattern that could not be compiled
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid pattern '{expression}': {reason} at position {position}")]
pub struct PatternError {
    pub expression: String,
    pub reason: String,
    pub position: usize,
}

impl PatternError {
    fn new(expression: &str, reason: impl Into<String>, position: usize) -> Self {
        Self {
            expression: expression.to_string(),
            reason: reason.into(),
            position,
        }
    }
}

/// Compiled form of a field or root declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// The binding root itself (empty pattern or `.`)
    Root,
    /// An attribute of the binding root (`@name`)
    RootAttribute(String),
    /// An absolute or relative chain of steps
    Chain(PathChain),
}

impl Pattern {
    /// Absolute chains this pattern denotes under the given roots.
    ///
    /// Relative patterns are cloned once per root alternative, absolute ones
    /// are returned as-is.
    #[must_use]
    pub fn resolve(&self, roots: &[PathChain]) -> Vec<PathChain> {
        match self {
            Pattern::Root => roots.to_vec(),
            Pattern::RootAttribute(attribute) => {
                roots.iter().map(|root| root.selecting(attribute)).collect()
            }
            Pattern::Chain(chain) if chain.is_relative() => {
                roots.iter().map(|root| chain.under(root)).collect()
            }
            Pattern::Chain(chain) => vec![chain.clone()],
        }
    }
}

enum Segment {
    Step(PathStep),
    Attribute(String),
}

/// Pattern text parser
pub struct XPathParser;

impl XPathParser {
    /// Compile a field pattern
    ///
    /// # Errors
    ///
    /// Returns `PatternError` for empty steps, unbalanced brackets, malformed
    /// predicates, invalid names or an attribute selector that is not last.
    pub fn compile(expression: &str) -> Result<Pattern, PatternError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Ok(Pattern::Root);
        }

        let (absolute, body, offset) = if let Some(rest) = trimmed.strip_prefix("//") {
            (true, rest, 2)
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            (true, rest, 1)
        } else {
            (false, trimmed, 0)
        };

        let raw_segments = split_segments(expression, body, offset)?;
        let mut steps = Vec::with_capacity(raw_segments.len());
        let last = raw_segments.len() - 1;

        for (index, (segment, position)) in raw_segments.into_iter().enumerate() {
            // `.` is the context node and adds no step
            if segment.trim() == "." {
                continue;
            }
            match parse_segment(expression, segment, position)? {
                Segment::Step(step) => steps.push(step),
                Segment::Attribute(attribute) => {
                    if index != last {
                        return Err(PatternError::new(
                            expression,
                            "attribute selector must be the last step",
                            position,
                        ));
                    }
                    match steps.last_mut() {
                        Some(leaf) => leaf.set_attribute(Some(attribute)),
                        None if !absolute => return Ok(Pattern::RootAttribute(attribute)),
                        None => {
                            return Err(PatternError::new(
                                expression,
                                "attribute selector needs an element step",
                                position,
                            ));
                        }
                    }
                }
            }
        }

        if steps.is_empty() {
            if absolute {
                return Err(PatternError::new(
                    expression,
                    "absolute pattern needs an element step",
                    offset,
                ));
            }
            return Ok(Pattern::Root);
        }

        let chain = if absolute {
            PathChain::absolute(steps)
        } else {
            PathChain::relative(steps)
        };
        Ok(Pattern::Chain(chain))
    }

    /// Compile a root pattern, which must be an absolute element chain
    ///
    /// # Errors
    ///
    /// Returns `PatternError` for unparsable text, relative patterns and
    /// patterns selecting an attribute.
    pub fn compile_root(expression: &str) -> Result<PathChain, PatternError> {
        match Self::compile(expression)? {
            Pattern::Chain(chain) if chain.is_relative() => Err(PatternError::new(
                expression,
                "root pattern must be absolute",
                0,
            )),
            Pattern::Chain(chain) if chain.leaf().and_then(PathStep::attribute).is_some() => Err(
                PatternError::new(expression, "root pattern cannot select an attribute", 0),
            ),
            Pattern::Chain(chain) => Ok(chain),
            Pattern::Root | Pattern::RootAttribute(_) => Err(PatternError::new(
                expression,
                "root pattern must name at least one element",
                0,
            )),
        }
    }
}

/// Split on `/` outside of brackets and quotes, keeping segment offsets
fn split_segments<'a>(
    expression: &str,
    body: &'a str,
    offset: usize,
) -> Result<Vec<(&'a str, usize)>, PatternError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;

    for (index, ch) in body.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => {
                if depth == 0 {
                    return Err(PatternError::new(
                        expression,
                        "unbalanced ']'",
                        offset + index,
                    ));
                }
                depth -= 1;
            }
            (None, '/') if depth == 0 => {
                segments.push((&body[start..index], offset + start));
                start = index + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err(PatternError::new(
            expression,
            "unterminated quoted value",
            offset + body.len(),
        ));
    }
    if depth != 0 {
        return Err(PatternError::new(
            expression,
            "unbalanced '['",
            offset + body.len(),
        ));
    }
    segments.push((&body[start..], offset + start));

    if let Some((_, position)) = segments.iter().find(|(segment, _)| segment.trim().is_empty()) {
        return Err(PatternError::new(expression, "empty step", *position));
    }

    Ok(segments)
}

fn parse_segment(
    expression: &str,
    segment: &str,
    position: usize,
) -> Result<Segment, PatternError> {
    let segment = segment.trim();

    if let Some(attribute) = segment.strip_prefix('@') {
        validate_name(expression, attribute, position + 1)?;
        return Ok(Segment::Attribute(local_name(attribute).to_string()));
    }

    let name_end = segment.find('[').unwrap_or(segment.len());
    let name = segment[..name_end].trim();
    validate_name(expression, name, position)?;

    let mut step = PathStep::new(local_name(name));
    let mut rest = &segment[name_end..];
    let mut cursor = position + name_end;

    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(PatternError::new(
                expression,
                "unexpected text after predicate",
                cursor,
            ));
        }
        let close = closing_bracket(rest).ok_or_else(|| {
            PatternError::new(expression, "unbalanced '['", cursor)
        })?;
        parse_predicates(expression, &rest[1..close], cursor + 1, &mut step)?;
        cursor += close + 1;
        rest = &rest[close + 1..];
    }

    Ok(Segment::Step(step))
}

fn closing_bracket(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, ch) in text.char_indices().skip(1) {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ']') => return Some(index),
            _ => {}
        }
    }
    None
}

/// Parse `@a='x' and @b="y"` into the step's predicates
fn parse_predicates(
    expression: &str,
    text: &str,
    position: usize,
    step: &mut PathStep,
) -> Result<(), PatternError> {
    let bytes = text.as_bytes();
    let mut index = 0usize;

    loop {
        index = skip_whitespace(bytes, index);
        if bytes.get(index) != Some(&b'@') {
            return Err(PatternError::new(
                expression,
                "predicate must start with '@'",
                position + index,
            ));
        }
        index += 1;

        let key_start = index;
        while index < bytes.len() && !bytes[index].is_ascii_whitespace() && bytes[index] != b'=' {
            index += 1;
        }
        let key = &text[key_start..index];
        validate_name(expression, key, position + key_start)?;

        index = skip_whitespace(bytes, index);
        if bytes.get(index) != Some(&b'=') {
            return Err(PatternError::new(
                expression,
                "expected '=' in predicate",
                position + index,
            ));
        }
        index = skip_whitespace(bytes, index + 1);

        let quote = match bytes.get(index) {
            Some(&q @ (b'\'' | b'"')) => q,
            _ => {
                return Err(PatternError::new(
                    expression,
                    "predicate value must be quoted",
                    position + index,
                ));
            }
        };
        let value_start = index + 1;
        let value_end = text[value_start..]
            .find(char::from(quote))
            .map(|offset| value_start + offset)
            .ok_or_else(|| {
                PatternError::new(expression, "unterminated quoted value", position + index)
            })?;
        step.add_predicate(local_name(key), &text[value_start..value_end]);

        index = skip_whitespace(bytes, value_end + 1);
        if index >= bytes.len() {
            return Ok(());
        }
        match text[index..].strip_prefix("and") {
            Some(after) if after.starts_with(char::is_whitespace) => index += 3,
            _ => {
                return Err(PatternError::new(
                    expression,
                    "predicates must be joined with 'and'",
                    position + index,
                ));
            }
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut index: usize) -> usize {
    while index < bytes.len() && bytes[index].is_ascii_whitespace() {
        index += 1;
    }
    index
}

fn validate_name(expression: &str, name: &str, position: usize) -> Result<(), PatternError> {
    if name.is_empty() {
        return Err(PatternError::new(expression, "missing name", position));
    }
    if name == ".." {
        return Err(PatternError::new(expression, "parent steps are not supported", position));
    }
    if let Some((offset, ch)) = name.char_indices().find(|(_, ch)| {
        ch.is_whitespace()
            || matches!(ch, '[' | ']' | '@' | '=' | '\'' | '"' | '/' | '*' | '(' | ')')
    }) {
        return Err(PatternError::new(
            expression,
            format!("invalid character '{ch}' in name"),
            position + offset,
        ));
    }
    Ok(())
}
