//! Label ID lists and ranges.
//!
//! Range formats use the same placeholder syntax as the PDF service: `{}`,
//! `{:d}`, `{:0Nd}` and `{:Nd}`, with `{{` / `}}` for literal braces.

use std::path::Path;

use crate::error::{QrMagicError, QrResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Number { zero_pad: bool, width: usize },
}

fn format_error(format: &str, reason: impl Into<String>) -> QrMagicError {
    QrMagicError::IdFormat {
        format: format.to_string(),
        reason: reason.into(),
    }
}

fn parse_spec(format: &str, spec: &str) -> QrResult<Piece> {
    let digits = spec.strip_suffix('d').unwrap_or(spec);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(format_error(format, format!("unsupported format spec ':{spec}'")));
    }

    let zero_pad = digits.starts_with('0');
    let width = match digits.trim_start_matches('0') {
        "" => 0,
        w => w
            .parse()
            .map_err(|_| format_error(format, format!("width '{w}' is too large")))?,
    };
    Ok(Piece::Number { zero_pad, width })
}

fn parse_format(format: &str) -> QrResult<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut auto_fields = 0;
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(format_error(format, "single '}' encountered")),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => return Err(format_error(format, "unclosed '{'")),
                    }
                }

                let (name, spec) = field.split_once(':').unwrap_or((field.as_str(), ""));
                match name {
                    "" => auto_fields += 1,
                    "0" => {}
                    other => {
                        return Err(format_error(format, format!("unknown field '{other}'")));
                    }
                }
                if auto_fields > 1 {
                    return Err(format_error(format, "only one number is substituted"));
                }

                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(parse_spec(format, spec)?);
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

fn render(pieces: &[Piece], n: i64) -> String {
    let mut out = String::new();
    for piece in pieces {
        match *piece {
            Piece::Literal(ref text) => out.push_str(text),
            Piece::Number {
                zero_pad: true,
                width,
            } => out.push_str(&format!("{n:0width$}")),
            Piece::Number {
                zero_pad: false,
                width,
            } => out.push_str(&format!("{n:width$}")),
        }
    }
    out
}

/// Check that `format` can be rendered.
pub fn validate_id_format(format: &str) -> QrResult<()> {
    parse_format(format).map(|_| ())
}

/// Render `format` for one number.
pub fn format_id(format: &str, n: i64) -> QrResult<String> {
    Ok(render(&parse_format(format)?, n))
}

/// Render `format` for every number in `start..=end`, lazily.
///
/// The format is checked up front. An empty range (`start > end`) yields
/// nothing. Ranges may span the whole `i64` domain, so callers stream the
/// result rather than collect it.
pub fn expand_id_range(
    format: &str,
    start: i64,
    end: i64,
) -> QrResult<impl Iterator<Item = String>> {
    let pieces = parse_format(format)?;
    Ok((start..=end).map(move |n| render(&pieces, n)))
}

/// Split an ID list into labels, one per line.
///
/// Blank lines are kept and produce blank labels.
pub fn parse_id_list(text: &str) -> Vec<String> {
    text.lines().map(|line| line.trim().to_string()).collect()
}

pub fn read_id_file(path: &Path) -> QrResult<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_id_list(&text))
}
