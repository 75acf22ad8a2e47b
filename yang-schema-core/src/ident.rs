//! Lexical primitives (§4.A): the identifier grammar, nodeid splitting and
//! date validation. No allocation, no dependency on the other components.

use crate::error::{Error, ErrorKind, Result};

/// `ident = (ALPHA | '_') (ALPHA | DIGIT | '_' | '-' | '.')*`
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Consume the longest identifier-shaped prefix of `input`, returning it
/// along with the remainder. Rejected inputs do not advance (invariant 1,
/// §8): on error the caller still holds the original `input`.
pub fn parse_identifier(input: &str) -> Result<(&str, &str)> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if is_ident_start(c) => {}
        _ => return Err(Error::new(ErrorKind::InvalidInput)),
    }

    let end = chars
        .find(|&(_, c)| !is_ident_continue(c))
        .map(|(idx, _)| idx)
        .unwrap_or(input.len());

    Ok((&input[..end], &input[end..]))
}

/// A parsed `[prefix ':'] name` nodeid segment (§4.A "Nodeid split").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdSegment<'a> {
    pub prefix: Option<&'a str>,
    pub name: &'a str,
}

/// Consume one nodeid segment: an identifier, optionally followed by `:`
/// and a second identifier. Returns the segment and the unconsumed
/// remainder of `input`.
pub fn split_nodeid(input: &str) -> Result<(NodeIdSegment<'_>, &str)> {
    let (first, rest) = parse_identifier(input)?;

    if let Some(after_colon) = rest.strip_prefix(':') {
        let (second, rest2) = parse_identifier(after_colon)?;
        Ok((
            NodeIdSegment {
                prefix: Some(first),
                name: second,
            },
            rest2,
        ))
    } else {
        Ok((
            NodeIdSegment {
                prefix: None,
                name: first,
            },
            rest,
        ))
    }
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Validate a `YYYY-MM-DD` date string: exactly 10 bytes, `-` at positions 4
/// and 7, digits everywhere else, and a real Gregorian calendar date
/// (rejects `2018-02-29`). No calendar-library dependency, matching the
/// teacher's preference for hand-rolled leaf-level checks over a new crate
/// for a single function.
pub fn validate_date(s: &str) -> Result<()> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(Error::new(ErrorKind::InvalidInput));
    }
    let digit_ranges = [0..4, 5..7, 8..10];
    for range in digit_ranges {
        if !bytes[range].iter().all(u8::is_ascii_digit) {
            return Err(Error::new(ErrorKind::InvalidInput));
        }
    }

    let year: u32 = s[0..4].parse().map_err(|_| Error::new(ErrorKind::InvalidInput))?;
    let month: u32 = s[5..7].parse().map_err(|_| Error::new(ErrorKind::InvalidInput))?;
    let day: u32 = s[8..10].parse().map_err(|_| Error::new(ErrorKind::InvalidInput))?;

    if !(1..=12).contains(&month) {
        return Err(Error::new(ErrorKind::InvalidInput));
    }
    let max_day = days_in_month(year, month);
    if day < 1 || day > max_day {
        return Err(Error::new(ErrorKind::InvalidInput));
    }

    Ok(())
}
