//! Dot/bracket key paths into a configuration table.
//!
//! `db.host`, `servers[0].name` and `labels["a.b"]` are all valid paths.
//! Quoted bracket keys may contain dots; `\"` and `\\` escape inside them.

use toml::{Table, Value};

use super::ConfigError;

/// One step of a parsed key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Parses a key path into its segments.
pub fn parse_path(path: &str) -> Result<Vec<Segment>, ConfigError> {
    let invalid = || ConfigError::InvalidPath(path.to_string());

    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();
    let mut key = String::new();
    // True right after a `.`, where a bare key is mandatory.
    let mut expect_key = true;

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if key.is_empty() && expect_key {
                    return Err(invalid());
                }
                if !key.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut key)));
                }
                expect_key = true;
            }
            '[' => {
                if !key.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut key)));
                } else if expect_key && !segments.is_empty() {
                    // `a.[0]`
                    return Err(invalid());
                }
                segments.push(parse_bracket(&mut chars).ok_or_else(invalid)?);
                expect_key = false;
            }
            ']' => return Err(invalid()),
            _ => {
                if !expect_key && key.is_empty() {
                    // `a[0]b`
                    return Err(invalid());
                }
                key.push(ch);
                expect_key = true;
            }
        }
    }

    if !key.is_empty() {
        segments.push(Segment::Key(key));
    } else if expect_key {
        // Empty path or trailing `.`
        return Err(invalid());
    }

    Ok(segments)
}

/// Parses the inside of `[...]`, consuming the closing bracket.
fn parse_bracket(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<Segment> {
    if chars.peek() == Some(&'"') {
        chars.next();
        let mut key = String::new();
        loop {
            match chars.next()? {
                '\\' => key.push(chars.next()?),
                '"' => break,
                ch => key.push(ch),
            }
        }
        return (chars.next()? == ']').then_some(Segment::Key(key));
    }

    let mut digits = String::new();
    for ch in chars.by_ref() {
        if ch == ']' {
            return digits.parse().ok().map(Segment::Index);
        }
        digits.push(ch);
    }
    None // Unclosed bracket
}

/// Looks up a parsed path in the table.
pub fn lookup<'a>(root: &'a Table, segments: &[Segment]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let Segment::Key(first) = first else {
        return None;
    };

    let mut current = root.get(first)?;
    for segment in rest {
        current = match (segment, current) {
            (Segment::Key(key), Value::Table(table)) => table.get(key)?,
            (Segment::Index(index), Value::Array(array)) => array.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at the parsed path, creating intermediate tables.
///
/// Array elements can be replaced in place but never appended.
pub fn insert(
    root: &mut Table,
    segments: &[Segment],
    value: Value,
    path: &str,
) -> Result<(), ConfigError> {
    let not_a_table = || ConfigError::NotATable(path.to_string());

    let Some((Segment::Key(first), rest)) = segments.split_first() else {
        return Err(ConfigError::InvalidPath(path.to_string()));
    };

    if !writable(root, segments) {
        return Err(not_a_table());
    }

    if rest.is_empty() {
        root.insert(first.clone(), value);
        return Ok(());
    }

    if !root.contains_key(first) {
        root.insert(first.clone(), Value::Table(Table::new()));
    }
    let mut current = root.get_mut(first).ok_or_else(not_a_table)?;

    let (last, middle) = rest.split_last().ok_or_else(not_a_table)?;
    for segment in middle {
        current = match (segment, current) {
            (Segment::Key(key), Value::Table(table)) => table
                .entry(key.clone())
                .or_insert_with(|| Value::Table(Table::new())),
            (Segment::Index(index), Value::Array(array)) => {
                array.get_mut(*index).ok_or_else(not_a_table)?
            }
            _ => return Err(not_a_table()),
        };
    }

    match (last, current) {
        (Segment::Key(key), Value::Table(table)) => {
            table.insert(key.clone(), value);
        }
        (Segment::Index(index), Value::Array(array)) => {
            *array.get_mut(*index).ok_or_else(not_a_table)? = value;
        }
        _ => return Err(not_a_table()),
    }
    Ok(())
}

/// Checks that `insert` can succeed without touching the table.
///
/// Existing nodes must be tables (for keys) or arrays with the index in
/// range. Past the deepest existing node only keys may follow, since only
/// tables are created.
fn writable(root: &Table, segments: &[Segment]) -> bool {
    let Some((Segment::Key(first), rest)) = segments.split_first() else {
        return false;
    };
    let only_keys = |tail: &[Segment]| tail.iter().all(|s| matches!(s, Segment::Key(_)));

    let Some(mut current) = root.get(first) else {
        return only_keys(rest);
    };
    for (i, segment) in rest.iter().enumerate() {
        current = match (segment, current) {
            (Segment::Key(key), Value::Table(table)) => match table.get(key) {
                Some(next) => next,
                None => return only_keys(&rest[i + 1..]),
            },
            (Segment::Index(index), Value::Array(array)) => match array.get(*index) {
                Some(next) => next,
                None => return false,
            },
            _ => return false,
        };
    }
    true
}
