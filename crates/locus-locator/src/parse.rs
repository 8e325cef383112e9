//! Locator parsing
//!
//! Re-parses rendered locators: path expressions back into [`Directory`]
//! values, selector strings into step lists. Both scanners are
//! quote-aware, so attribute values containing `/`, `>`, or brackets do
//! not confuse segmentation.

use crate::directory::{AttrDescriptor, AttrKind, Directory, DirectoryEntry};
use crate::{LocatorError, SHADOW_MARKER};

/// One step of a parsed selector string
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorStep {
    /// `$shadow$` boundary marker
    Boundary,
    Compound(CompoundSelector),
}

/// One compound selector (`tag.class#id:nth-child(n)`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    /// `*` or empty means any tag
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub nth_child: Option<usize>,
    pub nth_of_type: Option<usize>,
}

impl CompoundSelector {
    pub fn matches_any_tag(&self) -> bool {
        self.tag.is_empty() || self.tag == "*"
    }
}

/// Split a path expression into structural segments, quote- and
/// bracket-aware, dropping the empty pieces produced by `//`.
pub fn split_path_segments(path: &str) -> Vec<String> {
    split_top(path, '/')
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a selector string into `>`-separated steps
pub fn split_selector_steps(selector: &str) -> Vec<String> {
    split_top(selector, '>')
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split on `sep` outside quotes, brackets, and parens
fn split_top(s: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    for c in s.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                cur.push(c);
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    cur.push(c);
                }
                '[' | '(' => {
                    depth += 1;
                    cur.push(c);
                }
                ']' | ')' => {
                    depth -= 1;
                    cur.push(c);
                }
                _ if c == sep && depth == 0 => {
                    out.push(std::mem::take(&mut cur));
                }
                _ => cur.push(c),
            },
        }
    }
    out.push(cur);
    out
}

/// Parse a single-fragment path expression into a Directory
pub fn parse_path(path: &str) -> Result<Directory, LocatorError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(LocatorError::Malformed(path.to_string()));
    }
    let mut entries = Vec::new();
    for segment in split_path_segments(trimmed) {
        if segment == SHADOW_MARKER {
            return Err(LocatorError::Malformed(segment));
        }
        entries.push(parse_segment(&segment)?);
    }
    if entries.is_empty() {
        return Err(LocatorError::Malformed(path.to_string()));
    }
    Ok(Directory::new(entries))
}

fn parse_segment(segment: &str) -> Result<DirectoryEntry, LocatorError> {
    let malformed = || LocatorError::Malformed(segment.to_string());
    let (tag, conds) = match segment.find('[') {
        Some(open) => {
            if !segment.ends_with(']') {
                return Err(malformed());
            }
            (&segment[..open], Some(&segment[open + 1..segment.len() - 1]))
        }
        None => (segment, None),
    };
    if tag.is_empty() {
        return Err(malformed());
    }
    let mut entry = DirectoryEntry::new(tag);
    if let Some(conds) = conds {
        for cond in split_conditions(conds) {
            entry.attrs.push(parse_condition(cond.trim(), segment)?);
        }
    }
    Ok(entry)
}

/// Split a condition conjunction on ` and ` outside quotes/parens
fn split_conditions(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                cur.push(c);
                i += 1;
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                    cur.push(c);
                    i += 1;
                } else if c == '(' || c == '[' {
                    depth += 1;
                    cur.push(c);
                    i += 1;
                } else if c == ')' || c == ']' {
                    depth -= 1;
                    cur.push(c);
                    i += 1;
                } else if depth == 0 && chars[i..].starts_with(&[' ', 'a', 'n', 'd', ' ']) {
                    out.push(std::mem::take(&mut cur));
                    i += 5;
                } else {
                    cur.push(c);
                    i += 1;
                }
            }
        }
    }
    out.push(cur);
    out.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

fn parse_condition(cond: &str, segment: &str) -> Result<AttrDescriptor, LocatorError> {
    let malformed = || LocatorError::Malformed(segment.to_string());

    if let Some(rest) = cond.strip_prefix("position()=") {
        let n: usize = rest.trim().parse().map_err(|_| malformed())?;
        return Ok(AttrDescriptor::exact("index", n.to_string(), true));
    }
    if let Some(rest) = cond.strip_prefix("text()=") {
        let value = parse_text_expr(rest.trim()).ok_or_else(malformed)?;
        return Ok(AttrDescriptor::exact("text", value, true));
    }
    if let Some(inner) = cond
        .strip_prefix("contains(")
        .and_then(|r| r.strip_suffix(')'))
    {
        let comma = top_level_comma(inner).ok_or_else(malformed)?;
        let (subject, value) = (inner[..comma].trim(), inner[comma + 1..].trim());
        let value = unquote(value).ok_or_else(malformed)?;
        if subject == "." {
            return Ok(AttrDescriptor::contains("text", value, true));
        }
        if let Some(name) = subject.strip_prefix('@') {
            return Ok(AttrDescriptor::contains(name, value, true));
        }
        return Err(malformed());
    }
    if let Some(rest) = cond.strip_prefix('@') {
        let eq = rest.find('=').ok_or_else(malformed)?;
        let (name, value) = (rest[..eq].trim(), rest[eq + 1..].trim());
        let value = unquote(value).ok_or_else(malformed)?;
        if name.is_empty() {
            return Err(malformed());
        }
        return Ok(AttrDescriptor::exact(name, value, true));
    }
    Err(malformed())
}

fn top_level_comma(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                ',' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn unquote(s: &str) -> Option<String> {
    let first = s.chars().next()?;
    if (first == '"' || first == '\'') && s.len() >= 2 && s.ends_with(first) {
        Some(s[1..s.len() - 1].to_string())
    } else {
        None
    }
}

/// `"v"` or `concat("a", '"', "b")`
fn parse_text_expr(s: &str) -> Option<String> {
    if let Some(inner) = s.strip_prefix("concat(").and_then(|r| r.strip_suffix(')')) {
        let mut out = String::new();
        let mut rest = inner;
        loop {
            let piece = rest.trim_start();
            if piece.is_empty() {
                break;
            }
            let q = piece.chars().next()?;
            if q != '"' && q != '\'' {
                return None;
            }
            let end = piece[1..].find(q)? + 1;
            out.push_str(&piece[1..end]);
            rest = piece[end + 1..].trim_start();
            rest = rest.strip_prefix(',').unwrap_or(rest);
        }
        return Some(out);
    }
    unquote(s)
}

/// Parse a selector string into steps, honoring the shadow marker
pub fn parse_selector(selector: &str) -> Result<Vec<SelectorStep>, LocatorError> {
    let steps = split_selector_steps(selector);
    if steps.is_empty() {
        return Err(LocatorError::Malformed(selector.to_string()));
    }
    steps
        .into_iter()
        .map(|s| {
            if s == SHADOW_MARKER {
                Ok(SelectorStep::Boundary)
            } else {
                parse_compound(&s).map(SelectorStep::Compound)
            }
        })
        .collect()
}

fn parse_compound(s: &str) -> Result<CompoundSelector, LocatorError> {
    let malformed = || LocatorError::Malformed(s.to_string());
    let mut out = CompoundSelector::default();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;

    let read_name = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && !matches!(chars[*i], '.' | '#' | ':') {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && !matches!(chars[i], '.' | '#' | ':') {
        out.tag = read_name(&mut i);
    }
    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let name = read_name(&mut i);
                if name.is_empty() {
                    return Err(malformed());
                }
                out.classes.push(name);
            }
            '#' => {
                i += 1;
                let name = read_name(&mut i);
                if name.is_empty() {
                    return Err(malformed());
                }
                out.id = Some(name);
            }
            ':' => {
                i += 1;
                let rest: String = chars[i..].iter().collect();
                let (pseudo, arg_len) = parse_pseudo(&rest).ok_or_else(malformed)?;
                match pseudo {
                    Pseudo::NthChild(n) => out.nth_child = Some(n),
                    Pseudo::NthOfType(n) => out.nth_of_type = Some(n),
                }
                i += arg_len;
            }
            _ => return Err(malformed()),
        }
    }
    if out.tag.is_empty() && out.id.is_none() && out.classes.is_empty() {
        return Err(malformed());
    }
    Ok(out)
}

enum Pseudo {
    NthChild(usize),
    NthOfType(usize),
}

fn parse_pseudo(s: &str) -> Option<(Pseudo, usize)> {
    for (name, make) in [
        ("nth-child(", Pseudo::NthChild as fn(usize) -> Pseudo),
        ("nth-of-type(", Pseudo::NthOfType as fn(usize) -> Pseudo),
    ] {
        if let Some(rest) = s.strip_prefix(name) {
            let close = rest.find(')')?;
            let n: usize = rest[..close].trim().parse().ok()?;
            return Some((make(n), name.len() + close + 1));
        }
    }
    None
}
