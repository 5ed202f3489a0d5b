//! Lexical pre-validation.
//!
//! Some malformed fragments never make it into a tree: a lenient parser
//! drops the stray token and carries on. These checks look at the raw text
//! before parsing. They never gate the parse; their errors are merged with
//! whatever the semantic rules report.

use regex::Regex;
use tracing::trace;

use crate::config::LexicalConfig;
use crate::dialect::normalize_whitespace;
use crate::error::ConfigError;

pub const DANGLING_OPERATOR: &str = "Invalid arithmetic expression: operator without operand";
pub const EMPTY_SELECT_LIST: &str = "Empty SELECT list";
pub const TRAILING_COMMA: &str = "Trailing comma in SELECT list";
pub const DANGLING_CONNECTIVE: &str = "Invalid WHERE clause: missing condition before AND/OR";
pub const MISMATCHED_PARENTHESES: &str = "Mismatched parentheses";

/// Built-in `(pattern, message)` checks, in reporting order.
const PATTERN_CHECKS: &[(&str, &str)] = &[
    (r"(?i),\s*[+\-*/]\s+FROM\b", DANGLING_OPERATOR),
    (
        r"(?i)\bSELECT\s+(?:FROM|WHERE|GROUP|ORDER|LIMIT)\b",
        EMPTY_SELECT_LIST,
    ),
    (r"(?i),\s*FROM\b", TRAILING_COMMA),
    (r"(?i)\bWHERE\s+(?:AND|OR)\b", DANGLING_CONNECTIVE),
];

#[derive(Debug, Clone)]
struct Check {
    pattern: Regex,
    message: String,
}

/// Compiled lexical checks.
#[derive(Debug, Clone)]
pub struct LexicalValidator {
    enabled: bool,
    checks: Vec<Check>,
}

impl LexicalValidator {
    /// Compiles the built-in checks plus any extra checks from `config`.
    pub fn new(config: &LexicalConfig) -> Result<Self, ConfigError> {
        let builtin = PATTERN_CHECKS.iter().copied();
        let extra = config
            .extra
            .iter()
            .map(|check| (check.pattern.as_str(), check.message.as_str()));

        let checks = builtin
            .chain(extra)
            .map(|(pattern, message)| {
                Regex::new(pattern)
                    .map(|pattern| Check {
                        pattern,
                        message: message.to_string(),
                    })
                    .map_err(|source| ConfigError::Pattern {
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enabled: config.enabled,
            checks,
        })
    }

    /// Returns one error per failed check. Every check runs.
    pub fn pre_validate(&self, raw: &str) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }

        let text = normalize_whitespace(&mask_quoted_text(raw));
        let mut errors: Vec<String> = self
            .checks
            .iter()
            .filter(|check| check.pattern.is_match(&text))
            .map(|check| check.message.clone())
            .collect();

        if !parentheses_balanced(&text) {
            errors.push(MISMATCHED_PARENTHESES.to_string());
        }

        trace!(errors = errors.len(), "lexical pre-validation");
        errors
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Literal,
    QuotedIdent,
    LineComment,
    BlockComment,
}

/// Replaces the contents of `'...'` literals and `"..."` identifiers with
/// `_` and blanks out `--` and `/* */` comments, so the checks only see
/// SQL tokens. Quotes are kept. A doubled quote closes and reopens, which
/// masks the same characters.
fn mask_quoted_text(raw: &str) -> String {
    let mut state = Scan::Code;
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Scan::Code => match c {
                '\'' => {
                    state = Scan::Literal;
                    out.push(c);
                }
                '"' => {
                    state = Scan::QuotedIdent;
                    out.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = Scan::LineComment;
                    out.push_str("  ");
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = Scan::BlockComment;
                    out.push_str("  ");
                }
                _ => out.push(c),
            },
            Scan::Literal | Scan::QuotedIdent => {
                let closing = if state == Scan::Literal { '\'' } else { '"' };
                if c == closing {
                    state = Scan::Code;
                    out.push(c);
                } else {
                    out.push('_');
                }
            }
            Scan::LineComment => {
                if c == '\n' {
                    state = Scan::Code;
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
            Scan::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = Scan::Code;
                    out.push_str("  ");
                } else {
                    out.push(' ');
                }
            }
        }
    }
    out
}

fn parentheses_balanced(text: &str) -> bool {
    let mut depth: i64 = 0;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
