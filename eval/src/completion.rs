//! Prefix completion over known names.

use std::collections::BTreeSet;

/// Functions, constants and units offered before any variable exists.
const BUILTIN_NAMES: &[&str] = &[
    "abs", "acos", "acosh", "asin", "asinh", "atan", "atanh", "binary", "cbrt", "ceil",
    "celsius", "cos", "cosh", "day", "days", "decimal", "exp", "fahrenheit", "false", "floor",
    "foot", "feet", "gram", "hexadecimal", "hour", "hours", "inch", "kelvin", "kilogram",
    "kilometer", "liter", "ln", "log", "log10", "log2", "meter", "mile", "minute", "minutes",
    "octal", "percent", "pi", "pound", "round", "second", "seconds", "sin", "sinh", "sqrt",
    "tan", "tanh", "tau", "today", "true", "week", "year",
];

#[derive(Debug, Clone)]
pub struct CompletionIndex {
    names: BTreeSet<String>,
}

impl Default for CompletionIndex {
    fn default() -> Self {
        Self {
            names: BUILTIN_NAMES.iter().map(|name| (*name).to_string()).collect(),
        }
    }
}

impl CompletionIndex {
    /// Remember the variable bound by `input`, if it is an assignment.
    pub fn learn_assignment(&mut self, input: &str) {
        if let Some(name) = assigned_name(input) {
            self.names.insert(name.to_string());
        }
    }

    /// Suffix that extends the identifier at the end of `input`.
    ///
    /// A single match completes fully; several matches complete their
    /// shared extension. Returns `None` when nothing can be added.
    #[must_use]
    pub fn complete(&self, input: &str) -> Option<String> {
        let prefix = trailing_identifier(input)?;
        let mut matches = self
            .names
            .range(prefix.to_string()..)
            .take_while(|name| name.starts_with(prefix))
            .filter(|name| name.len() > prefix.len());

        let first = matches.next()?;
        let common = matches.fold(first.as_str(), |common, name| {
            let shared = common
                .char_indices()
                .zip(name.chars())
                .find(|((_, a), b)| a != b)
                .map_or(common.len().min(name.len()), |((i, _), _)| i);
            &common[..shared]
        });

        let suffix = &common[prefix.len()..];
        (!suffix.is_empty()).then(|| suffix.to_string())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(is_ident_char)
}

fn trailing_identifier(input: &str) -> Option<&str> {
    let start = input
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map(|(i, _)| i)?;
    let ident = &input[start..];
    is_identifier(ident).then_some(ident)
}

/// `name = expr` binds `name`; comparisons like `a == b` do not.
fn assigned_name(input: &str) -> Option<&str> {
    let (lhs, rhs) = input.split_once('=')?;
    if rhs.starts_with('=') {
        return None;
    }
    let name = lhs.trim();
    let name = name.strip_prefix("let ").map_or(name, str::trim);
    is_identifier(name).then_some(name)
}
