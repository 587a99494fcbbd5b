//! Compilation of path and host patterns into anchored regexes.
//!
//! A path pattern such as `/users/{id}` becomes `^/users/(?P<id>(?:[^/]+))$`.
//! The literal text before the first placeholder is kept separately as the
//! static prefix; because the regex starts with exactly that literal, a
//! failed prefix check always implies a failed regex match.

use super::types::{normalize_pattern, Route};
use crate::error::RouteDefinitionError;
use regex::Regex;

const DEFAULT_PATH_REQUIREMENT: &str = "[^/]+";
const DEFAULT_HOST_REQUIREMENT: &str = "[^.]+";
const GREEDY_REQUIREMENT: &str = ".*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Variable { name: String, greedy: bool },
}

/// A compiled pattern together with its placeholder names.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    pub(crate) regex: Regex,
    pub(crate) static_prefix: String,
    pub(crate) variables: Vec<String>,
}

impl CompiledPattern {
    #[inline]
    pub(crate) fn prefix_matches(&self, subject: &str) -> bool {
        subject.starts_with(self.static_prefix.as_str())
    }
}

fn valid_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Split a pattern into literal and placeholder tokens.
pub(crate) fn tokenize(route: &str, pattern: &str) -> Result<Vec<Token>, RouteDefinitionError> {
    let unbalanced = || RouteDefinitionError::UnbalancedBrace {
        route: route.to_string(),
        pattern: pattern.to_string(),
    };

    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find(['{', '}']) {
        if rest[pos..].starts_with('}') {
            return Err(unbalanced());
        }
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let close = after.find('}').ok_or_else(unbalanced)?;
        let inner = &after[..close];
        if inner.contains('{') {
            return Err(unbalanced());
        }
        let (name, greedy) = match inner.strip_prefix('*') {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if !valid_placeholder_name(name) {
            return Err(RouteDefinitionError::InvalidPlaceholder {
                route: route.to_string(),
                name: name.to_string(),
            });
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(Token::Variable {
            name: name.to_string(),
            greedy,
        });
        rest = &after[close + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Strip `^`/`$` anchors users sometimes put on requirements.
fn unanchor(requirement: &str) -> &str {
    let r = requirement.strip_prefix('^').unwrap_or(requirement);
    r.strip_suffix('$').unwrap_or(r)
}

fn requirement_for<'a>(route: &'a Route, name: &str, greedy: bool, fallback: &'a str) -> &'a str {
    match route.requirements.get(name) {
        Some(req) => unanchor(req),
        None if greedy => GREEDY_REQUIREMENT,
        None => fallback,
    }
}

fn group(route: &Route, name: &str, requirement: &str) -> Result<String, RouteDefinitionError> {
    // Compile the requirement alone first so errors name the placeholder.
    Regex::new(requirement).map_err(|source| RouteDefinitionError::InvalidRequirement {
        route: route.name.clone(),
        placeholder: name.to_string(),
        source,
    })?;
    Ok(format!("(?P<{name}>(?:{requirement}))"))
}

fn compile_regex(route: &Route, pattern: &str) -> Result<Regex, RouteDefinitionError> {
    Regex::new(pattern).map_err(|source| RouteDefinitionError::InvalidRequirement {
        route: route.name.clone(),
        placeholder: String::new(),
        source,
    })
}

/// Compile the route's path pattern.
///
/// A trailing `/{name}` whose placeholder has a default becomes optional, so
/// `/blog/{page}` with `page = 1` also matches `/blog`, and
/// `/{section}/{page}` also matches `/news`.
pub(crate) fn compile_path(route: &Route) -> Result<CompiledPattern, RouteDefinitionError> {
    let path = normalize_pattern(&route.path);
    let mut tokens = tokenize(&route.name, &path)?;

    // A lone leading `/` stays literal; that shape is handled by `optional_root`
    let mut optional_tail = false;
    if let [head @ .., Token::Literal(lit), Token::Variable { name, .. }] = tokens.as_mut_slice() {
        if route.defaults.contains_key(name.as_str())
            && lit.ends_with('/')
            && (!head.is_empty() || lit.len() > 1)
        {
            lit.pop();
            optional_tail = true;
        }
    }
    // `/{page}` with a default: the whole path is optional after the root slash
    let optional_root = !optional_tail
        && matches!(
            tokens.as_slice(),
            [Token::Literal(lit), Token::Variable { name, .. }]
                if lit == "/" && route.defaults.contains_key(name.as_str())
        );

    let mut regex = String::with_capacity(path.len() + 16);
    regex.push('^');
    let mut static_prefix = String::new();
    let mut seen_variable = false;
    let mut variables = Vec::new();
    let last = tokens.len().saturating_sub(1);

    for (idx, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(lit) => {
                if !seen_variable {
                    static_prefix.push_str(lit);
                }
                regex.push_str(&regex::escape(lit));
            }
            Token::Variable { name, greedy } => {
                seen_variable = true;
                let req = requirement_for(route, name, *greedy, DEFAULT_PATH_REQUIREMENT);
                let grp = group(route, name, req)?;
                if idx == last && optional_tail {
                    regex.push_str("(?:/");
                    regex.push_str(&grp);
                    regex.push_str(")?");
                } else if idx == last && optional_root {
                    regex.push_str(&grp);
                    regex.push('?');
                } else {
                    regex.push_str(&grp);
                }
                variables.push(name.clone());
            }
        }
    }
    regex.push('$');

    Ok(CompiledPattern {
        regex: compile_regex(route, &regex)?,
        static_prefix,
        variables,
    })
}

/// Compile a host pattern; host matching is case-insensitive.
pub(crate) fn compile_host(route: &Route, host: &str) -> Result<CompiledPattern, RouteDefinitionError> {
    let tokens = tokenize(&route.name, host)?;
    let mut regex = String::from("(?i)^");
    let mut variables = Vec::new();
    for token in &tokens {
        match token {
            Token::Literal(lit) => regex.push_str(&regex::escape(lit)),
            Token::Variable { name, greedy } => {
                let req = requirement_for(route, name, *greedy, DEFAULT_HOST_REQUIREMENT);
                regex.push_str(&group(route, name, req)?);
                variables.push(name.clone());
            }
        }
    }
    regex.push('$');
    Ok(CompiledPattern {
        regex: compile_regex(route, &regex)?,
        // Hosts are matched case-insensitively, so no literal prefix check.
        static_prefix: String::new(),
        variables,
    })
}
