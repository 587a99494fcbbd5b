//! CLI variant of the router.
//!
//! A command-line invocation carries a single token instead of a path. The
//! token *is* the handler notation; when it is missing the configured
//! default handler is used. There is no pattern matching.

use super::core::MatchParams;
use crate::handler_spec::{HandlerSpec, ParseOptions};
use crate::routes::{CONTROLLER_KEY, ROUTE_KEY};
use std::collections::BTreeMap;
use tracing::debug;

/// Route name published for CLI dispatches.
pub const CLI_ROUTE_NAME: &str = "cli";

/// A split command line: the handler token and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliInvocation {
    pub token: Option<String>,
    pub params: BTreeMap<String, String>,
}

impl CliInvocation {
    /// Split arguments (program name excluded).
    ///
    /// `--key=value` and `key=value` become parameters, a bare `--flag`
    /// becomes `flag=true`. The first bare argument is the token; later bare
    /// arguments are numbered `arg0`, `arg1`, ...
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut invocation = Self::default();
        let mut positional = 0usize;
        for arg in args {
            let arg = arg.as_ref();
            if let Some(option) = arg.strip_prefix("--") {
                match option.split_once('=') {
                    Some((k, v)) => invocation.params.insert(k.to_string(), v.to_string()),
                    None => invocation.params.insert(option.to_string(), "true".to_string()),
                };
            } else if let Some((k, v)) = arg.split_once('=') {
                invocation.params.insert(k.to_string(), v.to_string());
            } else if invocation.token.is_none() && !arg.is_empty() {
                invocation.token = Some(arg.to_string());
            } else {
                invocation
                    .params
                    .insert(format!("arg{positional}"), arg.to_string());
                positional += 1;
            }
        }
        invocation
    }
}

/// Resolves CLI tokens to handlers.
#[derive(Debug, Clone)]
pub struct CliRouter {
    default_handler: String,
    options: ParseOptions,
}

impl CliRouter {
    pub fn new(default_handler: impl Into<String>, options: ParseOptions) -> Self {
        Self {
            default_handler: default_handler.into(),
            options,
        }
    }

    #[must_use]
    pub fn default_handler(&self) -> &str {
        &self.default_handler
    }

    /// Handler notation for a token, falling back to the default handler
    #[must_use]
    pub fn notation<'a>(&'a self, token: Option<&'a str>) -> &'a str {
        match token {
            Some(t) if !t.trim().is_empty() => t.trim(),
            _ => &self.default_handler,
        }
    }

    #[must_use]
    pub fn resolve(&self, token: Option<&str>) -> HandlerSpec {
        HandlerSpec::parse_with(self.notation(token), &self.options)
    }

    /// Route an invocation into the same parameter shape an HTTP match has
    #[must_use]
    pub fn route(&self, invocation: &CliInvocation) -> MatchParams {
        let notation = self.notation(invocation.token.as_deref());
        debug!(
            token = ?invocation.token,
            notation = %notation,
            params = invocation.params.len(),
            "CLI route resolved"
        );
        let mut params: MatchParams = invocation.params.clone().into();
        params.insert(CONTROLLER_KEY, notation);
        params.insert(ROUTE_KEY, CLI_ROUTE_NAME);
        params
    }
}
