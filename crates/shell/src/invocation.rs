// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the argv the local runner is invoked with over SSH: `exec env
//! [KEY=VAL …] <runnerPath> <args…>`, with proxy variables injected in a
//! fixed order and shell-quoted the way a human would type them.

/// Fixed order proxy variables are emitted in, regardless of how the caller
/// supplies them. Empty values are omitted entirely.
const PROXY_VAR_ORDER: [&str; 3] = ["HTTP_PROXY", "HTTPS_PROXY", "NO_PROXY"];

/// A single `KEY=VAL` environment assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAssignment {
    pub key: String,
    pub value: String,
}

impl EnvAssignment {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn token(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// Reorders `vars` into [`PROXY_VAR_ORDER`], dropping entries whose value is
/// empty. Keys not in the fixed set are dropped: this builder is for proxy
/// propagation specifically.
pub fn ordered_proxy_vars(vars: &[EnvAssignment]) -> Vec<EnvAssignment> {
    PROXY_VAR_ORDER
        .iter()
        .filter_map(|name| {
            vars.iter()
                .find(|v| v.key == *name)
                .filter(|v| !v.value.is_empty())
                .cloned()
        })
        .collect()
}

/// Builds the full invocation argv: `exec env K=V… <runner_path> <args…>`.
pub fn build_invocation(env_vars: &[EnvAssignment], runner_path: &str, args: &[String]) -> Vec<String> {
    let mut argv = vec!["exec".to_string(), "env".to_string()];
    argv.extend(env_vars.iter().map(EnvAssignment::token));
    argv.push(runner_path.to_string());
    argv.extend(args.iter().cloned());
    argv
}

/// Quotes a single argv token the way a shell would need it typed: wraps in
/// single quotes if it contains whitespace, a comma, or a shell metacharacter.
/// Tokens that need no quoting are returned unchanged.
pub fn quote_token(token: &str) -> String {
    if token.is_empty() || needs_quoting(token) {
        format!("'{}'", token.replace('\'', r"'\''"))
    } else {
        token.to_string()
    }
}

fn needs_quoting(token: &str) -> bool {
    token.chars().any(|c| {
        c.is_whitespace() || matches!(c, ',' | '|' | '&' | ';' | '$' | '"' | '*' | '?' | '(' | ')' | '<' | '>')
    })
}

/// Renders an argv as a single shell command line, quoting tokens that need it.
pub fn render_invocation(argv: &[String]) -> String {
    argv.iter().map(|t| quote_token(t)).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "invocation_tests.rs"]
mod tests;
