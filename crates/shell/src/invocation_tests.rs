// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ordered_proxy_vars_reorders_regardless_of_input_order() {
    let vars = vec![
        EnvAssignment::new("NO_PROXY", "foo.com"),
        EnvAssignment::new("HTTP_PROXY", "10.0.0.1:8000"),
        EnvAssignment::new("HTTPS_PROXY", "10.0.0.1:8001"),
    ];
    let ordered = ordered_proxy_vars(&vars);
    let keys: Vec<&str> = ordered.iter().map(|v| v.key.as_str()).collect();
    assert_eq!(keys, vec!["HTTP_PROXY", "HTTPS_PROXY", "NO_PROXY"]);
}

#[test]
fn ordered_proxy_vars_drops_empty_values() {
    let vars = vec![
        EnvAssignment::new("HTTP_PROXY", "10.0.0.1:8000"),
        EnvAssignment::new("HTTPS_PROXY", ""),
    ];
    let ordered = ordered_proxy_vars(&vars);
    assert_eq!(ordered, vec![EnvAssignment::new("HTTP_PROXY", "10.0.0.1:8000")]);
}

#[test]
fn quote_token_leaves_plain_tokens_unquoted() {
    assert_eq!(quote_token("HTTP_PROXY=10.0.0.1:8000"), "HTTP_PROXY=10.0.0.1:8000");
    assert_eq!(quote_token("/mock/local_test_runner"), "/mock/local_test_runner");
}

#[test]
fn quote_token_wraps_values_with_commas_and_spaces() {
    assert_eq!(
        quote_token("NO_PROXY=foo.com, localhost, 127.0.0.0"),
        "'NO_PROXY=foo.com, localhost, 127.0.0.0'"
    );
}

#[test]
fn proxy_propagation_matches_expected_command_line() {
    let vars = vec![
        EnvAssignment::new("HTTP_PROXY", "10.0.0.1:8000"),
        EnvAssignment::new("HTTPS_PROXY", "10.0.0.1:8001"),
        EnvAssignment::new("NO_PROXY", "foo.com, localhost, 127.0.0.0"),
    ];
    let ordered = ordered_proxy_vars(&vars);
    let argv = build_invocation(&ordered, "/mock/local_test_runner", &[]);
    let rendered = render_invocation(&argv);
    assert_eq!(
        rendered,
        "exec env HTTP_PROXY=10.0.0.1:8000 HTTPS_PROXY=10.0.0.1:8001 \
         'NO_PROXY=foo.com, localhost, 127.0.0.0' /mock/local_test_runner"
    );
}

#[test]
fn build_invocation_without_proxy_vars_is_plain_exec_env() {
    let argv = build_invocation(&[], "/mock/local_test_runner", &[]);
    assert_eq!(render_invocation(&argv), "exec env /mock/local_test_runner");
}
