use logstencil::syntax;
use logstencil::token::{PendingStack, Token};

fn tok(s: &str) -> Token {
    Token::new(s.to_string())
}

#[test]
fn posint_reports_consumed_digits() {
    assert_eq!(syntax::match_posint("12345"), Some(5));
    assert_eq!(syntax::match_posint("12ab"), Some(2));
    assert_eq!(syntax::match_posint("abc"), None);
}

#[test]
fn time_24hr_requires_two_digit_hour() {
    assert_eq!(syntax::match_time_24hr("22:14:15"), Some(8));
    assert_eq!(syntax::match_time_24hr("09:00:00"), Some(8));
    assert_eq!(syntax::match_time_24hr("9:14:15"), None);
    assert_eq!(syntax::match_time_24hr("24:00:00"), None);
}

#[test]
fn duration_accepts_single_digit_and_long_hours() {
    assert_eq!(syntax::match_duration("9:14:15"), Some(7));
    assert_eq!(syntax::match_duration("123:59:59"), Some(9));
    assert_eq!(syntax::match_duration("12:61:00"), None);
}

#[test]
fn ipv4_matches_full_and_proper_prefix() {
    assert_eq!(syntax::match_ipv4("10.0.0.1"), Some(8));
    assert_eq!(syntax::match_ipv4("10.0.0.1/24"), Some(8));
    assert_eq!(syntax::match_ipv4("999.0.0.1"), None);
    assert_eq!(syntax::match_ipv4("hostname"), None);
}

#[test]
fn detect_replaces_only_full_span_matches() {
    let mut t = tok("443");
    syntax::detect(&mut t, None);
    assert_eq!(t.text, "%posint%");
    assert!(t.special);

    let mut t = tok("443x");
    syntax::detect(&mut t, None);
    assert_eq!(t.text, "443x");
    assert!(!t.special);
}

#[test]
fn detect_tries_time_before_duration() {
    let mut t = tok("22:14:15");
    syntax::detect(&mut t, None);
    assert_eq!(t.text, "%time-24hr%");

    let mut t = tok("9:14:15");
    syntax::detect(&mut t, None);
    assert_eq!(t.text, "%duration%");
}

#[test]
fn detect_is_idempotent_on_placeholders() {
    let mut t = tok("%posint%");
    syntax::detect(&mut t, None);
    assert_eq!(t.text, "%posint%");
    syntax::detect(&mut t, None);
    assert_eq!(t.text, "%posint%");
}

#[test]
fn stacked_ipv4_mask_pushes_mask_tokens() {
    let mut stack = PendingStack::default();
    let mut t = tok("10.0.0.1/24");
    syntax::detect(&mut t, Some(&mut stack));
    assert_eq!(t.text, "%ipv4%");
    assert!(t.special);
    assert!(t.subword);

    // LIFO: the slash dequeues first, then the mask placeholder
    let slash = stack.pop().expect("slash token");
    assert_eq!(slash.text, "/");
    assert!(slash.subword);
    let mask = stack.pop().expect("mask token");
    assert_eq!(mask.text, "%posint%");
    assert!(mask.special);
    assert!(stack.pop().is_none());
}

#[test]
fn stacked_path_disabled_without_pending_stack() {
    let mut t = tok("10.0.0.1/24");
    syntax::detect(&mut t, None);
    assert_eq!(t.text, "10.0.0.1/24");
    assert!(!t.special);
}

#[test]
fn stacked_path_rejects_non_integer_mask() {
    let mut stack = PendingStack::default();
    let mut t = tok("10.0.0.1/abc");
    syntax::detect(&mut t, Some(&mut stack));
    assert_eq!(t.text, "10.0.0.1/abc");
    assert!(stack.pop().is_none());
}

#[test]
fn preprocess_rewrites_rfc3164_date_across_spaces() {
    let out = syntax::preprocess_line("Oct 11 22:14:15 web01 sshd closed");
    assert_eq!(out, "%date-rfc3164% web01 sshd closed");
}

#[test]
fn preprocess_rewrites_rfc5424_date() {
    let out = syntax::preprocess_line("2015-10-11T22:14:15.003Z web01 up");
    assert_eq!(out, "%date-rfc5424% web01 up");
}

#[test]
fn preprocess_leaves_plain_text_untouched() {
    let line = "connection from host closed at 22:14:15";
    assert_eq!(syntax::preprocess_line(line), line);
}
