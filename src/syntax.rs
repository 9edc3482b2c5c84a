use once_cell::sync::Lazy;
use regex::Regex;

use crate::token::{PendingStack, Token};

/// First character of every canonical placeholder. Tokens that already start
/// with it are treated as canonical and skipped by detection.
pub const PLACEHOLDER_MARK: char = '%';

static RE_POSINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").unwrap());

// Two-digit hour, 00-23. Single-digit hours belong to duration.
static RE_TIME_24HR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d:[0-5]\d").unwrap());

// Elapsed time: hours are unbounded and may be a single digit.
static RE_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+:[0-5]\d:[0-5]\d").unwrap());

static RE_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)")
        .unwrap()
});

// Spans embedded whitespace, so it must run on the raw line. Example:
// "Oct 11 22:14:15" (day may be space-padded).
static RE_RFC3164_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec) {1,2}\d{1,2} \d{2}:\d{2}:\d{2}")
        .unwrap()
});

// ISO8601 timestamp with timezone, e.g. "2015-10-11T22:14:15.003Z".
static RE_RFC5424_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d{1,6})?(?:Z|[+-]\d{2}:\d{2})")
        .unwrap()
});

/// Number of bytes of `s` matched by the positive-integer recognizer.
pub fn match_posint(s: &str) -> Option<usize> {
    RE_POSINT.find(s).map(|m| m.end())
}

pub fn match_time_24hr(s: &str) -> Option<usize> {
    RE_TIME_24HR.find(s).map(|m| m.end())
}

pub fn match_duration(s: &str) -> Option<usize> {
    RE_DURATION.find(s).map(|m| m.end())
}

pub fn match_ipv4(s: &str) -> Option<usize> {
    RE_IPV4.find(s).map(|m| m.end())
}

pub fn match_rfc3164_date(s: &str) -> Option<usize> {
    RE_RFC3164_DATE.find(s).map(|m| m.end())
}

pub fn match_rfc5424_date(s: &str) -> Option<usize> {
    RE_RFC5424_DATE.find(s).map(|m| m.end())
}

/// Run the single-token recognizers over `token` and rewrite it to a
/// canonical placeholder on a full-span match.
///
/// Order matters: duration must be tried after 24-hour time, as its grammar
/// would otherwise take every time-of-day. When `pending` is given, the
/// stacked IPv4 `/mask` decomposition is enabled and the mask tokens are
/// pushed so they dequeue as `/` then `%posint%`. The refiner re-detects
/// residual values with `pending = None`.
pub fn detect(token: &mut Token, pending: Option<&mut PendingStack>) {
    let len = token.text.len();
    if match_posint(&token.text) == Some(len) {
        token.make_special("%posint%");
        return;
    }
    if match_time_24hr(&token.text) == Some(len) {
        token.make_special("%time-24hr%");
        return;
    }
    if match_duration(&token.text) == Some(len) {
        token.make_special("%duration%");
        return;
    }
    if let Some(nproc) = match_ipv4(&token.text) {
        if nproc == len {
            token.make_special("%ipv4%");
            return;
        }
        let Some(stack) = pending else { return };
        let Some(mask) = token.text[nproc..].strip_prefix('/') else {
            return;
        };
        if match_posint(mask) == Some(mask.len()) {
            token.make_special("%ipv4%");
            token.subword = true;

            let mut wi = Token::new("%posint%".to_string());
            wi.special = true;
            wi.subword = true;
            stack.push(wi);

            let mut wi = Token::new("/".to_string());
            wi.subword = true;
            stack.push(wi);
        }
    }
}

/// Replace multi-word date spans in a raw line with their placeholders.
///
/// Only syntaxes that spawn multiple words are handled here; everything else
/// is safer to detect per token after whitespace splitting.
pub fn preprocess_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < line.len() {
        let rest = &line[i..];
        if let Some(nproc) = match_rfc3164_date(rest) {
            out.push_str("%date-rfc3164%");
            i += nproc;
            continue;
        }
        if let Some(nproc) = match_rfc5424_date(rest) {
            out.push_str("%date-rfc5424%");
            i += nproc;
            continue;
        }
        match rest.chars().next() {
            Some(c) => {
                out.push(c);
                i += c.len_utf8();
            }
            None => break,
        }
    }
    out
}
