//! Parsing of structured model replies.
//!
//! Reviewers answer with `score: <n> review: <text>` and formatted specialists
//! with `<gate>: <bool> <body>: <text>`. A reply that does not carry both keys
//! in order is a format failure and maps to a sentinel, never to an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AnswerFormat;
use crate::types::ReviewResult;

static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid blank-line pattern"));

/// Split `input` on `key0:` and a following `key1:`.
///
/// Returns the trimmed text between the markers and the trimmed text after
/// the second marker, or `None` if either marker is missing or `key1:` only
/// occurs before `key0:`.
pub fn parse_key_value(input: &str, key0: &str, key1: &str) -> Option<(String, String)> {
    let marker0 = format!("{key0}:");
    let marker1 = format!("{key1}:");

    let start0 = input.find(&marker0)? + marker0.len();
    let offset1 = input[start0..].find(&marker1)?;
    let end0 = start0 + offset1;
    let start1 = end0 + marker1.len();

    Some((
        input[start0..end0].trim().to_string(),
        input[start1..].trim().to_string(),
    ))
}

/// Collapse runs of blank lines into a single newline and strip leading and
/// trailing newlines.
pub fn compact_empty_lines(input: &str) -> String {
    BLANK_LINE_RUN
        .replace_all(input, "\n")
        .trim_matches('\n')
        .to_string()
}

/// Parse a reviewer reply into a [`ReviewResult`].
///
/// A non-numeric score parses as 0. A reply missing either marker yields the
/// zero value.
pub fn parse_review(reply: &str) -> ReviewResult {
    match parse_key_value(reply, "score", "review") {
        Some((score, critique)) => ReviewResult {
            score: score.parse().unwrap_or(0),
            critique: compact_empty_lines(&critique),
        },
        None => ReviewResult::default(),
    }
}

/// Apply an optional answer format to a raw specialist reply.
pub fn apply_answer_format(format: Option<&AnswerFormat>, reply: &str) -> String {
    let Some(format) = format else {
        return reply.to_string();
    };
    match parse_key_value(reply, &format.gate_key, &format.body_key) {
        Some((gate, body)) if gate == "true" => compact_empty_lines(&body),
        _ => format.not_applicable.clone(),
    }
}
