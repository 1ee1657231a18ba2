//! Prompt template substitution.
//!
//! Templates carry bracketed placeholders such as `{question}` or `{source}`.
//! Substitution is literal text replacement in a single pass; placeholders
//! without a value are left untouched.

/// Replace each `{key}` in `template` with its value.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            break;
        };
        let key = &tail[1..close];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                // not a known placeholder, keep the brace and move on
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
