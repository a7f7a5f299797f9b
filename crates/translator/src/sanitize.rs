//! Identifier sanitization shared by every strategy (spec §4.1 "Base
//! utilities"): lowercase, non-alphanumeric runs collapse to a single `_`,
//! a leading digit gets a `_` prefix, length is capped at 50, and an empty
//! result falls back to a generated `unnamed_*` name.

const MAX_LEN: usize = 50;

/// Pure, idempotent sanitization: `sanitize(sanitize(x)) == sanitize(x)`
/// for all `x` (testable property 2). Empty or fully-non-alphanumeric
/// input collapses to the fixed name `unnamed` so that repeated
/// application never changes the output; callers that need distinct
/// fallback names for multiple empty inputs within one run should use
/// [`Sanitizer`] instead.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_LEN));
    let mut last_was_underscore = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
        if out.len() >= MAX_LEN {
            break;
        }
    }

    let trimmed = out.trim_matches('_');
    let mut result = if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    };

    if result
        .chars()
        .next()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
    {
        result.insert(0, '_');
    }

    result.truncate(MAX_LEN);
    result
}

/// Stateful sanitizer that disambiguates successive empty/placeholder
/// names (`unnamed_1`, `unnamed_2`, ...) within a single translation run,
/// matching spec §4.1's `unnamed_*` wildcard without breaking the pure
/// function's idempotency.
#[derive(Debug, Default)]
pub struct Sanitizer {
    unnamed_seq: u32,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sanitize(&mut self, input: &str) -> String {
        let base = sanitize(input);
        if base == "unnamed" {
            self.unnamed_seq += 1;
            format!("unnamed_{}", self.unnamed_seq)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_replaces_non_alphanumeric() {
        assert_eq!(sanitize("My Table-Name!"), "my_table_name");
    }

    #[test]
    fn leading_digit_gets_prefixed() {
        assert_eq!(sanitize("123abc"), "_123abc");
    }

    #[test]
    fn empty_input_falls_back_to_unnamed() {
        assert_eq!(sanitize(""), "unnamed");
        assert_eq!(sanitize("---"), "unnamed");
    }

    #[test]
    fn truncates_to_max_len() {
        let long = "a".repeat(100);
        assert_eq!(sanitize(&long).len(), MAX_LEN);
    }

    #[test]
    fn is_idempotent_for_arbitrary_strings() {
        let inputs = [
            "",
            "already_sane",
            "Mixed CASE-with.punct",
            "123_leading_digit",
            "😀 emoji table",
            &"x".repeat(200),
        ];
        for input in inputs {
            let once = sanitize(input);
            let twice = sanitize(&once);
            assert_eq!(once, twice, "sanitize not idempotent for {input:?}");
        }
    }

    #[test]
    fn sanitizer_disambiguates_successive_unnamed() {
        let mut s = Sanitizer::new();
        assert_eq!(s.sanitize(""), "unnamed_1");
        assert_eq!(s.sanitize(""), "unnamed_2");
        assert_eq!(s.sanitize("real_name"), "real_name");
    }
}
