use regex::Regex;
use std::sync::OnceLock;

static SCRIPT_SCHEME: OnceLock<Regex> = OnceLock::new();
static INLINE_HANDLER: OnceLock<Regex> = OnceLock::new();

fn script_scheme() -> &'static Regex {
    SCRIPT_SCHEME.get_or_init(|| Regex::new(r"(?i)javascript\s*:").expect("static regex"))
}

fn inline_handler() -> &'static Regex {
    INLINE_HANDLER.get_or_init(|| Regex::new(r"(?i)\bon[a-z]+\s*=").expect("static regex"))
}

/// Strips angle brackets, the `javascript:` scheme and inline `on*=` handler
/// patterns before a value is displayed.
///
/// Runs until the value stops changing, so fragments that reassemble after
/// one removal (`javajavascript:script:`) are stripped too. This is a display
/// filter for values that already passed validation, not a validator.
pub fn sanitize(value: &str) -> String {
    let mut current: String = value.chars().filter(|ch| *ch != '<' && *ch != '>').collect();
    loop {
        let stripped = script_scheme().replace_all(&current, "");
        let stripped = inline_handler().replace_all(&stripped, "").into_owned();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}
