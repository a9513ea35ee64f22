use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value as Json};

lazy_static! {
    static ref CONTEXT_VARIABLE: Regex = Regex::new(r"\$context\.[a-zA-Z\.]+").unwrap();
}

/// Replaces every `$context.*` placeholder with a scalar so the format can be
/// decoded without knowing the access log grammar.
pub fn substitute_placeholders(format: &str) -> String {
    CONTEXT_VARIABLE.replace_all(format, "4").into_owned()
}

/// True when the access log format is a JSON object once placeholders are filled in.
pub fn is_json_log_format(format: &str) -> bool {
    serde_json::from_str::<Map<String, Json>>(&substitute_placeholders(format)).is_ok()
}
