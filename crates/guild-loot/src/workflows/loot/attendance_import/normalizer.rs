pub(crate) fn normalize_identifier(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

/// Officer exports mark flags with a mix of words and ticks. Blank means false.
pub(crate) fn parse_flag(value: Option<&str>) -> Option<bool> {
    let Some(value) = value else {
        return Some(false);
    };
    match normalize_identifier(value).to_ascii_lowercase().as_str() {
        "" | "no" | "n" | "false" | "0" => Some(false),
        "yes" | "y" | "true" | "1" | "x" => Some(true),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_identifier(value)
}
