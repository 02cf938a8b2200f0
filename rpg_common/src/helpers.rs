/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Normalise a Korean mobile number to digits only, e.g. `010-1234-5678` -> `01012345678`.
pub fn normalize_phone_number(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}
