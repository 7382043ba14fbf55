use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

lazy_static! {
    /// Regex for Philippine mobile numbers
    /// Optional `+63` or `0` prefix, then `9` and nine more digits
    /// - Valid: "09171234567", "+639171234567", "9171234567"
    /// - Invalid: "0917123456", "08171234567", "+63 917 123 4567"
    pub static ref PH_MOBILE_REGEX: Regex = Regex::new(r"^(?:\+63|0)?9\d{9}$").unwrap();
}

/// Rejects empty or whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Flattens validation errors into `"<field>: <message>"` lines.
///
/// Field names are reported in camelCase to match the request payloads.
/// Struct-level errors are reported under their error code.
pub fn field_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages.sort();
    messages
}

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let name = if *field == "__all__" {
                        error.code.to_string()
                    } else {
                        to_camel_case(field)
                    };
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", name));
                    out.push(format!("{}: {}", name, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_messages(nested, out);
                }
            }
        }
    }
}

fn to_camel_case(field: &str) -> String {
    let mut result = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ph_mobile_regex_valid() {
        assert!(PH_MOBILE_REGEX.is_match("09171234567"));
        assert!(PH_MOBILE_REGEX.is_match("+639171234567"));
        assert!(PH_MOBILE_REGEX.is_match("9171234567"));
    }

    #[test]
    fn test_ph_mobile_regex_invalid() {
        assert!(!PH_MOBILE_REGEX.is_match("0917123456")); // too short
        assert!(!PH_MOBILE_REGEX.is_match("091712345678")); // too long
        assert!(!PH_MOBILE_REGEX.is_match("08171234567")); // not a mobile prefix
        assert!(!PH_MOBILE_REGEX.is_match("+63 917 123 4567")); // spaces
        assert!(!PH_MOBILE_REGEX.is_match("(032) 255-0046")); // landline
        assert!(!PH_MOBILE_REGEX.is_match(""));
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Maria").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("contact_number"), "contactNumber");
        assert_eq!(to_camel_case("title"), "title");
    }
}
