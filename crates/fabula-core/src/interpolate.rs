//! `${name}` placeholder substitution in section text.

use std::collections::HashMap;

/// Replace every `${key}` occurrence in `text` with its value from
/// `variables`. Unknown keys are left as literal `${key}` text, and a
/// substituted value is never re-scanned. If either input is absent the text
/// comes back unchanged (empty when the text is absent too).
pub fn interpolate(text: Option<&str>, variables: Option<&HashMap<String, String>>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let Some(variables) = variables else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder, keep the tail as-is.
            break;
        };
        out.push_str(&rest[..start]);
        let key = &after[..end];
        match variables.get(key) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str("${");
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
