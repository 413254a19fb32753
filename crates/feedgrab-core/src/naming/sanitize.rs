//! Filesystem-safe path components.

/// Sanitizes one path component (profile token, folder, or file name).
///
/// - Replaces NUL, `/`, `\`, `<>:"|?*`, whitespace and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots, spaces and underscores
/// - Limits length to 255 bytes (NAME_MAX)
pub fn sanitize_component(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = c == '\0'
            || c == '/'
            || c == '\\'
            || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*')
            || c.is_whitespace()
            || c.is_control();
        let replacement = if unsafe_char { '_' } else { c };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators_and_reserved() {
        assert_eq!(sanitize_component("a/b\\c:d?.jpg"), "a_b_c_d_.jpg");
    }

    #[test]
    fn trims_dots_spaces_underscores() {
        assert_eq!(sanitize_component("  ..__name__.. "), "name");
        assert_eq!(sanitize_component(".."), "");
    }

    #[test]
    fn collapses_underscores() {
        assert_eq!(sanitize_component("x___y  z"), "x_y_z");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_component(&long);
        assert!(out.len() <= 255);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
