/// Derive a URL-safe slug from a display string.
///
/// Lower-cases the input, drops everything outside `[a-z0-9]`, whitespace
/// and `-`, turns whitespace runs and repeated hyphens into a single `-` and
/// trims hyphens from both ends. The result may be empty.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Feria de Emprendedores 2025"), "feria-de-emprendedores-2025");
    }

    #[test]
    fn strips_disallowed_characters() {
        assert_eq!(slugify("Q&A: What's new?"), "qa-whats-new");
        assert_eq!(slugify("Año Nuevo"), "ao-nuevo");
    }

    #[test]
    fn collapses_whitespace_and_hyphen_runs() {
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("a---b\t\nc"), "a-b-c");
    }

    #[test]
    fn trims_edge_hyphens() {
        assert_eq!(slugify("  -launch day-  "), "launch-day");
    }

    #[test]
    fn punctuation_only_yields_empty() {
        assert_eq!(slugify("!!! ??? ..."), "");
        assert_eq!(slugify(""), "");
    }
}
