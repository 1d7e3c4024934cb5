//! Contact details derived from free text and display names.

use std::sync::OnceLock;

use regex::Regex;

fn email_re() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
    })
}

/// First email-shaped substring of `text`, or an empty string.
///
/// This is a pattern match only; nothing is verified.
pub fn email_in(text: &str) -> String {
    email_re()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Split a display name on its first space.
///
/// `"Maria Clara Souza"` becomes `("Maria", "Clara Souza")`. A single word
/// yields an empty last name.
pub fn split_name(name: &str) -> (String, String) {
    let name = name.trim();
    match name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// Derived `(first_name, last_name)` for an optional author name.
pub fn names_for(name: Option<&str>) -> (Option<String>, Option<String>) {
    match name {
        Some(name) => {
            let (first, last) = split_name(name);
            (Some(first), Some(last))
        }
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_found_in_sentence() {
        assert_eq!(
            email_in("contact me at a.b+c@example.co.uk please"),
            "a.b+c@example.co.uk"
        );
    }

    #[test]
    fn test_email_absent() {
        assert_eq!(email_in("no email here"), "");
        assert_eq!(email_in(""), "");
    }

    #[test]
    fn test_first_email_wins() {
        assert_eq!(email_in("x@one.com or y@two.org"), "x@one.com");
    }

    #[test]
    fn test_split_on_first_space() {
        let (first, last) = split_name("Maria Clara Souza");
        assert_eq!(first, "Maria");
        assert_eq!(last, "Clara Souza");
    }

    #[test]
    fn test_single_word_name() {
        let (first, last) = split_name("Cher");
        assert_eq!(first, "Cher");
        assert_eq!(last, "");
    }

    #[test]
    fn test_names_for_missing_author() {
        assert_eq!(names_for(None), (None, None));
        assert_eq!(
            names_for(Some("Jo Silva")),
            (Some("Jo".into()), Some("Silva".into()))
        );
    }
}
