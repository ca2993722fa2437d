/// Join words into a typing prompt: single spaces, capitalized first letter,
/// trailing period.
pub fn format_sentence<S: AsRef<str>>(words: &[S]) -> String {
    if words.is_empty() {
        return String::new();
    }

    let joined = words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<&str>>()
        .join(" ");

    let mut text = capitalize_first_letter(&joined);
    text.push('.');
    text
}

pub fn capitalize_first_letter(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => first.to_uppercase().chain(chars).collect(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sentence() {
        assert_eq!(
            format_sentence(&["time", "person", "year"]),
            "Time person year."
        );
    }

    #[test]
    fn test_format_single_word() {
        assert_eq!(format_sentence(&["hello".to_string()]), "Hello.");
    }

    #[test]
    fn test_format_empty() {
        let words: [&str; 0] = [];
        assert_eq!(format_sentence(&words), "");
    }

    #[test]
    fn test_capitalize_first_letter() {
        assert_eq!(capitalize_first_letter("hello"), "Hello");
        assert_eq!(capitalize_first_letter("WORLD"), "WORLD");
        assert_eq!(capitalize_first_letter("test123"), "Test123");
        assert_eq!(capitalize_first_letter(""), "");
        assert_eq!(capitalize_first_letter("123abc"), "123abc");
    }

    #[test]
    fn test_capitalize_keeps_pronoun() {
        assert_eq!(format_sentence(&["I", "know"]), "I know.");
    }
}
