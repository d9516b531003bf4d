/// Canonical form of resume and job-description text before vectorization.
///
/// Case-folding only. Callers must not rely on any further cleanup
/// (punctuation, stop words) happening here.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folds() {
        assert_eq!(normalize("Senior JAVA Developer"), "senior java developer");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_keeps_punctuation_and_whitespace() {
        assert_eq!(normalize("C++, Go;  Rust!\n"), "c++, go;  rust!\n");
    }

    #[test]
    fn test_unicode_case_folding() {
        assert_eq!(normalize("ÉCOLE Straße"), "école straße");
    }
}
