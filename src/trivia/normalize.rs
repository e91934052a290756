/// Reduces an answer to the form used for comparison.
///
/// Lowercases the text and keeps only alphanumeric characters, so spacing,
/// punctuation and case never decide a round. Words are not stripped and
/// nothing fuzzy happens: "the paris" and "paris" stay different answers.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn folds_case_and_strips_whitespace() {
        assert_eq!(normalize("  Paris "), "paris");
        assert_eq!(normalize("New\tYork\nCity"), "newyorkcity");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(normalize("Rock 'n' Roll!"), "rocknroll");
        assert_eq!(normalize("3.14"), "314");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(normalize("Ünïcödé Straße"), "ünïcödéstraße");
    }

    #[test]
    fn keeps_filler_words() {
        assert_eq!(normalize("The Beatles"), "thebeatles");
        assert_ne!(normalize("the Paris"), normalize("Paris"));
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(normalize(" \t\n"), "");
        assert_eq!(normalize("?!..."), "");
    }

    proptest! {
        #[test]
        fn idempotent(text in "[a-zA-Z0-9 .,!?'éÉüÜß\t-]{0,40}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn output_has_no_whitespace_or_uppercase(text in "[a-zA-Z0-9 .,!?'\t-]{0,40}") {
            let out = normalize(&text);
            prop_assert!(!out.chars().any(|c| c.is_whitespace() || c.is_uppercase()));
        }
    }
}
