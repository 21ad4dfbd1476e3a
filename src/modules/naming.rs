//! Canonical lowercase projection for name comparisons.

/// Map a display name to the lowercase form used for equality lookups.
///
/// Unicode-aware folding, so non-ASCII letters compare correctly. Total on
/// any input; the empty string maps to the empty string.
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_ascii() {
        assert_eq!(normalize("Bob McTesterson"), "bob mctesterson");
    }

    #[test]
    fn folds_non_ascii_letters() {
        assert_eq!(normalize("ÉMILE ZOLA"), "émile zola");
        assert_eq!(normalize("Đorđe Balašević"), "đorđe balašević");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn is_idempotent() {
        let once = normalize("Robert M. Tester");
        assert_eq!(normalize(&once), once);
    }
}
