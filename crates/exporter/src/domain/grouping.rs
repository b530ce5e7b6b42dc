//! Index family derivation for date-rotated indices.

/// Strips the date-qualified tail of `index` to recover its family.
///
/// The tail starts at the last occurrence of `date_token`, so rollover
/// counters after the date (`logs-2024.05.01-000002`) go with it. Names that
/// do not carry the token are returned as-is, as are names that would be left
/// empty.
pub fn group_key(index: &str, date_token: &str) -> String {
    if date_token.is_empty() {
        return index.to_string();
    }

    match index.rfind(date_token) {
        Some(0) | None => index.to_string(),
        Some(pos) => index[..pos].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn strips_date_suffix() {
        assert_eq!(group_key("my-index-2024.05.01", "2024.05.01"), "my-index-");
    }

    #[test]
    fn name_without_token_is_unchanged() {
        assert_eq!(group_key("my-index", "2024.05.01"), "my-index");
        assert_eq!(group_key("my-index-2024.04.30", "2024.05.01"), "my-index-2024.04.30");
    }

    #[test]
    fn strips_rollover_counter_after_date() {
        assert_eq!(group_key("logs-2024.05.01-000002", "2024.05.01"), "logs-");
    }

    #[test]
    fn uses_last_occurrence_of_token() {
        assert_eq!(
            group_key("2024.05.01-archive-2024.05.01", "2024.05.01"),
            "2024.05.01-archive-"
        );
    }

    #[test]
    fn degenerate_inputs_keep_the_name() {
        assert_eq!(group_key("2024.05.01", "2024.05.01"), "2024.05.01");
        assert_eq!(group_key("my-index", ""), "my-index");
        assert_eq!(group_key("", "2024.05.01"), "");
    }
}
