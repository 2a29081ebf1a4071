/// Canonical ticker form: trimmed and upper-cased.
///
/// Returns `None` for input that is empty after trimming.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_folds_and_trims() {
        assert_eq!(normalize_symbol("  aapl ").as_deref(), Some("AAPL"));
        assert_eq!(normalize_symbol("Btc-usd").as_deref(), Some("BTC-USD"));
        assert_eq!(normalize_symbol("   "), None);
    }
}
