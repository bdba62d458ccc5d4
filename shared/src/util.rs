/// Random identifier for ephemeral records (print jobs, order lines)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// First eight characters of an id, as printed on tickets and bills
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("abcdef123456"), "abcdef12");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }
}
