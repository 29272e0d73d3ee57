//! Utility functions.

/// Mask a secret for display.
///
/// Every character except the last four is replaced by `*`, so
/// `"123456:ABCDEF"` becomes `"*********CDEF"`.
pub fn mask_token(token: &str) -> String {
    let len = token.chars().count();
    token
        .chars()
        .enumerate()
        .map(|(i, c)| if i + 4 < len { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("123456:ABCDEF"), "*********CDEF");
        assert_eq!(mask_token("abcd"), "abcd");
        assert_eq!(mask_token("ab"), "ab");
        assert_eq!(mask_token(""), "");
    }
}
