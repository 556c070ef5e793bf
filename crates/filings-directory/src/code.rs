//! Corp code normalization.

/// Canonical 8-digit form of a corp code.
///
/// Leading zeros are insignificant: `"126380"`, `"00126380"` and `"000126380"` all
/// normalize to `"00126380"`, so a code exported as a number still matches.
#[must_use]
pub fn normalize_corp_code(code: &str) -> String {
    let significant = code.trim().trim_start_matches('0');
    format!("{significant:0>8}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_corp_code() {
        assert_eq!(normalize_corp_code("00126380"), "00126380");
        assert_eq!(normalize_corp_code("126380"), "00126380");
        assert_eq!(normalize_corp_code("000126380"), "00126380");
        assert_eq!(normalize_corp_code(" 171636 "), "00171636");
        assert_eq!(normalize_corp_code("00000000"), "00000000");
    }
}
