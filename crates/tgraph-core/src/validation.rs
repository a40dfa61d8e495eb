//! String/control-character bounds and CID shape checks (spec §2 component 2).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CoreError;

// CIDv0: "Qm" followed by 44 base58btc characters (total 46).
static CIDV0_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Qm[1-9A-HJ-NP-Za-km-z]{44}$").unwrap());

// CIDv1 (textual, base32 lower multibase prefix "b"): 'b' + at least 58
// lowercase base32 characters.
static CIDV1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^b[a-z2-7]{58,}$").unwrap());

/// Validate that `cid` is a syntactically well-formed CIDv0 or CIDv1.
pub fn validate_cid(cid: &str) -> Result<(), CoreError> {
    if CIDV0_RE.is_match(cid) || CIDV1_RE.is_match(cid) {
        Ok(())
    } else {
        Err(CoreError::MalformedCid(cid.to_string()))
    }
}

/// Validate a free-text string: bounded length, no control characters other
/// than tab/newline/CR.
pub fn validate_bounded_string(s: &str, max_len: usize) -> Result<(), CoreError> {
    if s.len() > max_len {
        return Err(CoreError::StringTooLong {
            max: max_len,
            got: s.len(),
        });
    }
    if s.chars().any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r')) {
        return Err(CoreError::DisallowedControlChar);
    }
    Ok(())
}

/// DNS-style trust-domain name: non-empty, dot-separated labels, bounded
/// length. Does not enforce per-label charset beyond the general
/// control-character bound — trust domains in this system are operator
/// chosen, not externally resolved DNS names.
pub fn validate_domain_name(name: &str) -> Result<(), CoreError> {
    validate_bounded_string(name, crate::constants::MAX_DOMAIN_NAME_LEN)?;
    if name.is_empty() || name.split('.').any(|label| label.is_empty()) {
        return Err(CoreError::MalformedQuid(format!("invalid domain name: {name}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidv0_accepts_valid() {
        assert!(validate_cid("QmSnuWmxptJZdLJpKRarxBMS2Ju2oANVrgbr2xWbie9b2D").is_ok());
    }

    #[test]
    fn cidv0_rejects_uppercase_body() {
        // 'O' and 'I' are not in the base58btc alphabet; uppercase generally rejected.
        assert!(validate_cid("QMSNUWMXPTJZDLJPKRARXBMS2JU2OANVRGBR2XWBIE9B2D").is_err());
    }

    #[test]
    fn cidv1_accepts_valid() {
        let cid = format!("b{}", "a".repeat(58));
        assert!(validate_cid(&cid).is_ok());
    }

    #[test]
    fn cidv1_rejects_short() {
        let cid = format!("b{}", "a".repeat(40));
        assert!(validate_cid(&cid).is_err());
    }

    #[test]
    fn cidv1_rejects_uppercase() {
        let cid = format!("b{}", "A".repeat(58));
        assert!(validate_cid(&cid).is_err());
    }

    #[test]
    fn bounded_string_rejects_control_chars() {
        assert!(validate_bounded_string("hello\u{0007}world", 100).is_err());
    }

    #[test]
    fn bounded_string_allows_tab_newline_cr() {
        assert!(validate_bounded_string("hello\tworld\n\r", 100).is_ok());
    }
}
