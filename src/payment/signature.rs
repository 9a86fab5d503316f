use sha2::{Digest, Sha512};

const ORDER_REF_PREFIX: &str = "ORDER-";

/// Lowercase hex SHA-512 of `order_ref + gross_amount + server_key`.
pub fn expected_signature(order_ref: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_ref.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_signature(
    order_ref: &str,
    gross_amount: &str,
    server_key: &str,
    signature: &str,
) -> bool {
    constant_time_eq(&expected_signature(order_ref, gross_amount, server_key), signature)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn format_order_ref(order_id: i64) -> String {
    format!("{ORDER_REF_PREFIX}{order_id}")
}

/// `ORDER-<digits>` to the order id.
pub fn parse_order_ref(order_ref: &str) -> Option<i64> {
    let digits = order_ref.strip_prefix(ORDER_REF_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn signature_test() {
        let sig = expected_signature("ORDER-1", "100000.00", "secret");
        assert_eq!(sig.len(), 128);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(verify_signature("ORDER-1", "100000.00", "secret", &sig));
    }

    #[test]
    fn tampered_signature_test() {
        let sig = expected_signature("ORDER-1", "100000.00", "secret");
        assert!(!verify_signature("ORDER-1", "1.00", "secret", &sig));
        assert!(!verify_signature("ORDER-2", "100000.00", "secret", &sig));
        assert!(!verify_signature("ORDER-1", "100000.00", "other", &sig));
        assert!(!verify_signature(
            "ORDER-1",
            "100000.00",
            "secret",
            &sig.to_uppercase()
        ));
    }

    #[test]
    fn constant_time_eq_test() {
        assert!(constant_time_eq("", ""));
        assert!(constant_time_eq("abc123", "abc123"));
        assert!(!constant_time_eq("abc123", "abc124"));
        assert!(!constant_time_eq("abc123", "abc12"));
        assert!(!constant_time_eq("abc", "ABC"));

        let sig = expected_signature("ORDER-1", "100000.00", "secret");
        assert!(!verify_signature("ORDER-1", "100000.00", "secret", &sig[..127]));
        assert!(!verify_signature("ORDER-1", "100000.00", "secret", ""));
    }

    #[test]
    fn known_digest_test() {
        // sha512("")
        assert_eq!(
            expected_signature("", "", ""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn order_ref_test() {
        assert_eq!(format_order_ref(42), "ORDER-42");
        assert_eq!(parse_order_ref("ORDER-42"), Some(42));
        assert_eq!(parse_order_ref(&format_order_ref(7)), Some(7));
        assert_eq!(parse_order_ref("ORDER-"), None);
        assert_eq!(parse_order_ref("ORDER-4x"), None);
        assert_eq!(parse_order_ref("ORDER--1"), None);
        assert_eq!(parse_order_ref("order-1"), None);
        assert_eq!(parse_order_ref("42"), None);
        assert_eq!(parse_order_ref("ORDER-99999999999999999999"), None);
    }
}
