use subtle::ConstantTimeEq;

/// Compares a presented credential with the configured secret.
///
/// Over equal-length inputs every byte is examined and the differences are folded
/// together, so the running time does not depend on where the first mismatch is.
///
/// # Length
///
/// Inputs of different length are rejected without looking at their bytes. This leaks
/// the secret's length to a caller that can measure response times. Token length is not
/// treated as sensitive here; the per-byte check over the compared span is what protects
/// the value.
pub fn constant_time_eq(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();
    if presented.len() != expected.len() {
        return false;
    }
    presented.ct_eq(expected).into()
}
