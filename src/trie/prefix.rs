//! Shared-prefix helpers

/// Find the length of the common prefix between two byte slices
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// The longest shared leading bytes of `a` and `b`, borrowed from `a`
pub fn common_prefix<'a>(a: &'a [u8], b: &[u8]) -> &'a [u8] {
    &a[..common_prefix_len(a, b)]
}
