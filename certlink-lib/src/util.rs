//! Shared formatting utilities.

/// Marker appended to values cut by [`truncate_with_marker`].
pub(crate) const TRUNCATION_MARKER: &str = "... (truncated)";

/// Format bytes as colon-separated uppercase hex (e.g., "AB:CD:EF").
pub fn hex_colon_upper(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Keep at most `limit` characters of `value`, appending [`TRUNCATION_MARKER`]
/// when anything was cut.
pub fn truncate_with_marker(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((byte_pos, _)) => {
            let kept = value.get(..byte_pos).unwrap_or(value);
            format!("{}{}", kept, TRUNCATION_MARKER)
        }
        None => value.to_string(),
    }
}

/// Number of significant bits in a big-endian unsigned integer.
pub fn significant_bits(be_bytes: &[u8]) -> u32 {
    let Some(pos) = be_bytes.iter().position(|&b| b != 0) else {
        return 0;
    };
    let rest = be_bytes.get(pos..).unwrap_or_default();
    match rest.first() {
        Some(&lead) => (rest.len() as u32) * 8 - lead.leading_zeros(),
        None => 0,
    }
}
