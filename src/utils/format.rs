use chrono::{DateTime, Utc};

/// Shorten a public key to `chars` characters on each side, e.g. `GABC…WXYZ`.
pub fn shorten_public_key(key: &str, chars: usize) -> String {
    let count = key.chars().count();
    if chars == 0 || count <= chars * 2 {
        return key.to_string();
    }
    let head: String = key.chars().take(chars).collect();
    let tail: String = key.chars().skip(count - chars).collect();
    format!("{}…{}", head, tail)
}

/// Render a ledger timestamp (seconds since the epoch) as RFC 3339 UTC.
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}
