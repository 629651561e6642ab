/// Deterministic id synthesis for source records that lack a usable
/// integer primary key (notes, tag-derived groups, generated families).
///
/// The id must be a pure function of identity-defining content so that
/// repeated exports of the same source data produce the same destination
/// key, which is what lets the destination system upsert instead of
/// duplicating on re-import.
///
/// Algorithm: MD5 over the parts concatenated in caller order with no
/// delimiter, digest bytes 0..4 read as a little-endian i32, absolute
/// value. A zero result means no id is assigned — the caller leaves the
/// key unset rather than retrying with a salt.
pub fn synthesize_id<I, S>(parts: I) -> Option<i64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for part in parts {
        joined.push_str(part.as_ref());
    }
    let digest = md5::compute(joined.as_bytes());
    let prefix = [digest.0[0], digest.0[1], digest.0[2], digest.0[3]];
    // Widen before abs: |i32::MIN| does not fit in i32.
    let id = i64::from(i32::from_le_bytes(prefix)).abs();
    if id == 0 {
        None
    } else {
        Some(id)
    }
}
