//! Statsd gauge lines.
//!
//! A gauge line is `<KEY>:<VALUE>|g\n` where `VALUE` is an unsigned 64-bit
//! integer in base 10. Encoding appends to a caller owned buffer and never
//! allocates when that buffer already has room, see [`max_encoded_len`].

/// Type suffix and line terminator of a gauge line.
const SUFFIX: &[u8] = b"|g\n";
/// Digits in `u64::MAX`.
const MAX_DIGITS: usize = 20;

/// Append the gauge line for `key` and `value` to `buf`, returning the whole
/// of `buf`.
///
/// Callers typically `clear` the buffer first so the returned slice is
/// exactly one line.
#[inline]
pub fn encode<'a>(buf: &'a mut Vec<u8>, key: &str, value: u64) -> &'a [u8] {
    buf.extend_from_slice(key.as_bytes());
    buf.push(b':');
    push_decimal(buf, value);
    buf.extend_from_slice(SUFFIX);
    buf.as_slice()
}

/// The longest line [`encode`] can produce for `key`.
#[must_use]
pub fn max_encoded_len(key: &str) -> usize {
    key.len() + 1 + MAX_DIGITS + SUFFIX.len()
}

#[inline]
fn push_decimal(buf: &mut Vec<u8>, mut value: u64) {
    let mut digits = [0_u8; MAX_DIGITS];
    let mut pos = MAX_DIGITS;
    loop {
        pos -= 1;
        // value % 10 is always a single digit
        #[allow(clippy::cast_possible_truncation)]
        let digit = (value % 10) as u8;
        digits[pos] = b'0' + digit;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[pos..]);
}
