//! Fixed-width base62 encoding of numeric uids.

/// Digit alphabet, least significant value first.
const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Minimum width of an encoded short code.
pub const CODE_WIDTH: usize = 7;

/// Encodes `uid` in base62, most significant digit first, left-padded with
/// `'0'` to [`CODE_WIDTH`].
///
/// Values of `62^7` and above produce codes longer than [`CODE_WIDTH`]; they
/// are never truncated, so distinct uids always map to distinct codes.
///
/// ```ignore
/// assert_eq!(encode_fixed(0), "0000000");
/// assert_eq!(encode_fixed(62), "0000010");
/// ```
pub fn encode_fixed(mut uid: u64) -> String {
    let base = ALPHABET.len() as u64;
    let mut digits = Vec::with_capacity(CODE_WIDTH);

    loop {
        digits.push(ALPHABET[(uid % base) as usize]);
        uid /= base;
        if uid == 0 {
            break;
        }
    }

    while digits.len() < CODE_WIDTH {
        digits.push(b'0');
    }

    digits.iter().rev().map(|&b| b as char).collect()
}
