//! Escaping of stored long URLs for use as a `Location` header.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except unreserved characters and URL delimiters. `%` is kept so
/// URLs that are already escaped pass through unchanged.
const LOCATION_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b'%')
    .remove(b'#')
    .remove(b'?')
    .remove(b'=')
    .remove(b'@')
    .remove(b'[')
    .remove(b']')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';');

/// Percent-encodes `url` so it is always a valid header value.
///
/// Control characters, spaces and non-ASCII text are escaped; a well-formed
/// URL comes back unchanged.
pub fn encode_location(url: &str) -> String {
    utf8_percent_encode(url, LOCATION_ENCODE_SET).to_string()
}
