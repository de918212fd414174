/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The checksum is the sum of every byte before the `10=` field, SOH
//! delimiters included, modulo 256, rendered as exactly three digits.

/// Calculates the checksum of a complete byte run.
///
/// # Example
/// ```
/// use ferrofix_tagvalue::calculate_checksum;
///
/// let data = b"8=FIX.4.1\x019=90\x0135=0\x0149=INVMGR\x0156=BRKR\x0134=240\x0152=19980604-08:03:31\x01";
/// assert_eq!(calculate_checksum(data), 129);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    let mut running = RunningChecksum::new();
    running.update(data);
    running.value()
}

/// Checksum accumulated field by field while a message streams in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningChecksum {
    sum: u8,
}

impl RunningChecksum {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { sum: 0 }
    }

    /// Adds `data` to the running sum.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.sum = data.iter().fold(self.sum, |acc, &b| acc.wrapping_add(b));
    }

    /// Adds one byte to the running sum.
    #[inline]
    pub fn update_byte(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    /// Current value, sum modulo 256.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.sum
    }

    #[inline]
    pub fn reset(&mut self) {
        self.sum = 0;
    }
}

/// Formats a checksum value as a 3-digit zero-padded string.
///
/// # Returns
/// A 3-character string representation (e.g., "042", "255").
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    let d0 = b'0' + (checksum / 100);
    let d1 = b'0' + ((checksum / 10) % 10);
    let d2 = b'0' + (checksum % 10);
    [d0, d1, d2]
}

/// Parses a declared checksum.
///
/// Accepts one to three ASCII digits with a value up to 255; senders that
/// drop the zero padding are tolerated on input.
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u8> {
    if bytes.is_empty() || bytes.len() > 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = bytes
        .iter()
        .fold(0u16, |acc, &b| acc * 10 + u16::from(b - b'0'));
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_checksum_empty() {
        assert_eq!(calculate_checksum(b""), 0);
    }

    #[test]
    fn test_calculate_checksum_wraps() {
        let data = vec![255u8; 1000];
        let expected = ((255u32 * 1000) % 256) as u8;
        assert_eq!(calculate_checksum(&data), expected);
    }

    #[test]
    fn test_running_checksum_matches_whole_buffer() {
        let fields: [&[u8]; 3] = [b"8=FIX.4.2\x01", b"9=65\x01", b"35=A\x01"];
        let mut running = RunningChecksum::new();
        for f in fields {
            running.update(f);
        }
        assert_eq!(running.value(), calculate_checksum(&fields.concat()));
        running.reset();
        assert_eq!(running.value(), 0);
        running.update_byte(0x01);
        assert_eq!(running.value(), 1);
    }

    #[test]
    fn test_format_checksum() {
        assert_eq!(format_checksum(0), *b"000");
        assert_eq!(format_checksum(42), *b"042");
        assert_eq!(format_checksum(100), *b"100");
        assert_eq!(format_checksum(255), *b"255");
    }

    #[test]
    fn test_parse_checksum() {
        assert_eq!(parse_checksum(b"000"), Some(0));
        assert_eq!(parse_checksum(b"062"), Some(62));
        assert_eq!(parse_checksum(b"255"), Some(255));
        assert_eq!(parse_checksum(b"7"), Some(7));
    }

    #[test]
    fn test_parse_checksum_invalid() {
        assert_eq!(parse_checksum(b""), None);
        assert_eq!(parse_checksum(b"0000"), None);
        assert_eq!(parse_checksum(b"256"), None);
        assert_eq!(parse_checksum(b"12X"), None);
        assert_eq!(parse_checksum(b"-1"), None);
    }
}
