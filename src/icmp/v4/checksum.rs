//! Internet checksum (RFC 1071).
//!
//! Words are read in native byte order and the result is meant to be written
//! back in native byte order. The one's complement sum is byte-order
//! independent, so the bytes that land on the wire are the same on every host.

/// Checksum stored in a message disagrees with the one computed over it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChecksumMismatch {
    /// Value carried by the message, in wire order.
    pub expected: u16,
    /// Value recomputed over the message, in wire order.
    pub computed: u16,
}

/// Computes the Internet checksum over `bytes`.
///
/// An odd trailing byte is summed as if followed by a zero byte.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u16 {
    let mut chunks = bytes.chunks_exact(2);
    let mut sum: u64 = chunks
        .by_ref()
        .map(|word| u64::from(u16::from_ne_bytes([word[0], word[1]])))
        .sum();
    if let [last] = chunks.remainder() {
        sum += u64::from(u16::from_ne_bytes([*last, 0]));
    }
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    #[allow(clippy::cast_possible_truncation)]
    let folded = sum as u16;
    !folded
}

/// Zeroes the checksum field at `offset`, computes the checksum over the
/// whole buffer and writes it into that field.
pub(crate) fn stamp(message: &mut [u8], offset: usize) {
    message[offset..offset + 2].copy_from_slice(&[0, 0]);
    let value = checksum(message);
    message[offset..offset + 2].copy_from_slice(&value.to_ne_bytes());
}

/// Recomputes the checksum of `message` with the field at `offset` zeroed and
/// compares it to the stored value. `message` is left untouched.
///
/// A message too short to hold the field at `offset` never verifies; the
/// missing bytes are reported as zero.
pub fn verify(message: &[u8], offset: usize) -> Result<(), ChecksumMismatch> {
    let Some(&[high, low]) = offset.checked_add(2).and_then(|end| message.get(offset..end)) else {
        return Err(ChecksumMismatch {
            expected: 0,
            computed: u16::from_be_bytes(checksum(message).to_ne_bytes()),
        });
    };
    let field = [high, low];
    let mut zeroed = message.to_vec();
    zeroed[offset..offset + 2].copy_from_slice(&[0, 0]);
    let computed = checksum(&zeroed).to_ne_bytes();
    if computed == field {
        Ok(())
    } else {
        Err(ChecksumMismatch {
            expected: u16::from_be_bytes(field),
            computed: u16::from_be_bytes(computed),
        })
    }
}
