//! RFC 1071 Internet checksum.

/// Compute the 16-bit ones-complement checksum of `data`.
///
/// The buffer is summed as big-endian 16-bit words. An odd trailing byte
/// is summed as if followed by a zero byte.
pub fn checksum(data: &[u8]) -> u16 {
    let mut chunks = data.chunks_exact(2);
    let mut sum: u32 = 0;

    // Folding after every add keeps the sum below 0x1FFFF
    for word in chunks.by_ref() {
        sum += u16::from_be_bytes([word[0], word[1]]) as u32;
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    if let [last] = chunks.remainder() {
        sum += u16::from_be_bytes([*last, 0]) as u32;
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !sum as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ipv4_header() {
        // Classic example header with the checksum field zeroed
        let header = [
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ];
        assert_eq!(checksum(&header), 0xb861);
    }

    #[test]
    fn test_inserted_checksum_verifies_to_zero() {
        // (length, checksum field offset, fill seed)
        let cases = [
            (2, 0, 0x00u8),
            (8, 2, 0x09),
            (8, 6, 0xff),
            (20, 10, 0x45),
            (28, 14, 0xa5),
            (64, 30, 0x80),
            (1500, 0, 0x3c),
        ];

        for (len, offset, seed) in cases {
            let mut buf: Vec<u8> = (0..len)
                .map(|i| seed.wrapping_mul(31).wrapping_add(i as u8))
                .collect();
            buf[offset..offset + 2].fill(0);
            let sum = checksum(&buf);
            buf[offset..offset + 2].copy_from_slice(&sum.to_be_bytes());
            assert_eq!(checksum(&buf), 0, "len {} offset {}", len, offset);
        }
    }

    #[test]
    fn test_large_buffer_folds_without_overflow() {
        // 150_000 words of 0xffff fold back to 0xffff
        let data = vec![0xff; 300_000];
        assert_eq!(checksum(&data), 0x0000);

        let mut odd = vec![0xff; 300_001];
        odd[300_000] = 0x01;
        assert_eq!(checksum(&odd), !0x0100u16);
    }

    #[test]
    fn test_odd_length_padding() {
        let odd = [0xde, 0xad, 0xbe];
        let padded = [0xde, 0xad, 0xbe, 0x00];
        assert_eq!(checksum(&odd), checksum(&padded));
    }

    #[test]
    fn test_carry_folding() {
        // 0xffff + 0xffff + 0x0002 = 0x20000, folds to 0x0002
        let data = [0xff, 0xff, 0xff, 0xff, 0x00, 0x02];
        assert_eq!(checksum(&data), !0x0002u16);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(checksum(&[]), 0xFFFF);
    }
}
