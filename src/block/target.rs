use super::*;

/// Unsigned big-endian comparison, `hash <= target`.
pub fn meets_target(hash: &[u8; 32], target: &[u8; 32]) -> bool {
    hash <= target
}

/// A 256-bit proof-of-work target stored big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Target([u8; 32]);

impl Target {
    /// The difficulty 1 target, `0x00000000ffff0000...`.
    pub const MAX: Self = {
        let mut bytes = [0u8; 32];
        bytes[4] = 0xff;
        bytes[5] = 0xff;
        Self(bytes)
    };

    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Decodes compact `nbits`: byte 0 is the exponent, bytes 1..4 the
    /// mantissa placed at offset `32 - exponent`.
    pub fn from_compact(nbits: &str) -> Result<Self, BlockError> {
        let nbits = codec::hex_decode_array::<4>(nbits).context(FieldSnafu { field: "nbits" })?;

        let exponent = nbits[0];

        if !(3..=32).contains(&exponent) {
            return Err(BlockError::CompactExponent { exponent });
        }

        let offset = 32 - usize::from(exponent);
        let mut bytes = [0u8; 32];
        bytes[offset..offset + 3].copy_from_slice(&nbits[1..]);

        Ok(Self(bytes))
    }

    /// `MAX / difficulty`, computed by long division in base 256 so the
    /// quotient never passes through a 256-bit integer. Digits are carried
    /// upward and the result saturates at 2^256 - 1.
    pub fn from_difficulty(difficulty: f64) -> Result<Self, BlockError> {
        if !difficulty.is_finite() || difficulty <= 0.0 {
            return Err(BlockError::Difficulty { difficulty });
        }

        // Above 2^256 - 1.
        if difficulty <= 1.0 / 4_294_967_296.0 {
            return Ok(Self([0xff; 32]));
        }

        let mut digits = [0u64; 32];
        let mut remainder = 0.0f64;

        for (digit, byte) in digits.iter_mut().zip(Self::MAX.0) {
            let current = remainder * 256.0 + f64::from(byte);
            let quotient = (current / difficulty).floor().max(0.0);
            remainder = (current - quotient * difficulty).max(0.0);

            // A non-integer divisor can leave a digit above 255.
            *digit = quotient as u64;
        }

        let mut bytes = [0u8; 32];
        let mut carry = 0u64;

        for (byte, digit) in bytes.iter_mut().zip(digits).rev() {
            let value = digit + carry;
            *byte = (value & 0xff) as u8;
            carry = value >> 8;
        }

        if carry > 0 {
            return Ok(Self([0xff; 32]));
        }

        Ok(Self(bytes))
    }

    /// Parses 64 hex digits, most significant byte first.
    pub fn from_hex(hex: &str) -> Result<Self, BlockError> {
        Ok(Self(
            codec::hex_decode_array::<32>(hex).context(FieldSnafu { field: "target" })?,
        ))
    }

    /// Checks a raw double-SHA256 digest, which is little-endian as a number.
    pub fn is_met_by(&self, digest: &[u8; 32]) -> bool {
        let mut hash = *digest;
        codec::reverse_bytes(&mut hash);
        meets_target(&hash, &self.0)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", codec::hex_encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[track_caller]
    fn case(target: Target, expected: &str) {
        assert_eq!(target.to_string(), expected);
    }

    #[test]
    fn compact_max_target() {
        case(
            Target::from_compact("1d00ffff").unwrap(),
            "00000000ffff0000000000000000000000000000000000000000000000000000",
        );
        assert_eq!(Target::from_compact("1d00ffff").unwrap(), Target::MAX);
    }

    #[test]
    fn compact_mainnet_and_regtest() {
        case(
            Target::from_compact("17034219").unwrap(),
            "0000000000000000000342190000000000000000000000000000000000000000",
        );
        case(
            Target::from_compact("207fffff").unwrap(),
            "7fffff0000000000000000000000000000000000000000000000000000000000",
        );
        case(
            Target::from_compact("03123456").unwrap(),
            "0000000000000000000000000000000000000000000000000000000000123456",
        );
    }

    #[test]
    fn compact_matches_bitcoin() {
        for bits in [0x1d00ffff_u32, 0x1c2ac4af, 0x17034219, 0x207fffff] {
            let ours = Target::from_compact(&format!("{bits:08x}")).unwrap();
            let theirs = bitcoin::Target::from_compact(bitcoin::CompactTarget::from_consensus(bits));
            assert_eq!(ours.to_be_bytes(), theirs.to_be_bytes());
        }
    }

    #[test]
    fn compact_rejects_bad_exponent() {
        assert_eq!(
            Target::from_compact("02123456"),
            Err(BlockError::CompactExponent { exponent: 2 })
        );
        assert_eq!(
            Target::from_compact("21123456"),
            Err(BlockError::CompactExponent { exponent: 0x21 })
        );
        assert!(matches!(
            Target::from_compact("1d00"),
            Err(BlockError::Field { field: "nbits", .. })
        ));
    }

    #[test]
    fn difficulty_targets() {
        case(
            Target::from_difficulty(1.0).unwrap(),
            "00000000ffff0000000000000000000000000000000000000000000000000000",
        );
        case(
            Target::from_difficulty(2.0).unwrap(),
            "000000007fff8000000000000000000000000000000000000000000000000000",
        );
        case(
            Target::from_difficulty(256.0).unwrap(),
            "0000000000ffff00000000000000000000000000000000000000000000000000",
        );
        case(
            Target::from_difficulty(65536.0).unwrap(),
            "000000000000ffff000000000000000000000000000000000000000000000000",
        );
    }

    #[test]
    fn fractional_difficulty_carries() {
        case(
            Target::from_difficulty(0.5).unwrap(),
            "00000001fffe0000000000000000000000000000000000000000000000000000",
        );
        case(
            Target::from_difficulty(1.0 / 256.0).unwrap(),
            "000000ffff000000000000000000000000000000000000000000000000000000",
        );
        assert_eq!(
            Target::from_difficulty(1e-12).unwrap(),
            Target::from_be_bytes([0xff; 32])
        );
    }

    #[test]
    fn fractional_difficulty_matches_exact_division() {
        #[track_caller]
        fn prefix(difficulty: f64, expected: &str) {
            let target = Target::from_difficulty(difficulty).unwrap().to_string();
            assert_eq!(&target[..expected.len()], expected, "difficulty {difficulty}");
        }

        prefix(1.01, "00000000fd76237c32b1");
        prefix(1.005, "00000000feb8f4898d5f");
        prefix(12345.678, "0000000000054eef1232");

        case(
            Target::from_difficulty(1.5).unwrap(),
            "00000000aaaa0000000000000000000000000000000000000000000000000000",
        );
    }

    #[test]
    fn difficulty_is_monotonic() {
        let mut previous = Target::from_difficulty(0.001).unwrap();

        for difficulty in [0.01, 0.5, 1.0, 1.5, 3.0, 1000.0, 1e9, 1e15] {
            let target = Target::from_difficulty(difficulty).unwrap();
            assert!(target < previous, "difficulty {difficulty}");
            previous = target;
        }
    }

    #[test]
    fn difficulty_rejects_non_positive() {
        for difficulty in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Target::from_difficulty(difficulty),
                Err(BlockError::Difficulty { .. })
            ));
        }
    }

    #[test]
    fn hex_target() {
        let hex = "7fffff0000000000000000000000000000000000000000000000000000000000";
        case(Target::from_hex(hex).unwrap(), hex);
        assert!(Target::from_hex("7fffff").is_err());
    }

    #[test]
    fn comparison_is_reflexive_and_big_endian() {
        let target = Target::MAX.to_be_bytes();
        assert!(meets_target(&target, &target));

        let mut above = target;
        above[3] = 1;
        assert!(!meets_target(&above, &target));

        let mut below = target;
        below[31] = 0;
        below[5] = 0xfe;
        assert!(meets_target(&below, &target));
    }

    #[test]
    fn digest_is_reversed_before_comparison() {
        let target = Target::from_compact("1d00ffff").unwrap();

        let mut digest = [0u8; 32];
        digest[0] = 0xff;
        assert!(target.is_met_by(&digest));

        let mut digest = [0u8; 32];
        digest[31] = 0x01;
        assert!(!target.is_met_by(&digest));
    }

    #[test]
    fn genesis_meets_its_target() {
        let header = bitcoin::constants::genesis_block(bitcoin::Network::Bitcoin).header;
        let target = Target::from_compact("1d00ffff").unwrap();
        assert!(target.is_met_by(&header.block_hash().to_byte_array()));
    }
}
