use super::*;

/// `SHA256(SHA256(data))` in raw digest byte order.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(data).to_byte_array()
}

/// Hashes an 80-byte block header for many nonces. The SHA256 state after
/// the first 64-byte block does not depend on the nonce, so it is computed
/// once and cloned for every attempt.
#[derive(Clone)]
pub struct HeaderHasher {
    header: [u8; 80],
    midstate: sha256::HashEngine,
}

impl HeaderHasher {
    pub fn new(header: [u8; 80]) -> Self {
        let mut midstate = sha256::Hash::engine();
        midstate.input(&header[..64]);
        Self { header, midstate }
    }

    pub fn hash(&self, nonce: u32) -> [u8; 32] {
        let mut tail = [0u8; 16];
        tail[..12].copy_from_slice(&self.header[64..76]);
        LittleEndian::write_u32(&mut tail[12..], nonce);

        let mut engine = self.midstate.clone();
        engine.input(&tail);
        let first = sha256::Hash::from_engine(engine);

        sha256::Hash::hash(first.as_byte_array()).to_byte_array()
    }

    pub fn header(&self, nonce: u32) -> [u8; 80] {
        let mut header = self.header;
        LittleEndian::write_u32(&mut header[76..], nonce);
        header
    }
}

impl fmt::Debug for HeaderHasher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderHasher")
            .field("header", &codec::hex_encode(&self.header))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    const GENESIS_HEADER: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";

    fn genesis() -> [u8; 80] {
        codec::hex_decode_array(GENESIS_HEADER).unwrap()
    }

    #[test]
    fn known_digests() {
        assert_eq!(
            codec::hex_encode(&double_sha256(b"hello")),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
        assert_eq!(
            codec::hex_encode(&double_sha256(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn genesis_block_hash() {
        let mut digest = double_sha256(&genesis());
        codec::reverse_bytes(&mut digest);
        assert_eq!(
            codec::hex_encode(&digest),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
    }

    #[test]
    fn deterministic() {
        let data = b"the same bytes twice";
        assert_eq!(double_sha256(data), double_sha256(data));
    }

    #[test]
    fn single_bit_flip_changes_about_half_the_output() {
        let base = [0x5au8; 80];
        let reference = double_sha256(&base);

        let mut total = 0u32;
        let mut trials = 0u32;

        for byte in 0..base.len() {
            for bit in 0..8 {
                let mut flipped = base;
                flipped[byte] ^= 1 << bit;
                let digest = double_sha256(&flipped);
                assert_ne!(digest, reference);
                total += reference
                    .iter()
                    .zip(digest.iter())
                    .map(|(a, b)| (a ^ b).count_ones())
                    .sum::<u32>();
                trials += 1;
            }
        }

        let mean = f64::from(total) / f64::from(trials);
        assert!((120.0..136.0).contains(&mean), "mean flipped bits {mean}");
    }

    #[test]
    fn midstate_matches_full_hash() {
        let hasher = HeaderHasher::new(genesis());

        for nonce in [0, 1, 2_083_236_893, u32::MAX] {
            assert_eq!(hasher.hash(nonce), double_sha256(&hasher.header(nonce)));
        }
    }

    #[test]
    fn header_sets_nonce_little_endian() {
        let hasher = HeaderHasher::new([0; 80]);
        assert_eq!(&hasher.header(0x0403_0201)[76..], &[1, 2, 3, 4]);
    }

    #[test]
    fn matches_bitcoin_block_hash() {
        let header: bitcoin::block::Header =
            bitcoin::consensus::deserialize(&genesis()).unwrap();
        let hasher = HeaderHasher::new(genesis());
        assert_eq!(
            hasher.hash(header.nonce),
            header.block_hash().to_byte_array()
        );
    }
}
