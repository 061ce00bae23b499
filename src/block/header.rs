use super::*;

/// Serializes an 80-byte header. `prev_hash` and `bits` arrive as display
/// hex and are byte-reversed, `merkle_root` is already in header order.
pub fn build_header(
    version: u32,
    prev_hash: &str,
    merkle_root: &[u8; 32],
    time: u32,
    bits: &str,
    nonce: u32,
) -> Result<[u8; 80], BlockError> {
    let mut prev_hash =
        codec::hex_decode_array::<32>(prev_hash).context(FieldSnafu { field: "prev_hash" })?;
    codec::reverse_bytes(&mut prev_hash);

    let mut bits = codec::hex_decode_array::<4>(bits).context(FieldSnafu { field: "bits" })?;
    codec::reverse_bytes(&mut bits);

    let mut header = [0u8; 80];
    LittleEndian::write_u32(&mut header[0..4], version);
    header[4..36].copy_from_slice(&prev_hash);
    header[36..68].copy_from_slice(merkle_root);
    LittleEndian::write_u32(&mut header[68..72], time);
    header[72..76].copy_from_slice(&bits);
    LittleEndian::write_u32(&mut header[76..80], nonce);

    Ok(header)
}

/// `header || varint(tx count) || coinbase || transactions`
pub fn serialize_block(
    header: &[u8; 80],
    coinbase: &str,
    transactions: &[String],
) -> Result<Vec<u8>, BlockError> {
    let mut block = Vec::with_capacity(80 + 9 + coinbase.len() / 2);
    block.extend_from_slice(header);
    block.extend(codec::varint(transactions.len() as u64 + 1));
    block.extend(
        codec::hex_decode(coinbase, MAX_TRANSACTION_SIZE).context(FieldSnafu { field: "coinbase" })?,
    );

    for transaction in transactions {
        block.extend(
            codec::hex_decode(transaction, MAX_TRANSACTION_SIZE).context(FieldSnafu {
                field: "transaction",
            })?,
        );
    }

    Ok(block)
}
