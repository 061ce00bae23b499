use super::*;

/// Folds a pool merkle branch onto the coinbase hash. The branch is already
/// ordered by the pool, the running hash is always on the left.
pub fn merkle_root(coinbase: &[u8], merkle_branch: &[[u8; 32]]) -> [u8; 32] {
    merkle_branch
        .iter()
        .fold(double_sha256(coinbase), |root, node| {
            let mut concat = [0u8; 64];
            concat[..32].copy_from_slice(&root);
            concat[32..].copy_from_slice(node);
            double_sha256(&concat)
        })
}

/// Builds the coinbase `coinb1 || extranonce1 || extranonce2 || coinb2`
/// from hex and returns the merkle root in header byte order.
pub fn build_merkle_root(
    coinb1: &str,
    extranonce1: &str,
    extranonce2: &str,
    coinb2: &str,
    merkle_branch: &[String],
) -> Result<[u8; 32], BlockError> {
    let mut coinbase = codec::hex_decode(coinb1, MAX_TRANSACTION_SIZE).context(FieldSnafu {
        field: "coinb1",
    })?;

    for (field, hex) in [
        ("extranonce1", extranonce1),
        ("extranonce2", extranonce2),
        ("coinb2", coinb2),
    ] {
        coinbase.extend(codec::hex_decode(hex, MAX_TRANSACTION_SIZE).context(FieldSnafu { field })?);
    }

    let branch = merkle_branch
        .iter()
        .map(|node| codec::hex_decode_array::<32>(node))
        .collect::<Result<Vec<_>, _>>()
        .context(FieldSnafu {
            field: "merkle_branch",
        })?;

    Ok(merkle_root(&coinbase, &branch))
}

/// Standard Bitcoin merkle tree. An odd node at any level is paired with
/// itself.
pub fn merkle_root_flat(mut level: Vec<[u8; 32]>) -> [u8; 32] {
    if level.is_empty() {
        return [0; 32];
    }

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(level[level.len() - 1]);
        }

        level = level
            .chunks_exact(2)
            .map(|pair| {
                let mut concat = [0u8; 64];
                concat[..32].copy_from_slice(&pair[0]);
                concat[32..].copy_from_slice(&pair[1]);
                double_sha256(&concat)
            })
            .collect();
    }

    level[0]
}

/// Merkle root for a node template: the coinbase is hashed here, the other
/// transactions are given as display-order txids.
pub fn build_merkle_root_flat(coinbase: &str, txids: &[String]) -> Result<[u8; 32], BlockError> {
    let coinbase = codec::hex_decode(coinbase, MAX_TRANSACTION_SIZE).context(FieldSnafu {
        field: "coinbase",
    })?;

    let mut leaves = Vec::with_capacity(txids.len() + 1);
    leaves.push(double_sha256(&coinbase));

    for txid in txids {
        let mut leaf = codec::hex_decode_array::<32>(txid).context(FieldSnafu { field: "txid" })?;
        codec::reverse_bytes(&mut leaf);
        leaves.push(leaf);
    }

    Ok(merkle_root_flat(leaves))
}
