use super::*;

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTransaction {
    pub data: String,
    pub txid: String,
}

/// The fields of a `getblocktemplate` result needed to mine on it. Hex
/// fields are validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTemplate {
    pub previous_block_hash: String,
    pub bits: String,
    pub target: Target,
    pub version: u32,
    pub curtime: u32,
    pub coinbase: String,
    pub transactions: Vec<TemplateTransaction>,
}

fn string<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, TemplateError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or(TemplateError::MissingField { field })
}

fn uint32(value: &Value, field: &'static str) -> Result<u32, TemplateError> {
    let number = value
        .get(field)
        .and_then(Value::as_i64)
        .ok_or(TemplateError::MissingField { field })?;

    u32::try_from(number).map_err(|_| TemplateError::OutOfRange {
        field,
        value: number,
    })
}

impl BlockTemplate {
    pub fn from_value(value: &Value) -> Result<Self, TemplateError> {
        let previous_block_hash = string(value, "previousblockhash")?;
        codec::hex_decode_array::<32>(previous_block_hash).context(error::InvalidFieldSnafu {
            field: "previousblockhash",
        })?;

        let bits = string(value, "bits")?;
        codec::hex_decode_array::<4>(bits).context(error::InvalidFieldSnafu { field: "bits" })?;

        let target = Target::from_hex(string(value, "target")?).context(error::TargetSnafu)?;

        let version = uint32(value, "version")?;
        let curtime = uint32(value, "curtime")?;

        let coinbase = value
            .get("coinbasetxn")
            .and_then(|coinbase| coinbase.get("data"))
            .and_then(Value::as_str)
            .ok_or(TemplateError::MissingField {
                field: "coinbasetxn.data",
            })?;

        codec::hex_decode(coinbase, block::MAX_TRANSACTION_SIZE).context(
            error::InvalidFieldSnafu {
                field: "coinbasetxn.data",
            },
        )?;

        let entries = match value.get("transactions") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries.clone(),
            Some(_) => {
                return Err(TemplateError::MissingField {
                    field: "transactions",
                });
            }
        };

        if entries.len() > MAX_TEMPLATE_TRANSACTIONS {
            return Err(TemplateError::TooManyTransactions {
                count: entries.len(),
            });
        }

        let transactions = entries
            .iter()
            .map(|entry| {
                let data = string(entry, "data")?;
                codec::hex_decode(data, block::MAX_TRANSACTION_SIZE)
                    .context(error::InvalidFieldSnafu { field: "data" })?;

                let txid = string(entry, "txid")?;
                codec::hex_decode_array::<32>(txid)
                    .context(error::InvalidFieldSnafu { field: "txid" })?;

                Ok(TemplateTransaction {
                    data: data.into(),
                    txid: txid.into(),
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        Ok(Self {
            previous_block_hash: previous_block_hash.into(),
            bits: bits.into(),
            target,
            version,
            curtime,
            coinbase: coinbase.into(),
            transactions,
        })
    }

    /// Header with nonce zero over the flat merkle root of the coinbase and
    /// every template transaction.
    pub fn header(&self) -> Result<[u8; 80], BlockError> {
        let txids = self
            .transactions
            .iter()
            .map(|transaction| transaction.txid.clone())
            .collect::<Vec<_>>();

        let merkle_root = block::build_merkle_root_flat(&self.coinbase, &txids)?;

        block::build_header(
            self.version,
            &self.previous_block_hash,
            &merkle_root,
            self.curtime,
            &self.bits,
            0,
        )
    }

    pub fn serialize(&self, header: &[u8; 80]) -> Result<Vec<u8>, BlockError> {
        let data = self
            .transactions
            .iter()
            .map(|transaction| transaction.data.clone())
            .collect::<Vec<_>>();

        block::serialize_block(header, &self.coinbase, &data)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    const COINBASE: &str = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff0704ffff001d0104ffffffff0100f2052a0100000043410496b538e853519c726a2c91e61ec11600ae1390813a627c66fb8be7947be63c52da7589379515d4e0a604f8141781e62294721166bf621e73a82cbf2342c858eeac00000000";

    fn template() -> Value {
        json!({
            "previousblockhash": "000000000000000000028d4d5d4d9c6b4e0c0b0a6d3f2c8e8a7b6c5d4e3f2a1b",
            "bits": "207fffff",
            "target": "7fffff0000000000000000000000000000000000000000000000000000000000",
            "version": 536870912,
            "curtime": 1700000000,
            "coinbasetxn": {"data": COINBASE},
            "transactions": [],
            "height": 1,
        })
    }

    #[track_caller]
    fn rejected(field: &str, replacement: Value) -> TemplateError {
        let mut value = template();
        value[field] = replacement;
        BlockTemplate::from_value(&value).unwrap_err()
    }

    #[test]
    fn parses_template() {
        let template = BlockTemplate::from_value(&template()).unwrap();

        assert_eq!(template.bits, "207fffff");
        assert_eq!(template.version, 0x2000_0000);
        assert_eq!(template.curtime, 1_700_000_000);
        assert_eq!(template.target, Target::from_compact("207fffff").unwrap());
        assert_eq!(template.coinbase, COINBASE);
        assert!(template.transactions.is_empty());
    }

    #[test]
    fn header_commits_to_coinbase() {
        let template = BlockTemplate::from_value(&template()).unwrap();
        let header = template.header().unwrap();

        assert_eq!(&header[..4], &0x2000_0000u32.to_le_bytes());
        assert_eq!(
            &header[36..68],
            &block::merkle_root(&codec::hex_decode(COINBASE, 1024).unwrap(), &[])
        );
        assert_eq!(&header[68..72], &1_700_000_000u32.to_le_bytes());
        assert_eq!(&header[72..76], &[0xffu8, 0xff, 0x7f, 0x20]);
        assert_eq!(&header[76..], &[0u8; 4]);
    }

    #[test]
    fn serialized_block_has_transaction_count() {
        let mut value = template();
        value["transactions"] = json!([{
            "data": "0100000000000000000000",
            "txid": "9b0fc92260312ce44e74ef369f5c66bbb85848f2eddd5a7a1cde251e54ccfdd5",
        }]);

        let template = BlockTemplate::from_value(&value).unwrap();
        let header = template.header().unwrap();
        let block = template.serialize(&header).unwrap();

        assert_eq!(&block[..80], &header[..]);
        assert_eq!(block[80], 2);
        assert_eq!(block.len(), 80 + 1 + COINBASE.len() / 2 + 11);
    }

    #[test]
    fn missing_fields() {
        for field in ["previousblockhash", "bits", "target", "version", "curtime"] {
            let mut value = template();
            value.as_object_mut().unwrap().remove(field);
            assert!(
                matches!(
                    BlockTemplate::from_value(&value),
                    Err(TemplateError::MissingField { .. })
                ),
                "{field}"
            );
        }

        let mut value = template();
        value["coinbasetxn"] = json!({});
        assert!(matches!(
            BlockTemplate::from_value(&value),
            Err(TemplateError::MissingField {
                field: "coinbasetxn.data"
            })
        ));
    }

    #[test]
    fn malformed_fields() {
        assert!(matches!(
            rejected("bits", json!("7fffff")),
            TemplateError::InvalidField { field: "bits", .. }
        ));
        assert!(matches!(
            rejected("target", json!("00ff")),
            TemplateError::Target { .. }
        ));
        assert!(matches!(
            rejected("curtime", json!(-1)),
            TemplateError::OutOfRange {
                field: "curtime",
                value: -1
            }
        ));
        assert!(matches!(
            rejected("transactions", json!([{"data": "00"}])),
            TemplateError::MissingField { field: "txid" }
        ));
    }

    #[test]
    fn too_many_transactions() {
        let entry = json!({
            "data": "00",
            "txid": "9b0fc92260312ce44e74ef369f5c66bbb85848f2eddd5a7a1cde251e54ccfdd5",
        });

        assert!(matches!(
            rejected("transactions", json!(vec![entry; 513])),
            TemplateError::TooManyTransactions { count: 513 }
        ));
    }
}
