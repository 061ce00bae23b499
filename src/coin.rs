use super::*;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Coin {
    #[default]
    #[display("bitcoin")]
    #[value(alias = "btc")]
    #[serde(alias = "btc")]
    Bitcoin,
    #[display("litecoin")]
    #[value(alias = "ltc")]
    #[serde(alias = "ltc")]
    Litecoin,
    #[display("dogecoin")]
    #[value(alias = "doge")]
    #[serde(alias = "doge")]
    Dogecoin,
}

impl Coin {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Bitcoin => "BTC",
            Self::Litecoin => "LTC",
            Self::Dogecoin => "DOGE",
        }
    }

    pub fn algorithm(self) -> &'static str {
        match self {
            Self::Bitcoin => "sha256d",
            Self::Litecoin | Self::Dogecoin => "scrypt",
        }
    }

    /// Whether this miner's hash function produces valid work for the coin.
    pub fn is_supported(self) -> bool {
        self.algorithm() == "sha256d"
    }
}

impl FromStr for Coin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(s, true).map_err(|err| anyhow!("invalid coin `{s}`: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_and_aliases() {
        #[track_caller]
        fn case(input: &str, expected: Coin) {
            assert_eq!(input.parse::<Coin>().unwrap(), expected);
        }

        case("bitcoin", Coin::Bitcoin);
        case("btc", Coin::Bitcoin);
        case("BTC", Coin::Bitcoin);
        case("litecoin", Coin::Litecoin);
        case("ltc", Coin::Litecoin);
        case("dogecoin", Coin::Dogecoin);
        case("doge", Coin::Dogecoin);

        assert!("monero".parse::<Coin>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Coin::Bitcoin.to_string(), "bitcoin");
        assert_eq!(Coin::Dogecoin.to_string(), "dogecoin");
    }

    #[test]
    fn only_sha256d_is_supported() {
        assert!(Coin::Bitcoin.is_supported());
        assert!(!Coin::Litecoin.is_supported());
        assert!(!Coin::Dogecoin.is_supported());
        assert_eq!(Coin::Dogecoin.symbol(), "DOGE");
    }

    #[test]
    fn deserialize_from_config() {
        #[derive(Deserialize)]
        struct Section {
            coin: Coin,
        }

        assert_eq!(
            toml::from_str::<Section>("coin = \"ltc\"").unwrap().coin,
            Coin::Litecoin
        );
        assert_eq!(
            toml::from_str::<Section>("coin = \"bitcoin\"").unwrap().coin,
            Coin::Bitcoin
        );
    }
}
