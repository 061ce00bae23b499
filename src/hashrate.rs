use super::*;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct HashRate(pub f64);

impl HashRate {
    pub const ZERO: Self = Self(0.0);

    pub fn from_hashes(hashes: u64, elapsed: Duration) -> Self {
        if elapsed.is_zero() {
            return Self::ZERO;
        }

        Self(hashes as f64 / elapsed.as_secs_f64())
    }
}

impl fmt::Display for HashRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        format_si(self.0, "H/s", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hashes() {
        assert_eq!(
            HashRate::from_hashes(5_000_000, Duration::from_secs(2)),
            HashRate(2_500_000.0)
        );
        assert_eq!(
            HashRate::from_hashes(100, Duration::ZERO),
            HashRate::ZERO
        );
    }

    #[test]
    fn display_formatting() {
        let cases = [
            (0.0, "0 H/s"),
            (1e3, "1 KH/s"),
            (1e6, "1 MH/s"),
            (1.5e6, "1.5 MH/s"),
            (2.345e9, "2.345 GH/s"),
            (123.456e12, "123.456 TH/s"),
        ];

        for (value, expected) in cases {
            assert_eq!(HashRate(value).to_string(), expected, "for value {value}");
        }
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&HashRate(1.5e6)).unwrap(), "1500000.0");
    }
}
