use super::*;

const SI_PREFIXES: &[(&str, f64)] = &[
    ("", 1.0),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

pub(crate) fn format_si(value: f64, unit: &str, f: &mut Formatter<'_>) -> fmt::Result {
    if value == 0.0 {
        return write!(f, "0 {unit}");
    }

    let (prefix, divisor) = SI_PREFIXES
        .iter()
        .rev()
        .find(|(_, div)| value.abs() >= *div)
        .unwrap_or(&SI_PREFIXES[0]);

    let scaled = value / divisor;
    let s = format!("{scaled:.3}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');

    write!(f, "{trimmed} {prefix}{unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Si(f64);

    impl fmt::Display for Si {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            format_si(self.0, "B", f)
        }
    }

    #[test]
    fn prefixes() {
        #[track_caller]
        fn case(value: f64, expected: &str) {
            assert_eq!(Si(value).to_string(), expected);
        }

        case(0.0, "0 B");
        case(0.5, "0.5 B");
        case(999.0, "999 B");
        case(1000.0, "1 KB");
        case(1234.0, "1.234 KB");
        case(2.5e6, "2.5 MB");
        case(7e18, "7 EB");
        case(7e21, "7000 EB");
    }
}
