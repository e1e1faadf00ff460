//! Human-readable size strings (`512Mi`, `100G`, ...).

use crate::error::{Result, VirtError};

/// A size with a unit suffix, e.g. `512Mi` or `100G`. Kept as the raw
/// string so manifests round-trip unchanged.
pub type SizeString = String;

/// Parse a size string into bytes.
///
/// Suffixes `K`/`M`/`G`/`T` (either case) scale by powers of 1000; a
/// trailing `i` (`Ki`, `Mi`, ...) switches to powers of 1024.
pub fn to_size(s: &str) -> Result<u64> {
    let mut num = s;
    let mut co: u64 = 1000;

    if let Some(rest) = num.strip_suffix('i') {
        // binary byte mode
        co = 1024;
        num = rest;
    }

    let exp = match num.chars().last() {
        Some('T' | 't') => 4,
        Some('G' | 'g') => 3,
        Some('M' | 'm') => 2,
        Some('K' | 'k') => 1,
        _ => 0,
    };

    if exp > 0 {
        // unit letters are single-byte ASCII
        num = &num[..num.len() - 1];
    } else if co == 1024 {
        // a trailing `i` with no unit letter in front of it
        return Err(VirtError::InvalidSize { value: s.to_string() });
    }

    let scalar = num
        .parse::<u64>()
        .map_err(|_| VirtError::InvalidSize { value: s.to_string() })?;

    Ok(scalar * co.pow(exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_units() {
        assert_eq!(to_size("100M").unwrap(), 100_000_000);
        assert_eq!(to_size("10m").unwrap(), 10_000_000);
        assert_eq!(to_size("20G").unwrap(), 20_000_000_000);
        assert_eq!(to_size("12g").unwrap(), 12_000_000_000);
        assert_eq!(to_size("2T").unwrap(), 2_000_000_000_000);
        assert_eq!(to_size("8K").unwrap(), 8_000);
    }

    #[test]
    fn binary_units() {
        assert_eq!(to_size("512Mi").unwrap(), 512 * 1024 * 1024);
        assert_eq!(to_size("12Gi").unwrap(), 12 * 1024 * 1024 * 1024);
        assert_eq!(to_size("1Ti").unwrap(), 1024u64.pow(4));
    }

    #[test]
    fn bare_number() {
        assert_eq!(to_size("4096").unwrap(), 4096);
        assert_eq!(to_size("5").unwrap(), 5);
        assert_eq!(to_size("0").unwrap(), 0);
    }

    #[test]
    fn invalid() {
        assert!(to_size("12Timmies").is_err());
        assert!(to_size("G").is_err());
        assert!(to_size("Mi").is_err());
        assert!(to_size("1i").is_err());
        assert!(to_size("").is_err());
    }

    #[test]
    fn invalid_multibyte_suffix() {
        assert!(to_size("1Gö").is_err());
        assert!(to_size("größe").is_err());
    }
}
