//! SOL amount parsing
//!
//! Bet amounts are entered in SOL (e.g. "0.69") and stored in lamports.
//! Conversion is exact decimal arithmetic; nothing is rounded.

use solana_sdk::native_token::LAMPORTS_PER_SOL;
use thiserror::Error;

/// Number of decimal places in one SOL.
pub const SOL_DECIMALS: usize = 9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount '{0}': expected a non-negative decimal number")]
    Invalid(String),
    #[error("amount '{0}' has more than 9 decimal places")]
    TooPrecise(String),
    #[error("amount '{0}' does not fit in u64 lamports")]
    Overflow(String),
}

/// Parse a decimal SOL amount into lamports.
///
/// # Arguments
///
/// * `value` - Decimal string such as "1", "0.69" or ".5"
///
/// # Returns
///
/// * `Ok(u64)` - Amount in lamports
/// * `Err(AmountError)` - Negative, malformed, too precise or too large
pub fn parse_sol_amount(value: &str) -> Result<u64, AmountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Invalid(value.to_string()));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::Invalid(value.to_string()));
    }
    if fraction.len() > SOL_DECIMALS {
        return Err(AmountError::TooPrecise(value.to_string()));
    }

    let overflow = || AmountError::Overflow(value.to_string());
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{fraction:0<width$}", width = SOL_DECIMALS);
        padded.parse().map_err(|_| AmountError::Invalid(value.to_string()))?
    };

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|lamports| lamports.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Format lamports as a SOL decimal string without trailing zeros.
pub fn format_lamports(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let fraction = lamports % LAMPORTS_PER_SOL;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{fraction:0>width$}", width = SOL_DECIMALS);
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bet_amount() {
        assert_eq!(parse_sol_amount("0.69"), Ok(690_000_000));
        assert_eq!(parse_sol_amount("1"), Ok(LAMPORTS_PER_SOL));
        assert_eq!(parse_sol_amount(".5"), Ok(500_000_000));
        assert_eq!(parse_sol_amount("2."), Ok(2 * LAMPORTS_PER_SOL));
        assert_eq!(parse_sol_amount("0.000000001"), Ok(1));
        assert_eq!(parse_sol_amount("0"), Ok(0));
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert_eq!(parse_sol_amount(""), Err(AmountError::Empty));
        assert!(matches!(parse_sol_amount("-0.69"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_sol_amount("1e9"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_sol_amount("."), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_sol_amount("1.2.3"), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(matches!(
            parse_sol_amount("0.0000000001"),
            Err(AmountError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(matches!(
            parse_sol_amount("18446744074"),
            Err(AmountError::Overflow(_))
        ));
        assert!(matches!(
            parse_sol_amount("99999999999999999999999"),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_lamports() {
        assert_eq!(format_lamports(690_000_000), "0.69");
        assert_eq!(format_lamports(LAMPORTS_PER_SOL), "1");
        assert_eq!(format_lamports(1), "0.000000001");
        assert_eq!(format_lamports(0), "0");
    }
}
