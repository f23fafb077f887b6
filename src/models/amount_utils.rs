use num_bigint::{BigInt, Sign};
use num_traits::Signed;
use serde::{self, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits carried by on-chain decimals.
pub const DEC_PRECISION: usize = 18;

/// Fixed-point decimal with 18 fractional digits, stored as a scaled `BigInt`.
///
/// Share amounts arrive as strings such as
/// `"5956506193276.000000000000000000"`. They are kept exact and rendered back
/// in the same form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Dec(BigInt);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal amount {input:?}: {reason}")]
pub struct ParseDecError {
    input: String,
    reason: &'static str,
}

fn scale() -> BigInt {
    BigInt::from(10u32).pow(DEC_PRECISION as u32)
}

impl FromStr for Dec {
    type Err = ParseDecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseDecError {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (unsigned, ""),
        };

        if int_part.is_empty() {
            return Err(err("missing integer part"));
        }
        if frac_part.len() > DEC_PRECISION {
            return Err(err("more than 18 fractional digits"));
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(err("not a decimal number"));
        }

        let digits = format!("{int_part}{frac_part:0<width$}", width = DEC_PRECISION);
        let magnitude =
            BigInt::from_str(&digits).map_err(|_| err("not a decimal number"))?;

        Ok(Dec(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.abs().to_string();
        let padded = format!("{digits:0>width$}", width = DEC_PRECISION + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - DEC_PRECISION);
        let sign = if self.0.sign() == Sign::Minus { "-" } else { "" };
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Dec::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Integer amounts are transported as decimal strings so they never pass
/// through a bounded numeric type.
pub fn deserialize_bigint<'de, D>(deserializer: D) -> Result<BigInt, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    BigInt::from_str(raw.trim())
        .map_err(|e| serde::de::Error::custom(format!("invalid integer amount {raw:?}: {e}")))
}
