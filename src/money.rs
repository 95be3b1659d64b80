use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

const SCALE: i64 = 100;

/// A fixed-scale signed monetary amount, stored as an integer count of minor units (cents).
///
/// `Money` never performs floating-point arithmetic. Addition and subtraction are checked and
/// return `InvalidAmount`/`Internal` on overflow rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Constructs a `Money` value directly from a count of minor units (cents).
    pub const fn from_minor_units(minor_units: i64) -> Self {
        Money(minor_units)
    }

    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Result<Money, AppError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| AppError::Overflow("money addition overflowed".into()))
    }

    pub fn checked_sub(self, other: Money) -> Result<Money, AppError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| AppError::Overflow("money subtraction overflowed".into()))
    }

    pub fn checked_neg(self) -> Result<Money, AppError> {
        self.0
            .checked_neg()
            .map(Money)
            .ok_or_else(|| AppError::Overflow("money negation overflowed".into()))
    }

    /// Parses a decimal string or number with at most 2 fractional digits into `Money`.
    pub fn parse(input: &str) -> Result<Money, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::InvalidAmount("amount must not be empty".into()));
        }

        let (sign, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (-1_i64, rest),
            None => (1_i64, input.strip_prefix('+').unwrap_or(input)),
        };

        let mut parts = unsigned.splitn(2, '.');
        let whole = parts.next().unwrap_or("0");
        let frac = parts.next().unwrap_or("");

        if frac.len() > 2 {
            return Err(AppError::InvalidAmount(format!(
                "amount '{input}' has more than 2 fractional digits"
            )));
        }
        if whole.is_empty() && frac.is_empty() {
            return Err(AppError::InvalidAmount(format!("amount '{input}' is not a number")));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) && !whole.is_empty() {
            return Err(AppError::InvalidAmount(format!("amount '{input}' is not a number")));
        }
        if !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidAmount(format!("amount '{input}' is not a number")));
        }

        let whole_val: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AppError::InvalidAmount(format!("amount '{input}' is not a number")))?
        };
        let padded_frac = format!("{frac:0<2}");
        let frac_val: i64 = padded_frac
            .parse()
            .map_err(|_| AppError::InvalidAmount(format!("amount '{input}' is not a number")))?;

        let minor = whole_val
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac_val))
            .ok_or_else(|| AppError::Overflow("amount out of range".into()))?;

        Ok(Money(sign * minor))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MoneyVisitor;

        impl<'de> de::Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or number with at most 2 fractional digits")
            }

            fn visit_str<E>(self, v: &str) -> Result<Money, E>
            where
                E: de::Error,
            {
                Money::parse(v).map_err(de::Error::custom)
            }

            fn visit_f64<E>(self, v: f64) -> Result<Money, E>
            where
                E: de::Error,
            {
                Money::parse(&format!("{v}")).map_err(de::Error::custom)
            }

            fn visit_i64<E>(self, v: i64) -> Result<Money, E>
            where
                E: de::Error,
            {
                Ok(Money(v.saturating_mul(SCALE)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Money, E>
            where
                E: de::Error,
            {
                Ok(Money((v as i64).saturating_mul(SCALE)))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// Stored as BIGINT minor units, matching the `i64` representation in memory: no
// decimal codec crosses the wire, and no text<->numeric cast is needed.
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let minor = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Money::from_minor_units(minor))
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode(self.minor_units(), buf)
    }
}
