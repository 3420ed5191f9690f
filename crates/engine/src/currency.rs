use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO currency code used by ledger transactions and documents.
///
/// A transaction's currency is fixed when it is created and is never converted
/// in storage. Conversion only happens for display, through the single rate
/// table below ([`convert_minor`]).
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**.
/// `minor_units()` returns how many decimal digits are used when converting between:
/// - major units (human input/output, e.g. `10.50 USD`)
/// - minor units (stored integers, e.g. `1050`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Pkr,
    Sar,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Pkr, Currency::Sar];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Pkr => "PKR",
            Currency::Sar => "SAR",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Usd | Currency::Pkr | Currency::Sar => 2,
        }
    }

    /// Units of this currency per one USD, in hundredths.
    ///
    /// `USD -> PKR = 280`, `USD -> SAR = 3.75`.
    const fn per_usd_hundredths(self) -> i128 {
        match self {
            Currency::Usd => 100,
            Currency::Pkr => 28_000,
            Currency::Sar => 375,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "PKR" => Ok(Currency::Pkr),
            "SAR" => Ok(Currency::Sar),
            other => Err(EngineError::InvalidCurrency(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

/// Converts an amount in minor units between two currencies.
///
/// The conversion goes through the fixed rate table and rounds half away from
/// zero. Converting to the same currency is the identity.
#[must_use]
pub fn convert_minor(amount_minor: i64, from: Currency, to: Currency) -> i64 {
    if from == to {
        return amount_minor;
    }

    let numerator = i128::from(amount_minor) * to.per_usd_hundredths();
    let denominator = from.per_usd_hundredths();
    let mut quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator {
        quotient += numerator.signum();
    }

    i64::try_from(quotient).unwrap_or(if quotient < 0 { i64::MIN } else { i64::MAX })
}

/// Sum of amounts in mixed currencies expressed in one display currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedTotal {
    pub currency: Currency,
    pub amount_minor: i64,
}

impl ConvertedTotal {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            amount_minor: 0,
        }
    }

    /// Adds `amount_minor` expressed in `currency` to the total.
    pub fn add(&mut self, amount_minor: i64, currency: Currency) {
        self.amount_minor = self
            .amount_minor
            .saturating_add(convert_minor(amount_minor, currency, self.currency));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_to_pkr_uses_fixed_rate() {
        assert_eq!(convert_minor(100, Currency::Usd, Currency::Pkr), 28_000);
        assert_eq!(convert_minor(10_000, Currency::Usd, Currency::Pkr), 2_800_000);
    }

    #[test]
    fn pkr_to_usd_rounds_half_away_from_zero() {
        // 140 PKR minor = 0.5 USD minor
        assert_eq!(convert_minor(140, Currency::Pkr, Currency::Usd), 1);
        assert_eq!(convert_minor(-140, Currency::Pkr, Currency::Usd), -1);
        assert_eq!(convert_minor(139, Currency::Pkr, Currency::Usd), 0);
    }

    #[test]
    fn sar_goes_through_usd() {
        assert_eq!(convert_minor(375, Currency::Sar, Currency::Usd), 100);
        assert_eq!(convert_minor(375, Currency::Sar, Currency::Pkr), 28_000);
    }

    #[test]
    fn same_currency_is_identity() {
        for currency in Currency::ALL {
            assert_eq!(convert_minor(-12_345, currency, currency), -12_345);
        }
    }

    #[test]
    fn parse_currency_codes() {
        assert_eq!(Currency::try_from(" pkr ").unwrap(), Currency::Pkr);
        assert!(matches!(
            Currency::try_from("CNY"),
            Err(EngineError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn converted_total_mixes_currencies() {
        let mut total = ConvertedTotal::new(Currency::Pkr);
        total.add(10_000, Currency::Usd);
        total.add(10_000, Currency::Pkr);
        assert_eq!(total.amount_minor, 2_810_000);
    }
}
