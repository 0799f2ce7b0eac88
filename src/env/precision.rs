//! Fixed-precision rounding for the charge/rate pipeline.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::EnvError;

/// Number of significant digits every intermediate charge/rate value is
/// rounded to.
///
/// Each environment carries its own `Precision`, so simulators running side
/// by side never share a rounding context. The default is the widest
/// `Decimal` supports; narrower settings coarsen large batteries, since the
/// stored charge spends digits on its integer part.
///
/// # Examples
///
/// ```
/// use battery_env::env::precision::Precision;
/// use rust_decimal::Decimal;
///
/// let p = Precision::new(6).unwrap();
/// let third = p.round(Decimal::ONE / Decimal::from(3));
/// assert_eq!(third.to_string(), "0.333333");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    significant_digits: u32,
}

impl Precision {
    /// Lowest precision that keeps the energy balance inside tolerance.
    pub const MIN_DIGITS: u32 = 6;
    /// Widest precision `Decimal` can represent.
    pub const MAX_DIGITS: u32 = 28;

    /// Creates a precision of `significant_digits`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidConfiguration`] outside
    /// `[MIN_DIGITS, MAX_DIGITS]`.
    pub fn new(significant_digits: u32) -> Result<Self, EnvError> {
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&significant_digits) {
            return Err(EnvError::InvalidConfiguration(format!(
                "precision must be within [{}, {}] significant digits, got {significant_digits}",
                Self::MIN_DIGITS,
                Self::MAX_DIGITS
            )));
        }
        Ok(Self { significant_digits })
    }

    /// Returns the configured number of significant digits.
    pub fn significant_digits(self) -> u32 {
        self.significant_digits
    }

    /// Rounds `value` half-to-even to the configured significant digits.
    pub fn round(self, value: Decimal) -> Decimal {
        value.round_sf(self.significant_digits).unwrap_or(value)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            significant_digits: Self::MAX_DIGITS,
        }
    }
}

/// Converts a caller-supplied float into the decimal domain.
///
/// Returns `None` for NaN and infinities.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok()
}

/// Converts a decimal back into a float at the interface boundary.
pub fn to_f64(value: Decimal) -> f64 {
    // Every Decimal magnitude fits in an f64.
    value.to_f64().unwrap_or(f64::NAN)
}
