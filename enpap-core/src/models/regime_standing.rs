use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Advisory classification of total receipts against the forfettario
/// permanence limits.
///
/// The classification is informational only: it never changes the
/// contribution or tax arithmetic. The thresholds are the statutory
/// €85,000 permanence limit and the €100,000 mid-year exit limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimeStanding {
    /// Receipts at or below €85,000: the regime continues next year.
    WithinLimit,

    /// Receipts above €85,000 but at or below €100,000: the regime is
    /// normally lost from the following year.
    ExitNextYear,

    /// Receipts above €100,000: the regime is normally lost in the
    /// current year.
    ExitThisYear,
}

impl RegimeStanding {
    /// Receipts limit for staying in the regime next year (€85,000).
    pub fn permanence_limit() -> Decimal {
        Decimal::from(85_000)
    }

    /// Receipts limit beyond which the regime is lost mid-year (€100,000).
    pub fn mid_year_exit_limit() -> Decimal {
        Decimal::from(100_000)
    }

    /// Classifies total gross receipts against the regime thresholds.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use enpap_core::RegimeStanding;
    ///
    /// assert_eq!(RegimeStanding::for_receipts(dec!(52000)), RegimeStanding::WithinLimit);
    /// assert_eq!(RegimeStanding::for_receipts(dec!(92000)), RegimeStanding::ExitNextYear);
    /// assert_eq!(RegimeStanding::for_receipts(dec!(120000)), RegimeStanding::ExitThisYear);
    /// ```
    pub fn for_receipts(total_receipts: Decimal) -> Self {
        if total_receipts > Self::mid_year_exit_limit() {
            Self::ExitThisYear
        } else if total_receipts > Self::permanence_limit() {
            Self::ExitNextYear
        } else {
            Self::WithinLimit
        }
    }
}
