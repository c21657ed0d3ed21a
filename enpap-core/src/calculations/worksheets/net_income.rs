//! Net-income worksheet for the ENPAP forfettario regime.
//!
//! This module implements the contribution-and-tax worksheet that turns
//! annual gross receipts into an itemized breakdown of ENPAP contributions,
//! substitute tax, and net income.
//!
//! # Worksheet Structure
//!
//! The worksheet consists of the following steps:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Base compensation: receipts net of the integrative surcharge |
//! | 2    | Integrative contribution: surcharge rate × base, with annual floor |
//! | 3    | Taxable base: base compensation × profitability coefficient |
//! | 4    | Subjective contribution: chosen % × taxable base, with annual floor |
//! | 5    | Maternity fee: fixed annual amount, if the parameter set has one |
//! | 6    | Total contributions: subjective + integrative + maternity |
//! | 7    | Deductible contributions: subjective + maternity |
//! | 8    | Taxable income: taxable base − deductible, floored at zero |
//! | 9    | Substitute tax: tax rate × taxable income |
//! | 10   | Net annual income, before and after fixed expenses |
//!
//! Receipts already include the integrative surcharge, so step 1 divides by
//! `1 + rate` to recover the base compensation. With split private and
//! public-administration streams, each channel has its own surcharge rate
//! and step 1 is applied per channel.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use enpap_core::IncomeStreams;
//! use enpap_core::calculations::{
//!     NetIncomeWorksheet, NetIncomeWorksheetInput, RegimeParameters, INTEGRATIVE_DEDUCTIBLE,
//! };
//!
//! let params = RegimeParameters {
//!     year: 2025,
//!     integrative_rate_private: dec!(0.02),
//!     integrative_rate_public: dec!(0.04),
//!     min_integrative: dec!(66.00),
//!     min_subjective: dec!(856.00),
//!     maternity_fee: None,
//!     integrative_deductible: INTEGRATIVE_DEDUCTIBLE,
//!     montante_integrative_share: dec!(0.50),
//! };
//!
//! let worksheet = NetIncomeWorksheet::new(params);
//! let result = worksheet.calculate(&NetIncomeWorksheetInput {
//!     streams: IncomeStreams::Single { gross_receipts: dec!(52000.00) },
//!     fixed_expenses: dec!(0.00),
//!     subjective_rate_pct: dec!(10),
//!     substitute_tax_rate: dec!(0.15),
//!     profitability_coefficient: dec!(0.78),
//! }).unwrap();
//!
//! assert_eq!(result.base_compensation, dec!(50980.39));
//! assert_eq!(result.total_contributions, dec!(4996.08));
//! assert_eq!(result.net_annual_before_expenses, dec!(41635.69));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{max, round_half_up};
use crate::models::{IncomeStreams, RegimeStanding};

/// Whether the integrative contribution enters the deductible base.
///
/// Fund policy keeps the invoice surcharge outside the deduction, so this is
/// `false` for every current parameter set. The [`RegimeParameters`] field
/// exists so that a future policy change stays a data edit rather than a
/// formula change.
pub const INTEGRATIVE_DEDUCTIBLE: bool = false;

/// Errors that can occur during net-income worksheet calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetIncomeWorksheetError {
    /// The private-channel integrative rate must be between 0 and 1.
    #[error("private integrative rate must be between 0 and 1, got {0}")]
    InvalidPrivateIntegrativeRate(Decimal),

    /// The public-administration integrative rate must be between 0 and 1.
    #[error("public integrative rate must be between 0 and 1, got {0}")]
    InvalidPublicIntegrativeRate(Decimal),

    /// The integrative contribution floor must be non-negative.
    #[error("minimum integrative contribution must be non-negative, got {0}")]
    InvalidMinIntegrative(Decimal),

    /// The subjective contribution floor must be non-negative.
    #[error("minimum subjective contribution must be non-negative, got {0}")]
    InvalidMinSubjective(Decimal),

    /// The maternity fee must be non-negative when present.
    #[error("maternity fee must be non-negative, got {0}")]
    InvalidMaternityFee(Decimal),

    /// The montante integrative share must be between 0 and 1.
    #[error("montante integrative share must be between 0 and 1, got {0}")]
    InvalidMontanteShare(Decimal),
}

/// ENPAP parameter set for one regime year.
///
/// These are fund-specified rates, floors, and fees that may change from
/// year to year; they are supplied per invocation rather than held as
/// process-wide globals so that multiple regime years can be evaluated
/// side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeParameters {
    /// The regime year these values apply to.
    pub year: i32,

    /// Integrative surcharge rate on private-client invoices.
    ///
    /// Typically 2% (0.02). A single income stream is invoiced at this rate.
    pub integrative_rate_private: Decimal,

    /// Integrative surcharge rate on public-administration invoices.
    ///
    /// Typically 4% (0.04). Only used by the split-stream variant.
    pub integrative_rate_public: Decimal,

    /// Annual floor for the total integrative contribution.
    pub min_integrative: Decimal,

    /// Annual floor for the subjective contribution.
    pub min_subjective: Decimal,

    /// Fixed annual maternity fee, or `None` for parameter sets that
    /// predate the fee.
    pub maternity_fee: Option<Decimal>,

    /// Whether the integrative contribution enters the deductible base.
    ///
    /// Current fund policy fixes this to [`INTEGRATIVE_DEDUCTIBLE`] (false).
    pub integrative_deductible: bool,

    /// Fraction of the private-channel integrative contribution credited to
    /// the pension accrual (montante).
    ///
    /// The split-stream variant reports `subjective + share × private
    /// integrative` as the amount that increases the long-term accrual.
    pub montante_integrative_share: Decimal,
}

impl RegimeParameters {
    /// Validates the parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`NetIncomeWorksheetError`] if:
    /// - either integrative rate is not in [0, 1]
    /// - either contribution floor is negative
    /// - the maternity fee is present and negative
    /// - the montante share is not in [0, 1]
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use enpap_core::calculations::{NetIncomeWorksheetError, RegimeParameters};
    ///
    /// let invalid = RegimeParameters {
    ///     year: 2025,
    ///     integrative_rate_private: dec!(0.02),
    ///     integrative_rate_public: dec!(0.04),
    ///     min_integrative: dec!(-66.00),
    ///     min_subjective: dec!(856.00),
    ///     maternity_fee: None,
    ///     integrative_deductible: false,
    ///     montante_integrative_share: dec!(0.50),
    /// };
    ///
    /// let result = invalid.validate();
    /// assert_eq!(result, Err(NetIncomeWorksheetError::InvalidMinIntegrative(dec!(-66.00))));
    /// ```
    pub fn validate(&self) -> Result<(), NetIncomeWorksheetError> {
        if self.integrative_rate_private < Decimal::ZERO
            || self.integrative_rate_private > Decimal::ONE
        {
            return Err(NetIncomeWorksheetError::InvalidPrivateIntegrativeRate(
                self.integrative_rate_private,
            ));
        }
        if self.integrative_rate_public < Decimal::ZERO
            || self.integrative_rate_public > Decimal::ONE
        {
            return Err(NetIncomeWorksheetError::InvalidPublicIntegrativeRate(
                self.integrative_rate_public,
            ));
        }
        if self.min_integrative < Decimal::ZERO {
            return Err(NetIncomeWorksheetError::InvalidMinIntegrative(
                self.min_integrative,
            ));
        }
        if self.min_subjective < Decimal::ZERO {
            return Err(NetIncomeWorksheetError::InvalidMinSubjective(
                self.min_subjective,
            ));
        }
        if let Some(fee) = self.maternity_fee {
            if fee < Decimal::ZERO {
                return Err(NetIncomeWorksheetError::InvalidMaternityFee(fee));
            }
        }
        if self.montante_integrative_share < Decimal::ZERO
            || self.montante_integrative_share > Decimal::ONE
        {
            return Err(NetIncomeWorksheetError::InvalidMontanteShare(
                self.montante_integrative_share,
            ));
        }
        Ok(())
    }
}

/// Input values for the net-income worksheet.
///
/// These are user-provided values; the presentation layer constrains their
/// ranges (subjective rate within [10, 30] percent, substitute tax rate
/// within [0, 0.5], profitability coefficient within [0.40, 1.00]) before
/// calling the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetIncomeWorksheetInput {
    /// Annual gross receipts, inclusive of the integrative surcharge.
    pub streams: IncomeStreams,

    /// Fixed annual office expenses.
    ///
    /// Reduces only the final net figures, never the taxable base.
    pub fixed_expenses: Decimal,

    /// Chosen subjective contribution rate, as a percentage (e.g. 10 for 10%).
    pub subjective_rate_pct: Decimal,

    /// Substitute tax rate, as a fraction (e.g. 0.15 for 15%).
    pub substitute_tax_rate: Decimal,

    /// Profitability coefficient: the fraction of base compensation treated
    /// as taxable profit under the regime (e.g. 0.78).
    pub profitability_coefficient: Decimal,
}

/// Per-channel breakdown for the split-stream variant.
///
/// The integrative contribution here is the raw channel amount, before the
/// overall floor is applied to the sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamBreakdown {
    /// Channel receipts net of the channel's surcharge.
    pub base_compensation: Decimal,

    /// Channel surcharge rate × channel base compensation, unfloored.
    pub integrative_contribution: Decimal,
}

/// Result of the net-income worksheet.
///
/// All fields are fully derived; the engine holds no state between calls.
/// Contribution and tax fields are always non-negative. The net figures may
/// be negative when the contribution floors exceed the receipts; that is a
/// valid, reportable outcome and is never clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetIncomeWorksheetResult {
    /// Total gross receipts across all streams.
    pub gross_receipts: Decimal,

    /// Total base compensation: receipts net of the integrative surcharge.
    pub base_compensation: Decimal,

    /// Private-channel breakdown. `Some` only for the split variant.
    pub private_stream: Option<StreamBreakdown>,

    /// Public-administration channel breakdown. `Some` only for the split variant.
    pub public_stream: Option<StreamBreakdown>,

    /// Total integrative contribution, with the annual floor applied.
    pub integrative_contribution: Decimal,

    /// Base compensation × profitability coefficient.
    pub taxable_base: Decimal,

    /// Subjective contribution, with the annual floor applied.
    pub subjective_contribution: Decimal,

    /// Fixed maternity fee; zero when the parameter set has none.
    pub maternity_fee: Decimal,

    /// Subjective + integrative + maternity.
    pub total_contributions: Decimal,

    /// Contributions that reduce the taxable base: subjective + maternity,
    /// plus the integrative contribution only if the parameter set marks it
    /// deductible.
    pub deductible_contributions: Decimal,

    /// Taxable base − deductible contributions, floored at zero.
    pub taxable_income: Decimal,

    /// Substitute tax due on the taxable income.
    pub substitute_tax: Decimal,

    /// Receipts − total contributions − substitute tax. May be negative.
    pub net_annual_before_expenses: Decimal,

    /// Net annual income after fixed expenses. May be negative.
    pub net_annual_after_expenses: Decimal,

    /// Net annual income before expenses, divided over twelve months.
    pub net_monthly_before_expenses: Decimal,

    /// Net annual income after expenses, divided over twelve months.
    pub net_monthly_after_expenses: Decimal,

    /// Contribution amount credited to the pension accrual (montante):
    /// subjective + the configured share of the raw private-channel
    /// integrative contribution. `Some` only for the split variant.
    pub pension_accrual_contribution: Option<Decimal>,
}

/// Per-variant intermediate totals feeding the shared worksheet steps.
struct StreamTotals {
    base_compensation: Decimal,
    integrative_contribution: Decimal,
    private_stream: Option<StreamBreakdown>,
    public_stream: Option<StreamBreakdown>,
}

/// Calculator for the net-income worksheet.
///
/// Encapsulates one regime year's [`RegimeParameters`] and computes the full
/// breakdown for either income-stream variant. The calculation is pure:
/// identical inputs always produce identical results.
#[derive(Debug, Clone)]
pub struct NetIncomeWorksheet {
    params: RegimeParameters,
}

impl NetIncomeWorksheet {
    /// Creates a new worksheet calculator with the given parameter set.
    pub fn new(params: RegimeParameters) -> Self {
        Self { params }
    }

    /// Calculates the complete worksheet and returns the itemized result.
    ///
    /// This is the main entry point. It validates the parameter set and then
    /// runs every step of the worksheet; for inputs within the documented
    /// domain the calculation itself never fails.
    ///
    /// Receipts above the forfettario permanence limits are reported via a
    /// warning log but never change the arithmetic; see [`RegimeStanding`].
    ///
    /// # Errors
    ///
    /// Returns [`NetIncomeWorksheetError`] if the parameter set is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use enpap_core::IncomeStreams;
    /// use enpap_core::calculations::{
    ///     NetIncomeWorksheet, NetIncomeWorksheetInput, RegimeParameters, INTEGRATIVE_DEDUCTIBLE,
    /// };
    ///
    /// let params = RegimeParameters {
    ///     year: 2025,
    ///     integrative_rate_private: dec!(0.02),
    ///     integrative_rate_public: dec!(0.04),
    ///     min_integrative: dec!(66.00),
    ///     min_subjective: dec!(856.00),
    ///     maternity_fee: Some(dec!(91.00)),
    ///     integrative_deductible: INTEGRATIVE_DEDUCTIBLE,
    ///     montante_integrative_share: dec!(0.50),
    /// };
    ///
    /// let worksheet = NetIncomeWorksheet::new(params);
    ///
    /// // Private and public-administration streams, each at its own rate
    /// let result = worksheet.calculate(&NetIncomeWorksheetInput {
    ///     streams: IncomeStreams::Split {
    ///         private_receipts: dec!(30600.00),
    ///         public_receipts: dec!(20800.00),
    ///     },
    ///     fixed_expenses: dec!(0.00),
    ///     subjective_rate_pct: dec!(10),
    ///     substitute_tax_rate: dec!(0.15),
    ///     profitability_coefficient: dec!(0.78),
    /// }).unwrap();
    ///
    /// // base = 30600/1.02 + 20800/1.04 = 30000 + 20000
    /// assert_eq!(result.base_compensation, dec!(50000.00));
    /// assert_eq!(result.pension_accrual_contribution, Some(dec!(4200.00)));
    /// ```
    pub fn calculate(
        &self,
        input: &NetIncomeWorksheetInput,
    ) -> Result<NetIncomeWorksheetResult, NetIncomeWorksheetError> {
        self.params.validate()?;

        let gross_receipts = round_half_up(input.streams.total_receipts());

        let standing = RegimeStanding::for_receipts(gross_receipts);
        if standing != RegimeStanding::WithinLimit {
            warn!(
                gross_receipts = %gross_receipts,
                standing = ?standing,
                "Receipts exceed the forfettario permanence limit"
            );
        }

        // Steps 1-2: per-variant base compensation and integrative contribution
        let totals = self.stream_totals(&input.streams, gross_receipts);

        // Step 3: taxable base
        let taxable_base = self.taxable_base(totals.base_compensation, input.profitability_coefficient);

        // Step 4: subjective contribution
        let subjective_contribution =
            self.subjective_contribution(taxable_base, input.subjective_rate_pct);

        // Step 5: maternity fee
        let maternity_fee = self.maternity_fee();

        // Step 6: total contributions due to the fund
        let total_contributions = round_half_up(
            subjective_contribution + totals.integrative_contribution + maternity_fee,
        );

        // Step 7: deductible contributions
        let deductible_contributions = self.deductible_contributions(
            subjective_contribution,
            maternity_fee,
            totals.integrative_contribution,
        );

        // Step 8: taxable income
        let taxable_income = self.taxable_income(taxable_base, deductible_contributions);

        // Step 9: substitute tax
        let substitute_tax = self.substitute_tax(taxable_income, input.substitute_tax_rate);

        // Step 10: net figures
        let net_annual_before_expenses =
            round_half_up(gross_receipts - total_contributions - substitute_tax);
        let net_annual_after_expenses =
            round_half_up(net_annual_before_expenses - input.fixed_expenses);

        if net_annual_before_expenses < Decimal::ZERO {
            warn!(
                gross_receipts = %gross_receipts,
                total_contributions = %total_contributions,
                net_annual_before_expenses = %net_annual_before_expenses,
                "Contribution floors exceed receipts; net income is negative"
            );
        }

        let twelve = Decimal::from(12);
        let net_monthly_before_expenses = round_half_up(net_annual_before_expenses / twelve);
        let net_monthly_after_expenses = round_half_up(net_annual_after_expenses / twelve);

        // Montante credit: only the split variant reports it
        let pension_accrual_contribution = totals.private_stream.as_ref().map(|private| {
            round_half_up(
                subjective_contribution
                    + self.params.montante_integrative_share * private.integrative_contribution,
            )
        });

        Ok(NetIncomeWorksheetResult {
            gross_receipts,
            base_compensation: totals.base_compensation,
            private_stream: totals.private_stream,
            public_stream: totals.public_stream,
            integrative_contribution: totals.integrative_contribution,
            taxable_base,
            subjective_contribution,
            maternity_fee,
            total_contributions,
            deductible_contributions,
            taxable_income,
            substitute_tax,
            net_annual_before_expenses,
            net_annual_after_expenses,
            net_monthly_before_expenses,
            net_monthly_after_expenses,
            pension_accrual_contribution,
        })
    }

    /// Computes base compensation and the floored integrative contribution
    /// for either income-stream variant (Steps 1 and 2).
    ///
    /// Single stream: the whole receipts figure is invoiced at the private
    /// rate, and the integrative floor applies unconditionally.
    ///
    /// Split streams: each channel is netted at its own rate (a channel with
    /// zero receipts contributes zero, without division), and the floor
    /// applies to the channel sum only when total receipts are positive.
    fn stream_totals(
        &self,
        streams: &IncomeStreams,
        gross_receipts: Decimal,
    ) -> StreamTotals {
        match *streams {
            IncomeStreams::Single { gross_receipts: receipts } => {
                let base_compensation =
                    self.base_compensation(receipts, self.params.integrative_rate_private);
                let raw_integrative =
                    round_half_up(self.params.integrative_rate_private * base_compensation);
                let integrative_contribution = max(raw_integrative, self.params.min_integrative);

                if receipts == Decimal::ZERO {
                    warn!(
                        min_integrative = %self.params.min_integrative,
                        min_subjective = %self.params.min_subjective,
                        "Zero receipts; minimum contributions still apply"
                    );
                }

                StreamTotals {
                    base_compensation,
                    integrative_contribution,
                    private_stream: None,
                    public_stream: None,
                }
            }
            IncomeStreams::Split {
                private_receipts,
                public_receipts,
            } => {
                let base_private = self
                    .channel_base_compensation(private_receipts, self.params.integrative_rate_private);
                let base_public = self
                    .channel_base_compensation(public_receipts, self.params.integrative_rate_public);

                let raw_private =
                    round_half_up(self.params.integrative_rate_private * base_private);
                let raw_public = round_half_up(self.params.integrative_rate_public * base_public);
                let subtotal = round_half_up(raw_private + raw_public);

                // Genuinely zero income is never floored
                let integrative_contribution = if gross_receipts > Decimal::ZERO {
                    max(subtotal, self.params.min_integrative)
                } else {
                    subtotal
                };

                StreamTotals {
                    base_compensation: round_half_up(base_private + base_public),
                    integrative_contribution,
                    private_stream: Some(StreamBreakdown {
                        base_compensation: base_private,
                        integrative_contribution: raw_private,
                    }),
                    public_stream: Some(StreamBreakdown {
                        base_compensation: base_public,
                        integrative_contribution: raw_public,
                    }),
                }
            }
        }
    }

    /// Recovers base compensation from surcharge-inclusive receipts (Step 1).
    ///
    /// Receipts satisfy `R = base × (1 + rate)`, so the base is `R / (1 + rate)`.
    /// If the divisor is zero the receipts are used as-is; this is a defensive
    /// guard, not an error condition.
    fn base_compensation(
        &self,
        receipts: Decimal,
        surcharge_rate: Decimal,
    ) -> Decimal {
        let divisor = Decimal::ONE + surcharge_rate;
        if divisor.is_zero() {
            warn!(
                surcharge_rate = %surcharge_rate,
                "Surcharge divisor is zero; treating receipts as base compensation"
            );
            return round_half_up(receipts);
        }
        round_half_up(receipts / divisor)
    }

    /// Recovers one channel's base compensation for the split variant.
    ///
    /// A channel with zero receipts has zero base, with no division at all.
    fn channel_base_compensation(
        &self,
        receipts: Decimal,
        surcharge_rate: Decimal,
    ) -> Decimal {
        if receipts == Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.base_compensation(receipts, surcharge_rate)
    }

    /// Calculates the notional taxable base (Step 3).
    ///
    /// The regime taxes a fixed fraction of base compensation, given by the
    /// profitability coefficient, regardless of actual expenses.
    fn taxable_base(
        &self,
        base_compensation: Decimal,
        profitability_coefficient: Decimal,
    ) -> Decimal {
        round_half_up(base_compensation * profitability_coefficient)
    }

    /// Calculates the subjective contribution (Step 4).
    ///
    /// The chosen percentage of the taxable base, never below the annual floor.
    fn subjective_contribution(
        &self,
        taxable_base: Decimal,
        subjective_rate_pct: Decimal,
    ) -> Decimal {
        let raw = round_half_up(subjective_rate_pct / Decimal::ONE_HUNDRED * taxable_base);
        max(raw, self.params.min_subjective)
    }

    /// Returns the maternity fee for this parameter set (Step 5).
    fn maternity_fee(&self) -> Decimal {
        self.params.maternity_fee.unwrap_or(Decimal::ZERO)
    }

    /// Calculates the contributions that reduce the taxable base (Step 7).
    ///
    /// Subjective and maternity always count; the integrative contribution
    /// counts only if the parameter set marks it deductible, which current
    /// fund policy does not.
    fn deductible_contributions(
        &self,
        subjective_contribution: Decimal,
        maternity_fee: Decimal,
        integrative_contribution: Decimal,
    ) -> Decimal {
        let integrative_part = if self.params.integrative_deductible {
            integrative_contribution
        } else {
            Decimal::ZERO
        };
        round_half_up(subjective_contribution + maternity_fee + integrative_part)
    }

    /// Calculates taxable income (Step 8).
    ///
    /// Deductible contributions can exceed the taxable base when the floors
    /// dominate; the result is clamped at zero so tax is never negative.
    fn taxable_income(
        &self,
        taxable_base: Decimal,
        deductible_contributions: Decimal,
    ) -> Decimal {
        max(round_half_up(taxable_base - deductible_contributions), Decimal::ZERO)
    }

    /// Calculates the substitute tax due (Step 9).
    fn substitute_tax(
        &self,
        taxable_income: Decimal,
        substitute_tax_rate: Decimal,
    ) -> Decimal {
        round_half_up(substitute_tax_rate * taxable_income)
    }
}
