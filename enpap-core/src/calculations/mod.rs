//! Contribution and tax calculations for the ENPAP forfettario regime.
//!
//! This module provides the worksheet-style calculation logic that turns
//! annual gross receipts into an itemized breakdown of ENPAP contributions,
//! substitute tax, and net income.

pub mod common;
pub mod worksheets;

pub use worksheets::net_income::{
    INTEGRATIVE_DEDUCTIBLE, NetIncomeWorksheet, NetIncomeWorksheetError, NetIncomeWorksheetInput,
    NetIncomeWorksheetResult, RegimeParameters, StreamBreakdown,
};
