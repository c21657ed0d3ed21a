//! ENPAP forfettario worksheet implementations.
//!
//! This module contains the calculation logic for the net-income worksheet
//! that itemizes contributions, substitute tax, and net income.

pub mod net_income;

pub use net_income::{
    INTEGRATIVE_DEDUCTIBLE, NetIncomeWorksheet, NetIncomeWorksheetError, NetIncomeWorksheetInput,
    NetIncomeWorksheetResult, RegimeParameters, StreamBreakdown,
};
