mod income_streams;
mod regime_standing;

pub use income_streams::IncomeStreams;
pub use regime_standing::RegimeStanding;
