use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Annual gross receipts, split by invoicing channel.
///
/// Receipts are gross of the ENPAP integrative surcharge: the amounts here
/// are what the professional actually invoiced, surcharge included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeStreams {
    /// A single income stream, invoiced at the private-client surcharge rate.
    Single { gross_receipts: Decimal },

    /// Separate private and public-administration streams, each invoiced at
    /// its own surcharge rate.
    Split {
        private_receipts: Decimal,
        public_receipts: Decimal,
    },
}

impl IncomeStreams {
    /// Total gross receipts across all streams.
    pub fn total_receipts(&self) -> Decimal {
        match self {
            Self::Single { gross_receipts } => *gross_receipts,
            Self::Split {
                private_receipts,
                public_receipts,
            } => *private_receipts + *public_receipts,
        }
    }
}
