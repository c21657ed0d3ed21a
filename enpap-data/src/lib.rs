pub mod loader;

pub use loader::{
    ParameterLoader, ParameterLoaderError, ParameterTable, RegimeParameterRecord,
};
