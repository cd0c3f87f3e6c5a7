pub mod error;
pub mod interpret;
pub mod math;
pub mod types;

#[cfg(feature = "loans")]
pub mod loan;

#[cfg(feature = "investing")]
pub mod investing;

#[cfg(feature = "health")]
pub mod health;

pub use error::CalcError;
pub use types::*;

/// Standard result type for all calc-kit operations
pub type CalcResult<T> = Result<T, CalcError>;
