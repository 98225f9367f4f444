pub mod amount;
pub mod error;
pub mod json;
pub mod month;

pub use amount::{Amount, coerce_amount};
pub use error::{Result, StoreError};
pub use month::{Month, parse_date};
