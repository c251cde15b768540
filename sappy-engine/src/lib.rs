//! State and reward rules for the Sappy water-saving companion.
//!
//! - [`usage`] maps a day's water usage onto Sappy's plant state and gauge.
//! - [`profile`] turns onboarding answers into the household profile sent
//!   to the inference service.
//! - [`store`] holds the points balance, the item catalog and purchases.
//! - [`reward`] converts saved water into points at the end of each day.
//! - `gateway` (feature `api`) posts the profile to the inference service.

pub mod error;
#[cfg(feature = "api")]
pub mod gateway;
pub mod profile;
pub mod reward;
pub mod store;
pub mod usage;

pub use error::{Result, SappyError};
