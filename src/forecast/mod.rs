//! The forecast-derivation pipeline: pure numeric transformations from
//! raw space-weather series to displayable forecast data.
//!
//! Every function in this tree is a pure function of its inputs at call
//! time; nothing here holds state across refresh cycles. Insufficient or
//! degenerate input is signaled with `None`, never a panic, so a bad poll
//! cycle can never take down the schedule.

pub mod baseline;
pub mod cme;
pub mod coupling;
pub mod disturbance;
pub mod reach;
pub mod score;
pub mod substorm;

pub use coupling::CouplingOutlook;
pub use disturbance::CombinePolicy;
pub use reach::ObservationMode;
