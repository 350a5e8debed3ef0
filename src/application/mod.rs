//! Application layer: the user-facing workflows of the marketplace.
//!
//! Each service owns the ports it needs and performs one action the front
//! end offers (booking, searching, asking for a recommendation, managing the
//! session). Services hold no view state; the caller keeps an `AppState`.

pub mod booking;
pub mod dashboard;
pub mod recommend;
pub mod search;
pub mod session;
