//! Domain types of the marketplace and the ports to its collaborators.

pub mod appointment;
pub mod auth;
pub mod catalog;
pub mod ports;
pub mod profile;
pub mod tutor;
pub mod wallet;
