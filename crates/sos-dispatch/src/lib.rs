//! Emergency reporting backend: nearby service lookup, incident tracking, SOS alerts and
//! response team dispatch.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod geo;
pub mod overpass;
pub mod telemetry;

pub use error::AppError;
