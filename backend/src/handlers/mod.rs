//! HTTP handlers for the Rubber Carbon Assessment Platform

mod carbon;
mod geocoding;
mod health;
mod plot;
mod workflow;

pub use carbon::*;
pub use geocoding::*;
pub use health::*;
pub use plot::*;
pub use workflow::*;
