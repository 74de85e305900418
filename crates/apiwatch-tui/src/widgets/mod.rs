//! Small rendering helpers shared by screens.

pub mod fmt;
pub mod pulse;
pub mod status_badge;
