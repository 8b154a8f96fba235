//! Worker primitives for search streams.
//!
//! A [`TaskGroup`] tracks every background task spawned for one stream so
//! callers can wait for all of them (optionally with a deadline), and carries
//! the [`QuitToken`] the tasks poll for cooperative cancellation.

mod class;
mod group;
mod token;

pub use class::TaskClass;
pub use group::TaskGroup;
pub use token::QuitToken;
