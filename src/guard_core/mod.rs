//! # Guard Core
//!
//! The read and write engines built on top of the permission resolver.
//!
//! * `projection` - [`Projector`], redacted reads with recursion into nested
//!   governed documents and populated references
//! * `mutation` - [`Updater`], all-or-nothing partial updates
//!
//! Both fan out one branch per field and join on all of them before
//! producing a result.

pub mod mutation;
pub mod projection;

pub use mutation::Updater;
pub use projection::{ProjectionOptions, Projector};
