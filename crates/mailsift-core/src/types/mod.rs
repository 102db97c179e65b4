//! Core types for mailsift.

mod extraction;
mod message;

pub use extraction::*;
pub use message::*;
