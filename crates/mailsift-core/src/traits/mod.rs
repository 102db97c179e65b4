//! Core traits for mailsift providers.

mod mailbox;

pub use mailbox::*;
