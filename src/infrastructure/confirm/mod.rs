//! Confirm implementations

mod interactive;

pub use interactive::InteractiveConfirm;
