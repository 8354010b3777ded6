//! File access for local checkouts

mod checkout;

pub use checkout::CheckoutDir;
