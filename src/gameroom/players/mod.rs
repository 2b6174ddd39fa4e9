//! Automated seat policies.
mod fish;
mod tsumogiri;

pub use fish::*;
pub use tsumogiri::*;
