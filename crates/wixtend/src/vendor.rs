//! Vendor customization of a generated installer definition

pub mod extend;
pub mod fragments;
pub mod profile;

pub use extend::{ExtendReport, extend};
pub use profile::VendorProfile;
