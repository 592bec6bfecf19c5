// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod photo;
pub mod pricing;
pub mod testimonial;

pub use photo::*;
pub use pricing::*;
pub use testimonial::*;
