// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod pricing_repository;
pub mod testimonial_repository;

pub use pricing_repository::PricingRepository;
pub use testimonial_repository::TestimonialRepository;
