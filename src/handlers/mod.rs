// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod cron;
pub mod health;
pub mod photos;
pub mod pricing;
pub mod testimonials;

pub use cron::config as cron_config;
pub use health::config as health_config;
pub use photos::config as photos_config;
pub use pricing::config as pricing_config;
pub use testimonials::config as testimonials_config;
