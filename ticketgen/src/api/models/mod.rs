//! API request and response models.

pub mod health;
pub mod tickets;
