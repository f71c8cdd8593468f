//! Request handlers

pub mod countries;
pub mod health;
pub mod providers;
pub mod services;
