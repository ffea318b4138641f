//! Infrastructure layer: concrete implementations of domain traits and DTOs.

pub mod auth;
pub mod broker;
pub mod dto;
