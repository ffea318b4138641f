//! Data Transfer Objects (DTOs) for the debate chat broker.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket command / event frame DTOs
//! - `http`: HTTP API request / response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
