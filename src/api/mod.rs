//! HTTP surface: handlers, route table and middleware.

pub mod middleware;
pub mod services;
