//! HTTP surface - routes, handlers and server-rendered pages

pub mod handlers;
pub mod pages;
pub mod routes;
