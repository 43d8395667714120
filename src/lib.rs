//! Header-driven HTTP resource transfer server
//!
//! `GET /download` streams a stored resource back to the client and
//! `PUT|POST /upload` pipes the request body into one. The resource and its
//! access mode travel in the `X-Resource` and `X-Mode` headers; the backing
//! medium is any [`store::ResourceStore`].

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod store;
