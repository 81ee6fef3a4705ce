//! Infrastructure layer: store adapters, the entry codec and the upstream
//! HTTP backend.

pub mod cache;
pub mod codec;
pub mod upstream;
