// Backend access: the transport seam, its HTTP implementation and wire shapes
pub mod backend;
pub mod http_backend;
pub mod transport;
pub mod wire;

#[cfg(test)]
pub mod fake;

// Re-export commonly used types
pub use backend::ScribeBackend;
pub use http_backend::HttpBackend;
pub use transport::TransportError;
