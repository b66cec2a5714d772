//! Adapters for external systems.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
