//! Response types returned by the transport

mod api_response;
mod error_body;

pub use api_response::ApiResponse;
pub use error_body::ErrorBody;
