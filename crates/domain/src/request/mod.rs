//! Request types sent through the transport

mod api_request;
mod body;
mod header;
mod method;

pub use api_request::ApiRequest;
pub use body::RequestBody;
pub use header::{AUTHORIZATION, Header, Headers};
pub use method::HttpMethod;
