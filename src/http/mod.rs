//! Request templates and the transport used to send them.
mod template;
mod transport;


pub use template::{BasicAuth, RequestOptions};
pub use transport::{HttpTransport, Transport, TransportSettings};
