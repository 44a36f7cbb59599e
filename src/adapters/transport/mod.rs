//! Transport adapters - implementations of the HttpTransport port.
//!
//! - **ReqwestTransport** - real network calls
//! - **MockTransport** - scripted replies with call recording

mod mock_transport;
mod reqwest_transport;

pub use mock_transport::{MockReply, MockTransport};
pub use reqwest_transport::ReqwestTransport;
