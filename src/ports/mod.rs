//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the client core and the outside world. Adapters implement these ports.
//!
//! - `HttpTransport` - single HTTP round trip
//! - `KeyValueStore` - durable storage that survives page reloads
//! - `Navigator` - current location, redirects and history replacement
//! - `BackoffTimer` - suspension between retry attempts

mod backoff_timer;
mod http_transport;
mod key_value_store;
mod navigator;

pub use backoff_timer::BackoffTimer;
pub use http_transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError, TransportErrorKind,
};
pub use key_value_store::{read_json, write_json, KeyValueStore, StorageError};
pub use navigator::{NavigationError, Navigator};
