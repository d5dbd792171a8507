//! Transport-side doubles.
//!
//! Each double appends `(method, args)` to an ordered [`CallLog`] and
//! notifies subscribed observers; none of them deliver anything.

mod batch;
mod call_log;
mod callback;
mod config;
mod proxy;

pub use batch::TransportBatch;
pub use call_log::{error_arg, message_arg, CallLog, CallObserver, MethodCall};
pub use callback::{BatchCallback, BatchOperation, BatchOperationStatus};
pub use config::{ReceiveEndpoint, TransportConfig};
pub use proxy::{BatchConstructor, TransportProxy};
