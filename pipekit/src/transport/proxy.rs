//! Transport proxy double.

use super::{error_arg, BatchCallback, CallLog, TransportBatch, TransportConfig};
use crate::document::MessageFactory;
use std::sync::Arc;

/// Constructs the batch returned by [`TransportProxy::get_batch`].
pub type BatchConstructor =
    Box<dyn Fn(Option<Arc<BatchCallback>>, Option<serde_json::Value>) -> TransportBatch + Send + Sync>;

/// Records adapter calls into the messaging runtime.
pub struct TransportProxy {
    calls: CallLog,
    new_batch: BatchConstructor,
    message_factory: MessageFactory,
}

impl Default for TransportProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportProxy {
    /// Creates a proxy that hands out plain [`TransportBatch`]es.
    #[must_use]
    pub fn new() -> Self {
        Self::with_batch_constructor(TransportBatch::with_callback)
    }

    /// Creates a proxy with a custom batch constructor.
    #[must_use]
    pub fn with_batch_constructor<F>(new_batch: F) -> Self
    where
        F: Fn(Option<Arc<BatchCallback>>, Option<serde_json::Value>) -> TransportBatch
            + Send
            + Sync
            + 'static,
    {
        Self {
            calls: CallLog::new(),
            new_batch: Box::new(new_batch),
            message_factory: MessageFactory::new(),
        }
    }

    /// Opens a new batch.
    pub fn get_batch(
        &self,
        callback: Option<Arc<BatchCallback>>,
        cookie: Option<serde_json::Value>,
    ) -> TransportBatch {
        self.calls.record(
            "get_batch",
            vec![
                serde_json::json!(callback.is_some()),
                cookie.clone().unwrap_or(serde_json::Value::Null),
            ],
        );
        (self.new_batch)(callback, cookie)
    }

    /// Returns a message factory.
    pub fn get_message_factory(&self) -> MessageFactory {
        self.calls.record("get_message_factory", vec![]);
        self.message_factory
    }

    /// Registers an isolated receiver for `url`.
    pub fn register_isolated_receiver(&self, url: &str, config: &TransportConfig) {
        self.calls.record(
            "register_isolated_receiver",
            vec![
                serde_json::json!(url),
                serde_json::json!(config.urls().collect::<Vec<_>>()),
            ],
        );
    }

    /// Reports that a receive location is shutting down.
    pub fn receiver_shutting_down(&self, url: &str, error: Option<&anyhow::Error>) {
        self.calls.record(
            "receiver_shutting_down",
            vec![
                serde_json::json!(url),
                error.map_or(serde_json::Value::Null, error_arg),
            ],
        );
    }

    /// Terminates the isolated receiver.
    pub fn terminate_isolated_receiver(&self) {
        self.calls.record("terminate_isolated_receiver", vec![]);
    }

    /// Reports an adapter error.
    pub fn set_error_info(&self, error: &anyhow::Error) {
        self.calls.record("set_error_info", vec![error_arg(error)]);
    }

    /// Returns the call log.
    #[must_use]
    pub const fn calls(&self) -> &CallLog {
        &self.calls
    }
}

impl std::fmt::Debug for TransportProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportProxy")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PropertyStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_get_batch_passes_callback_and_cookie() {
        let proxy = TransportProxy::new();
        let callback = Arc::new(BatchCallback::new());

        let batch = proxy.get_batch(Some(callback), Some(serde_json::json!(7)));

        assert!(batch.callback().is_some());
        assert_eq!(batch.cookie(), Some(&serde_json::json!(7)));
        let call = proxy.calls().last().unwrap();
        assert_eq!(call.method, "get_batch");
        assert_eq!(call.args, vec![serde_json::json!(true), serde_json::json!(7)]);
    }

    #[test]
    fn test_custom_batch_constructor() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let proxy = TransportProxy::with_batch_constructor(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            let batch = TransportBatch::new();
            batch.calls().record("prepared", vec![]);
            batch
        });

        let batch = proxy.get_batch(None, None);

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(batch.calls().count_of("prepared"), 1);
    }

    #[test]
    fn test_receiver_shutting_down_recorded_under_own_name() {
        let proxy = TransportProxy::new();
        let error = anyhow::anyhow!("disk full");

        proxy.receiver_shutting_down("file://in", Some(&error));

        assert_eq!(proxy.calls().count_of("register_isolated_receiver"), 0);
        let call = &proxy.calls().calls_to("receiver_shutting_down")[0];
        assert_eq!(call.args[0], "file://in");
        assert_eq!(call.args[1], "disk full");
    }

    #[test]
    fn test_receiver_lifecycle_calls() {
        let proxy = TransportProxy::new();
        let mut config = TransportConfig::new();
        config
            .add_receive_endpoint("file://in", PropertyStore::new(), PropertyStore::new())
            .unwrap();

        proxy.register_isolated_receiver("file://in", &config);
        proxy.set_error_info(&anyhow::anyhow!("oops"));
        proxy.terminate_isolated_receiver();
        let _factory = proxy.get_message_factory();

        let methods: Vec<String> = proxy.calls().calls().into_iter().map(|c| c.method).collect();
        assert_eq!(
            methods,
            vec![
                "register_isolated_receiver",
                "set_error_info",
                "terminate_isolated_receiver",
                "get_message_factory",
            ]
        );
        assert_eq!(
            proxy.calls().calls()[0].args[1],
            serde_json::json!(["file://in"])
        );
    }
}
