use async_trait::async_trait;

use crate::{Answer, DispatchError};

#[async_trait]
pub trait QueryDispatcher: Send + Sync {
    /// Short identifier for status display.
    fn name(&self) -> &str;

    /// Human-readable target, e.g. the URL questions are posted to.
    fn target(&self) -> String {
        self.name().to_string()
    }

    /// Send one question and wait for its answer.
    ///
    /// Exactly one outbound call is made per invocation.  Every failure mode
    /// (transport, status, payload) is reported as the same [`DispatchError`].
    async fn dispatch(&self, query: &str) -> Result<Answer, DispatchError>;
}
