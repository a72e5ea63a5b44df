use async_trait::async_trait;
use serde_json::Value;

use crate::types::DriverError;

/// Opens browser sessions. One call, one independent session.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn open(&self) -> Result<Box<dyn SessionDriver>, DriverError>;
}

/// A single live browser session.
///
/// Page-level queries return the visible text of every element matching a CSS
/// selector on the live page. Card-level extraction works on
/// [`SessionDriver::page_source`] instead, so it never races the page.
#[async_trait]
pub trait SessionDriver: Send {
    /// Returns once navigation has completed.
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Texts of all elements matching `selector`, in document order.
    async fn query(&mut self, selector: &str) -> Result<Vec<String>, DriverError>;

    async fn exists(&mut self, selector: &str) -> Result<bool, DriverError> {
        Ok(!self.query(selector).await?.is_empty())
    }

    /// Types `text` into the first element matching `selector`.
    async fn fill(&mut self, selector: &str, text: &str) -> Result<(), DriverError>;

    async fn click(&mut self, selector: &str) -> Result<(), DriverError>;

    /// Runs `script` as a function body; `args` are visible as `arguments`.
    async fn execute(&mut self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;

    /// Serialized DOM of the current page.
    async fn page_source(&mut self) -> Result<String, DriverError>;

    /// Releases the session. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), DriverError>;
}
