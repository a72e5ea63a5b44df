use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::driver::{SessionDriver, SessionLauncher};
use crate::types::DriverError;

const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-notifications",
    "--start-maximized",
    "--log-level=3",
    "--disable-infobars",
];

const STEALTH_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    /// Explicit browser binary; otherwise the usual install locations are probed.
    pub executable: Option<PathBuf>,
    pub window_size: (u32, u32),
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: false,
            executable: None,
            window_size: (1440, 900),
        }
    }
}

/// Launches a local Chrome/Chromium over the DevTools protocol.
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    options: ChromeOptions,
}

impl ChromeLauncher {
    pub fn new(options: ChromeOptions) -> Self {
        Self { options }
    }

    fn browser_config(&self) -> Result<BrowserConfig, DriverError> {
        let (width, height) = self.options.window_size;
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .args(LAUNCH_ARGS.iter().copied());
        if !self.options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.options.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(DriverError::Unavailable)
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn open(&self) -> Result<Box<dyn SessionDriver>, DriverError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| DriverError::Unavailable(err.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    engine_debug!("chrome handler event error: {err}");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| DriverError::Unavailable(err.to_string()))?;
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
            .await
            .map_err(|err| DriverError::Unavailable(err.to_string()))?;

        engine_info!("Browser session opened");
        Ok(Box::new(ChromeSession {
            browser: Some(browser),
            page,
            handler_task: Some(handler_task),
        }))
    }
}

pub struct ChromeSession {
    browser: Option<Browser>,
    page: Page,
    handler_task: Option<JoinHandle<()>>,
}

fn protocol(err: CdpError) -> DriverError {
    DriverError::Protocol(err.to_string())
}

impl ChromeSession {
    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.browser.is_none() {
            return Err(DriverError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionDriver for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.page
            .goto(url)
            .await
            .map_err(|err| DriverError::Navigation {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        Ok(())
    }

    async fn query(&mut self, selector: &str) -> Result<Vec<String>, DriverError> {
        self.ensure_open()?;
        let elements = match self.page.find_elements(selector).await {
            Ok(elements) => elements,
            // Nothing matched.
            Err(CdpError::NotFound) => return Ok(Vec::new()),
            Err(err) => return Err(protocol(err)),
        };
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            texts.push(element.inner_text().await.map_err(protocol)?.unwrap_or_default());
        }
        Ok(texts)
    }

    async fn exists(&mut self, selector: &str) -> Result<bool, DriverError> {
        self.ensure_open()?;
        match self.page.find_elements(selector).await {
            Ok(elements) => Ok(!elements.is_empty()),
            Err(CdpError::NotFound) => Ok(false),
            Err(err) => Err(protocol(err)),
        }
    }

    async fn fill(&mut self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| DriverError::ElementMissing(selector.to_string()))?;
        element.click().await.map_err(protocol)?;
        element.type_str(text).await.map_err(protocol)?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| DriverError::ElementMissing(selector.to_string()))?;
        element.click().await.map_err(protocol)?;
        Ok(())
    }

    async fn execute(&mut self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.ensure_open()?;
        let args = Value::Array(args).to_string();
        let expression = format!("(function() {{ {script} }}).apply(null, {args})");
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|err| DriverError::Script(err.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        self.ensure_open()?;
        self.page.content().await.map_err(protocol)
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        let closed = browser.close().await.map_err(protocol);
        if let Err(err) = browser.wait().await {
            engine_warn!("Waiting for browser exit failed: {err}");
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        engine_info!("Browser session closed");
        closed.map(|_| ())
    }
}
