//! Chromium driver over the Chrome DevTools Protocol.
//!
//! Reads go through `Runtime.evaluate` against `querySelectorAll(sel)[i]`;
//! clicks, hovers and typing use chromiumoxide's element input so the page
//! sees real mouse and keyboard events.

use crate::driver::{not_found, DriverConfig, ProbeDriver};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

/// Real browser driver
#[derive(Debug)]
pub struct ChromiumDriver {
    config: DriverConfig,
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be launched
    pub async fn launch(config: DriverConfig) -> ProbeResult<Self> {
        let mut builder =
            CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;

        tracing::info!(
            headless = config.headless,
            width = config.viewport_width,
            height = config.viewport_height,
            "chromium launched"
        );

        Ok(Self {
            config,
            browser: Mutex::new(browser),
            page,
            handle,
        })
    }

    /// The launch configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    async fn eval<T: DeserializeOwned>(&self, action: &str, expr: String) -> ProbeResult<T> {
        let result = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| ProbeError::driver(action, e))?;
        let value = result.value().cloned().unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).map_err(|e| ProbeError::driver(action, e))
    }

    async fn element(&self, selector: &str, index: usize) -> ProbeResult<Element> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|_| not_found(selector, index))?;
        elements
            .into_iter()
            .nth(index)
            .ok_or_else(|| not_found(selector, index))
    }
}

/// `(() => { const el = document.querySelectorAll(sel)[i]; ... })()`
fn on_element(selector: &str, index: usize, body: &str) -> ProbeResult<String> {
    let sel = serde_json::to_string(selector)?;
    Ok(format!(
        "(() => {{ const el = document.querySelectorAll({sel})[{index}]; \
         if (!el) return null; {body} }})()"
    ))
}

#[async_trait]
impl ProbeDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let nav = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(self.config.navigation_timeout(), nav).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(ProbeError::Navigation {
                url: url.to_string(),
                message: format!("no load within {}ms", self.config.navigation_timeout_ms),
            }),
        }
    }

    async fn current_url(&self) -> ProbeResult<String> {
        self.page
            .url()
            .await
            .map_err(|e| ProbeError::driver("current_url", e))?
            .ok_or_else(|| ProbeError::driver("current_url", "page has no URL"))
    }

    async fn count(&self, selector: &str) -> ProbeResult<usize> {
        let sel = serde_json::to_string(selector)?;
        self.eval("count", format!("document.querySelectorAll({sel}).length"))
            .await
    }

    async fn text(&self, selector: &str, index: usize) -> ProbeResult<Option<String>> {
        let expr = on_element(selector, index, "return el.textContent;")?;
        self.eval("text", expr).await
    }

    async fn attribute(
        &self,
        selector: &str,
        index: usize,
        name: &str,
    ) -> ProbeResult<Option<String>> {
        let name = serde_json::to_string(name)?;
        let expr = on_element(selector, index, &format!("return el.getAttribute({name});"))?;
        self.eval("attribute", expr).await
    }

    async fn computed_style(
        &self,
        selector: &str,
        index: usize,
        property: &str,
    ) -> ProbeResult<Option<String>> {
        let property = serde_json::to_string(property)?;
        let expr = on_element(
            selector,
            index,
            &format!("return getComputedStyle(el).getPropertyValue({property});"),
        )?;
        self.eval("computed_style", expr).await
    }

    async fn is_visible(&self, selector: &str, index: usize) -> ProbeResult<bool> {
        let expr = on_element(
            selector,
            index,
            "const r = el.getBoundingClientRect(); const s = getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';",
        )?;
        let visible: Option<bool> = self.eval("is_visible", expr).await?;
        Ok(visible.unwrap_or(false))
    }

    async fn is_enabled(&self, selector: &str, index: usize) -> ProbeResult<bool> {
        let expr = on_element(selector, index, "return !el.disabled;")?;
        let enabled: Option<bool> = self.eval("is_enabled", expr).await?;
        Ok(enabled.unwrap_or(false))
    }

    async fn click(&self, selector: &str, index: usize) -> ProbeResult<()> {
        let element = self.element(selector, index).await?;
        element
            .click()
            .await
            .map_err(|e| ProbeError::driver("click", e))?;
        Ok(())
    }

    async fn hover(&self, selector: &str, index: usize) -> ProbeResult<()> {
        let element = self.element(selector, index).await?;
        element
            .hover()
            .await
            .map_err(|e| ProbeError::driver("hover", e))?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, index: usize, text: &str) -> ProbeResult<()> {
        let element = self.element(selector, index).await?;
        element
            .focus()
            .await
            .map_err(|e| ProbeError::driver("type", e))?;
        element
            .type_str(text)
            .await
            .map_err(|e| ProbeError::driver("type", e))?;
        Ok(())
    }

    async fn clear(&self, selector: &str, index: usize) -> ProbeResult<()> {
        let element = self.element(selector, index).await?;
        element
            .focus()
            .await
            .map_err(|e| ProbeError::driver("clear", e))?;
        // select-all then Backspace so framework change handlers fire
        let _: Option<bool> = self
            .eval(
                "clear",
                on_element(selector, index, "el.select(); return true;")?,
            )
            .await?;
        element
            .press_key("Backspace")
            .await
            .map_err(|e| ProbeError::driver("clear", e))?;
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        use base64::Engine;

        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| ProbeError::driver("screenshot", e))?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| ProbeError::driver("screenshot", e))
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| ProbeError::driver("close", e));
        self.handle.abort();
        closed
    }
}
