//! Page Actions
//!
//! Abstract surface for the actions a command can perform on the embedding
//! host (a browser page, a test harness, a simulator). The dispatcher never
//! touches the host directly.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Actions the embedder exposes to voice commands
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Scroll vertically by `dy` pixels (negative scrolls up)
    async fn scroll_by(&self, dy: i32) -> Result<()>;
    async fn scroll_to_top(&self) -> Result<()>;
    async fn scroll_to_bottom(&self) -> Result<()>;
    async fn navigate_back(&self) -> Result<()>;
    async fn navigate_forward(&self) -> Result<()>;
    async fn refresh(&self) -> Result<()>;
    /// Insert text into the focused input, if any. Returns false when no
    /// input has focus.
    async fn type_text(&self, text: &str) -> Result<bool>;
    async fn clear_input(&self) -> Result<()>;
    async fn submit(&self) -> Result<()>;
}

/// Driver that logs each action instead of performing it. Default for the
/// standalone binary, where no page is attached.
pub struct LoggingPageDriver;

#[async_trait]
impl PageDriver for LoggingPageDriver {
    async fn scroll_by(&self, dy: i32) -> Result<()> {
        info!("⬇️ scroll_by({})", dy);
        Ok(())
    }

    async fn scroll_to_top(&self) -> Result<()> {
        info!("⬆️ scroll_to_top");
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        info!("⬇️ scroll_to_bottom");
        Ok(())
    }

    async fn navigate_back(&self) -> Result<()> {
        info!("⬅️ navigate_back");
        Ok(())
    }

    async fn navigate_forward(&self) -> Result<()> {
        info!("➡️ navigate_forward");
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        info!("🔄 refresh");
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<bool> {
        info!("✏️ type_text('{}')", text);
        Ok(true)
    }

    async fn clear_input(&self) -> Result<()> {
        info!("🧹 clear_input");
        Ok(())
    }

    async fn submit(&self) -> Result<()> {
        info!("📤 submit");
        Ok(())
    }
}
