// ABOUTME: Chat platforms the relay can deliver to (console, Telegram)
// ABOUTME: Factory builds the selected platform from configuration

pub mod console;
#[cfg(feature = "telegram")]
pub mod telegram;

pub use console::{ConsoleCall, ConsolePlatform};
#[cfg(feature = "telegram")]
pub use telegram::TelegramPlatform;

use anyhow::Result;
use jake_core::config::Config;
use jake_core::traits::{ChatPlatform, PlatformCapabilities};
use std::sync::Arc;
use std::time::Duration;

/// Typing presence shown on the console lasts this long
const CONSOLE_TYPING_EXPIRY: Duration = Duration::from_secs(10);

/// Console platform configured from the `[console]` and `[stream]` sections
pub fn console_platform(config: &Config) -> ConsolePlatform {
    let caps = PlatformCapabilities::new(config.console.char_limit)
        .with_edit(config.console.supports_edit)
        .with_edit_interval(config.stream.edit_interval());
    ConsolePlatform::new(caps).with_typing(CONSOLE_TYPING_EXPIRY)
}

/// Create a platform instance by id
pub async fn create_platform(config: &Config, platform_id: &str) -> Result<Arc<dyn ChatPlatform>> {
    match platform_id {
        "console" => Ok(Arc::new(console_platform(config))),
        #[cfg(feature = "telegram")]
        "telegram" => {
            let tg_config = config
                .telegram
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Telegram not configured: add a [telegram] section"))?;
            let platform = TelegramPlatform::new(tg_config, config.stream.edit_interval());
            platform.verify().await?;
            Ok(Arc::new(platform))
        }
        #[cfg(not(feature = "telegram"))]
        "telegram" => {
            anyhow::bail!("Telegram support not compiled. Build with --features telegram")
        }
        _ => anyhow::bail!("Unknown platform: {}", platform_id),
    }
}
