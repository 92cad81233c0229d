//! Host platform integration.
//!
//! The host shell owns the window the client runs in: it can open the
//! betting site, fire a success notification, and show alerts. All calls
//! are fire-and-forget.

use tracing::info;

/// Operations the host shell exposes to the client.
#[cfg_attr(test, mockall::automock)]
pub trait HostPlatform: Send + Sync {
    /// Tell the host the client finished loading.
    fn ready(&self);

    /// Ask the host for the full viewport.
    fn expand(&self);

    /// Open an external page (the betting site) in the host's browser.
    fn open_external_surface(&self, url: &str);

    /// Success notification (haptic feedback on mobile hosts).
    fn notify_success(&self);

    /// Modal alert with a text message.
    fn show_alert(&self, text: &str);
}

/// Alert shown when a probe reports a new bet.
pub fn bet_detected_alert(streak: i64) -> String {
    format!("✅ Bet detected! Your streak is now {streak}.")
}

/// Terminal host: prints to stdout and logs every call.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl HostPlatform for ConsoleHost {
    fn ready(&self) {
        info!("Host ready");
    }

    fn expand(&self) {
        info!("Host expanded");
    }

    fn open_external_surface(&self, url: &str) {
        info!(url, "Opening betting site");
        println!("Place your bet at: {url}");
    }

    fn notify_success(&self) {
        info!("Success notification");
        print!("\x07");
    }

    fn show_alert(&self, text: &str) {
        info!(text, "Alert");
        println!("{text}");
    }
}
