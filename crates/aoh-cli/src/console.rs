//! Terminal notifier.

use aoh_core::notify::{Notification, Notifier, Severity};
use tracing::{error, info, warn};

/// Prints notifications: information on stdout, warnings and errors on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        let Notification {
            severity,
            title,
            message,
        } = notification;
        match severity {
            Severity::Information => {
                info!(%title, "{message}");
                println!("{title}: {message}");
            },
            Severity::Warning => {
                warn!(%title, "{message}");
                eprintln!("{title}: {message}");
            },
            Severity::Critical => {
                error!(%title, "{message}");
                eprintln!("{title}: {message}");
            },
        }
    }
}
