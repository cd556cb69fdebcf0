//! Outcome notifications.
//!
//! A run ends with exactly one [`Notification`]. Notifiers are stateless: the
//! severity, title and message travel with each call.

use crate::error::AohError;
use crate::types::Provisioned;

/// How prominent a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Warning,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Information => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// A message for the user about the outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Notification for a failed run.
    #[must_use]
    pub fn from_error(error: &AohError) -> Self {
        let severity = match error {
            AohError::RunInProgress => Severity::Warning,
            _ => Severity::Critical,
        };
        Self::new(severity, error.title(), error.user_message())
    }

    /// Notification for a successful run.
    #[must_use]
    pub fn completed(provisioned: &Provisioned) -> Self {
        let message = if provisioned.created {
            format!(
                "Created integer field {} on layer {}",
                provisioned.field, provisioned.layer.name
            )
        } else {
            format!(
                "Using existing field {} on layer {}",
                provisioned.field, provisioned.layer.name
            )
        };
        Self::new(Severity::Information, "Mission complete", message)
    }
}

/// Delivers notifications to the user.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Sends the notification matching `outcome` and returns it.
pub fn report<N>(notifier: &N, outcome: &Result<Provisioned, AohError>) -> Notification
where
    N: Notifier + ?Sized,
{
    let notification = match outcome {
        Ok(provisioned) => Notification::completed(provisioned),
        Err(error) => Notification::from_error(error),
    };
    notifier.notify(&notification);
    notification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GridSize, IDENTITY_TRANSFORM, RasterDescriptor, VectorLayerDescriptor};
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<Notification>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, notification: &Notification) {
            self.seen.borrow_mut().push(notification.clone());
        }
    }

    fn provisioned(created: bool) -> Provisioned {
        let raster = RasterDescriptor::new("r.tif", GridSize::new(1, 1), IDENTITY_TRANSFORM, "");
        Provisioned {
            dem: raster.clone(),
            classification: raster,
            layer: VectorLayerDescriptor {
                container: PathBuf::from("habitat.gdb"),
                name: "zones".to_string(),
                fields: vec![],
            },
            field: "aoh_val".to_string(),
            created,
        }
    }

    #[test]
    fn test_error_notification() {
        let n = Notification::from_error(&AohError::FieldNameCollision("h3".to_string()));
        assert_eq!(n.severity, Severity::Critical);
        assert_eq!(n.title, "Field error");
        assert_eq!(n.message, "Field h3 already exists");
    }

    #[test]
    fn test_busy_is_a_warning() {
        let n = Notification::from_error(&AohError::RunInProgress);
        assert_eq!(n.severity, Severity::Warning);
    }

    #[test]
    fn test_report_sends_exactly_one() {
        let recorder = Recorder::default();
        let sent = report(&recorder, &Ok(provisioned(true)));
        assert_eq!(sent.severity, Severity::Information);
        assert_eq!(sent.message, "Created integer field aoh_val on layer zones");

        report(&recorder, &Err(AohError::EmptyFieldName));
        let seen = recorder.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].message, "Please add a field name to store aoh");
    }

    #[test]
    fn test_completed_existing_field() {
        let n = Notification::completed(&provisioned(false));
        assert_eq!(n.title, "Mission complete");
        assert!(n.message.starts_with("Using existing field"));
    }
}
