pub mod notifier;

pub use notifier::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
