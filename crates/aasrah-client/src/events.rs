//! Transient notifications and navigation requests fanned out to the views.

use tokio::sync::broadcast;

use crate::router::Route;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// A dismissable notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Toast(Toast),
    Navigate(Route),
    /// One or more report buckets changed membership.
    ReportsChanged,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: AppEvent) {
        if let Err(e) = self.tx.send(event) {
            // Nobody is listening (e.g. during start-up); the event is dropped.
            tracing::debug!(event = ?e.0, "No event subscribers");
        }
    }

    pub fn toast(&self, toast: Toast) {
        self.emit(AppEvent::Toast(toast));
    }

    pub fn navigate(&self, route: Route) {
        self.emit(AppEvent::Navigate(route));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.toast(Toast::info("Saved", "All good"));
        bus.navigate(Route::Dashboard);

        assert_eq!(
            rx.recv().await.unwrap(),
            AppEvent::Toast(Toast::info("Saved", "All good"))
        );
        assert_eq!(rx.recv().await.unwrap(), AppEvent::Navigate(Route::Dashboard));
    }

    #[test]
    fn test_emit_without_subscribers_is_harmless() {
        EventBus::new().toast(Toast::error("Error", "nobody listens"));
    }
}
