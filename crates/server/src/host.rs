//! Host side of the notification surface.
//!
//! A stdio server has no display, so shown notifications are logged and kept
//! by tag, and the open views are whatever the caller reports.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use wayside_client::{ClientView, ClientViews, Notification, Notifier};
use wayside_core::Error;

/// Records displayed notifications; a notification replaces any shown with the same tag.
#[derive(Default)]
pub struct LogNotifier {
    shown: Mutex<HashMap<String, Notification>>,
}

impl LogNotifier {
    /// Notifications currently on display.
    pub fn shown(&self) -> Vec<Notification> {
        match self.shown.lock() {
            Ok(shown) => shown.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        let mut shown = self
            .shown
            .lock()
            .map_err(|_| Error::NotifyFailed("notification registry poisoned".into()))?;
        let replaced = shown
            .insert(notification.tag.clone(), notification.clone())
            .is_some();
        tracing::info!(
            tag = %notification.tag,
            title = %notification.title,
            url = %notification.data.url,
            replaced,
            "notification displayed"
        );
        Ok(())
    }

    async fn close(&self, notification: &Notification) -> Result<(), Error> {
        let mut shown = self
            .shown
            .lock()
            .map_err(|_| Error::NotifyFailed("notification registry poisoned".into()))?;
        shown.remove(&notification.tag);
        Ok(())
    }
}

/// Views reported by the caller of a single click.
pub struct SuppliedViews {
    views: Vec<ClientView>,
}

impl SuppliedViews {
    pub fn new(views: Vec<ClientView>) -> Self {
        Self { views }
    }
}

#[async_trait]
impl ClientViews for SuppliedViews {
    async fn list(&self, _include_uncontrolled: bool) -> Result<Vec<ClientView>, Error> {
        Ok(self.views.clone())
    }

    async fn focus(&self, id: &str) -> Result<(), Error> {
        if !self.views.iter().any(|view| view.id == id) {
            return Err(Error::NotifyFailed(format!("no open view with id {id}")));
        }
        tracing::info!(view = id, "focusing view");
        Ok(())
    }

    async fn open(&self, url: &str) -> Result<(), Error> {
        tracing::info!(url, "opening view");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayside_client::{NotificationDefaults, PushPayload};
    use wayside_core::AppConfig;

    fn notification(raw: &str) -> Notification {
        NotificationDefaults::from(&AppConfig::default()).build(PushPayload::parse(raw.as_bytes()).into_payload())
    }

    #[tokio::test]
    async fn test_same_tag_replaces() {
        let notifier = LogNotifier::default();
        notifier.show(&notification(r#"{"title":"one"}"#)).await.unwrap();
        notifier.show(&notification(r#"{"title":"two"}"#)).await.unwrap();
        notifier.show(&notification(r#"{"title":"dm","tag":"dm-7"}"#)).await.unwrap();

        let mut titles: Vec<String> = notifier.shown().into_iter().map(|n| n.title).collect();
        titles.sort();
        assert_eq!(titles, vec!["dm", "two"]);
    }

    #[tokio::test]
    async fn test_close_removes() {
        let notifier = LogNotifier::default();
        let shown = notification("plain text");
        notifier.show(&shown).await.unwrap();
        notifier.close(&shown).await.unwrap();
        assert!(notifier.shown().is_empty());
    }

    #[tokio::test]
    async fn test_focus_unknown_view_fails() {
        let views = SuppliedViews::new(vec![ClientView { id: "a".into(), url: "https://c.example/feed".into() }]);
        assert!(views.focus("a").await.is_ok());
        assert!(matches!(views.focus("b").await, Err(Error::NotifyFailed(_))));
    }
}
