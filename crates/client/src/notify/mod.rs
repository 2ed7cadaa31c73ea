//! Push notification channel.
//!
//! Independent of request interception. Two entry points:
//!
//! - **deliver**: decode a push payload and display a notification. A payload
//!   that is not JSON still produces a notification with the text as its body.
//! - **click**: close the notification, then focus the first open view whose
//!   location contains the notification's target URL, or open a new view there.
//!
//! The platform is reached through [`Notifier`] and [`ClientViews`].

pub mod click;
pub mod payload;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use wayside_core::{AppConfig, Error};

pub use click::{ClickOutcome, ClientView, find_view};
pub use payload::{NotificationAction, NotificationPayload, PushPayload};

/// Data embedded in a notification for the click handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
    /// Delivery time, milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
}

/// A notification as handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub tag: String,
    pub renotify: bool,
    pub actions: Vec<NotificationAction>,
    pub data: NotificationData,
}

/// A user interaction with a displayed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationClick {
    pub notification: Notification,
    /// Identifier of the action button pressed, if any.
    pub action: Option<String>,
}

/// Values used where the payload leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDefaults {
    pub title: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub url: String,
    pub vibrate: Vec<u32>,
}

impl From<&AppConfig> for NotificationDefaults {
    fn from(config: &AppConfig) -> Self {
        Self {
            title: config.app_name.clone(),
            icon: config.notification_icon.clone(),
            badge: config.notification_badge.clone(),
            tag: config.notification_tag.clone(),
            url: "/".into(),
            vibrate: config.vibrate.clone(),
        }
    }
}

impl NotificationDefaults {
    /// Fill in a notification from a payload, stamping the delivery time.
    pub fn build(&self, payload: NotificationPayload) -> Notification {
        Notification {
            title: payload.title.unwrap_or_else(|| self.title.clone()),
            body: payload.body.unwrap_or_default(),
            icon: self.icon.clone(),
            badge: self.badge.clone(),
            vibrate: self.vibrate.clone(),
            tag: payload.tag.unwrap_or_else(|| self.tag.clone()),
            renotify: payload.renotify.unwrap_or(false),
            actions: payload.actions,
            data: NotificationData {
                url: payload.url.unwrap_or_else(|| self.url.clone()),
                date_of_arrival: Utc::now().timestamp_millis(),
            },
        }
    }
}

/// Displays and dismisses local notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;

    async fn close(&self, notification: &Notification) -> Result<(), Error>;
}

/// The application's open views.
#[async_trait]
pub trait ClientViews: Send + Sync {
    /// Every open view; with `include_uncontrolled`, also views served by an
    /// older generation of the agent.
    async fn list(&self, include_uncontrolled: bool) -> Result<Vec<ClientView>, Error>;

    async fn focus(&self, id: &str) -> Result<(), Error>;

    async fn open(&self, url: &str) -> Result<(), Error>;
}

/// Delivery and click routing for push notifications.
pub struct NotificationChannel {
    defaults: NotificationDefaults,
    notifier: Arc<dyn Notifier>,
    views: Arc<dyn ClientViews>,
}

impl NotificationChannel {
    pub fn new(defaults: NotificationDefaults, notifier: Arc<dyn Notifier>, views: Arc<dyn ClientViews>) -> Self {
        Self { defaults, notifier, views }
    }

    pub fn defaults(&self) -> &NotificationDefaults {
        &self.defaults
    }

    /// Decode `data` and display it. Returns the notification if the platform showed it.
    pub async fn deliver(&self, data: &[u8]) -> Option<Notification> {
        let notification = self.defaults.build(PushPayload::parse(data).into_payload());

        match self.notifier.show(&notification).await {
            Ok(()) => {
                tracing::debug!(tag = %notification.tag, url = %notification.data.url, "notification shown");
                Some(notification)
            }
            Err(e) => {
                tracing::warn!(tag = %notification.tag, error = %e, "failed to show notification");
                None
            }
        }
    }

    /// Route a click to an existing view or a new one.
    pub async fn click(&self, click: &NotificationClick) -> Result<ClickOutcome, Error> {
        let notification = &click.notification;
        if let Err(e) = self.notifier.close(notification).await {
            tracing::warn!(tag = %notification.tag, error = %e, "failed to close notification");
        }

        let target = notification.data.url.as_str();
        tracing::debug!(url = target, action = click.action.as_deref().unwrap_or("none"), "notification clicked");

        let views = self.views.list(true).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to list open views");
            Vec::new()
        });

        if let Some(view) = find_view(&views, target) {
            self.views.focus(&view.id).await?;
            return Ok(ClickOutcome::Focused { id: view.id.clone(), url: view.url.clone() });
        }

        self.views.open(target).await?;
        Ok(ClickOutcome::Opened { url: target.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        shown: Mutex<Vec<Notification>>,
        closed: Mutex<Vec<String>>,
        refuse: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn show(&self, notification: &Notification) -> Result<(), Error> {
            if self.refuse {
                return Err(Error::NotifyFailed("permission denied".into()));
            }
            self.shown.lock().unwrap().push(notification.clone());
            Ok(())
        }

        async fn close(&self, notification: &Notification) -> Result<(), Error> {
            self.closed.lock().unwrap().push(notification.tag.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeViews {
        open: Vec<ClientView>,
        focused: Mutex<Vec<String>>,
        opened: Mutex<Vec<String>>,
        uncontrolled_requested: Mutex<Option<bool>>,
    }

    #[async_trait]
    impl ClientViews for FakeViews {
        async fn list(&self, include_uncontrolled: bool) -> Result<Vec<ClientView>, Error> {
            *self.uncontrolled_requested.lock().unwrap() = Some(include_uncontrolled);
            Ok(self.open.clone())
        }

        async fn focus(&self, id: &str) -> Result<(), Error> {
            self.focused.lock().unwrap().push(id.to_string());
            Ok(())
        }

        async fn open(&self, url: &str) -> Result<(), Error> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn defaults() -> NotificationDefaults {
        NotificationDefaults::from(&AppConfig::default())
    }

    fn channel(notifier: Arc<RecordingNotifier>, views: Arc<FakeViews>) -> NotificationChannel {
        NotificationChannel::new(defaults(), notifier, views)
    }

    fn view(id: &str, url: &str) -> ClientView {
        ClientView { id: id.into(), url: url.into() }
    }

    fn click_for(url: &str) -> NotificationClick {
        let payload = NotificationPayload { url: Some(url.into()), ..Default::default() };
        NotificationClick { notification: defaults().build(payload), action: None }
    }

    #[tokio::test]
    async fn test_deliver_json_payload() {
        let notifier = Arc::new(RecordingNotifier::default());
        let channel = channel(notifier.clone(), Arc::new(FakeViews::default()));

        let before = Utc::now().timestamp_millis();
        let shown = channel.deliver(br#"{"title":"X","body":"Y","url":"/z"}"#).await.unwrap();
        assert_eq!(shown.title, "X");
        assert_eq!(shown.body, "Y");
        assert_eq!(shown.data.url, "/z");
        assert!(shown.data.date_of_arrival >= before);
        assert_eq!(notifier.shown.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deliver_raw_text_payload() {
        let notifier = Arc::new(RecordingNotifier::default());
        let channel = channel(notifier, Arc::new(FakeViews::default()));

        let shown = channel.deliver(b"hello").await.unwrap();
        assert_eq!(shown.title, "Community");
        assert_eq!(shown.body, "hello");
        assert_eq!(shown.data.url, "/");
    }

    #[tokio::test]
    async fn test_deliver_applies_defaults() {
        let channel = channel(Arc::new(RecordingNotifier::default()), Arc::new(FakeViews::default()));

        let shown = channel.deliver(b"{}").await.unwrap();
        assert_eq!(shown.tag, "community-notification");
        assert!(!shown.renotify);
        assert!(shown.actions.is_empty());
        assert_eq!(shown.icon, "/icons/icon-192x192.png");
        assert_eq!(shown.badge, "/icons/badge-72x72.png");
        assert_eq!(shown.vibrate, vec![100, 50, 100]);
    }

    #[tokio::test]
    async fn test_deliver_keeps_payload_tag_and_actions() {
        let channel = channel(Arc::new(RecordingNotifier::default()), Arc::new(FakeViews::default()));

        let shown = channel
            .deliver(br#"{"tag":"dm","renotify":true,"actions":[{"action":"reply","title":"Reply"}]}"#)
            .await
            .unwrap();
        assert_eq!(shown.tag, "dm");
        assert!(shown.renotify);
        assert_eq!(shown.actions[0].action, "reply");
    }

    #[tokio::test]
    async fn test_deliver_display_failure_is_swallowed() {
        let notifier = Arc::new(RecordingNotifier { refuse: true, ..Default::default() });
        let channel = channel(notifier, Arc::new(FakeViews::default()));
        assert!(channel.deliver(b"hello").await.is_none());
    }

    #[tokio::test]
    async fn test_click_focuses_matching_view() {
        let notifier = Arc::new(RecordingNotifier::default());
        let views = Arc::new(FakeViews { open: vec![view("tab-1", "https://community.example/z")], ..Default::default() });
        let channel = channel(notifier.clone(), views.clone());

        let outcome = channel.click(&click_for("/z")).await.unwrap();
        assert_eq!(outcome, ClickOutcome::Focused { id: "tab-1".into(), url: "https://community.example/z".into() });
        assert_eq!(*views.focused.lock().unwrap(), vec!["tab-1".to_string()]);
        assert!(views.opened.lock().unwrap().is_empty());
        assert_eq!(*views.uncontrolled_requested.lock().unwrap(), Some(true));
        assert_eq!(notifier.closed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_click_opens_when_no_view_matches() {
        let views = Arc::new(FakeViews {
            open: vec![view("tab-1", "https://community.example/feed")],
            ..Default::default()
        });
        let channel = channel(Arc::new(RecordingNotifier::default()), views.clone());

        let outcome = channel.click(&click_for("/z")).await.unwrap();
        assert_eq!(outcome, ClickOutcome::Opened { url: "/z".into() });
        assert_eq!(*views.opened.lock().unwrap(), vec!["/z".to_string()]);
        assert!(views.focused.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_focuses_only_first_match() {
        let views = Arc::new(FakeViews {
            open: vec![view("tab-1", "https://community.example/z"), view("tab-2", "https://community.example/z")],
            ..Default::default()
        });
        let channel = channel(Arc::new(RecordingNotifier::default()), views.clone());

        channel.click(&click_for("/z")).await.unwrap();
        assert_eq!(*views.focused.lock().unwrap(), vec!["tab-1".to_string()]);
    }

    #[tokio::test]
    async fn test_click_with_action_routes_to_same_target() {
        let views = Arc::new(FakeViews::default());
        let channel = channel(Arc::new(RecordingNotifier::default()), views.clone());

        let mut click = click_for("/messages/7");
        click.action = Some("reply".into());
        let outcome = channel.click(&click).await.unwrap();
        assert_eq!(outcome, ClickOutcome::Opened { url: "/messages/7".into() });
    }
}
