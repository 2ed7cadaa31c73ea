//! push_deliver and notification_click tool implementations.

use std::sync::Arc;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wayside_client::{ClientView, Notification, NotificationChannel, NotificationClick, NotificationPayload};
use wayside_core::Error;

use super::json_result;
use crate::host::SuppliedViews;
use crate::state::AppState;

/// Parameters for the push_deliver tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushDeliverParams {
    /// Raw push message data. JSON objects are decoded; anything else is shown as text.
    pub payload: String,
}

/// An open view reported by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewParam {
    pub id: String,
    pub url: String,
}

/// Parameters for the notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Target URL carried by the clicked notification.
    pub url: String,

    /// Tag of the clicked notification (default: the configured tag).
    #[serde(default)]
    pub tag: Option<String>,

    /// Action button that was clicked, if any.
    #[serde(default)]
    pub action: Option<String>,

    /// Views currently open, in the order the platform lists them.
    #[serde(default)]
    pub views: Vec<ViewParam>,
}

/// Output from the push_deliver tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushDeliverOutput {
    pub notification: Notification,
    /// Notifications on display after this one, one per tag.
    pub on_display: usize,
}

fn channel(state: &AppState, views: Vec<ClientView>) -> NotificationChannel {
    NotificationChannel::new(state.notification_defaults(), state.notifier.clone(), Arc::new(SuppliedViews::new(views)))
}

/// Implementation of the push_deliver tool.
pub async fn deliver_impl(state: &AppState, params: PushDeliverParams) -> Result<CallToolResult, McpError> {
    let notification = channel(state, Vec::new())
        .deliver(params.payload.as_bytes())
        .await
        .ok_or_else(|| Error::NotifyFailed("notification was not displayed".into()))?;
    json_result(&PushDeliverOutput { notification, on_display: state.notifier.shown().len() })
}

/// Implementation of the notification_click tool.
pub async fn click_impl(state: &AppState, params: NotificationClickParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url must not be empty".into()).into());
    }

    let payload = NotificationPayload { url: Some(params.url), tag: params.tag, ..Default::default() };
    let click = NotificationClick { notification: state.notification_defaults().build(payload), action: params.action };

    let views = params
        .views
        .into_iter()
        .map(|view| ClientView { id: view.id, url: view.url })
        .collect();
    let outcome = channel(state, views).click(&click).await?;
    json_result(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, state};
    use wayside_client::ClickOutcome;

    fn click(url: &str, views: &[(&str, &str)]) -> NotificationClickParams {
        NotificationClickParams {
            url: url.into(),
            tag: None,
            action: None,
            views: views
                .iter()
                .map(|(id, url)| ViewParam { id: id.to_string(), url: url.to_string() })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_deliver_json_payload() {
        let (state, _) = state().await;
        let params = PushDeliverParams { payload: r#"{"title":"New reply","url":"/threads/9"}"#.into() };

        let out: PushDeliverOutput = output(&deliver_impl(&state, params).await.unwrap());
        assert_eq!(out.notification.title, "New reply");
        assert_eq!(out.notification.data.url, "/threads/9");
        assert_eq!(out.notification.tag, "community-notification");
        assert_eq!(out.on_display, 1);
    }

    #[tokio::test]
    async fn test_deliver_plain_text_payload() {
        let (state, _) = state().await;
        let params = PushDeliverParams { payload: "server restarting".into() };

        let notification = output::<PushDeliverOutput>(&deliver_impl(&state, params).await.unwrap()).notification;
        assert_eq!(notification.title, "Community");
        assert_eq!(notification.body, "server restarting");
        assert_eq!(notification.data.url, "/");
    }

    #[tokio::test]
    async fn test_click_focuses_matching_view() {
        let (state, _) = state().await;
        let params = click(
            "/messages",
            &[("a", "https://community.example/feed"), ("b", "https://community.example/messages/4")],
        );

        let outcome: ClickOutcome = output(&click_impl(&state, params).await.unwrap());
        assert_eq!(
            outcome,
            ClickOutcome::Focused { id: "b".into(), url: "https://community.example/messages/4".into() }
        );
    }

    #[tokio::test]
    async fn test_click_opens_when_nothing_matches() {
        let (state, _) = state().await;
        let params = click("/events", &[("a", "https://community.example/feed")]);

        let outcome: ClickOutcome = output(&click_impl(&state, params).await.unwrap());
        assert_eq!(outcome, ClickOutcome::Opened { url: "/events".into() });
    }

    #[tokio::test]
    async fn test_click_closes_shown_notification() {
        let (state, _) = state().await;
        deliver_impl(&state, PushDeliverParams { payload: r#"{"url":"/events"}"#.into() })
            .await
            .unwrap();
        assert_eq!(state.notifier.shown().len(), 1);

        click_impl(&state, click("/events", &[])).await.unwrap();
        assert!(state.notifier.shown().is_empty());
    }
}
