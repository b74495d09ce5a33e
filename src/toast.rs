//! Self-dismissing success toasts
//!
//! `ToastNotifier` waits for the document to finish loading, then listens on
//! the body for `urlAdded`. Every dispatch appends one fixed-position toast
//! and hands it to a `RemovalTimer` that detaches exactly that node after
//! the toast's lifetime. Toasts never share state: two dispatches in a row
//! give two toasts on two independent timers.

use crate::dom::style::{BoxShadow, CssColor, InlineStyle, Position};
use crate::dom::{CustomEvent, Document, NodeId, Subscription};
use crate::errors::ToastlineError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::task::TaskTracker;

/// Event announcing a freshly shortened URL
pub const URL_ADDED: &str = "urlAdded";

/// Text shown for every `urlAdded` dispatch
pub const SUCCESS_TEXT: &str = "URL shortened successfully!";

/// How long a toast stays attached
pub const TOAST_LIFETIME: Duration = Duration::from_millis(3000);

/// One acknowledgment message: text, presentation, lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct ToastMessage {
    text: &'static str,
    style: InlineStyle,
    lifetime: Duration,
}

impl ToastMessage {
    /// The success toast shown after a URL is shortened
    pub fn url_added() -> Self {
        Self {
            text: SUCCESS_TEXT,
            style: success_style(),
            lifetime: TOAST_LIFETIME,
        }
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

/// Green card pinned 20px from the top-right corner
fn success_style() -> InlineStyle {
    InlineStyle {
        position: Position::Fixed { top: 20, right: 20 },
        background: Some(CssColor::Hex(0x4C, 0xAF, 0x50)),
        color: Some(CssColor::White),
        padding: 10,
        border_radius: 4,
        box_shadow: Some(BoxShadow {
            offset_x: 0,
            offset_y: 2,
            blur: 4,
            color: CssColor::Rgba(0, 0, 0, 0.2),
        }),
    }
}

/// Append `message` to the body and schedule its removal
///
/// Returns the id of the inserted node.
pub fn show(document: &Document, timers: &TaskTracker, message: &ToastMessage) -> NodeId {
    let mut element = document.create_element("div");
    element.set_text_content(message.text());
    element.set_style(message.style().clone());
    let node = document.append_child(element);

    tracing::debug!(%node, lifetime_ms = message.lifetime().as_millis() as u64, "Toast shown");
    tracing::trace!(%node, style = %message.style().css_text(), "Toast style");

    RemovalTimer {
        document: document.clone(),
        node,
        delay: message.lifetime(),
    }
    .schedule(timers);

    node
}

/// Deferred removal of a single node
struct RemovalTimer {
    document: Document,
    node: NodeId,
    delay: Duration,
}

impl RemovalTimer {
    fn schedule(self, timers: &TaskTracker) {
        timers.spawn(self.run());
    }

    async fn run(self) {
        tokio::time::sleep(self.delay).await;

        match self.document.remove_child(self.node) {
            Ok(_) => tracing::debug!(node = %self.node, "Toast dismissed"),
            // Something else already cleared it; nothing left to do.
            Err(ToastlineError::NodeNotFound(_)) => {
                tracing::trace!(node = %self.node, "Toast already detached");
            }
            Err(e) => tracing::warn!(node = %self.node, "Toast removal failed: {}", e),
        }
    }
}

/// Shows a toast for every `urlAdded` event on the page
pub struct ToastNotifier {
    timers: TaskTracker,
    subscription: Arc<Mutex<Option<Subscription>>>,
}

impl ToastNotifier {
    /// Install the notifier on `document`
    ///
    /// The listener is registered once the document finishes parsing, so
    /// events dispatched while it is still loading are not observed.
    pub fn install(document: &Document) -> Self {
        let timers = TaskTracker::new();
        let subscription = Arc::new(Mutex::new(None));

        let doc = document.clone();
        let tracker = timers.clone();
        let slot = Arc::clone(&subscription);
        document.on_content_loaded(move || {
            let target = doc.clone();
            let sub = doc.add_event_listener(URL_ADDED, move |event: &CustomEvent| {
                tracing::info!(event = %event.name, "Acknowledging shortened URL");
                show(&target, &tracker, &ToastMessage::url_added());
            });
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(sub);
        });

        Self {
            timers,
            subscription,
        }
    }

    /// Whether the `urlAdded` listener is currently registered
    pub fn is_listening(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Toasts still waiting for their removal timer
    pub fn pending_removals(&self) -> usize {
        self.timers.len()
    }

    /// Stop listening. Pending removals still run.
    pub fn shutdown(&self) {
        let sub = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sub) = sub {
            sub.detach();
        }
        self.timers.close();
        tracing::debug!(pending = self.timers.len(), "Toast notifier shut down");
    }

    /// Stop listening and wait until every shown toast has been removed
    #[cfg(test)]
    pub async fn drain(&self) {
        self.shutdown();
        self.timers.wait().await;
    }
}

impl Drop for ToastNotifier {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    fn toasts(doc: &Document) -> Vec<Element> {
        doc.children()
            .into_iter()
            .filter(|el| el.text_content() == SUCCESS_TEXT)
            .collect()
    }

    fn loaded_page() -> (Document, ToastNotifier) {
        let doc = Document::new();
        let notifier = ToastNotifier::install(&doc);
        doc.finish_parsing();
        (doc, notifier)
    }

    fn url_added() -> CustomEvent {
        CustomEvent::new(URL_ADDED)
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn test_success_style_css_text() {
        assert_eq!(
            ToastMessage::url_added().style().css_text(),
            "position: fixed; top: 20px; right: 20px; background: #4CAF50; color: white; \
             padding: 10px; border-radius: 4px; box-shadow: 0 2px 4px rgba(0,0,0,0.2);"
        );
    }

    #[test]
    fn test_url_added_message() {
        let msg = ToastMessage::url_added();
        assert_eq!(msg.text(), "URL shortened successfully!");
        assert_eq!(msg.lifetime(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_appends_one_toast_to_body() {
        let (doc, notifier) = loaded_page();
        let existing = doc.create_element("h1");
        doc.append_child(existing);

        assert_eq!(doc.dispatch_event(&url_added()), 1);

        let children = doc.children();
        assert_eq!(children.len(), 2);
        let toast = children.last().unwrap();
        assert_eq!(toast.tag(), "div");
        assert_eq!(toast.text_content(), SUCCESS_TEXT);
        assert_eq!(
            toast.style().css_text(),
            "position: fixed; top: 20px; right: 20px; background: #4CAF50; color: white; \
             padding: 10px; border-radius: 4px; box-shadow: 0 2px 4px rgba(0,0,0,0.2);"
        );
        assert_eq!(notifier.pending_removals(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payload_is_ignored() {
        let (doc, _notifier) = loaded_page();
        let event = url_added().with_detail(serde_json::json!({"short": "xyz"}));
        doc.dispatch_event(&event);
        assert_eq!(toasts(&doc).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_removed_after_lifetime() {
        let (doc, _notifier) = loaded_page();
        doc.dispatch_event(&url_added());

        sleep_ms(2999).await;
        assert_eq!(toasts(&doc).len(), 1);

        sleep_ms(2).await;
        assert!(toasts(&doc).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_dispatches_are_removed_independently() {
        let (doc, notifier) = loaded_page();

        doc.dispatch_event(&url_added());
        sleep_ms(500).await;
        doc.dispatch_event(&url_added());
        sleep_ms(500).await;
        doc.dispatch_event(&url_added());

        let ids: Vec<NodeId> = toasts(&doc).iter().map(Element::id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(notifier.pending_removals(), 3);

        // t = 3001: only the first is gone
        sleep_ms(2001).await;
        assert!(!doc.contains(ids[0]));
        assert!(doc.contains(ids[1]));
        assert!(doc.contains(ids[2]));

        // t = 3501: second gone
        sleep_ms(500).await;
        assert!(!doc.contains(ids[1]));
        assert!(doc.contains(ids[2]));

        // t = 4001: all gone
        sleep_ms(500).await;
        assert!(toasts(&doc).is_empty());
        assert_eq!(notifier.pending_removals(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_before_load_is_not_observed() {
        let doc = Document::new();
        let notifier = ToastNotifier::install(&doc);

        assert_eq!(doc.dispatch_event(&url_added()), 0);
        assert!(!notifier.is_listening());
        assert_eq!(doc.child_count(), 0);

        doc.finish_parsing();
        assert!(notifier.is_listening());
        assert_eq!(doc.dispatch_event(&url_added()), 1);
        assert_eq!(toasts(&doc).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_after_load_listens_immediately() {
        let doc = Document::new();
        doc.finish_parsing();
        let notifier = ToastNotifier::install(&doc);
        assert!(notifier.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_single_toast() {
        let (doc, _notifier) = loaded_page();

        doc.dispatch_event(&url_added());
        assert_eq!(toasts(&doc).len(), 1);

        tokio::time::advance(Duration::from_millis(3000)).await;
        // Let the fired timer run
        sleep_ms(1).await;
        assert!(toasts(&doc).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_removal_of_already_cleared_toast_is_a_no_op() {
        let (doc, notifier) = loaded_page();
        doc.dispatch_event(&url_added());
        let id = toasts(&doc)[0].id();

        doc.remove_child(id).unwrap();
        let revision = doc.revision();

        notifier.drain().await;
        assert_eq!(doc.revision(), revision);
        assert_eq!(doc.child_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removal_leaves_other_content_alone() {
        let (doc, notifier) = loaded_page();
        let mut heading = doc.create_element("h1");
        heading.set_text_content("URL Shortener");
        let heading = doc.append_child(heading);

        doc.dispatch_event(&url_added());
        notifier.drain().await;

        assert!(doc.contains(heading));
        assert_eq!(doc.child_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_listening_but_keeps_timers() {
        let (doc, notifier) = loaded_page();
        doc.dispatch_event(&url_added());

        notifier.shutdown();
        assert!(!notifier.is_listening());
        assert_eq!(doc.listener_count(URL_ADDED), 0);
        assert_eq!(doc.dispatch_event(&url_added()), 0);
        assert_eq!(toasts(&doc).len(), 1);

        sleep_ms(3001).await;
        assert!(toasts(&doc).is_empty());
    }
}
