//! In-memory page document
//!
//! A deliberately small document model: a body holding a flat, ordered list
//! of elements, a ready state, and custom-event listeners attached to the
//! body. `Document` is a cheap cloneable handle; all clones see the same page.
//!
//! Listeners and content-loaded callbacks always run with the internal lock
//! released, so they are free to mutate the document they observe.

mod node;
pub mod style;

pub use node::{Element, NodeId};

use crate::errors::{Result, ToastlineError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Loading progress of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    /// Structure still being built; insertion targets may not exist yet
    #[default]
    Loading,
    /// Structure fully parsed (content-loaded callbacks have run)
    Interactive,
}

/// Application-defined event dispatched on the document body
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEvent {
    pub name: String,
    /// Optional payload. Listeners may ignore it.
    pub detail: Option<serde_json::Value>,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Identity of a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type Handler = Arc<dyn Fn(&CustomEvent) + Send + Sync>;
type LoadedCallback = Box<dyn FnOnce() + Send>;

struct Listener {
    id: ListenerId,
    event: String,
    handler: Handler,
}

#[derive(Default)]
struct DocumentState {
    ready: ReadyState,
    body: Vec<Element>,
    listeners: Vec<Listener>,
    on_loaded: Vec<LoadedCallback>,
    next_node: u64,
    next_listener: u64,
    revision: u64,
}

/// Handle to a page document
#[derive(Clone, Default)]
pub struct Document {
    state: Arc<Mutex<DocumentState>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Document")
            .field("ready", &state.ready)
            .field("children", &state.body.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document in the `Loading` state
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        // A panicking listener never holds the lock, so poisoning carries no
        // torn state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ready_state(&self) -> ReadyState {
        self.lock().ready
    }

    /// Mark the structure as fully parsed and run queued content-loaded callbacks
    ///
    /// Only the first call has an effect.
    pub fn finish_parsing(&self) {
        let callbacks = {
            let mut state = self.lock();
            if state.ready == ReadyState::Interactive {
                return;
            }
            state.ready = ReadyState::Interactive;
            std::mem::take(&mut state.on_loaded)
        };

        tracing::debug!(callbacks = callbacks.len(), "Document content loaded");
        for callback in callbacks {
            callback();
        }
    }

    /// Run `callback` once the document has finished parsing
    ///
    /// Runs immediately when the document is already interactive.
    pub fn on_content_loaded<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.lock();
            if state.ready == ReadyState::Loading {
                state.on_loaded.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    /// Create a detached element with a fresh id
    pub fn create_element(&self, tag: &'static str) -> Element {
        let mut state = self.lock();
        state.next_node += 1;
        Element::new(NodeId(state.next_node), tag)
    }

    /// Append `element` as the last child of the body
    pub fn append_child(&self, element: Element) -> NodeId {
        let id = element.id();
        let mut state = self.lock();
        state.body.push(element);
        state.revision += 1;
        id
    }

    /// Detach the body child with the given id
    pub fn remove_child(&self, id: NodeId) -> Result<Element> {
        let mut state = self.lock();
        let index = state
            .body
            .iter()
            .position(|el| el.id() == id)
            .ok_or(ToastlineError::NodeNotFound(id))?;
        state.revision += 1;
        Ok(state.body.remove(index))
    }

    #[cfg(test)]
    pub fn contains(&self, id: NodeId) -> bool {
        self.lock().body.iter().any(|el| el.id() == id)
    }

    /// Snapshot of the body's children, in document order
    pub fn children(&self) -> Vec<Element> {
        self.lock().body.clone()
    }

    pub fn child_count(&self) -> usize {
        self.lock().body.len()
    }

    /// Counter bumped on every body mutation
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Register `handler` for events named `event` on the body
    ///
    /// The listener stays registered for as long as the returned
    /// `Subscription` lives.
    pub fn add_event_listener<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&CustomEvent) + Send + Sync + 'static,
    {
        let id = {
            let mut state = self.lock();
            state.next_listener += 1;
            let id = ListenerId(state.next_listener);
            state.listeners.push(Listener {
                id,
                event: event.to_string(),
                handler: Arc::new(handler),
            });
            id
        };

        tracing::debug!(event, listener = id.0, "Listener registered");
        Subscription {
            document: self.clone(),
            id,
            event: event.to_string(),
            attached: true,
        }
    }

    /// Unregister a listener. Returns false if it was already gone.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut state = self.lock();
        let before = state.listeners.len();
        state.listeners.retain(|l| l.id != id);
        state.listeners.len() != before
    }

    #[cfg(test)]
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock()
            .listeners
            .iter()
            .filter(|l| l.event == event)
            .count()
    }

    /// Deliver `event` to every listener registered for its name
    ///
    /// Handlers run synchronously in registration order. Returns how many ran.
    pub fn dispatch_event(&self, event: &CustomEvent) -> usize {
        let handlers: Vec<Handler> = self
            .lock()
            .listeners
            .iter()
            .filter(|l| l.event == event.name)
            .map(|l| Arc::clone(&l.handler))
            .collect();

        if handlers.is_empty() {
            tracing::debug!(event = %event.name, "No listeners for event");
        }
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }
}

/// Registration handle returned by `Document::add_event_listener`
///
/// Dropping it removes the listener.
pub struct Subscription {
    document: Document,
    id: ListenerId,
    event: String,
    attached: bool,
}

impl Subscription {
    #[cfg(test)]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    #[cfg(test)]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Remove the listener now
    pub fn detach(mut self) {
        self.unregister();
    }

    fn unregister(&mut self) {
        if std::mem::take(&mut self.attached) && self.document.remove_event_listener(self.id) {
            tracing::debug!(event = %self.event, listener = self.id.0, "Listener removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn div(doc: &Document, text: &str) -> Element {
        let mut el = doc.create_element("div");
        el.set_text_content(text);
        el
    }

    #[test]
    fn test_new_document_is_loading_and_empty() {
        let doc = Document::new();
        assert_eq!(doc.ready_state(), ReadyState::Loading);
        assert_eq!(doc.child_count(), 0);
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn test_append_keeps_document_order() {
        let doc = Document::new();
        let first = doc.append_child(div(&doc, "one"));
        let second = doc.append_child(div(&doc, "two"));

        let children = doc.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id(), first);
        assert_eq!(children[1].id(), second);
        assert_eq!(children[1].text_content(), "two");
        assert_ne!(first, second);
    }

    #[test]
    fn test_created_element_is_detached() {
        let doc = Document::new();
        let el = doc.create_element("div");
        assert!(!doc.contains(el.id()));
        assert_eq!(el.tag(), "div");
    }

    #[test]
    fn test_remove_child_detaches_only_that_node() {
        let doc = Document::new();
        let a = doc.append_child(div(&doc, "a"));
        let b = doc.append_child(div(&doc, "b"));

        let removed = doc.remove_child(a).unwrap();
        assert_eq!(removed.text_content(), "a");
        assert!(!doc.contains(a));
        assert!(doc.contains(b));
    }

    #[test]
    fn test_remove_absent_child_is_an_error() {
        let doc = Document::new();
        let a = doc.append_child(div(&doc, "a"));
        doc.remove_child(a).unwrap();

        let err = doc.remove_child(a).unwrap_err();
        assert!(matches!(err, ToastlineError::NodeNotFound(id) if id == a));
        assert_eq!(doc.revision(), 2);
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let doc = Document::new();
        let a = doc.append_child(div(&doc, "a"));
        assert_eq!(doc.revision(), 1);
        doc.remove_child(a).unwrap();
        assert_eq!(doc.revision(), 2);
    }

    #[test]
    fn test_content_loaded_callbacks_are_deferred() {
        let doc = Document::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        doc.on_content_loaded(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        doc.finish_parsing();
        assert_eq!(doc.ready_state(), ReadyState::Interactive);
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        // Second call is a no-op
        doc.finish_parsing();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_content_loaded_runs_immediately_when_interactive() {
        let doc = Document::new();
        doc.finish_parsing();

        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        doc.on_content_loaded(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_reaches_matching_listeners_only() {
        let doc = Document::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = doc.add_event_listener("urlAdded", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(doc.dispatch_event(&CustomEvent::new("urlAdded")), 1);
        assert_eq!(doc.dispatch_event(&CustomEvent::new("somethingElse")), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_mutate_document() {
        let doc = Document::new();
        let target = doc.clone();
        let _sub = doc.add_event_listener("urlAdded", move |_| {
            let el = target.create_element("div");
            target.append_child(el);
        });

        doc.dispatch_event(&CustomEvent::new("urlAdded"));
        doc.dispatch_event(&CustomEvent::new("urlAdded"));
        assert_eq!(doc.child_count(), 2);
    }

    #[test]
    fn test_dropping_subscription_removes_listener() {
        let doc = Document::new();
        let sub = doc.add_event_listener("urlAdded", |_| {});
        assert_eq!(sub.event(), "urlAdded");
        assert_eq!(doc.listener_count("urlAdded"), 1);

        drop(sub);
        assert_eq!(doc.listener_count("urlAdded"), 0);
        assert_eq!(doc.dispatch_event(&CustomEvent::new("urlAdded")), 0);
    }

    #[test]
    fn test_detach_then_manual_remove_reports_absence() {
        let doc = Document::new();
        let sub = doc.add_event_listener("urlAdded", |_| {});
        let id = sub.id();
        sub.detach();
        assert!(!doc.remove_event_listener(id));
    }

    #[test]
    fn test_custom_event_detail() {
        let event = CustomEvent::new("urlAdded").with_detail(serde_json::json!({"short": "abc"}));
        assert_eq!(event.name, "urlAdded");
        assert_eq!(event.detail.unwrap()["short"], "abc");
    }
}
