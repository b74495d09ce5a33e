//! Page state and event handling
//!
//! `App` owns the page document, the toast notifier installed on it, and
//! the bookkeeping the terminal view needs (event log, dirty flag).

mod keyboard;

use crate::config::{ToastlineConfig, MAX_EVENTS};
use crate::dom::{CustomEvent, Document};
use crate::event::Event;
use crate::toast::ToastNotifier;
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::path::PathBuf;

/// One dispatched event, as shown in the event log
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub name: String,
    /// Listeners that ran for it
    pub handlers: usize,
    pub at: DateTime<Local>,
}

/// Page state and logic
pub struct App {
    pub document: Document,
    notifier: ToastNotifier,
    /// Page heading
    pub title: String,
    /// Socket events arrive on
    pub socket: PathBuf,
    pub should_quit: bool,
    /// Show the event log overlay
    pub debug_mode: bool,
    /// Dirty flag: true if UI needs re-render (render-on-change optimization)
    pub needs_render: bool,
    /// Most recent dispatches, newest first
    pub events: VecDeque<EventRecord>,
    /// Total dispatches since start
    pub dispatched: u64,
    /// Document revision at last render
    rendered_revision: u64,
    /// Wall-clock second shown in the header at last render
    rendered_second: i64,
}

impl App {
    pub fn new(config: &ToastlineConfig, socket: PathBuf, debug_mode: bool) -> Self {
        let document = Document::new();

        let mut heading = document.create_element("h1");
        heading.set_text_content(config.page.title.clone());
        document.append_child(heading);

        let notifier = ToastNotifier::install(&document);

        Self {
            document,
            notifier,
            title: config.page.title.clone(),
            socket,
            should_quit: false,
            debug_mode,
            needs_render: true,
            events: VecDeque::with_capacity(MAX_EVENTS),
            dispatched: 0,
            rendered_revision: 0,
            rendered_second: 0,
        }
    }

    /// The page structure is on screen; start reacting to page events
    pub fn page_loaded(&mut self) {
        self.document.finish_parsing();
        self.needs_render = true;
        tracing::info!("Page loaded");
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Page(custom) => self.dispatch(&custom),
            Event::Key(key) => self.handle_key(key),
        }
    }

    /// Dispatch `event` on the page body and record it
    pub fn dispatch(&mut self, event: &CustomEvent) {
        let handlers = self.document.dispatch_event(event);
        tracing::debug!(event = %event.name, handlers, "Dispatched page event");

        self.dispatched += 1;
        self.events.push_front(EventRecord {
            name: event.name.clone(),
            handlers,
            at: Local::now(),
        });
        self.events.truncate(MAX_EVENTS);
        self.needs_render = true;
    }

    /// Periodic update: pick up background document changes and the clock
    pub fn tick(&mut self) {
        if self.document.revision() != self.rendered_revision
            || Local::now().timestamp() != self.rendered_second
        {
            self.needs_render = true;
        }
    }

    /// Mark the current state as drawn
    pub fn rendered(&mut self) {
        self.needs_render = false;
        self.rendered_revision = self.document.revision();
        self.rendered_second = Local::now().timestamp();
    }

    pub fn is_listening(&self) -> bool {
        self.notifier.is_listening()
    }

    pub fn pending_toasts(&self) -> usize {
        self.notifier.pending_removals()
    }

    /// Tear down the page's event subscription
    pub fn shutdown(&self) {
        self.notifier.shutdown();
    }
}
