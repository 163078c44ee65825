//! Handler registry and dispatch boundary
//!
//! The registry is populated once at startup and immutable afterwards. The
//! dispatcher is the failure boundary: a handler error becomes a polite
//! per-capability reply and never takes the message loop down with it.

use std::sync::Arc;

use shopsaver_core::{Handler, HandlerLabel};

/// Insertion-ordered handler registry, immutable after startup
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Last registration wins for a duplicate label,
    /// matching ordinary map-insert semantics.
    pub fn register(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.retain(|h| h.label() != handler.label());
        self.handlers.push(handler);
        self
    }

    pub fn get(&self, label: HandlerLabel) -> Option<&Arc<dyn Handler>> {
        self.handlers.iter().find(|h| h.label() == label)
    }

    /// Registered labels in insertion order
    pub fn labels(&self) -> Vec<HandlerLabel> {
        self.handlers.iter().map(|h| h.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Routes a resolved label to its handler and absorbs handler failures
pub struct Dispatcher {
    registry: HandlerRegistry,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatch a message to the handler registered under `label`.
    ///
    /// An unregistered label falls back to the help handler, then to a
    /// static reply. Validation failures and handler errors both produce
    /// user-facing text; this method cannot fail.
    pub async fn dispatch(&self, label: HandlerLabel, user_id: &str, message: &str) -> String {
        let handler = match self.registry.get(label).or_else(|| self.registry.get(HandlerLabel::Help)) {
            Some(handler) => handler,
            None => {
                tracing::error!(%label, "No handler registered and no help fallback");
                return "Sorry, I can't handle that request right now.".to_string();
            }
        };

        if !handler.validate(message) {
            return "I couldn't read that message. Please send a short text describing \
                    what you need."
                .to_string();
        }

        match handler.handle(user_id, message).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(handler = %handler.label(), error = %e, "Handler failed");
                format!(
                    "The {} feature is temporarily unavailable. Please try again later.",
                    handler.label()
                )
            }
        }
    }
}
