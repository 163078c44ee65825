//! Capability overview

use async_trait::async_trait;

use shopsaver_core::{Handler, HandlerError, HandlerLabel};

/// Help handler; also the dispatch fallback for unregistered labels
#[derive(Default)]
pub struct HelpHandler;

impl HelpHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for HelpHandler {
    fn label(&self) -> HandlerLabel {
        HandlerLabel::Help
    }

    async fn handle(&self, _user_id: &str, _message: &str) -> Result<String, HandlerError> {
        let mut out = String::from("Here's what I can do:");
        for label in HandlerLabel::ALL {
            if label == HandlerLabel::Help {
                continue;
            }
            out.push_str(&format!("\n- {}", label.description()));
        }
        out.push_str(
            "\n\nTry: \"track iPhone 15 target price 30000\", \"record 150 lunch\", or \
             \"recommend wireless earbuds\".",
        );
        Ok(out)
    }
}
