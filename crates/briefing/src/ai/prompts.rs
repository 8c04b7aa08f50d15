//! Prompt template management.

use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

use crate::error::BriefingResult;

/// Template names known to the summarizer.
pub const TEMPLATES: [&str; 2] = ["system", "user"];

/// Manages Handlebars prompt templates.
pub struct PromptManager {
    handlebars: Handlebars<'static>,
}

impl PromptManager {
    /// Create a new prompt manager with embedded templates.
    pub fn new() -> BriefingResult<Self> {
        let mut handlebars = Self::engine();

        handlebars.register_template_string("system", SYSTEM_TEMPLATE)?;
        handlebars.register_template_string("user", USER_TEMPLATE)?;

        Ok(Self { handlebars })
    }

    /// Create a prompt manager, overriding embedded templates with any
    /// `<name>.hbs` found in `dir`.
    pub fn from_dir(dir: &Path) -> BriefingResult<Self> {
        let mut manager = Self::new()?;

        for name in TEMPLATES {
            let path = dir.join(format!("{name}.hbs"));
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    crate::BriefingError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                manager.handlebars.register_template_string(name, &content)?;
            }
        }

        Ok(manager)
    }

    /// Render a template with the given data.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> BriefingResult<String> {
        Ok(self.handlebars.render(template, data)?)
    }

    fn engine() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        // Article JSON goes in verbatim
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
    }
}

/// Analyst instructions.
const SYSTEM_TEMPLATE: &str = r"You are a renewable energy market analyst for a COO.
Focus on: 1) New project announcements with MW/GW sizes
2) Turbine/equipment orders and suppliers
3) Tender results and upcoming auctions
4) Policy changes affecting renewable markets
5) Major grid connections or PPAs

Structure: Start with {{primary}} (detailed), then other countries (brief).
Use bullet points. Include MW/GW numbers when mentioned.
Be concise but include key commercial details.";

/// Request wrapping the serialized news batch.
const USER_TEMPLATE: &str = r"Summarize these news, {{primary}} first and detailed:

{{news}}";
