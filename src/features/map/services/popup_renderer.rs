//! Marker popup rendering.
//!
//! Popups are HTML fragments rendered from `templates/post_popup.html` with
//! auto-escaping on. Heart and flag actions carry the post's endpoint URLs.

use minijinja::{context, Environment, Value};
use thiserror::Error;

use crate::features::posts::dtos::contact_mobile_number;
use crate::features::posts::models::{Post, PostKind};

const POPUP_TEMPLATE: &str = "post_popup.html";

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Renders marker popups for posts
pub struct PopupRenderer {
    env: Environment<'static>,
    api_base: String,
}

impl PopupRenderer {
    /// `api_base` prefixes the action URLs; empty for same-origin clients
    pub fn new(api_base: impl Into<String>) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.add_template(
            POPUP_TEMPLATE,
            include_str!("../../../../templates/post_popup.html"),
        )
        .map_err(|e| TemplateError::RenderError(e.to_string()))?;

        Ok(Self {
            env,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Built only from the configured base, kind and id, so it is marked safe
    fn action_url(&self, post: &Post, action: &str) -> Value {
        Value::from_safe_string(format!(
            "{}/api/posts/{}/{}/{}",
            self.api_base, post.kind, post.id, action
        ))
    }

    pub fn render(&self, post: &Post) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(POPUP_TEMPLATE)
            .map_err(|_| TemplateError::NotFound(POPUP_TEMPLATE.to_string()))?;

        let kind_label = match post.kind {
            PostKind::Source => "Source",
            PostKind::Help => "Needs Help",
        };

        template
            .render(context! {
                kind => post.kind.to_string(),
                kind_label,
                urgent => post.urgent(),
                verified => post.verified,
                title => &post.title,
                categories => &post.categories,
                description => &post.description,
                location => &post.location,
                contact => &post.contact,
                dial => contact_mobile_number(&post.contact),
                hearts => post.hearts,
                created_at => post.created_at.format("%b %-d, %Y %H:%M UTC").to_string(),
                updated_at => post.updated_at.format("%b %-d, %Y %H:%M UTC").to_string(),
                heart_url => self.action_url(post, "heart"),
                flag_url => self.action_url(post, "flag"),
            })
            .map_err(|e| {
                tracing::error!("Failed to render popup for post {}: {:?}", post.id, e);
                TemplateError::RenderError(e.to_string())
            })
    }
}
