//! Message template rendering.
//!
//! Templates are compiled once at engine construction and rendered with a
//! typed context, replacing the regex substitution the channel messages
//! previously went through. Strict mode makes a template referencing an
//! unknown variable a render error instead of silently emitting nothing.

use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

use fotogate_core::error::AppError;
use fotogate_core::result::AppResult;
use fotogate_entity::delivery::DeliveryChannel;
use fotogate_entity::token::AccessToken;

/// One gallery line in a message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Subject display name.
    pub subject_name: String,
}

/// Typed render context for channel messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContext {
    /// Family name used in the greeting.
    pub family_name: String,
    /// Event the gallery belongs to.
    pub event_name: String,
    /// Canonical portal link.
    pub portal_url: String,
    /// Whole days until the token expires, if it expires.
    pub expires_in_days: Option<i64>,
    /// Galleries the token unlocks.
    pub galleries: Vec<GalleryItem>,
}

impl MessageContext {
    /// Build a context from a token and its resolved naming.
    pub fn build(
        token: &AccessToken,
        portal_url: String,
        family_name: String,
        event_name: String,
        galleries: Vec<GalleryItem>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            family_name,
            event_name,
            portal_url,
            expires_in_days: token.expires_in_days(now),
            galleries,
        }
    }
}

const EMAIL_TEMPLATE: &str = "\
Hello {{family_name}},

Your photo gallery for {{event_name}} is ready.
{{#each galleries}}
  - {{subject_name}}
{{/each}}
View and order your photos here: {{portal_url}}
{{#if expires_in_days}}
This link expires in {{expires_in_days}} days.
{{/if}}";

const WHATSAPP_TEMPLATE: &str = "\
Hi {{family_name}}! Your {{event_name}} photos are ready: {{portal_url}}\
{{#if expires_in_days}} (link valid for {{expires_in_days}} days){{/if}}";

const SMS_TEMPLATE: &str = "{{event_name}} photos for {{family_name}}: {{portal_url}}";

/// Compile-once template registry with per-channel defaults.
pub struct TemplateEngine {
    /// Compiled template registry.
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine").finish()
    }
}

impl TemplateEngine {
    /// Create an engine with the built-in channel templates registered.
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Messages are plain text, not HTML.
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            ("email", EMAIL_TEMPLATE),
            ("whatsapp", WHATSAPP_TEMPLATE),
            ("sms", SMS_TEMPLATE),
        ] {
            registry
                .register_template_string(name, template)
                .map_err(|e| {
                    AppError::template(format!("Failed to compile '{name}' template: {e}"))
                })?;
        }

        Ok(Self { registry })
    }

    /// Replace the template for a channel. Compilation errors surface here,
    /// not at render time.
    pub fn register_override(
        &mut self,
        channel: DeliveryChannel,
        template: &str,
    ) -> AppResult<()> {
        let name = Self::template_name(channel).ok_or_else(|| {
            AppError::validation(format!("Channel {channel:?} has no message template"))
        })?;
        self.registry
            .register_template_string(name, template)
            .map_err(|e| AppError::template(format!("Failed to compile '{name}' template: {e}")))
    }

    /// Render the message for a channel.
    pub fn render(&self, channel: DeliveryChannel, context: &MessageContext) -> AppResult<String> {
        let name = Self::template_name(channel).ok_or_else(|| {
            AppError::validation(format!("Channel {channel:?} has no message template"))
        })?;
        self.registry
            .render(name, context)
            .map_err(|e| AppError::template(format!("Failed to render '{name}' template: {e}")))
    }

    /// Template name for a channel. Print and direct handovers carry no
    /// message body.
    fn template_name(channel: DeliveryChannel) -> Option<&'static str> {
        match channel {
            DeliveryChannel::Email => Some("email"),
            DeliveryChannel::Whatsapp => Some("whatsapp"),
            DeliveryChannel::Sms => Some("sms"),
            DeliveryChannel::Print | DeliveryChannel::Direct => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fotogate_core::error::ErrorKind;

    fn context() -> MessageContext {
        MessageContext {
            family_name: "Jensen".to_string(),
            event_name: "Spring Portraits 2026".to_string(),
            portal_url: "https://photos.example.com/f/ABC123DEF456GHI789JKL".to_string(),
            expires_in_days: Some(14),
            galleries: vec![
                GalleryItem {
                    subject_name: "Mara".to_string(),
                },
                GalleryItem {
                    subject_name: "Tom".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_email_renders_all_sections() {
        let engine = TemplateEngine::new().expect("engine");
        let body = engine
            .render(DeliveryChannel::Email, &context())
            .expect("render");

        assert!(body.contains("Hello Jensen,"));
        assert!(body.contains("Spring Portraits 2026"));
        assert!(body.contains("- Mara"));
        assert!(body.contains("- Tom"));
        assert!(body.contains("https://photos.example.com/f/ABC123DEF456GHI789JKL"));
        assert!(body.contains("expires in 14 days"));
    }

    #[test]
    fn test_conditional_block_skipped_without_expiry() {
        let engine = TemplateEngine::new().expect("engine");
        let mut ctx = context();
        ctx.expires_in_days = None;

        let body = engine.render(DeliveryChannel::Email, &ctx).expect("render");
        assert!(!body.contains("expires in"));
    }

    #[test]
    fn test_sms_is_single_line() {
        let engine = TemplateEngine::new().expect("engine");
        let body = engine
            .render(DeliveryChannel::Sms, &context())
            .expect("render");
        assert!(!body.contains('\n'));
        assert!(body.contains("https://photos.example.com/f/"));
    }

    #[test]
    fn test_print_channel_has_no_template() {
        let engine = TemplateEngine::new().expect("engine");
        let err = engine
            .render(DeliveryChannel::Print, &context())
            .expect_err("no template");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_override_with_unknown_variable_fails_at_render() {
        let mut engine = TemplateEngine::new().expect("engine");
        engine
            .register_override(DeliveryChannel::Email, "Hello {{no_such_variable}}")
            .expect("compiles");

        let err = engine
            .render(DeliveryChannel::Email, &context())
            .expect_err("strict mode");
        assert_eq!(err.kind, ErrorKind::Template);
    }

    #[test]
    fn test_malformed_override_fails_at_registration() {
        let mut engine = TemplateEngine::new().expect("engine");
        let err = engine
            .register_override(DeliveryChannel::Email, "{{#if x}}unclosed")
            .expect_err("malformed");
        assert_eq!(err.kind, ErrorKind::Template);
    }
}
