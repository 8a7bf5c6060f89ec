//! Raw items -> validated [`NewTrend`]s via a structured model call.
//!
//! The model is asked for a schema-conforming document, but its output is
//! still untrusted: every element is re-validated here and rejected
//! individually when it breaks the descriptor's constraints.

use std::fmt;
use std::sync::Arc;

use scout_core::{AppConfig, Category, NewTrend, PlatformIcon};
use serde_json::Value;

use crate::error::PipelineError;
use crate::schema::{
    ModelTier, SchemaDescriptor, SHORT_DESCRIPTION_MAX_CHARS, TOPIC_NAME_MAX_CHARS,
};
use crate::traits::StructuredModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSettings {
    pub fast_model: String,
    pub quality_model: String,
    /// Raw items beyond this prefix are never sent to the model.
    pub max_items: usize,
}

impl TransformSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            fast_model: config.gemini_fast_model.clone(),
            quality_model: config.gemini_quality_model.clone(),
            max_items: config.transform_max_items,
        }
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Quality => &self.quality_model,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutput {
    pub trends: Vec<NewTrend>,
    /// Elements of the model response that failed validation.
    pub rejected: usize,
}

pub struct Transformer {
    model: Arc<dyn StructuredModel>,
    settings: TransformSettings,
}

impl Transformer {
    #[must_use]
    pub fn new(model: Arc<dyn StructuredModel>, settings: TransformSettings) -> Self {
        Self { model, settings }
    }

    /// Sends at most `max_items` raw items to the model and validates the reply.
    ///
    /// When `category` is set it is named in the prompt and stamped on every
    /// accepted record.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the model call fails or the reply is not a
    /// JSON object with a `trends` array. Invalid elements are not errors.
    pub async fn transform(
        &self,
        raw_items: &[Value],
        descriptor: &SchemaDescriptor,
        category: Option<Category>,
    ) -> Result<TransformOutput, PipelineError> {
        let cut = raw_items.len().min(self.settings.max_items);
        let prefix = &raw_items[..cut];
        let model = self.settings.model_for(descriptor.tier);

        tracing::debug!(
            preset = descriptor.name,
            model,
            sent = prefix.len(),
            available = raw_items.len(),
            "requesting structured trends"
        );

        let text = self
            .model
            .generate(
                model,
                &descriptor.prompt(prefix, category),
                &descriptor.json_schema(),
            )
            .await?;

        let output = parse_response(&text, descriptor, category)?;
        if output.rejected > 0 {
            tracing::warn!(
                preset = descriptor.name,
                accepted = output.trends.len(),
                rejected = output.rejected,
                "model returned records that failed validation"
            );
        }
        Ok(output)
    }
}

/// Parses a model reply of the form `{ "trends": [...] }`.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedOutput`] for text that is not JSON and
/// [`PipelineError::MissingTrends`] when `trends` is absent or not an array.
pub fn parse_response(
    text: &str,
    descriptor: &SchemaDescriptor,
    category: Option<Category>,
) -> Result<TransformOutput, PipelineError> {
    let document: Value = serde_json::from_str(text).map_err(PipelineError::MalformedOutput)?;
    let Some(elements) = document.get("trends").and_then(Value::as_array) else {
        return Err(PipelineError::MissingTrends);
    };

    let mut output = TransformOutput::default();
    for (index, element) in elements.iter().enumerate() {
        match validate_record(element, descriptor, category) {
            Ok(trend) => output.trends.push(trend),
            Err(reason) => {
                tracing::debug!(index, %reason, "rejected model record");
                output.rejected += 1;
            }
        }
    }
    Ok(output)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotAnObject,
    Missing(&'static str),
    WrongType(&'static str),
    Empty(&'static str),
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },
    UnknownIcon(String),
    HashtagCount {
        got: usize,
        min: usize,
        max: usize,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAnObject => f.write_str("element is not an object"),
            Rejection::Missing(field) => write!(f, "missing {field}"),
            Rejection::WrongType(field) => write!(f, "{field} has the wrong type"),
            Rejection::Empty(field) => write!(f, "{field} is empty"),
            Rejection::TooLong { field, max, len } => {
                write!(f, "{field} is {len} chars (max {max})")
            }
            Rejection::UnknownIcon(icon) => write!(f, "unknown platform_icon '{icon}'"),
            Rejection::HashtagCount { got, min, max } => {
                write!(f, "{got} hashtags (expected {min}..={max})")
            }
        }
    }
}

/// Validates one element of the `trends` array against `descriptor`.
///
/// # Errors
///
/// Returns the first [`Rejection`] found.
pub fn validate_record(
    element: &Value,
    descriptor: &SchemaDescriptor,
    category: Option<Category>,
) -> Result<NewTrend, Rejection> {
    let object = element.as_object().ok_or(Rejection::NotAnObject)?;

    let topic_name = required_text(object, "topic_name", Some(TOPIC_NAME_MAX_CHARS))?;
    let short_description =
        required_text(object, "short_description", Some(SHORT_DESCRIPTION_MAX_CHARS))?;

    let trending_context = if descriptor.require_context {
        Some(required_text(object, "trending_context", None)?)
    } else {
        optional_text(object, "trending_context")?
    };

    let icon = required_text(object, "platform_icon", None)?;
    let platform_icon = icon
        .parse::<PlatformIcon>()
        .map_err(|_| Rejection::UnknownIcon(icon))?;

    let hashtags = hashtags(object, descriptor)?;

    let source = if descriptor.require_source {
        Some(required_text(object, "source", None)?)
    } else {
        optional_text(object, "source")?
    };

    Ok(NewTrend {
        topic_name,
        short_description,
        trending_context,
        platform_icon,
        hashtags,
        source,
        category,
    })
}

type Object = serde_json::Map<String, Value>;

fn required_text(
    object: &Object,
    field: &'static str,
    max_chars: Option<usize>,
) -> Result<String, Rejection> {
    let value = object
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or(Rejection::Missing(field))?;
    let text = value.as_str().ok_or(Rejection::WrongType(field))?.trim();
    if text.is_empty() {
        return Err(Rejection::Empty(field));
    }
    if let Some(max) = max_chars {
        let len = text.chars().count();
        if len > max {
            return Err(Rejection::TooLong { field, max, len });
        }
    }
    Ok(text.to_string())
}

/// Absent, null or blank all map to `None`.
fn optional_text(object: &Object, field: &'static str) -> Result<Option<String>, Rejection> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(Rejection::WrongType(field)),
    }
}

/// Normalises tags to `#tag` form, drops blanks, then enforces the count.
fn hashtags(object: &Object, descriptor: &SchemaDescriptor) -> Result<Vec<String>, Rejection> {
    let raw = object
        .get("hashtags")
        .filter(|v| !v.is_null())
        .ok_or(Rejection::Missing("hashtags"))?
        .as_array()
        .ok_or(Rejection::WrongType("hashtags"))?;

    let mut tags = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.as_str().ok_or(Rejection::WrongType("hashtags"))?;
        let bare = tag.trim().trim_start_matches('#').trim();
        if !bare.is_empty() {
            tags.push(format!("#{bare}"));
        }
    }

    if tags.len() < descriptor.hashtags_min || tags.len() > descriptor.hashtags_max {
        return Err(Rejection::HashtagCount {
            got: tags.len(),
            min: descriptor.hashtags_min,
            max: descriptor.hashtags_max,
        });
    }
    Ok(tags)
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
