//! Output schema variants for the transform stage.
//!
//! A [`SchemaDescriptor`] drives three things at once: the JSON Schema sent to
//! the model, the natural-language rules in the prompt, and the per-record
//! validation applied to whatever the model returns.

use std::fmt;
use std::str::FromStr;

use scout_core::{Category, PlatformIcon};
use serde_json::{json, Map, Value};

pub const TOPIC_NAME_MAX_CHARS: usize = 30;
pub const SHORT_DESCRIPTION_MAX_CHARS: usize = 50;

/// Which configured model a preset runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Quality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub name: &'static str,
    pub require_context: bool,
    pub hashtags_min: usize,
    pub hashtags_max: usize,
    pub require_source: bool,
    pub tier: ModelTier,
}

impl SchemaDescriptor {
    /// Mobile feed card: title, one-liner, icon and two hashtags.
    pub const CARD: SchemaDescriptor = SchemaDescriptor {
        name: "card",
        require_context: false,
        hashtags_min: 2,
        hashtags_max: 2,
        require_source: false,
        tier: ModelTier::Fast,
    };

    /// Card plus a 2-3 sentence explanation and the originating platform.
    pub const EXPLAINED: SchemaDescriptor = SchemaDescriptor {
        name: "explained",
        require_context: true,
        hashtags_min: 1,
        hashtags_max: 5,
        require_source: true,
        tier: ModelTier::Quality,
    };

    /// Per-category card with context, used by the multi-industry sync.
    pub const INDUSTRY: SchemaDescriptor = SchemaDescriptor {
        name: "industry",
        require_context: true,
        hashtags_min: 2,
        hashtags_max: 2,
        require_source: false,
        tier: ModelTier::Fast,
    };

    #[must_use]
    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["topic_name", "short_description"];
        if self.require_context {
            fields.push("trending_context");
        }
        fields.extend(["platform_icon", "hashtags"]);
        if self.require_source {
            fields.push("source");
        }
        fields
    }

    /// JSON Schema for the `{ "trends": [...] }` response object.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            "topic_name".into(),
            json!({
                "type": "string",
                "maxLength": TOPIC_NAME_MAX_CHARS,
                "description": "Catchy card title."
            }),
        );
        properties.insert(
            "short_description".into(),
            json!({
                "type": "string",
                "maxLength": SHORT_DESCRIPTION_MAX_CHARS,
                "description": "A punchy 1-sentence summary."
            }),
        );
        if self.require_context {
            properties.insert(
                "trending_context".into(),
                json!({
                    "type": "string",
                    "description": "2-3 sentences on why this is trending now."
                }),
            );
        }
        properties.insert(
            "platform_icon".into(),
            json!({
                "type": "string",
                "enum": PlatformIcon::ALL.map(PlatformIcon::as_str),
                "description": "Choose the most relevant platform for this trend."
            }),
        );
        properties.insert(
            "hashtags".into(),
            json!({
                "type": "array",
                "items": { "type": "string" },
                "minItems": self.hashtags_min,
                "maxItems": self.hashtags_max
            }),
        );
        properties.insert(
            "source".into(),
            json!({
                "type": "string",
                "description": "Platform the trend was observed on."
            }),
        );

        json!({
            "type": "object",
            "properties": {
                "trends": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": properties,
                        "required": self.required_fields()
                    }
                }
            },
            "required": ["trends"]
        })
    }

    /// Instruction text with the raw items embedded as JSON.
    #[must_use]
    pub fn prompt(&self, raw_items: &[Value], category: Option<Category>) -> String {
        let mut rules: Vec<String> = Vec::new();
        match category {
            Some(category) => rules.push(format!(
                "Extract the top 5 high-signal topics for personal branding in the {category} industry."
            )),
            None => rules.push("Extract the top 5 high-signal topics for personal branding.".into()),
        }
        rules.push("Map each one to 'icon-x', 'icon-instagram', or 'icon-linkedin'.".into());
        if self.hashtags_min == self.hashtags_max {
            rules.push(format!(
                "Generate exactly {} relevant hashtags for each.",
                self.hashtags_min
            ));
        } else {
            rules.push(format!(
                "Generate between {} and {} relevant hashtags for each.",
                self.hashtags_min, self.hashtags_max
            ));
        }
        rules.push(format!(
            "Keep descriptions under {SHORT_DESCRIPTION_MAX_CHARS} characters for mobile cards, \
             keep words short so they fit in two lines on a short card."
        ));
        rules.push(format!(
            "Keep the topic name to about {TOPIC_NAME_MAX_CHARS} characters."
        ));
        if self.require_context {
            rules.push(
                "Write trending_context as 2-3 sentences explaining why the topic is trending."
                    .into(),
            );
        }
        if self.require_source {
            rules.push("Set source to the platform the trend was observed on.".into());
        }

        let mut prompt = String::from("Analyze these raw social media trends.\n");
        for (i, rule) in rules.iter().enumerate() {
            prompt.push_str(&format!("{}. {rule}\n", i + 1));
        }
        prompt.push_str("\nRaw Data: ");
        prompt.push_str(&Value::Array(raw_items.to_vec()).to_string());
        prompt
    }
}

/// Named presets selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaPreset {
    Card,
    Explained,
    Industry,
}

impl SchemaPreset {
    #[must_use]
    pub fn descriptor(self) -> &'static SchemaDescriptor {
        match self {
            SchemaPreset::Card => &SchemaDescriptor::CARD,
            SchemaPreset::Explained => &SchemaDescriptor::EXPLAINED,
            SchemaPreset::Industry => &SchemaDescriptor::INDUSTRY,
        }
    }
}

impl fmt::Display for SchemaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

impl FromStr for SchemaPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(SchemaPreset::Card),
            "explained" => Ok(SchemaPreset::Explained),
            "industry" => Ok(SchemaPreset::Industry),
            other => Err(format!(
                "unknown preset '{other}' (expected card, explained or industry)"
            )),
        }
    }
}
