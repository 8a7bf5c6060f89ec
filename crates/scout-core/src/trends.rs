//! Canonical trend types shared by the pipeline, the database layer and the API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Platform badge the client app renders next to a trend card.
///
/// Serialized as the UI identifier (`"icon-x"`, ...), which is also the value
/// stored in the `platform_icon` column and the enum offered to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformIcon {
    #[serde(rename = "icon-x")]
    X,
    #[serde(rename = "icon-instagram")]
    Instagram,
    #[serde(rename = "icon-linkedin")]
    Linkedin,
}

impl PlatformIcon {
    pub const ALL: [PlatformIcon; 3] = [
        PlatformIcon::X,
        PlatformIcon::Instagram,
        PlatformIcon::Linkedin,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformIcon::X => "icon-x",
            PlatformIcon::Instagram => "icon-instagram",
            PlatformIcon::Linkedin => "icon-linkedin",
        }
    }
}

impl fmt::Display for PlatformIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformIcon {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|icon| icon.as_str() == s)
            .ok_or_else(|| CoreError::UnknownPlatformIcon(s.to_string()))
    }
}

/// Industry partition used by the multi-industry sync.
///
/// The declaration order is the order categories are synced in. The label is
/// the persisted value; the slug is the URL-safe form used by the API and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Technology & Software")]
    TechnologySoftware,
    #[serde(rename = "Finance & Fintech")]
    FinanceFintech,
    #[serde(rename = "Health & Wellness")]
    HealthWellness,
    #[serde(rename = "Marketing & Advertising")]
    MarketingAdvertising,
    #[serde(rename = "E-commerce & Retail")]
    EcommerceRetail,
    #[serde(rename = "Creator Economy")]
    CreatorEconomy,
    #[serde(rename = "Education & EdTech")]
    EducationEdtech,
    #[serde(rename = "Real Estate")]
    RealEstate,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::TechnologySoftware,
        Category::FinanceFintech,
        Category::HealthWellness,
        Category::MarketingAdvertising,
        Category::EcommerceRetail,
        Category::CreatorEconomy,
        Category::EducationEdtech,
        Category::RealEstate,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::TechnologySoftware => "Technology & Software",
            Category::FinanceFintech => "Finance & Fintech",
            Category::HealthWellness => "Health & Wellness",
            Category::MarketingAdvertising => "Marketing & Advertising",
            Category::EcommerceRetail => "E-commerce & Retail",
            Category::CreatorEconomy => "Creator Economy",
            Category::EducationEdtech => "Education & EdTech",
            Category::RealEstate => "Real Estate",
        }
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Category::TechnologySoftware => "technology-software",
            Category::FinanceFintech => "finance-fintech",
            Category::HealthWellness => "health-wellness",
            Category::MarketingAdvertising => "marketing-advertising",
            Category::EcommerceRetail => "ecommerce-retail",
            Category::CreatorEconomy => "creator-economy",
            Category::EducationEdtech => "education-edtech",
            Category::RealEstate => "real-estate",
        }
    }

    /// Look up a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownCategory`] if no category has this slug.
    pub fn from_slug(slug: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == slug)
            .ok_or_else(|| CoreError::UnknownCategory(slug.to_string()))
    }

    /// Look up a category by its persisted label.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownCategory`] if no category has this label.
    pub fn from_label(label: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == label)
            .ok_or_else(|| CoreError::UnknownCategory(label.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the slug or the label.
impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s).or_else(|_| Self::from_label(s))
    }
}

/// A validated trend produced by the transform stage, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrend {
    /// Card title, at most ~30 characters.
    pub topic_name: String,
    /// One-line summary, at most 50 characters.
    pub short_description: String,
    /// Longer 2-3 sentence explanation, when the schema variant asks for one.
    pub trending_context: Option<String>,
    pub platform_icon: PlatformIcon,
    pub hashtags: Vec<String>,
    /// Platform the trend was observed on, e.g. `"reddit"`.
    pub source: Option<String>,
    /// Set only by the multi-industry sync.
    pub category: Option<Category>,
}

/// A persisted trend row as served by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub trend: NewTrend,
}
