// Database record types and status/type vocabularies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

// ============================================================================
// Scenario
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScenarioRecord {
    pub id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub scenario_type: String,
    pub category: Option<String>,
    pub status: String,
    pub source: String,
    pub target: Option<String>,
    pub language: String,
    pub last_execution: Option<DateTime<Utc>>,
    pub next_execution: Option<String>,
    pub execution_count: i64,
    pub success_rate: f64,
    pub avg_execution_time: f64,
    pub description: Option<String>,
    pub config: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioType {
    Scraping,
    Redaction,
    IaGenerator,
    Translation,
}

impl ScenarioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::Scraping => "scraping",
            ScenarioType::Redaction => "redaction",
            ScenarioType::IaGenerator => "ia-generator",
            ScenarioType::Translation => "translation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scraping" => Some(ScenarioType::Scraping),
            "redaction" => Some(ScenarioType::Redaction),
            "ia-generator" => Some(ScenarioType::IaGenerator),
            "translation" => Some(ScenarioType::Translation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    Active,
    Paused,
    Error,
    Pending,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Active => "active",
            ScenarioStatus::Paused => "paused",
            ScenarioStatus::Error => "error",
            ScenarioStatus::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ScenarioStatus::Active),
            "paused" => Some(ScenarioStatus::Paused),
            "error" => Some(ScenarioStatus::Error),
            "pending" => Some(ScenarioStatus::Pending),
            _ => None,
        }
    }
}

// ============================================================================
// Article
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoData {
    pub meta_title: String,
    pub meta_description: String,
    pub slug: String,
    pub focus_keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub keywords: Json<Vec<String>>,
    pub project_id: Option<String>,
    pub template_id: Option<String>,
    pub status: String,
    pub seo_data: Json<SeoData>,
    pub source: Option<String>,
    pub scenario_id: Option<String>,
    pub original_article_id: Option<String>,
    pub language: String,
    pub category: Option<String>,
    pub word_count: i64,
    pub author_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
    ReadyForWordpress,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
            ArticleStatus::ReadyForWordpress => "ready-for-wordpress",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ArticleStatus::Draft),
            "published" => Some(ArticleStatus::Published),
            "archived" => Some(ArticleStatus::Archived),
            "ready-for-wordpress" => Some(ArticleStatus::ReadyForWordpress),
            _ => None,
        }
    }
}

// ============================================================================
// Generation history
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRecord {
    pub id: String,
    pub provider: String,
    pub prompt: String,
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub word_count: i64,
    pub template: Option<String>,
    pub status: String,
    pub settings: Json<serde_json::Value>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryStatus {
    Success,
    Error,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryStatus::Success => "success",
            HistoryStatus::Error => "error",
        }
    }
}

// ============================================================================
// Webhook log
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebhookLogRecord {
    pub id: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub data: Json<serde_json::Value>,
    pub processed: bool,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub result: Option<Json<serde_json::Value>>,
    pub processing_time_ms: Option<i64>,
}

// ============================================================================
// AI provider
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub last_used: Option<DateTime<Utc>>,
    pub capabilities: Json<Vec<String>>,
    pub max_tokens: i64,
    pub pricing: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderStatus {
    Connected,
    Disconnected,
    Error,
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Connected => "connected",
            ProviderStatus::Disconnected => "disconnected",
            ProviderStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "connected" => Some(ProviderStatus::Connected),
            "disconnected" => Some(ProviderStatus::Disconnected),
            "error" => Some(ProviderStatus::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_type_round_trip() {
        for t in [
            ScenarioType::Scraping,
            ScenarioType::Redaction,
            ScenarioType::IaGenerator,
            ScenarioType::Translation,
        ] {
            assert_eq!(ScenarioType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ScenarioType::parse("rss"), None);
    }

    #[test]
    fn test_article_status_includes_wordpress_queue() {
        assert_eq!(
            ArticleStatus::parse("ready-for-wordpress"),
            Some(ArticleStatus::ReadyForWordpress)
        );
    }
}
