// Content generation pipeline
//
// One handler per scenario type. Each handler derives exactly one article
// with deterministic SEO metadata from the scenario and the optional event
// payload; persistence is the caller's job so the execute path can bundle
// the insert with the statistics update in one transaction.

pub mod simulator;
pub mod synthesizer;
pub mod translator;

use crate::db::articles;
use crate::db::schema::{ArticleRecord, ArticleStatus, ScenarioRecord, ScenarioType, SeoData};
use crate::errors::{AppError, Result};
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::SqlitePool;
use translator::Translator;
use uuid::Uuid;

/// Topical vocabulary for the crypto scraping handler
pub const CRYPTO_KEYWORDS: [&str; 7] =
    ["Bitcoin", "Ethereum", "Crypto", "Blockchain", "DeFi", "NFT", "Trading"];

/// Topic vocabulary for the IA generation handler
pub const IA_TOPICS: [&str; 6] =
    ["Technologie", "Innovation", "Tendances", "Digital", "Futur", "IA"];

/// Default source language for translation scenarios
const DEFAULT_SOURCE_LANGUAGE: &str = "FR";

/// Dispatch to the handler for the scenario's type
pub async fn run_handler(
    pool: &SqlitePool,
    translator: &dyn Translator,
    scenario: &ScenarioRecord,
    payload: &Value,
) -> Result<ArticleRecord> {
    let scenario_type = ScenarioType::parse(&scenario.scenario_type)
        .ok_or_else(|| AppError::Internal(format!("Unknown scenario type: {}", scenario.scenario_type)))?;

    match scenario_type {
        ScenarioType::Scraping => handle_crypto_scraping(scenario, payload),
        ScenarioType::Redaction => handle_chat_redaction(scenario, payload),
        ScenarioType::IaGenerator => handle_ia_generation(scenario, payload),
        ScenarioType::Translation => handle_translation(pool, translator, scenario, payload).await,
    }
}

// ============================================================================
// Scraping (crypto feeds)
// ============================================================================

fn handle_crypto_scraping(scenario: &ScenarioRecord, payload: &Value) -> Result<ArticleRecord> {
    tracing::info!("Crypto scraping handler for source {}", scenario.source);

    let keyword = pick_term(&CRYPTO_KEYWORDS, payload, &scenario.source);
    let title = payload_str(payload, "title")
        .map(|t| t.to_string())
        .unwrap_or_else(|| format!("{} : dernières actualités depuis {}", keyword, scenario.source));

    let content = crypto_content(&scenario.source, payload);
    let excerpt = payload_str(payload, "excerpt")
        .map(|e| e.to_string())
        .unwrap_or_else(|| format!("Actualités crypto en temps réel depuis {}", scenario.source));

    let keywords = payload_keywords(payload)
        .unwrap_or_else(|| vec![keyword.to_string(), "Crypto".to_string(), "Actualités".to_string()]);

    Ok(build_article(ArticleParts {
        title: title.clone(),
        content,
        excerpt: Some(excerpt),
        keywords,
        status: ArticleStatus::Published,
        seo_data: SeoData {
            meta_title: format!("{} News | {}", keyword, scenario.source),
            meta_description: format!(
                "Dernières actualités {} et crypto depuis {}",
                keyword, scenario.source
            ),
            slug: slugify(&title),
            focus_keyword: keyword.to_string(),
        },
        source: Some(format!("rss-{}", scenario.source)),
        scenario_id: Some(scenario.id.clone()),
        original_article_id: None,
        language: scenario.language.clone(),
        category: Some("Crypto News".to_string()),
        template_id: Some("crypto-news-template".to_string()),
        project_id: payload_str(payload, "projectId").map(|p| p.to_string()),
    }))
}

fn crypto_content(source: &str, payload: &Value) -> String {
    let body = payload_str(payload, "content").unwrap_or(
        "Le marché des crypto-monnaies continue d'évoluer avec de nouvelles tendances et \
         opportunités. Cette analyse automatique compile les informations les plus récentes \
         pour suivre les développements importants.",
    );

    format!(
        "# Actualités Crypto depuis {source}\n\n\
         ## Introduction\n\n\
         Les dernières informations du monde de la crypto-monnaie collectées automatiquement \
         depuis {source}.\n\n\
         ## Analyse du marché\n\n\
         {body}\n\n\
         ## Points clés\n\n\
         - Évolution des prix en temps réel\n\
         - Nouvelles réglementations\n\
         - Innovations technologiques\n\
         - Adoption institutionnelle\n\n\
         ## Conclusion\n\n\
         Notre système de veille automatisé suit l'actualité crypto en continu.\n"
    )
}

// ============================================================================
// Redaction (chat-document intake)
// ============================================================================

fn handle_chat_redaction(scenario: &ScenarioRecord, payload: &Value) -> Result<ArticleRecord> {
    tracing::info!("Chat redaction handler for scenario {}", scenario.name);

    let title = payload_str(payload, "title")
        .map(|t| t.to_string())
        .unwrap_or_else(|| "Article Evergreen".to_string());

    let intake = if payload.get("document").is_some() {
        "document"
    } else {
        "url"
    };

    let body = payload_str(payload, "content")
        .map(|c| c.to_string())
        .or_else(|| payload_str(payload, "url").map(|u| format!("Source à rédiger : {}", u)))
        .unwrap_or_else(|| {
            "Contenu evergreen optimisé pour le référencement naturel. Ce type de contenu \
             conserve sa pertinence dans le temps et continue d'attirer du trafic organique."
                .to_string()
        });

    let content = format!(
        "# {title}\n\n\
         ## Introduction\n\n\
         Ce guide evergreen a été créé pour fournir une valeur durable à nos lecteurs.\n\n\
         ## Contenu Principal\n\n\
         {body}\n\n\
         ## Conseils Pratiques\n\n\
         - Optimisation SEO continue\n\
         - Mise à jour régulière\n\
         - Structure claire et logique\n\n\
         ## Conclusion\n\n\
         Un contenu evergreen bien conçu est un investissement à long terme.\n"
    );

    let keywords = payload_keywords(payload).unwrap_or_else(|| {
        vec!["Evergreen".to_string(), "Content".to_string(), "SEO".to_string()]
    });

    Ok(build_article(ArticleParts {
        title: title.clone(),
        content,
        excerpt: Some(format!("Article evergreen rédigé via intake {}", intake)),
        keywords,
        status: ArticleStatus::Draft,
        seo_data: SeoData {
            meta_title: format!("{} | Evergreen SEO", title),
            meta_description: "Contenu evergreen optimisé pour le SEO".to_string(),
            slug: slugify(&title),
            focus_keyword: "evergreen".to_string(),
        },
        source: Some("telegram".to_string()),
        scenario_id: Some(scenario.id.clone()),
        original_article_id: None,
        language: scenario.language.clone(),
        category: Some("Evergreen".to_string()),
        template_id: Some("evergreen-template".to_string()),
        project_id: payload_str(payload, "projectId").map(|p| p.to_string()),
    }))
}

// ============================================================================
// IA generation
// ============================================================================

fn handle_ia_generation(scenario: &ScenarioRecord, payload: &Value) -> Result<ArticleRecord> {
    tracing::info!("IA generation handler for scenario {}", scenario.name);

    let topic = pick_term(&IA_TOPICS, payload, &scenario.name);
    let prompt = payload_str(payload, "prompt")
        .map(|p| p.to_string())
        .unwrap_or_else(|| format!("Générer un article sur {}", topic));

    let title = payload_str(payload, "title")
        .map(|t| t.to_string())
        .unwrap_or_else(|| format!("{} : analyse automatique", topic));

    let body = payload_str(payload, "content").map(|c| c.to_string()).unwrap_or_else(|| {
        format!(
            "Cette analyse automatique explore les dernières tendances en matière de {}. Les \
             algorithmes identifient les patterns et insights les plus pertinents.",
            topic
        )
    });

    let content = format!(
        "# {topic} : Analyse Approfondie\n\n\
         ## Vue d'ensemble\n\n\
         L'intelligence artificielle transforme notre compréhension de {topic}.\n\n\
         ## Analyse Détaillée\n\n\
         {body}\n\n\
         ## Tendances Émergentes\n\n\
         - Innovation technologique\n\
         - Impact sur l'industrie\n\
         - Perspectives d'avenir\n\n\
         ## Conclusion\n\n\
         {topic} continue d'évoluer rapidement, et l'analyse automatique aide à anticiper ces \
         changements.\n"
    );

    let keywords = payload_keywords(payload).unwrap_or_else(|| {
        vec![topic.to_string(), "IA".to_string(), "Automatique".to_string()]
    });

    let mut article = build_article(ArticleParts {
        title,
        content,
        excerpt: Some(format!("Analyse générée automatiquement sur {}", topic)),
        keywords,
        status: ArticleStatus::Published,
        seo_data: SeoData {
            meta_title: format!("{} | Analyse Automatique", topic),
            meta_description: format!(
                "Analyse complète sur {} générée par intelligence artificielle",
                topic
            ),
            slug: slugify(&format!("{}-analyse-ia", topic)),
            focus_keyword: topic.to_string(),
        },
        source: Some("ia-generator".to_string()),
        scenario_id: Some(scenario.id.clone()),
        original_article_id: None,
        language: scenario.language.clone(),
        category: Some("IA Generated".to_string()),
        template_id: Some("ia-generated-template".to_string()),
        project_id: payload_str(payload, "projectId").map(|p| p.to_string()),
    });

    // Keep the originating prompt with the article body for the audit trail
    article.content = format!("{}\n---\n*Prompt : {}*\n", article.content, prompt);
    article.word_count = article.content.split_whitespace().count() as i64;

    Ok(article)
}

// ============================================================================
// Translation
// ============================================================================

async fn handle_translation(
    pool: &SqlitePool,
    translator: &dyn Translator,
    scenario: &ScenarioRecord,
    payload: &Value,
) -> Result<ArticleRecord> {
    let target = scenario.language.clone();
    let source_language = scenario
        .config
        .0
        .get("sourceLanguage")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_SOURCE_LANGUAGE)
        .to_string();

    tracing::info!("Translation handler {} -> {}", source_language, target);

    // Prefer a published article in the source language, then the most
    // recent article, then a hard-coded placeholder
    let source_article = match articles::latest_published_in_language(pool, &source_language).await? {
        Some(article) => Some(article),
        None => articles::latest(pool).await?,
    };

    let (src_id, src_title, src_content, src_excerpt, src_keywords, src_seo) = match &source_article
    {
        Some(article) => (
            Some(article.id.clone()),
            article.title.clone(),
            article.content.clone(),
            article.excerpt.clone().unwrap_or_else(|| "Extrait".to_string()),
            article.keywords.0.clone(),
            article.seo_data.0.clone(),
        ),
        None => (
            None,
            "Article source".to_string(),
            "Contenu à traduire".to_string(),
            "Extrait traduit".to_string(),
            vec!["Traduit".to_string(), "Content".to_string()],
            SeoData::default(),
        ),
    };

    let title = translator.translate(&source_language, &target, &src_title).await;
    let excerpt = translator.translate(&source_language, &target, &src_excerpt).await;

    let truncated: String = src_content.chars().take(500).collect();
    let translated_body = translator.translate(&source_language, &target, &truncated).await;
    let content = format!(
        "{}\n\n{}…\n\n*Traduction automatique*\n",
        translator::intro_header(&target),
        translated_body
    );

    let base_slug = if src_seo.slug.is_empty() {
        slugify(&src_title)
    } else {
        src_seo.slug.clone()
    };

    Ok(build_article(ArticleParts {
        title: title.clone(),
        content,
        excerpt: Some(excerpt.clone()),
        keywords: src_keywords,
        status: ArticleStatus::ReadyForWordpress,
        seo_data: SeoData {
            meta_title: title,
            meta_description: excerpt,
            slug: translator::localized_slug(&base_slug, &target),
            focus_keyword: if src_seo.focus_keyword.is_empty() {
                "content".to_string()
            } else {
                src_seo.focus_keyword
            },
        },
        source: Some(format!("translation-{}", target)),
        scenario_id: Some(scenario.id.clone()),
        original_article_id: src_id,
        language: target.clone(),
        category: Some(format!("WordPress {}", target)),
        template_id: Some("translation-template".to_string()),
        project_id: payload_str(payload, "projectId").map(|p| p.to_string()),
    }))
}

// ============================================================================
// Generic draft generation (automation platforms, POST /api/articles)
// ============================================================================

pub fn generic_article(payload: &Value, author_id: Option<&str>) -> ArticleRecord {
    let title = payload_str(payload, "title")
        .map(|t| t.to_string())
        .unwrap_or_else(|| "Article généré automatiquement".to_string());

    let content = payload_str(payload, "content").map(|c| c.to_string()).unwrap_or_else(|| {
        format!(
            "# {title}\n\n\
             ## Introduction\n\n\
             Cet article a été généré automatiquement via l'API.\n\n\
             ## Contenu principal\n\n\
             {}\n\n\
             ## Conclusion\n\n\
             Article généré via {}.\n",
            payload_str(payload, "prompt").unwrap_or("Contenu basé sur les paramètres fournis."),
            payload_str(payload, "source").unwrap_or("API"),
        )
    });

    let seo = payload.get("seoData").cloned().unwrap_or(Value::Null);
    let seo_str = |key: &str| seo.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

    build_article(ArticleParts {
        title: title.clone(),
        content,
        excerpt: payload_str(payload, "excerpt").map(|e| e.to_string()),
        keywords: payload_keywords(payload).unwrap_or_default(),
        status: ArticleStatus::Draft,
        seo_data: SeoData {
            meta_title: seo_str("metaTitle").unwrap_or_else(|| title.clone()),
            meta_description: seo_str("metaDescription").unwrap_or_default(),
            slug: seo_str("slug").unwrap_or_else(|| slugify(&title)),
            focus_keyword: seo_str("focusKeyword").unwrap_or_default(),
        },
        source: Some(
            payload_str(payload, "source").unwrap_or("manual").to_string(),
        ),
        scenario_id: None,
        original_article_id: None,
        language: payload_str(payload, "language").unwrap_or("FR").to_string(),
        category: payload_str(payload, "category").map(|c| c.to_string()),
        template_id: payload_str(payload, "templateId").map(|t| t.to_string()),
        project_id: payload_str(payload, "projectId").map(|p| p.to_string()),
    })
    .with_author(author_id)
}

// ============================================================================
// Shared article assembly
// ============================================================================

struct ArticleParts {
    title: String,
    content: String,
    excerpt: Option<String>,
    keywords: Vec<String>,
    status: ArticleStatus,
    seo_data: SeoData,
    source: Option<String>,
    scenario_id: Option<String>,
    original_article_id: Option<String>,
    language: String,
    category: Option<String>,
    template_id: Option<String>,
    project_id: Option<String>,
}

impl ArticleRecord {
    fn with_author(mut self, author_id: Option<&str>) -> Self {
        self.author_id = author_id.map(|a| a.to_string());
        self
    }
}

fn build_article(parts: ArticleParts) -> ArticleRecord {
    let now = Utc::now();
    let word_count = parts.content.split_whitespace().count() as i64;

    ArticleRecord {
        id: Uuid::new_v4().to_string(),
        title: parts.title,
        content: parts.content,
        excerpt: parts.excerpt,
        keywords: Json(parts.keywords),
        project_id: parts.project_id,
        template_id: parts.template_id,
        status: parts.status.as_str().to_string(),
        seo_data: Json(parts.seo_data),
        source: parts.source,
        scenario_id: parts.scenario_id,
        original_article_id: parts.original_article_id,
        language: parts.language,
        category: parts.category,
        word_count,
        author_id: None,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Payload helpers
// ============================================================================

fn payload_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn payload_keywords(payload: &Value) -> Option<Vec<String>> {
    let list = payload.get("keywords")?.as_array()?;
    let keywords: Vec<String> = list
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.to_string())
        .collect();

    if keywords.is_empty() {
        None
    } else {
        Some(keywords)
    }
}

/// Deterministic vocabulary pick: a term mentioned in the payload title or
/// content wins, otherwise the seed hashes to a stable index
fn pick_term<'a>(vocabulary: &[&'a str], payload: &Value, seed: &str) -> &'a str {
    for key in ["title", "content", "topic"] {
        if let Some(text) = payload_str(payload, key) {
            let lowered = text.to_lowercase();
            if let Some(term) = vocabulary.iter().find(|t| lowered.contains(&t.to_lowercase())) {
                return term;
            }
        }
    }

    vocabulary[(fnv1a(seed) % vocabulary.len() as u64) as usize]
}

fn fnv1a(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Lowercased URL slug, non-alphanumeric runs collapsed to single dashes
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;

    for c in input.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;
    use crate::pipeline::translator::KeywordTranslator;
    use serde_json::json;

    fn scenario(scenario_type: &str, source: &str, language: &str) -> ScenarioRecord {
        ScenarioRecord {
            id: Uuid::new_v4().to_string(),
            name: format!("Scenario {}", source),
            scenario_type: scenario_type.to_string(),
            category: None,
            status: "active".to_string(),
            source: source.to_string(),
            target: Some("ContentGen".to_string()),
            language: language.to_string(),
            last_execution: None,
            next_execution: None,
            execution_count: 0,
            success_rate: 100.0,
            avg_execution_time: 0.0,
            description: None,
            config: Json(json!({})),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_scraping_yields_published_crypto_article() {
        let pool = test_pool().await;
        let translator = KeywordTranslator;
        let scenario = scenario("scraping", "Cointelegraph", "FR");

        let article = run_handler(&pool, &translator, &scenario, &json!({})).await.unwrap();

        assert_eq!(article.status, "published");
        assert_eq!(article.category.as_deref(), Some("Crypto News"));
        assert_eq!(article.source.as_deref(), Some("rss-Cointelegraph"));
        assert_eq!(article.scenario_id.as_deref(), Some(scenario.id.as_str()));

        // Title or keywords reference the source or a vocabulary term
        let mentions_vocab = CRYPTO_KEYWORDS
            .iter()
            .any(|k| article.title.contains(k) || article.keywords.0.iter().any(|kw| kw == k));
        assert!(mentions_vocab || article.title.contains("Cointelegraph"));
        assert!(!article.seo_data.0.slug.is_empty());
        assert!(article.word_count > 0);
    }

    #[tokio::test]
    async fn test_scraping_prefers_payload_term() {
        let pool = test_pool().await;
        let translator = KeywordTranslator;
        let scenario = scenario("scraping", "Newsbit", "FR");

        let article = run_handler(
            &pool,
            &translator,
            &scenario,
            &json!({"content": "Ethereum staking yields are climbing"}),
        )
        .await
        .unwrap();

        assert_eq!(article.seo_data.0.focus_keyword, "Ethereum");
    }

    #[tokio::test]
    async fn test_redaction_yields_draft_evergreen() {
        let pool = test_pool().await;
        let translator = KeywordTranslator;
        let scenario = scenario("redaction", "Telegram URL", "FR");

        let article = run_handler(
            &pool,
            &translator,
            &scenario,
            &json!({"url": "https://example.com/guide"}),
        )
        .await
        .unwrap();

        assert_eq!(article.status, "draft");
        assert_eq!(article.category.as_deref(), Some("Evergreen"));
        assert!(article.content.contains("https://example.com/guide"));
    }

    #[tokio::test]
    async fn test_ia_generation_records_prompt() {
        let pool = test_pool().await;
        let translator = KeywordTranslator;
        let scenario = scenario("ia-generator", "IA Engine", "FR");

        let article = run_handler(
            &pool,
            &translator,
            &scenario,
            &json!({"prompt": "Écris sur la Blockchain"}),
        )
        .await
        .unwrap();

        assert_eq!(article.status, "published");
        assert!(article.content.contains("Écris sur la Blockchain"));
    }

    #[tokio::test]
    async fn test_translation_prefers_published_source() {
        let pool = test_pool().await;
        let translator = KeywordTranslator;

        // A published French source and a more recent draft
        let published = generic_article(
            &json!({"title": "Actualités Bitcoin", "content": "Contenu source", "language": "FR"}),
            None,
        );
        let mut published = published;
        published.status = "published".to_string();
        articles::insert(&pool, &published).await.unwrap();

        let draft = generic_article(&json!({"title": "Brouillon", "language": "FR"}), None);
        articles::insert(&pool, &draft).await.unwrap();

        let scenario = scenario("translation", "Evergreen FR", "DE");
        let article = run_handler(&pool, &translator, &scenario, &json!({})).await.unwrap();

        assert_eq!(article.status, "ready-for-wordpress");
        assert_eq!(article.original_article_id.as_deref(), Some(published.id.as_str()));
        assert_eq!(article.language, "DE");
        assert!(article.title.contains("Nachrichten"));
        assert!(article.seo_data.0.slug.ends_with("-de"));
        assert_eq!(article.category.as_deref(), Some("WordPress DE"));

        // The source article is untouched
        let source = articles::get_by_id(&pool, &published.id).await.unwrap().unwrap();
        assert_eq!(source.content, "Contenu source");
    }

    #[tokio::test]
    async fn test_translation_placeholder_without_sources() {
        let pool = test_pool().await;
        let translator = KeywordTranslator;
        let scenario = scenario("translation", "Evergreen FR", "EN");

        let article = run_handler(&pool, &translator, &scenario, &json!({})).await.unwrap();

        assert_eq!(article.status, "ready-for-wordpress");
        assert!(article.original_article_id.is_none());
    }

    #[test]
    fn test_pick_term_is_deterministic() {
        let empty = json!({});
        let a = pick_term(&CRYPTO_KEYWORDS, &empty, "Cointelegraph");
        let b = pick_term(&CRYPTO_KEYWORDS, &empty, "Cointelegraph");
        assert_eq!(a, b);
        assert!(CRYPTO_KEYWORDS.contains(&a));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Bitcoin : Dernières Actualités !"), "bitcoin-derni-res-actualit-s");
        assert_eq!(slugify("--Hello  World--"), "hello-world");
    }

    #[test]
    fn test_generic_article_defaults() {
        let article = generic_article(&json!({}), Some("u1"));
        assert_eq!(article.status, "draft");
        assert_eq!(article.author_id.as_deref(), Some("u1"));
        assert!(!article.seo_data.0.slug.is_empty());
    }
}
