// Idempotent bootstrap data: the provider catalogue and one user per role

use crate::auth::password;
use crate::config::SeedConfig;
use crate::db::schema::{ProviderRecord, UserRecord};
use crate::db::{providers, users};
use crate::errors::Result;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

pub async fn run(pool: &SqlitePool, config: &SeedConfig) -> Result<()> {
    if !config.enabled {
        tracing::info!("Seeding disabled, skipping bootstrap data");
        return Ok(());
    }

    seed_providers(pool).await?;
    seed_users(pool, &config.bootstrap_password).await?;

    Ok(())
}

async fn seed_providers(pool: &SqlitePool) -> Result<()> {
    let catalogue = [
        ProviderRecord {
            id: "claude".to_string(),
            name: "Claude (Anthropic)".to_string(),
            status: "disconnected".to_string(),
            description: Some(
                "Modèle avancé pour génération de contenu long-forme et analyse approfondie"
                    .to_string(),
            ),
            api_key: None,
            last_used: None,
            capabilities: Json(vec![
                "text-generation".to_string(),
                "analysis".to_string(),
                "translation".to_string(),
                "summarization".to_string(),
            ]),
            max_tokens: 100_000,
            pricing: "premium".to_string(),
        },
        ProviderRecord {
            id: "chatgpt".to_string(),
            name: "ChatGPT (OpenAI)".to_string(),
            status: "disconnected".to_string(),
            description: Some(
                "Générateur de contenu polyvalent et créatif avec excellent style rédactionnel"
                    .to_string(),
            ),
            api_key: None,
            last_used: None,
            capabilities: Json(vec![
                "text-generation".to_string(),
                "creative-writing".to_string(),
                "code-generation".to_string(),
                "translation".to_string(),
            ]),
            max_tokens: 128_000,
            pricing: "standard".to_string(),
        },
        ProviderRecord {
            id: "perplexity".to_string(),
            name: "Perplexity AI".to_string(),
            status: "disconnected".to_string(),
            description: Some(
                "IA spécialisée dans la recherche, l'actualité et les contenus factuels"
                    .to_string(),
            ),
            api_key: None,
            last_used: None,
            capabilities: Json(vec![
                "research".to_string(),
                "fact-checking".to_string(),
                "news-analysis".to_string(),
                "citations".to_string(),
            ]),
            max_tokens: 8_000,
            pricing: "standard".to_string(),
        },
    ];

    for provider in &catalogue {
        providers::insert_if_missing(pool, provider).await?;
    }

    tracing::info!("Provider catalogue seeded ({} providers)", catalogue.len());
    Ok(())
}

async fn seed_users(pool: &SqlitePool, bootstrap_password: &str) -> Result<()> {
    let password_hash = password::hash_password(bootstrap_password)?;

    let bootstrap = [
        ("super-admin-1", "admin", "Super Administrateur", "super_admin"),
        ("manager-1", "manager", "Gestionnaire Contenu", "manager"),
        ("redacteur-1", "redacteur", "Rédacteur Principal", "redacteur"),
    ];

    for (id, username, name, role) in bootstrap {
        if users::get_by_username(pool, username).await?.is_some() {
            continue;
        }

        let user = UserRecord {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{}@contentgen.local", username),
            name: name.to_string(),
            role: role.to_string(),
            password_hash: password_hash.clone(),
            avatar: None,
            status: "active".to_string(),
            created_at: Utc::now(),
            last_login: None,
        };

        users::insert(pool, &user).await?;
        tracing::info!("Bootstrap user created: {} ({})", username, role);
    }

    Ok(())
}
