// Provider synthesizer capability
//
// Ad-hoc generation dispatches to a named AI backend through this interface.
// The shipped implementation renders deterministic structured documents per
// backend; a real client performs the API call behind the same trait.

use crate::db::schema::ProviderRecord;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Parameters of one ad-hoc generation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub template: Option<String>,
    pub tone: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "wordCount")]
    pub word_count: Option<i64>,
    pub creativity: Option<i64>,
    #[serde(rename = "seoKeywords", default)]
    pub seo_keywords: Vec<String>,
}

/// Connection probe failure classes. A real probe must distinguish these;
/// the caller maps any of them to provider status `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    Timeout,
    AuthFailed,
    Network,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Timeout => write!(f, "connection timed out"),
            ProbeError::AuthFailed => write!(f, "authentication failed"),
            ProbeError::Network => write!(f, "network unreachable"),
        }
    }
}

#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Render content for the request against the given backend
    async fn generate(&self, provider: &ProviderRecord, request: &GenerationRequest)
        -> Result<String>;

    /// Probe the backend connection
    async fn probe(&self, provider: &ProviderRecord) -> std::result::Result<(), ProbeError>;
}

// ============================================================================
// Language packs
// ============================================================================

struct LanguagePack {
    intro: &'static str,
    conclusion: &'static str,
    connecting: [&'static str; 5],
}

fn language_pack(language: Option<&str>) -> &'static LanguagePack {
    const FRENCH: LanguagePack = LanguagePack {
        intro: "Dans cet article, nous allons explorer",
        conclusion: "En conclusion, il est important de retenir que",
        connecting: ["Par ailleurs", "En outre", "De plus", "Ainsi", "Cependant"],
    };
    const ENGLISH: LanguagePack = LanguagePack {
        intro: "In this article, we will explore",
        conclusion: "In conclusion, it's important to remember that",
        connecting: ["Furthermore", "Additionally", "Moreover", "Therefore", "However"],
    };
    const SPANISH: LanguagePack = LanguagePack {
        intro: "En este artículo, exploraremos",
        conclusion: "En conclusión, es importante recordar que",
        connecting: ["Además", "Por otra parte", "Asimismo", "Por tanto", "Sin embargo"],
    };

    match language {
        Some("english") | Some("EN") => &ENGLISH,
        Some("spanish") | Some("ES") => &SPANISH,
        _ => &FRENCH,
    }
}

// ============================================================================
// Template renderer
// ============================================================================

/// Deterministic template renderer standing in for the real AI backends
#[derive(Debug, Clone)]
pub struct TemplateProviderClient {
    pub latency: Duration,
}

impl TemplateProviderClient {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    fn keyword_line(prefix: &str, keywords: &[String]) -> String {
        if keywords.is_empty() {
            String::new()
        } else {
            format!(" {}: {}.", prefix, keywords.join(", "))
        }
    }

    fn heading(request: &GenerationRequest, fallback: &str) -> String {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            fallback.to_string()
        } else {
            prompt.to_string()
        }
    }

    fn render_claude(request: &GenerationRequest, pack: &LanguagePack) -> String {
        format!(
            "# {title}\n\n\
             ## Introduction\n\n\
             {intro} un sujet d'une importance capitale dans le paysage actuel. Cette analyse \
             approfondie vous permettra de comprendre les enjeux et les opportunités qui se \
             dessinent.\n\n\
             ## Développement Principal\n\n\
             Les données récentes montrent une évolution significative dans ce domaine. \
             {c0}, les experts s'accordent sur plusieurs points essentiels qui méritent notre \
             attention.\n\n\
             ### Points Clés à Retenir\n\n\
             1. **Évolution du marché** : les tendances actuelles révèlent des changements structurels\n\
             2. **Impact technologique** : l'innovation transforme les pratiques établies\n\
             3. **Perspectives d'avenir** : les projections à moyen terme sont encourageantes\n\n\
             {c1}, il convient d'analyser les différents aspects de cette question avec rigueur.\n\n\
             ## Recommandations Stratégiques\n\n\
             - Surveiller attentivement les indicateurs clés\n\
             - Investir dans la formation des équipes\n\
             - Maintenir une veille concurrentielle active\n\n\
             ## Conclusion\n\n\
             {conclusion} cette analyse ouvre de nombreuses perspectives d'évolution.\n\n\
             ---\n*Article généré par Claude AI.{keywords}*",
            title = Self::heading(request, "Analyse Complète"),
            intro = pack.intro,
            c0 = pack.connecting[0],
            c1 = pack.connecting[1],
            conclusion = pack.conclusion,
            keywords = Self::keyword_line("Mots-clés", &request.seo_keywords),
        )
    }

    fn render_chatgpt(request: &GenerationRequest, pack: &LanguagePack) -> String {
        format!(
            "# {title}\n\n\
             ## Vue d'Ensemble\n\n\
             {intro} un domaine en pleine expansion qui suscite un intérêt croissant.\n\n\
             ## Contexte et Enjeux\n\n\
             Le paysage actuel se caractérise par une dynamique particulièrement intense. \
             {c2}, les transformations en cours redéfinissent les règles du jeu établies.\n\n\
             ### Facteurs Déterminants\n\n\
             - **Innovation continue** : les avancées technologiques accélèrent les mutations\n\
             - **Demande croissante** : les besoins évoluent vers plus de sophistication\n\
             - **Concurrence intense** : la différenciation devient un impératif\n\n\
             ## Stratégies Gagnantes\n\n\
             1. **L'agilité opérationnelle** pour s'adapter rapidement\n\
             2. **L'innovation centrée utilisateur** pour créer de la valeur\n\
             3. **La mesure continue** pour optimiser les performances\n\n\
             ## Synthèse\n\n\
             {c4}, la vigilance reste de mise. {conclusion} cette analyse révèle un potentiel \
             significatif.\n\n\
             ---\n*Contenu généré par ChatGPT.{keywords}*",
            title = Self::heading(request, "Guide Complet"),
            intro = pack.intro,
            c2 = pack.connecting[2],
            c4 = pack.connecting[4],
            conclusion = pack.conclusion,
            keywords = Self::keyword_line("Mots-clés SEO", &request.seo_keywords),
        )
    }

    fn render_perplexity(request: &GenerationRequest, pack: &LanguagePack) -> String {
        format!(
            "# {title}\n\n\
             ## Recherche et Sources\n\n\
             {intro} un sujet d'actualité qui nécessite une approche basée sur les données les \
             plus récentes.\n\n\
             ## État des Connaissances\n\n\
             Selon les dernières études, plusieurs constats s'imposent. {c0}, les données \
             récentes confirment les tendances observées par les analystes du secteur.\n\n\
             ### Données Factuelles\n\n\
             - **Sources primaires** : études académiques et rapports d'experts\n\
             - **Indicateurs quantitatifs** : statistiques officielles\n\
             - **Retours terrain** : cas d'usage documentés\n\n\
             ## Synthèse des Recherches\n\n\
             L'analyse croisée des sources disponibles révèle une convergence remarquable sur \
             les points essentiels. {c1}, cette cohérence renforce la fiabilité des conclusions.\n\n\
             ## Conclusion Factuelle\n\n\
             {conclusion} cette recherche fournit une base solide pour la prise de décision.\n\n\
             ---\n*Recherche effectuée avec Perplexity AI.{keywords}*",
            title = Self::heading(request, "Recherche Approfondie"),
            intro = pack.intro,
            c0 = pack.connecting[0],
            c1 = pack.connecting[1],
            conclusion = pack.conclusion,
            keywords = Self::keyword_line("Optimisé pour", &request.seo_keywords),
        )
    }

    fn render_default(request: &GenerationRequest, pack: &LanguagePack) -> String {
        format!(
            "# {title}\n\n\
             ## Introduction\n\n\
             {intro} ce sujet important qui mérite toute notre attention.\n\n\
             ## Développement\n\n\
             Le contexte actuel présente de nombreuses opportunités d'évolution. {c0}, il est \
             essentiel de bien comprendre les enjeux pour prendre les bonnes décisions.\n\n\
             ### Points Essentiels\n\n\
             - Analyse des tendances actuelles\n\
             - Identification des opportunités\n\
             - Recommandations pratiques\n\n\
             ## Conclusion\n\n\
             {conclusion} cette analyse offre une perspective équilibrée sur le sujet.\n\n\
             ---\n*Contenu généré automatiquement.{keywords}*",
            title = Self::heading(request, "Analyse"),
            intro = pack.intro,
            c0 = pack.connecting[0],
            conclusion = pack.conclusion,
            keywords = Self::keyword_line("SEO", &request.seo_keywords),
        )
    }
}

#[async_trait]
impl ProviderClient for TemplateProviderClient {
    async fn generate(
        &self,
        provider: &ProviderRecord,
        request: &GenerationRequest,
    ) -> Result<String> {
        tracing::info!(
            "Generating content with {} ({} keywords)",
            provider.name,
            request.seo_keywords.len()
        );
        tokio::time::sleep(self.latency).await;

        let pack = language_pack(request.language.as_deref());

        let content = match provider.id.as_str() {
            "claude" => Self::render_claude(request, pack),
            "chatgpt" => Self::render_chatgpt(request, pack),
            "perplexity" => Self::render_perplexity(request, pack),
            _ => Self::render_default(request, pack),
        };

        Ok(content)
    }

    async fn probe(&self, provider: &ProviderRecord) -> std::result::Result<(), ProbeError> {
        tracing::info!("Testing connection for {}", provider.name);
        tokio::time::sleep(self.latency).await;

        // The simulated backend accepts any stored key; a real client must
        // map timeouts, 401s and transport errors onto ProbeError.
        if provider.api_key.is_none() {
            return Err(ProbeError::AuthFailed);
        }

        Ok(())
    }
}

/// Test double that always fails, for exercising the error bookkeeping
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingProviderClient;

#[async_trait]
impl ProviderClient for FailingProviderClient {
    async fn generate(
        &self,
        _provider: &ProviderRecord,
        _request: &GenerationRequest,
    ) -> Result<String> {
        Err(AppError::Upstream("synthesizer unavailable".to_string()))
    }

    async fn probe(&self, _provider: &ProviderRecord) -> std::result::Result<(), ProbeError> {
        Err(ProbeError::Network)
    }
}
