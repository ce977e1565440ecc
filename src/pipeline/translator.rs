// Translation capability
//
// The production seam for a real translation backend. The shipped
// implementation substitutes known terms per target language, which is enough
// for the WordPress hand-off flow and for deterministic tests.

use async_trait::async_trait;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate text from the source language to the target language.
    /// Language codes are the scenario codes (FR, DE, EN, ES, PT).
    async fn translate(&self, source_language: &str, target_language: &str, text: &str) -> String;
}

/// Term-substitution translator. One entry per known editorial term; unknown
/// target languages pass the text through untouched.
#[derive(Debug, Default, Clone)]
pub struct KeywordTranslator;

impl KeywordTranslator {
    fn terms(target_language: &str) -> &'static [(&'static str, &'static str)] {
        match target_language {
            "DE" => &[
                ("Actualités", "Nachrichten"),
                ("News", "Nachrichten"),
                ("Guide", "Leitfaden"),
                ("Article", "Artikel"),
                ("Contenu", "Inhalt"),
            ],
            "EN" => &[
                ("Actualités", "News"),
                ("Guide", "Guide"),
                ("Article", "Article"),
                ("Contenu", "Content"),
            ],
            "ES" => &[
                ("Actualités", "Noticias"),
                ("Guide", "Guía"),
                ("Article", "Artículo"),
                ("Contenu", "Contenido"),
            ],
            "PT" => &[
                ("Actualités", "Notícias"),
                ("Guide", "Guia"),
                ("Article", "Artigo"),
                ("Contenu", "Conteúdo"),
            ],
            _ => &[],
        }
    }
}

#[async_trait]
impl Translator for KeywordTranslator {
    async fn translate(&self, _source_language: &str, target_language: &str, text: &str) -> String {
        let mut translated = text.to_string();
        for (from, to) in Self::terms(target_language) {
            translated = translated.replace(from, to);
        }
        translated
    }
}

/// Header prepended to translated article bodies
pub fn intro_header(target_language: &str) -> &'static str {
    match target_language {
        "DE" => "# Übersetzter Inhalt\n\nDieser Artikel wurde automatisch ins Deutsche übersetzt.",
        "EN" => "# Translated Content\n\nThis article has been automatically translated to English.",
        "ES" => "# Contenido Traducido\n\nEste artículo ha sido traducido automáticamente al español.",
        "PT" => "# Conteúdo Traduzido\n\nEste artigo foi traduzido automaticamente para português.",
        _ => "# Contenu Traduit\n\nCet article a été traduit automatiquement.",
    }
}

/// URL slug for a translated derivative: the source slug plus the lowercased
/// language code
pub fn localized_slug(slug: &str, target_language: &str) -> String {
    format!("{}-{}", slug, target_language.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_term_substitution() {
        let translator = KeywordTranslator;

        let de = translator
            .translate("FR", "DE", "Actualités Crypto : Guide complet")
            .await;
        assert_eq!(de, "Nachrichten Crypto : Leitfaden complet");

        let en = translator.translate("FR", "EN", "Actualités du jour").await;
        assert_eq!(en, "News du jour");
    }

    #[tokio::test]
    async fn test_unknown_language_passes_through() {
        let translator = KeywordTranslator;
        let same = translator.translate("FR", "IT", "Actualités").await;
        assert_eq!(same, "Actualités");
    }

    #[test]
    fn test_localized_slug() {
        assert_eq!(localized_slug("bitcoin-analyse", "DE"), "bitcoin-analyse-de");
    }
}
