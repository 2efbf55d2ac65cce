use std::collections::HashMap;

use i18n_embed::DesktopLanguageRequester;
use log::debug;
use unic_langid::{langid, LanguageIdentifier};

use crate::download::OutcomeText;

// Simple in-memory translations
#[derive(Default)]
pub struct Translations {
    strings: HashMap<&'static str, &'static str>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: &'static str) {
        self.strings.insert(key, value);
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.strings.get(key).copied()
    }
}

fn english() -> Translations {
    let mut en = Translations::new();
    en.insert("app-title", "Media Downloader");
    en.insert("url-label", "Enter URL:");
    en.insert("url-placeholder", "https://www.example.com");
    en.insert("media-type-label", "Select Media Type:");
    en.insert("media-audio", "Audio");
    en.insert("media-video", "Video");
    en.insert("quality-label", "Select Video Quality:");
    en.insert("save-location-label", "Save Location:");
    en.insert("save-location-placeholder", "Select download directory");
    en.insert("choose-location", "Choose Location");
    en.insert("download-button", "Start Download");
    en.insert("update-button", "Update yt-dlp");
    en.insert("install-button", "Install yt-dlp");
    en.insert("ok-button", "OK");
    en.insert("saved-to", "Saved to:");
    en.insert("status-downloading", "Downloading...");
    en.insert("status-maintaining", "Working on yt-dlp...");
    en.insert("engine-missing", "yt-dlp not found");
    en.insert("popup-success", "Success");
    en.insert("popup-error", "Error");
    en.insert("download-success", "File downloaded successfully!");
    en.insert("download-failed", "An error occurred during download:");
    en.insert("error-empty-url", "Please enter a valid URL.");
    en.insert("error-missing-quality", "Please select a video quality.");
    en.insert("error-empty-save-path", "Please select a save location.");
    en.insert("error-busy", "A download is already in progress.");
    en.insert("error-worker", "Could not start the background worker:");
    en
}

fn spanish() -> Translations {
    let mut es = Translations::new();
    es.insert("app-title", "Descargador de medios");
    es.insert("url-label", "Ingrese la URL:");
    es.insert("media-type-label", "Tipo de medio:");
    es.insert("media-audio", "Audio");
    es.insert("media-video", "Video");
    es.insert("quality-label", "Calidad de video:");
    es.insert("save-location-label", "Ubicación de guardado:");
    es.insert("save-location-placeholder", "Seleccione el directorio de descarga");
    es.insert("choose-location", "Elegir ubicación");
    es.insert("download-button", "Iniciar descarga");
    es.insert("update-button", "Actualizar yt-dlp");
    es.insert("install-button", "Instalar yt-dlp");
    es.insert("ok-button", "Aceptar");
    es.insert("saved-to", "Guardado en:");
    es.insert("status-downloading", "Descargando...");
    es.insert("status-maintaining", "Trabajando en yt-dlp...");
    es.insert("engine-missing", "No se encontró yt-dlp");
    es.insert("popup-success", "Éxito");
    es.insert("popup-error", "Error");
    es.insert("download-success", "¡Archivo descargado correctamente!");
    es.insert("download-failed", "Ocurrió un error durante la descarga:");
    es.insert("error-empty-url", "Por favor ingrese una URL válida.");
    es.insert("error-missing-quality", "Por favor seleccione una calidad de video.");
    es.insert("error-empty-save-path", "Por favor seleccione una ubicación de guardado.");
    es.insert("error-busy", "Ya hay una descarga en curso.");
    es.insert("error-worker", "No se pudo iniciar el proceso en segundo plano:");
    es
}

pub struct Localizations {
    translations: HashMap<LanguageIdentifier, Translations>,
    fallback: LanguageIdentifier,
    current_lang: LanguageIdentifier,
}

impl Localizations {
    /// Bundled languages, starting in English.
    pub fn new() -> Self {
        let fallback = langid!("en-US");
        let mut translations = HashMap::new();
        translations.insert(fallback.clone(), english());
        translations.insert(langid!("es-ES"), spanish());

        Self {
            translations,
            current_lang: fallback.clone(),
            fallback,
        }
    }

    /// Bundled languages, switched to the first one the desktop asks for.
    pub fn from_desktop() -> Self {
        let mut localizer = Self::new();
        let requested = DesktopLanguageRequester::requested_languages();
        debug!("Desktop requested languages: {:?}", requested);
        for lang in &requested {
            if localizer.select(lang) {
                break;
            }
        }
        localizer
    }

    pub fn current(&self) -> &LanguageIdentifier {
        &self.current_lang
    }

    /// Exact match first, then any bundled language with the same primary tag.
    fn resolve(&self, lang: &LanguageIdentifier) -> Option<LanguageIdentifier> {
        if self.translations.contains_key(lang) {
            return Some(lang.clone());
        }
        self.translations
            .keys()
            .find(|key| key.language == lang.language)
            .cloned()
    }

    /// Switches to `lang` if a bundle covers it; otherwise keeps the current one.
    pub fn select(&mut self, lang: &LanguageIdentifier) -> bool {
        match self.resolve(lang) {
            Some(found) => {
                self.current_lang = found;
                true
            }
            None => false,
        }
    }

    pub fn lookup_single_language(&self, key: &str) -> Option<String> {
        self.translations
            .get(&self.current_lang)
            .and_then(|t| t.lookup(key))
            .or_else(|| self.translations.get(&self.fallback).and_then(|t| t.lookup(key)))
            .map(|s| s.to_string())
    }

    /// Translated text, or the key itself when no bundle has it.
    pub fn text(&self, key: &str) -> String {
        self.lookup_single_language(key)
            .unwrap_or_else(|| key.to_string())
    }

    pub fn outcome_text(&self) -> OutcomeText {
        OutcomeText {
            success_title: self.text("popup-success"),
            success_message: self.text("download-success"),
            error_title: self.text("popup-error"),
            failure_prefix: self.text("download-failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_english() {
        let localizer = Localizations::new();
        assert_eq!(localizer.text("download-button"), "Start Download");
    }

    #[test]
    fn selects_by_primary_language() {
        let mut localizer = Localizations::new();
        assert!(localizer.select(&langid!("es-MX")));
        assert_eq!(localizer.current(), &langid!("es-ES"));
        assert_eq!(localizer.text("download-button"), "Iniciar descarga");
    }

    #[test]
    fn unknown_language_keeps_current() {
        let mut localizer = Localizations::new();
        assert!(!localizer.select(&langid!("de-DE")));
        assert_eq!(localizer.current(), &langid!("en-US"));
    }

    #[test]
    fn missing_keys_fall_back_to_english_then_key() {
        let mut localizer = Localizations::new();
        localizer.select(&langid!("es-ES"));
        assert_eq!(localizer.text("url-placeholder"), "https://www.example.com");
        assert_eq!(localizer.text("no-such-key"), "no-such-key");
    }

    #[test]
    fn error_keys_are_translated_in_every_bundle() {
        let keys = [
            "error-empty-url",
            "error-missing-quality",
            "error-empty-save-path",
            "error-busy",
            "error-worker",
        ];
        for bundle in [english(), spanish()] {
            for key in keys {
                assert!(bundle.lookup(key).is_some(), "missing {}", key);
            }
        }
    }

    #[test]
    fn outcome_text_matches_default_in_english() {
        let text = Localizations::new().outcome_text();
        let default = OutcomeText::default();
        assert_eq!(text.success_message, default.success_message);
        assert_eq!(text.failure_prefix, default.failure_prefix);
    }
}
