//! Language tags and per-language routing metadata.

use serde::{Deserialize, Serialize};

/// A supported classical language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Latin (`lat`).
    #[serde(rename = "lat")]
    Latin,
    /// Ancient Greek (`grc`).
    #[serde(rename = "grc")]
    Greek,
    /// Sanskrit (`san`).
    #[serde(rename = "san")]
    Sanskrit,
}

impl Language {
    /// Parse an ISO 639-3 code. Returns `None` for unsupported codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "lat" | "latin" | "la" => Some(Language::Latin),
            "grc" | "greek" | "el" => Some(Language::Greek),
            "san" | "sanskrit" | "sa" => Some(Language::Sanskrit),
            _ => None,
        }
    }

    /// The ISO 639-3 code used in cache keys, fact subjects, and the CLI.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Latin => "lat",
            Language::Greek => "grc",
            Language::Sanskrit => "san",
        }
    }

    /// All supported languages, in routing order.
    pub fn all() -> [Language; 3] {
        [Language::Latin, Language::Greek, Language::Sanskrit]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_accepts_iso_and_names() {
        assert_eq!(Language::from_code("lat"), Some(Language::Latin));
        assert_eq!(Language::from_code("GRC"), Some(Language::Greek));
        assert_eq!(Language::from_code("sanskrit"), Some(Language::Sanskrit));
        assert_eq!(Language::from_code("fra"), None);
    }

    #[test]
    fn code_round_trips() {
        for lang in Language::all() {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }
}
