//! Runtime settings read from the environment (optionally seeded from `.env`).

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8501";
pub const DEFAULT_MODEL_PATH: &str = "models/sentiment_model.json";
pub const DEFAULT_VECTORIZER_PATH: &str = "models/tfidf_vectorizer.json";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_NLP_CACHE_DIR: &str = "nltk_data";
pub const DEFAULT_WORDNET_URL: &str = "https://wordnetcode.princeton.edu/3.0/WordNet-3.0.tar.gz";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
    /// Root of a prepared `nltk_data`-style tree. When set, nothing is fetched.
    pub nlp_data_dir: Option<PathBuf>,
    /// Where fetched NLP resources are cached when `nlp_data_dir` is unset.
    pub nlp_cache_dir: PathBuf,
    pub wordnet_url: String,
    /// Skip the fetch and use the embedded resources.
    pub nlp_offline: bool,
    pub static_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_str = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_str
            .parse()
            .with_context(|| format!("BIND_ADDR is not a socket address: {}", bind_str))?;

        Ok(Self {
            bind_addr,
            model_path: get("MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
                .into(),
            vectorizer_path: get("VECTORIZER_PATH")
                .unwrap_or_else(|| DEFAULT_VECTORIZER_PATH.to_string())
                .into(),
            nlp_data_dir: get("NLP_DATA_DIR").map(PathBuf::from),
            nlp_cache_dir: get("NLP_CACHE_DIR")
                .unwrap_or_else(|| DEFAULT_NLP_CACHE_DIR.to_string())
                .into(),
            wordnet_url: get("WORDNET_URL").unwrap_or_else(|| DEFAULT_WORDNET_URL.to_string()),
            nlp_offline: get("NLP_OFFLINE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            static_dir: get("STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8501)),
            model_path: DEFAULT_MODEL_PATH.into(),
            vectorizer_path: DEFAULT_VECTORIZER_PATH.into(),
            nlp_data_dir: None,
            nlp_cache_dir: DEFAULT_NLP_CACHE_DIR.into(),
            wordnet_url: DEFAULT_WORDNET_URL.to_string(),
            nlp_offline: false,
            static_dir: DEFAULT_STATIC_DIR.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.bind_addr.port(), 8501);
        assert_eq!(settings.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(settings.vectorizer_path, PathBuf::from(DEFAULT_VECTORIZER_PATH));
        assert!(settings.nlp_data_dir.is_none());
        assert_eq!(settings.nlp_cache_dir, PathBuf::from(DEFAULT_NLP_CACHE_DIR));
        assert_eq!(settings.wordnet_url, DEFAULT_WORDNET_URL);
        assert!(!settings.nlp_offline);
    }

    #[test]
    fn test_offline_flag() {
        for value in ["1", "true", "YES"] {
            let settings = Settings::from_lookup(lookup_from(&[("NLP_OFFLINE", value)])).unwrap();
            assert!(settings.nlp_offline, "{}", value);
        }
        let settings = Settings::from_lookup(lookup_from(&[("NLP_OFFLINE", "0")])).unwrap();
        assert!(!settings.nlp_offline);
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("MODEL_PATH", "/opt/model.json"),
            ("NLP_DATA_DIR", "   "),
        ]))
        .unwrap();
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(settings.model_path, PathBuf::from("/opt/model.json"));
        assert!(settings.nlp_data_dir.is_none());
    }

    #[test]
    fn test_bad_bind_addr_is_error() {
        let err = Settings::from_lookup(lookup_from(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }
}
