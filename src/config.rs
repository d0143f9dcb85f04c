use std::path::PathBuf;

use crate::catalog::Catalog;

pub const DEFAULT_IDLE_CLIP: &str =
    "https://res.cloudinary.com/djfiaa34u/video/upload/v1739933000/espera_n3saef.mp4";
pub const DEFAULT_THUMBNAIL_BASE: &str = "https://res.cloudinary.com/djfiaa34u/video/upload";
pub const DEFAULT_TITLE: &str = "SWAU Questions";

/// Kiosk settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskConfig {
    pub idle_clip: String,
    pub catalog_path: Option<PathBuf>,
    pub thumbnail_base: String,
    pub title: String,
}

impl Default for KioskConfig {
    fn default() -> Self {
        KioskConfig {
            idle_clip: DEFAULT_IDLE_CLIP.to_string(),
            catalog_path: None,
            thumbnail_base: DEFAULT_THUMBNAIL_BASE.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl KioskConfig {
    pub fn from_environment() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = KioskConfig::default();

        KioskConfig {
            idle_clip: get("FAQ_KIOSK_IDLE_CLIP").unwrap_or(defaults.idle_clip),
            catalog_path: get("FAQ_KIOSK_CATALOG").map(PathBuf::from),
            thumbnail_base: get("FAQ_KIOSK_THUMBNAIL_BASE").unwrap_or(defaults.thumbnail_base),
            title: get("FAQ_KIOSK_TITLE").unwrap_or(defaults.title),
        }
    }

    /// The configured catalog, or the built-in one if none is set or it fails to load.
    pub fn load_catalog(&self) -> Catalog {
        let Some(path) = &self.catalog_path else {
            return Catalog::builtin();
        };
        match Catalog::from_path(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("{}; falling back to the built-in catalog", e);
                Catalog::builtin()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = KioskConfig::from_lookup(lookup(&[]));
        assert_eq!(config, KioskConfig::default());
        assert_eq!(config.idle_clip, DEFAULT_IDLE_CLIP);
    }

    #[test]
    fn variables_override_defaults() {
        let config = KioskConfig::from_lookup(lookup(&[
            ("FAQ_KIOSK_IDLE_CLIP", "https://cdn.example.edu/v1/idle.mp4"),
            ("FAQ_KIOSK_CATALOG", "/etc/kiosk/catalog.json"),
            ("FAQ_KIOSK_THUMBNAIL_BASE", "https://img.example.edu"),
            ("FAQ_KIOSK_TITLE", "Open Day"),
        ]));

        assert_eq!(config.idle_clip, "https://cdn.example.edu/v1/idle.mp4");
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/kiosk/catalog.json"))
        );
        assert_eq!(config.thumbnail_base, "https://img.example.edu");
        assert_eq!(config.title, "Open Day");
    }

    #[test]
    fn blank_values_are_unset() {
        let config = KioskConfig::from_lookup(lookup(&[
            ("FAQ_KIOSK_IDLE_CLIP", "   "),
            ("FAQ_KIOSK_CATALOG", ""),
        ]));
        assert_eq!(config.idle_clip, DEFAULT_IDLE_CLIP);
        assert_eq!(config.catalog_path, None);
    }

    #[test]
    fn unreadable_catalog_falls_back_to_builtin() {
        let config = KioskConfig {
            catalog_path: Some(PathBuf::from("/nonexistent/kiosk/catalog.json")),
            ..KioskConfig::default()
        };
        assert_eq!(config.load_catalog().len(), Catalog::builtin().len());
    }
}
