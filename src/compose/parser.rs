//! Docker Compose file parser

use super::config::{CommandConfig, ComposeFile, EnvironmentConfig, ScalarValue};
use crate::error::{CorralError, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Default compose file names
pub const DEFAULT_COMPOSE_FILES: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// Compose file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Find compose file in directory
    pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
        DEFAULT_COMPOSE_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Parse compose file from path
    pub fn parse_file(path: &Path) -> Result<ComposeFile> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CorralError::ComposeParse(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_str(&content)
    }

    /// Parse compose file from string
    pub fn parse_str(content: &str) -> Result<ComposeFile> {
        serde_yaml::from_str(content)
            .map_err(|e| CorralError::ComposeParse(format!("Failed to parse YAML: {}", e)))
    }

    /// Parse multiple compose files (with merging)
    pub fn parse_files(paths: &[&Path]) -> Result<ComposeFile> {
        let mut file = ComposeFile::default();

        for path in paths {
            let overlay = Self::parse_file(path)?;
            file = Self::merge(file, overlay);
        }

        Ok(file)
    }

    /// Merge two compose files; the overlay wins field by field
    pub fn merge(base: ComposeFile, overlay: ComposeFile) -> ComposeFile {
        let mut result = base;

        if overlay.version.is_some() {
            result.version = overlay.version;
        }
        if overlay.name.is_some() {
            result.name = overlay.name;
        }

        for (name, service) in overlay.services {
            match result.services.iter_mut().find(|(n, _)| *n == name) {
                Some((_, existing)) => existing.merge(service),
                None => result.services.push((name, service)),
            }
        }

        result
    }

    /// Interpolate environment variables in images, commands and
    /// environment values
    pub fn interpolate(file: &mut ComposeFile, env: &HashMap<String, String>) {
        for (_, service) in file.services.iter_mut() {
            if let Some(ref mut image) = service.image {
                *image = interpolate_string(image, env);
            }

            match service.command {
                Some(CommandConfig::Shell(ref mut s)) => *s = interpolate_string(s, env),
                Some(CommandConfig::Exec(ref mut arr)) => {
                    for item in arr.iter_mut() {
                        *item = interpolate_string(item, env);
                    }
                }
                None => {}
            }

            match service.environment {
                Some(EnvironmentConfig::Map(ref mut map)) => {
                    for value in map.values_mut() {
                        if let Some(ScalarValue::Text(v)) = value {
                            *v = interpolate_string(v, env);
                        }
                    }
                }
                Some(EnvironmentConfig::Array(ref mut arr)) => {
                    for item in arr.iter_mut() {
                        *item = interpolate_string(item, env);
                    }
                }
                None => {}
            }
        }
    }
}

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("variable pattern is valid")
    })
}

/// Interpolate `${VAR}`, `${VAR:-default}` and `$VAR`; unset variables
/// without a default become empty
fn interpolate_string(s: &str, env: &HashMap<String, String>) -> String {
    variable_pattern()
        .replace_all(s, |caps: &Captures| {
            let var = caps
                .get(1)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match env.get(var) {
                Some(value) => value.clone(),
                None => caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_simple_compose() {
        let yaml = r#"
version: "3.8"
services:
  web:
    image: nginx:latest
    ports:
      - "80:80"
  db:
    image: postgres:13
    environment:
      POSTGRES_PASSWORD: secret
"#;

        let file = ComposeParser::parse_str(yaml).unwrap();
        assert_eq!(file.services.len(), 2);
        assert!(file.service("web").is_some());
        assert!(file.service("db").is_some());
    }

    #[test]
    fn test_duplicate_service_rejected() {
        let yaml = r#"
services:
  web:
    image: nginx
  web:
    image: httpd
"#;

        assert!(ComposeParser::parse_str(yaml).is_err());
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = ComposeParser::parse_str(
            "services:\n  web:\n    image: nginx\n    command: serve\n  db:\n    image: postgres\n",
        )
        .unwrap();
        let overlay = ComposeParser::parse_str(
            "name: prod\nservices:\n  web:\n    image: nginx:1.25\n  cache:\n    image: redis\n",
        )
        .unwrap();

        let merged = ComposeParser::merge(base, overlay);
        assert_eq!(merged.name.as_deref(), Some("prod"));
        let names: Vec<&str> = merged.services.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["web", "db", "cache"]);

        let web = merged.service("web").unwrap();
        assert_eq!(web.image.as_deref(), Some("nginx:1.25"));
        assert!(matches!(web.command, Some(CommandConfig::Shell(ref s)) if s == "serve"));
    }

    #[test]
    fn test_parse_files_from_disk() {
        let temp = tempdir().unwrap();
        let base = temp.path().join("compose.yaml");
        let overlay = temp.path().join("compose.override.yaml");
        std::fs::write(&base, "services:\n  web:\n    image: nginx\n").unwrap();
        std::fs::write(&overlay, "services:\n  web:\n    image: caddy\n").unwrap();

        assert_eq!(ComposeParser::find_compose_file(temp.path()), Some(base.clone()));

        let file = ComposeParser::parse_files(&[base.as_path(), overlay.as_path()]).unwrap();
        assert_eq!(file.service("web").unwrap().image.as_deref(), Some("caddy"));
    }

    #[test]
    fn test_interpolate() {
        let mut env = HashMap::new();
        env.insert("TAG".to_string(), "1.0.0".to_string());

        assert_eq!(interpolate_string("nginx:${TAG}", &env), "nginx:1.0.0");
        assert_eq!(interpolate_string("nginx:$TAG", &env), "nginx:1.0.0");
        assert_eq!(interpolate_string("db:${DB_TAG:-15}", &env), "db:15");
        assert_eq!(interpolate_string("${TAG:-x}-${MISSING}", &env), "1.0.0-");
        assert_eq!(interpolate_string("$TAGS", &env), "");
    }
}
