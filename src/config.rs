use std::collections::HashMap;
use std::path::Path;

/// Connection settings read from an optional `server.properties` file next to
/// the working directory. The file is written by the server itself; this
/// reader only surfaces it to the operator.
#[derive(Debug, Clone, Default)]
pub struct ServerProperties {
    pub local_port: Option<u16>,
    pub bots_secret: Option<String>,
    pub controller_secret: Option<String>,
}

impl ServerProperties {
    /// Reads and parses `server.properties`. Returns `None` when the file is
    /// absent or unreadable; the secrets may simply not exist yet.
    pub fn load(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        Some(Self::from_map(&parse_properties(&text)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            local_port: map.get("local-port").and_then(|v| v.parse().ok()),
            bots_secret: map.get("bots-secrets").cloned(),
            controller_secret: map.get("controller-secrets").cloned(),
        }
    }
}

/// Parses a flat `key=value` properties file. Lines starting with `#` and
/// lines without `=` are skipped; the value is split on the first `=` only.
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let map = parse_properties("# header\n\nlocal-port=7655\n  # indented comment\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["local-port"], "7655");
    }

    #[test]
    fn splits_on_first_equals_only() {
        let map = parse_properties("bots-secrets=abc=def==\n");
        assert_eq!(map["bots-secrets"], "abc=def==");
    }

    #[test]
    fn lines_without_equals_are_ignored() {
        let map = parse_properties("garbage line\nkey=value\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["key"], "value");
    }

    #[test]
    fn surfaces_known_keys() {
        let props = ServerProperties::from_map(&parse_properties(
            "local-port=7655\nbots-secrets=s3cret\ncontroller-secrets=c0ntrol\n",
        ));
        assert_eq!(props.local_port, Some(7655));
        assert_eq!(props.bots_secret.as_deref(), Some("s3cret"));
        assert_eq!(props.controller_secret.as_deref(), Some("c0ntrol"));
    }

    #[test]
    fn unparsable_port_is_none() {
        let props = ServerProperties::from_map(&parse_properties("local-port=ws://nope\n"));
        assert_eq!(props.local_port, None);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerProperties::load(&dir.path().join("server.properties")).is_none());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.properties");
        std::fs::write(&path, "local-port=9001\n").unwrap();
        let props = ServerProperties::load(&path).unwrap();
        assert_eq!(props.local_port, Some(9001));
    }
}
