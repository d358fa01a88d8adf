//! Toolchain description

use serde::{Deserialize, Serialize};

/// First `major.minor` release with type parameters.
const GENERICS_SINCE: (u32, u32) = (1, 18);

/// Version and build tags of the toolchain the program was checked with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolchainInfo {
    /// Version string such as `go1.21.3` or `1.17`
    pub version: String,
    pub build_tags: Vec<String>,
}

impl ToolchainInfo {
    pub fn new(version: &str) -> Self {
        ToolchainInfo {
            version: version.to_string(),
            build_tags: Vec::new(),
        }
    }

    /// `(major, minor)` parsed from the version string.
    pub fn major_minor(&self) -> Option<(u32, u32)> {
        let version = self.version.trim();
        let version = version.strip_prefix("go").unwrap_or(version);
        let mut parts = version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor: String = parts
            .next()?
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        Some((major, minor.parse().ok()?))
    }

    /// Whether generic code paths are active; unparsable versions count as newest.
    pub fn supports_generics(&self) -> bool {
        self.major_minor().map_or(true, |v| v >= GENERICS_SINCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_generics() {
        assert!(ToolchainInfo::new("go1.18").supports_generics());
        assert!(ToolchainInfo::new("go1.21.3").supports_generics());
        assert!(ToolchainInfo::new("1.22rc1").supports_generics());
        assert!(!ToolchainInfo::new("go1.17.13").supports_generics());
        assert!(ToolchainInfo::new("devel").supports_generics());
        assert!(ToolchainInfo::default().supports_generics());
    }

    #[test]
    fn test_major_minor() {
        assert_eq!(ToolchainInfo::new("go1.20.1").major_minor(), Some((1, 20)));
        assert_eq!(ToolchainInfo::new("2").major_minor(), None);
    }
}
