use std::path::PathBuf;

pub const PRETTY_JSON_ENV: &str = "BLUEPRINT_PRETTY_JSON";
pub const STACK_ROOT_ENV: &str = "BLUEPRINT_STACK_ROOT";

#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    pub codec: CodecOptions,
    /// Root directory of on-disk stack definitions, used by callers that
    /// compose a filesystem stack registry.
    pub stack_root: Option<PathBuf>,
}

impl CompilerConfig {
    /// Build a config from `BLUEPRINT_PRETTY_JSON` and `BLUEPRINT_STACK_ROOT`.
    pub fn from_env() -> Self {
        let pretty = std::env::var(PRETTY_JSON_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let stack_root = std::env::var_os(STACK_ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            codec: CodecOptions { pretty },
            stack_root,
        }
    }
}

/// Serialization switches for the blueprint codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    /// Indented output instead of compact.
    pub pretty: bool,
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_compact_without_stack_root() {
        let cfg = CompilerConfig::default();
        assert!(!cfg.codec.pretty);
        assert!(cfg.stack_root.is_none());
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("nope"));
    }
}
