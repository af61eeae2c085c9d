use crate::document_model::LineEnding;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const RC_FILE_NAME: &str = ".docenginerc";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Editing behaviour of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocConfig {
    pub tab_width: usize,
    pub replace_tabs: bool,
    pub space_indent: bool,
    pub keep_extra_spaces: bool,
    pub keep_indent_profile: bool,
    pub auto_indent: bool,
    pub auto_brackets: bool,
    pub backspace_indents: bool,
    pub delete_on_input: bool,
    pub keep_selection: bool,
    pub overwrite: bool,
    pub word_wrap: bool,
    pub word_wrap_at: usize,
    pub line_ending: LineEnding,
    pub undo_steps: usize,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            tab_width: 8,
            replace_tabs: false,
            space_indent: false,
            keep_extra_spaces: false,
            keep_indent_profile: false,
            auto_indent: true,
            auto_brackets: false,
            backspace_indents: false,
            delete_on_input: true,
            keep_selection: false,
            overwrite: false,
            word_wrap: false,
            word_wrap_at: 80,
            line_ending: LineEnding::Unix,
            undo_steps: 1000,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_tab_width(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|w| (1..=16).contains(w))
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .docenginerc in:
    /// 1. Current directory
    /// 2. Home directory (~/.docenginerc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(RC_FILE_NAME);
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(RC_FILE_NAME);
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    /// Load the RC file if there is one. Unreadable files fall back to
    /// defaults with a warning.
    pub fn load_config() -> DocConfig {
        match Self::get_rc_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|err| {
                tracing::warn!(%err, "ignoring rc file");
                DocConfig::default()
            }),
            None => DocConfig::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<DocConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = DocConfig::default();
        Self::parse_config_content(&content, &mut config);
        tracing::debug!(path = %path.display(), "loaded rc file");
        Ok(config)
    }

    pub fn parse_config_content(content: &str, config: &mut DocConfig) {
        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    fn parse_config_line(line: &str, config: &mut DocConfig) {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        // vim-style switches
        if let Some(stripped) = line.strip_prefix("set ") {
            let setting = stripped.trim();
            match setting {
                "expandtab" => {
                    config.replace_tabs = true;
                    config.space_indent = true;
                }
                "noexpandtab" => {
                    config.replace_tabs = false;
                    config.space_indent = false;
                }
                "autoindent" | "ai" => config.auto_indent = true,
                "noautoindent" | "noai" => config.auto_indent = false,
                "wrap" => config.word_wrap = true,
                "nowrap" => config.word_wrap = false,
                _ => {
                    if let Some((key, value)) = setting.split_once('=') {
                        Self::apply_setting(key.trim(), value.trim(), config);
                    }
                }
            }
        } else if let Some((key, value)) = line.split_once('=') {
            Self::apply_setting(key.trim(), value.trim(), config);
        }
    }

    /// Invalid values and unknown keys are ignored.
    fn apply_setting(key: &str, value: &str, config: &mut DocConfig) {
        match key {
            "tabstop" | "tab_width" => {
                if let Some(width) = parse_tab_width(value) {
                    config.tab_width = width;
                }
            }
            "textwidth" | "word_wrap_at" => {
                if let Ok(col) = value.parse::<usize>() {
                    if col > 0 {
                        config.word_wrap_at = col;
                    }
                }
            }
            "undolevels" | "undo_steps" => {
                if let Ok(steps) = value.parse::<usize>() {
                    config.undo_steps = steps;
                }
            }
            "fileformat" | "line_ending" => {
                if let Some(ending) = LineEnding::from_name(value) {
                    config.line_ending = ending;
                }
            }
            _ => {
                let Some(flag) = parse_bool(value) else {
                    return;
                };
                match key {
                    "replace_tabs" => config.replace_tabs = flag,
                    "space_indent" => config.space_indent = flag,
                    "keep_extra_spaces" => config.keep_extra_spaces = flag,
                    "keep_indent_profile" => config.keep_indent_profile = flag,
                    "auto_indent" => config.auto_indent = flag,
                    "auto_brackets" => config.auto_brackets = flag,
                    "backspace_indents" => config.backspace_indents = flag,
                    "delete_on_input" => config.delete_on_input = flag,
                    "keep_selection" => config.keep_selection = flag,
                    "overwrite" => config.overwrite = flag,
                    "word_wrap" => config.word_wrap = flag,
                    _ => {}
                }
            }
        }
    }

    pub fn generate_sample_rc() -> String {
        r#"# doc-engine configuration file (.docenginerc)
# Lines starting with # or " are comments

# Indentation
set tabstop=4          # Tab width, 1-16
set expandtab          # Indent with spaces and replace typed tabs
set autoindent         # New lines copy the previous indentation

# Word wrap
set nowrap
set textwidth=80

# File format
set fileformat=unix    # unix, dos, or mac

# Alternative key=value syntax:
# keep_extra_spaces=false
# keep_indent_profile=true
# auto_brackets=false
# backspace_indents=false
# undo_steps=1000
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vim_style_config() {
        let mut config = DocConfig::default();
        let content = r#"
            set expandtab
            set tabstop=4
            set noautoindent
            set wrap
            set textwidth=72
            set fileformat=dos
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert!(config.replace_tabs);
        assert!(config.space_indent);
        assert_eq!(config.tab_width, 4);
        assert!(!config.auto_indent);
        assert!(config.word_wrap);
        assert_eq!(config.word_wrap_at, 72);
        assert_eq!(config.line_ending, LineEnding::Dos);
    }

    #[test]
    fn test_parse_key_value_config() {
        let mut config = DocConfig::default();
        let content = r#"
            tab_width=2
            keep_extra_spaces=yes
            keep_indent_profile=1
            auto_brackets=true
            undo_steps=10
            line_ending=mac
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert_eq!(config.tab_width, 2);
        assert!(config.keep_extra_spaces);
        assert!(config.keep_indent_profile);
        assert!(config.auto_brackets);
        assert_eq!(config.undo_steps, 10);
        assert_eq!(config.line_ending, LineEnding::Mac);
    }

    #[test]
    fn test_parse_mixed_config_with_comments() {
        let mut config = DocConfig::default();
        let content = r#"
            # This is a comment
            set wrap               # Enable word wrap
            " This is also a comment

            tabstop=6              # Custom tab stop
            # set expandtab        # This is commented out
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert!(config.word_wrap);
        assert!(!config.replace_tabs);
        assert_eq!(config.tab_width, 6);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let mut config = DocConfig::default();
        let content = r#"
            set tabstop=0
            set tabstop=20
            tabstop=invalid
            line_ending=invalid
            auto_indent=maybe
            unknown_setting=value
        "#;

        RcLoader::parse_config_content(content, &mut config);

        assert_eq!(config, DocConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RC_FILE_NAME);
        fs::write(&path, "set tabstop=3\n").unwrap();
        let config = RcLoader::load_from(&path).unwrap();
        assert_eq!(config.tab_width, 3);

        let missing = RcLoader::load_from(&dir.path().join("nope"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_sample_rc_parses() {
        let mut config = DocConfig::default();
        RcLoader::parse_config_content(&RcLoader::generate_sample_rc(), &mut config);
        assert_eq!(config.tab_width, 4);
        assert!(config.space_indent);
    }
}
