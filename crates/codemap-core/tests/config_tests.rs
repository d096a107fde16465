use codemap_core::config::{DEFAULT_GRAMMAR_TIER, DEFAULT_MAX_FILE_SIZE};
use codemap_core::{CodeExtractor, Config, ConfigError, ExtractError};
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.parser.max_file_size, DEFAULT_MAX_FILE_SIZE);
    assert_eq!(config.parser.grammar_tier, DEFAULT_GRAMMAR_TIER);
}

#[test]
fn test_default_config_string_round_trips() {
    let text = Config::default_config_string();
    let config = Config::from_toml(&text).unwrap();
    assert_eq!(config.parser.max_file_size, DEFAULT_MAX_FILE_SIZE);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = Config::from_toml("[parser]\ngrammar_tier = false\n").unwrap();
    assert!(!config.parser.grammar_tier);
    assert_eq!(config.parser.max_file_size, DEFAULT_MAX_FILE_SIZE);
    assert!(config.parser.extension_aliases.is_empty());
}

#[test]
fn test_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("codemap.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[parser]\nmax_file_size = 4096").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.parser.max_file_size > 0);
}

#[test]
fn test_missing_file_is_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = Config::from_file(temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let result = Config::from_toml("[parser\nmax_file_size = ");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_empty_alias_rejected() {
    let result = Config::from_toml("[parser.extension_aliases]\nfoo = \"\"\n");
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_error_converts() {
    let err: ExtractError = ConfigError::Invalid("bad".to_string()).into();
    assert!(err.to_string().contains("bad"));
}

#[test]
fn test_extractor_honors_config() {
    let config = Config::from_toml(
        "[parser]\ngrammar_tier = false\n\n[parser.extension_aliases]\npyx = \"python\"\n",
    )
    .unwrap();
    let extractor = CodeExtractor::from_config(&config);

    let elements = extractor.parse_source("mod.pyx", "def f():\n    return 1\n");
    assert_eq!(elements[0].language, "python");
    assert!(elements.iter().any(|e| e.name == "f"));

    let elements = extractor.parse_source("app.ts", "function f() {}\n");
    assert_eq!(elements.len(), 1);
}

#[test]
fn test_extractor_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("codemap.toml");
    std::fs::write(&path, "[parser.extension_aliases]\npyx = \"python\"\n").unwrap();

    let extractor = CodeExtractor::from_config_file(&path).unwrap();
    assert_eq!(extractor.language_for_path("fast.pyx"), "python");
}

#[test]
fn test_extractor_config_failures_are_config_errors() {
    let temp_dir = TempDir::new().unwrap();
    let missing = CodeExtractor::from_config_file(temp_dir.path().join("absent.toml"));
    assert!(matches!(
        missing,
        Err(ExtractError::Config(ConfigError::ReadError(_)))
    ));

    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[parser\n").unwrap();
    let broken = CodeExtractor::from_config_file(&path);
    assert!(matches!(
        broken,
        Err(ExtractError::Config(ConfigError::ParseError(_)))
    ));
}
