//! Default values for codemap configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Parser Defaults
// ============================================================================

/// Files larger than this are not parsed structurally (1 MiB).
///
/// Hand-written patterns can backtrack badly on adversarial input, so large
/// files only get the whole-file element.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Whether the tree-sitter tier is enabled by default.
pub const DEFAULT_GRAMMAR_TIER: bool = true;

/// Project-local configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "codemap.toml";

/// Directory under the user config dir.
pub const DEFAULT_CONFIG_DIR: &str = "codemap";

/// Language tag used when nothing else matches.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

// ============================================================================
// Language Table
// ============================================================================

/// Extension to language tag, used to label whole-file fallback elements.
pub const DEFAULT_LANGUAGE_TABLE: &[(&str, &str)] = &[
    // Systems
    ("rs", "rust"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hh", "cpp"),
    ("go", "go"),
    ("zig", "zig"),
    // JVM
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("groovy", "groovy"),
    // .NET
    ("cs", "csharp"),
    ("fs", "fsharp"),
    // Scripting
    ("py", "python"),
    ("pyw", "python"),
    ("pyi", "python"),
    ("rb", "ruby"),
    ("php", "php"),
    ("lua", "lua"),
    ("pl", "perl"),
    ("r", "r"),
    // JavaScript
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("mts", "typescript"),
    ("cts", "typescript"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    // Mobile
    ("swift", "swift"),
    ("dart", "dart"),
    // Functional
    ("ml", "ocaml"),
    ("hs", "haskell"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("clj", "clojure"),
    // Web
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("less", "less"),
    // Config/Data
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("xml", "xml"),
    // Shell
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("ps1", "powershell"),
    // Docs
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("mdx", "markdown"),
    ("rst", "restructuredtext"),
    ("txt", "plaintext"),
    // Database
    ("sql", "sql"),
];

/// Extensions handled by the fenced code block extractor.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdx"];

/// Look up the language tag for an extension (case-insensitive).
pub fn language_for_extension(extension: &str) -> &'static str {
    DEFAULT_LANGUAGE_TABLE
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, lang)| *lang)
        .unwrap_or(UNKNOWN_LANGUAGE)
}
