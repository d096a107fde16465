//! Declarative pattern table for the generic parser tier.
//!
//! Every pattern's first capture group is the construct name. Patterns are
//! compiled by the `regex` crate, so matching stays linear in the input size.

/// Function, class and import patterns for one language.
#[derive(Debug, Clone, Copy)]
pub struct LanguagePatterns {
    pub language: &'static str,
    pub extensions: &'static [&'static str],
    pub function: &'static str,
    pub class: &'static str,
    pub import: &'static str,
}

/// Words that the function/class patterns can capture as a name but that
/// never name a declaration.
pub const NON_FUNCTION_KEYWORDS: &[&str] = &[
    "if", "else", "elif", "elsif", "unless", "until", "for", "foreach", "while", "do", "loop",
    "switch", "match", "case", "catch", "try", "return", "throw", "new", "delete", "sizeof",
    "fn", "fun", "func", "def", "function", "var", "let", "const", "class", "struct", "enum",
    "interface", "protocol", "extension", "object", "module", "namespace",
];

/// Built-in languages without a dedicated parser.
pub const GENERIC_LANGUAGES: &[LanguagePatterns] = &[
    LanguagePatterns {
        language: "rust",
        extensions: &["rs"],
        function: r#"(?m)^[ \t]*(?:pub(?:\([^)\n]*\))?[ \t]+)?(?:const[ \t]+)?(?:async[ \t]+)?(?:unsafe[ \t]+)?(?:extern[ \t]+"[^"\n]*"[ \t]+)?fn[ \t]+(\w+)"#,
        class: r"(?m)^[ \t]*(?:pub(?:\([^)\n]*\))?[ \t]+)?(?:struct|enum|trait|union)[ \t]+(\w+)",
        import: r"(?m)^[ \t]*(?:pub(?:\([^)\n]*\))?[ \t]+)?use[ \t]+([^;]+);",
    },
    LanguagePatterns {
        language: "csharp",
        extensions: &["cs"],
        function: r"(?m)^[ \t]*(?:(?:public|private|protected|internal|static|virtual|override|abstract|async|sealed|extern|unsafe|new|partial)[ \t]+)+[\w<>\[\],.?]+(?:[ \t]*<[^>\n]*>)?[ \t]+(\w+)[ \t]*(?:<[^>\n]*>)?[ \t]*\(",
        class: r"(?m)^[ \t]*(?:(?:public|private|protected|internal|static|abstract|sealed|partial)[ \t]+)*(?:class|struct|interface|record|enum)[ \t]+(\w+)",
        import: r"(?m)^[ \t]*using[ \t]+(?:static[ \t]+)?([\w.]+)[ \t]*;",
    },
    LanguagePatterns {
        language: "ruby",
        extensions: &["rb", "rake"],
        function: r"(?m)^[ \t]*def[ \t]+(?:self\.)?(\w+[?!=]?)",
        class: r"(?m)^[ \t]*(?:class|module)[ \t]+([\w:]+)",
        import: r#"(?m)^[ \t]*require(?:_relative)?[ \t(]+['"]([^'"\n]+)['"]"#,
    },
    LanguagePatterns {
        language: "php",
        extensions: &["php"],
        function: r"(?m)^[ \t]*(?:(?:public|private|protected|static|final|abstract)[ \t]+)*function[ \t]+&?(\w+)",
        class: r"(?m)^[ \t]*(?:(?:abstract|final|readonly)[ \t]+)*(?:class|interface|trait|enum)[ \t]+(\w+)",
        import: r"(?m)^[ \t]*use[ \t]+([\w\\]+)",
    },
    LanguagePatterns {
        language: "kotlin",
        extensions: &["kt", "kts"],
        function: r"(?m)^[ \t]*(?:(?:public|private|protected|internal|override|open|abstract|suspend|inline|operator|infix|tailrec|external)[ \t]+)*fun[ \t]+(?:<[^>\n]*>[ \t]*)?(?:[\w.]+\.)?(\w+)[ \t]*\(",
        class: r"(?m)^[ \t]*(?:(?:public|private|protected|internal|open|abstract|sealed|data|enum|inner|annotation|value)[ \t]+)*(?:class|interface|object)[ \t]+(\w+)",
        import: r"(?m)^[ \t]*import[ \t]+([\w.*]+)",
    },
    LanguagePatterns {
        language: "swift",
        extensions: &["swift"],
        function: r"(?m)^[ \t]*(?:(?:public|private|fileprivate|internal|open|static|class|override|mutating|final|@\w+)[ \t]+)*func[ \t]+(\w+)",
        class: r"(?m)^[ \t]*(?:(?:public|private|fileprivate|internal|open|final)[ \t]+)*(?:class|struct|protocol|enum|extension|actor)[ \t]+(\w+)",
        import: r"(?m)^[ \t]*import[ \t]+(?:\w+[ \t]+)?([\w.]+)",
    },
    LanguagePatterns {
        language: "cpp",
        extensions: &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
        function: r"(?m)^[ \t]*(?:[\w:<>*&]+[ \t]+)+[*&]?((?:\w+::)*~?\w+)[ \t]*\([^;{}]*\)[^;{}\n]*\{",
        class: r"(?m)^[ \t]*(?:template[ \t]*<[^>\n]*>[ \t]*)?(?:class|struct|union|enum(?:[ \t]+class)?|namespace)[ \t]+(\w+)",
        import: r#"(?m)^[ \t]*#[ \t]*include[ \t]*[<"]([^>"\n]+)[>"]"#,
    },
    LanguagePatterns {
        language: "c",
        extensions: &["c", "h"],
        function: r"(?m)^[ \t]*(?:[\w*]+[ \t]+)+\**(\w+)[ \t]*\([^;{}]*\)\s*\{",
        class: r"(?m)^[ \t]*(?:typedef[ \t]+)?(?:struct|union|enum)[ \t]+(\w+)",
        import: r#"(?m)^[ \t]*#[ \t]*include[ \t]*[<"]([^>"\n]+)[>"]"#,
    },
];
