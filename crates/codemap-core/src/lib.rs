pub mod config;
pub mod error;
pub mod extractor;
pub mod markdown;
pub mod models;
pub mod parser;

pub use config::{Config, ConfigError, ParserConfig};
pub use error::{ExtractError, Result};
pub use extractor::{CodeExtractor, Strategy};
pub use markdown::extract_fenced_blocks;
pub use models::{CodeElement, ElementKind, Parameter};
pub use parser::{Parser, ParserCapability, ParserRegistration, ParserRegistry};
