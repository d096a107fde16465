use codemap_core::{CodeExtractor, ElementKind, ExtractError};
use tempfile::TempDir;

const GUIDE: &str = r#"# Guide

Install it:

```bash
cargo install codemap
```

Then call it from Python:

```python
import subprocess

subprocess.run(["codemap", "parse", "main.py"])
```

```
no hint here
```

```toml
[parser]
unterminated = true
"#;

#[test]
fn test_parse_markdown_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("GUIDE.md");
    std::fs::write(&path, GUIDE).unwrap();

    let blocks = CodeExtractor::new().parse_markdown(&path).unwrap();
    assert_eq!(blocks.len(), 3);

    let languages: Vec<&str> = blocks.iter().map(|b| b.language.as_str()).collect();
    assert_eq!(languages, vec!["bash", "python", "unknown"]);

    assert_eq!(blocks[0].content, "cargo install codemap");
    assert_eq!(blocks[0].name, "GUIDE.md:5");
    assert_eq!((blocks[0].start_line, blocks[0].end_line), (5, 7));

    assert_eq!(
        blocks[1].content,
        "import subprocess\n\nsubprocess.run([\"codemap\", \"parse\", \"main.py\"])"
    );
    assert!(blocks.iter().all(|b| b.kind == ElementKind::File));
}

#[test]
fn test_parse_markdown_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = CodeExtractor::new().parse_markdown(temp_dir.path().join("nope.md"));
    assert!(matches!(result, Err(ExtractError::FileAccess { .. })));
}

#[test]
fn test_markdown_through_parse_file_is_whole_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("GUIDE.md");
    std::fs::write(&path, GUIDE).unwrap();

    let elements = CodeExtractor::new().parse_file(&path).unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].language, "markdown");
    assert_eq!(elements[0].end_line, GUIDE.lines().count() as u32);
}
