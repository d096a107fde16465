//! Tree-sitter based parsing utilities for the grammar tier.

use tree_sitter::{Language, Node, Parser as TSParser, Tree};

/// Node kinds that add one to complexity.
const BRANCH_KINDS: &[&str] = &[
    "if_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "ternary_expression",
    "switch_case",
];

/// Short-circuit operators of `binary_expression` nodes that add one.
const LOGICAL_OPERATORS: &[&str] = &["&&", "||"];

/// Base tree-sitter parser with shared functionality.
pub struct TreeSitterParser {
    language: Language,
    language_name: &'static str,
    extensions: &'static [&'static str],
}

impl TreeSitterParser {
    pub fn new(language: Language, language_name: &'static str, extensions: &'static [&'static str]) -> Self {
        Self { language, language_name, extensions }
    }

    pub fn language_name(&self) -> &'static str {
        self.language_name
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// Parse source code into a tree-sitter tree.
    pub fn parse_tree(&self, content: &str) -> Result<Tree, String> {
        let mut parser = TSParser::new();
        parser.set_language(&self.language)
            .map_err(|e| format!("Failed to set language: {}", e))?;

        parser.parse(content, None)
            .ok_or_else(|| "Failed to parse content".to_string())
    }

    /// Get text for a node from source content.
    pub fn node_text<'a>(node: &Node, content: &'a str) -> &'a str {
        &content[node.byte_range()]
    }

    /// Get line number (1-based) for a node.
    pub fn node_line(node: &Node) -> u32 {
        node.start_position().row as u32 + 1
    }

    /// Get end line number (1-based) for a node.
    ///
    /// A node ending at column 0 stops before that line.
    pub fn node_end_line(node: &Node) -> u32 {
        let end = node.end_position();
        let row = if end.column == 0 && end.row > node.start_position().row {
            end.row - 1
        } else {
            end.row
        };
        row as u32 + 1
    }

    /// Whether `node` has an unnamed child token of the given kind
    /// (`async`, `static`, `default`, ...).
    pub fn has_token(node: &Node, kind: &str) -> bool {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == kind);
        found
    }

    /// Heuristic complexity of a subtree.
    ///
    /// Starts at 1 and adds 1 per conditional, loop, case label, ternary and
    /// `&&`/`||` operator. A ternary inside a logical expression counts for
    /// both.
    pub fn calculate_complexity(node: &Node) -> u32 {
        let mut complexity = 1u32;
        let mut cursor = node.walk();
        let mut stack = vec![*node];

        while let Some(current) = stack.pop() {
            if is_branch(&current) {
                complexity += 1;
            }
            stack.extend(current.children(&mut cursor));
        }

        complexity
    }
}

fn is_branch(node: &Node) -> bool {
    if BRANCH_KINDS.contains(&node.kind()) {
        return true;
    }
    node.kind() == "binary_expression"
        && node
            .child_by_field_name("operator")
            .is_some_and(|op| LOGICAL_OPERATORS.contains(&op.kind()))
}

/// Helper to extract doc comments from preceding nodes.
///
/// Walks back over comment siblings that directly precede `node` (no blank
/// line in between) and strips the comment markers.
pub fn extract_doc_comment(node: &Node, content: &str) -> Option<String> {
    let mut comments = Vec::new();
    let mut next_row = node.start_position().row;
    let mut sibling = node.prev_sibling();

    while let Some(s) = sibling {
        if s.kind() != "comment" || s.end_position().row + 1 < next_row {
            break;
        }
        comments.push(clean_comment(TreeSitterParser::node_text(&s, content)));
        next_row = s.start_position().row;
        sibling = s.prev_sibling();
    }

    comments.reverse();
    let text = comments
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (!text.is_empty()).then_some(text)
}

fn clean_comment(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = line.trim();
            let line = line
                .strip_prefix("/**")
                .or_else(|| line.strip_prefix("/*"))
                .or_else(|| line.strip_prefix("///"))
                .or_else(|| line.strip_prefix("//"))
                .unwrap_or(line);
            let line = line.strip_suffix("*/").unwrap_or(line).trim();
            line.strip_prefix('*').unwrap_or(line).trim()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn javascript() -> TreeSitterParser {
        TreeSitterParser::new(tree_sitter_javascript::LANGUAGE.into(), "javascript", &["js"])
    }

    fn first_function<'t>(tree: &'t Tree) -> Node<'t> {
        let root = tree.root_node();
        let mut cursor = root.walk();
        let found = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "function_declaration")
            .unwrap();
        found
    }

    #[test]
    fn test_complexity_counts_each_construct() {
        let src = "function f(a, b) {\n  if (a && b) { return 1; }\n  for (const x of a) {}\n  return a ? 1 : 2;\n}\n";
        let parser = javascript();
        let tree = parser.parse_tree(src).unwrap();
        // if + && + for-of + ternary
        assert_eq!(TreeSitterParser::calculate_complexity(&first_function(&tree)), 5);
    }

    #[test]
    fn test_complexity_baseline() {
        let src = "function f() { return 1; }\n";
        let parser = javascript();
        let tree = parser.parse_tree(src).unwrap();
        assert_eq!(TreeSitterParser::calculate_complexity(&first_function(&tree)), 1);
    }

    #[test]
    fn test_doc_comment_adjacent_only() {
        let src = "// license\n\n/**\n * Adds.\n */\nfunction f() {}\n";
        let parser = javascript();
        let tree = parser.parse_tree(src).unwrap();
        let doc = extract_doc_comment(&first_function(&tree), src);
        assert_eq!(doc.as_deref(), Some("Adds."));
    }

    #[test]
    fn test_node_lines() {
        let src = "\nfunction f() {\n  return 1;\n}\n";
        let parser = javascript();
        let tree = parser.parse_tree(src).unwrap();
        let func = first_function(&tree);
        assert_eq!(TreeSitterParser::node_line(&func), 2);
        assert_eq!(TreeSitterParser::node_end_line(&func), 4);
    }

    #[test]
    fn test_clean_comment() {
        assert_eq!(clean_comment("/** One.\n * Two.\n */"), "One.\nTwo.");
        assert_eq!(clean_comment("// plain"), "plain");
    }
}
