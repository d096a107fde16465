//! TypeScript and JavaScript parser using tree-sitter.
//!
//! Walks the top-level statements of the syntax tree and emits imports,
//! exports, functions, classes with their methods, interfaces, enums and
//! top-level variables.

use tree_sitter::Node;

use super::base::{assemble, file_element};
use super::traits::{Parser, ParserCapability};
use super::treesitter::{extract_doc_comment, TreeSitterParser};
use crate::models::{CodeElement, ElementKind, Parameter};

/// Initializers that turn a variable declaration into a function.
const FUNCTION_VALUE_KINDS: &[&str] = &["arrow_function", "function_expression", "function", "generator_function"];

/// Keyword tokens recorded as modifiers.
const MODIFIER_TOKENS: &[&str] = &["async", "static", "abstract", "readonly", "get", "set", "declare", "override"];

/// TypeScript parser using tree-sitter.
pub struct TypeScriptParser {
    base: TreeSitterParser,
}

/// Context shared by the extraction helpers for one file.
struct Walk<'a> {
    path: &'a str,
    content: &'a str,
    language: &'static str,
    elements: Vec<CodeElement>,
    imports: Vec<String>,
    exports: Vec<String>,
}

impl<'a> Walk<'a> {
    fn element(&self, kind: ElementKind, name: impl Into<String>, node: &Node) -> CodeElement {
        CodeElement::new(
            kind,
            name,
            TreeSitterParser::node_text(node, self.content),
            TreeSitterParser::node_line(node),
            TreeSitterParser::node_end_line(node),
            self.path,
            self.language,
        )
    }

    fn text(&self, node: &Node) -> &'a str {
        TreeSitterParser::node_text(node, self.content)
    }

    fn field_text(&self, node: &Node, field: &str) -> Option<&'a str> {
        node.child_by_field_name(field).map(|n| self.text(&n))
    }
}

impl TypeScriptParser {
    /// Create a TypeScript parser.
    pub fn typescript() -> Self {
        Self {
            base: TreeSitterParser::new(
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                "typescript",
                &["ts", "mts", "cts"],
            ),
        }
    }

    /// Create a TSX parser (tagged as TypeScript).
    pub fn tsx() -> Self {
        Self {
            base: TreeSitterParser::new(
                tree_sitter_typescript::LANGUAGE_TSX.into(),
                "typescript",
                &["tsx"],
            ),
        }
    }

    /// Create a JavaScript parser.
    pub fn javascript() -> Self {
        Self {
            base: TreeSitterParser::new(
                tree_sitter_javascript::LANGUAGE.into(),
                "javascript",
                &["js", "jsx", "mjs", "cjs"],
            ),
        }
    }

    fn process_node(&self, node: Node, walk: &mut Walk, exported: bool) {
        match node.kind() {
            "import_statement" => self.extract_import(&node, walk),
            "export_statement" => self.extract_export(&node, walk),
            "function_declaration" | "generator_function_declaration" => {
                if let Some(func) = self.extract_function(&node, walk, exported) {
                    walk.elements.push(func);
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                self.extract_class(&node, walk, exported);
            }
            "interface_declaration" => {
                if let Some(name) = walk.field_text(&node, "name") {
                    let iface = walk
                        .element(ElementKind::Interface, name, &node)
                        .with_modifiers(export_modifiers(exported))
                        .with_documentation(doc_for(&node, walk.content));
                    walk.elements.push(iface);
                }
            }
            "enum_declaration" => {
                if let Some(name) = walk.field_text(&node, "name") {
                    let mut modifiers = export_modifiers(exported);
                    if TreeSitterParser::has_token(&node, "const") {
                        modifiers.push("const");
                    }
                    let enumeration = walk
                        .element(ElementKind::Enum, name, &node)
                        .with_modifiers(modifiers)
                        .with_documentation(doc_for(&node, walk.content));
                    walk.elements.push(enumeration);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                self.extract_variables(&node, walk, exported);
            }
            _ => {}
        }
    }

    fn extract_import(&self, node: &Node, walk: &mut Walk) {
        let Some(source) = walk.field_text(node, "source") else {
            return;
        };
        let module = unquote(source);
        walk.imports.push(module.to_string());
        let import = walk.element(ElementKind::Import, module, node);
        walk.elements.push(import);
    }

    fn extract_export(&self, node: &Node, walk: &mut Walk) {
        let is_default = TreeSitterParser::has_token(node, "default");
        let mut markers: Vec<String> = Vec::new();

        if let Some(declaration) = node.child_by_field_name("declaration") {
            if is_default {
                markers.push("default".to_string());
            } else {
                markers.extend(declared_names(&declaration, walk.content));
            }
            self.process_node(declaration, walk, true);
        } else if is_default || node.child_by_field_name("value").is_some() {
            markers.push("default".to_string());
        } else if TreeSitterParser::has_token(node, "=") {
            markers.push("=".to_string());
        } else {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "export_clause" => {
                        let mut inner = child.walk();
                        for specifier in child.named_children(&mut inner) {
                            let name = specifier
                                .child_by_field_name("alias")
                                .or_else(|| specifier.child_by_field_name("name"))
                                .map(|n| walk.text(&n).to_string());
                            markers.extend(name);
                        }
                    }
                    "namespace_export" => {
                        let mut inner = child.walk();
                        let alias = child.named_children(&mut inner).last().map(|n| walk.text(&n).to_string());
                        markers.extend(alias);
                    }
                    _ => {}
                }
            }
            if markers.is_empty() && TreeSitterParser::has_token(node, "*") {
                markers.push("*".to_string());
            }
        }

        for marker in markers {
            walk.exports.push(marker.clone());
            let export = walk.element(ElementKind::Export, marker, node);
            walk.elements.push(export);
        }
    }

    fn extract_function(&self, node: &Node, walk: &Walk, exported: bool) -> Option<CodeElement> {
        let name = walk.field_text(node, "name")?;
        let mut modifiers = export_modifiers(exported);
        modifiers.extend(token_modifiers(node));

        Some(
            walk.element(ElementKind::Function, name, node)
                .with_parameters(extract_parameters(node, walk))
                .with_return_type(return_type(node, walk))
                .with_modifiers(modifiers)
                .with_documentation(doc_for(node, walk.content))
                .with_complexity(TreeSitterParser::calculate_complexity(node)),
        )
    }

    fn extract_class(&self, node: &Node, walk: &mut Walk, exported: bool) {
        let Some(name) = walk.field_text(node, "name") else {
            return;
        };
        let mut modifiers = export_modifiers(exported);
        if node.kind() == "abstract_class_declaration" {
            modifiers.push("abstract");
        }

        let class = walk
            .element(ElementKind::Class, name, node)
            .with_modifiers(modifiers)
            .with_documentation(doc_for(node, walk.content));
        walk.elements.push(class);

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if !matches!(member.kind(), "method_definition" | "abstract_method_signature") {
                continue;
            }
            let Some(method_name) = walk.field_text(&member, "name") else {
                continue;
            };

            let mut modifiers: Vec<&str> = token_modifiers(&member);
            let mut inner = member.walk();
            for child in member.children(&mut inner) {
                if child.kind() == "accessibility_modifier" {
                    modifiers.push(walk.text(&child));
                }
            }

            let method = walk
                .element(ElementKind::Method, format!("{}.{}", name, method_name), &member)
                .with_parameters(extract_parameters(&member, walk))
                .with_return_type(return_type(&member, walk))
                .with_modifiers(modifiers)
                .with_documentation(extract_doc_comment(&member, walk.content))
                .with_complexity(TreeSitterParser::calculate_complexity(&member));
            walk.elements.push(method);
        }
    }

    fn extract_variables(&self, node: &Node, walk: &mut Walk, exported: bool) {
        let keyword = node
            .child(0)
            .map(|k| walk.text(&k))
            .filter(|k| matches!(*k, "const" | "let" | "var"));

        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let name = walk.text(&name_node);
            let mut modifiers: Vec<&str> = export_modifiers(exported);
            modifiers.extend(keyword);

            let value = declarator
                .child_by_field_name("value")
                .filter(|v| FUNCTION_VALUE_KINDS.contains(&v.kind()));

            let element = match value {
                Some(func) => {
                    modifiers.extend(token_modifiers(&func));
                    walk.element(ElementKind::Function, name, node)
                        .with_parameters(extract_parameters(&func, walk))
                        .with_return_type(return_type(&func, walk))
                        .with_complexity(TreeSitterParser::calculate_complexity(&func))
                }
                None => walk
                    .element(ElementKind::Variable, name, node)
                    .with_return_type(
                        walk.field_text(&declarator, "type").map(|t| strip_annotation(t).to_string()),
                    ),
            };

            let element = element
                .with_modifiers(modifiers)
                .with_documentation(doc_for(node, walk.content));
            walk.elements.push(element);
        }
    }
}

impl Parser for TypeScriptParser {
    fn parse_file(&self, path: &str, content: &str) -> Vec<CodeElement> {
        let mut file = file_element(path, content, self.language_name());

        let tree = match self.base.parse_tree(content) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Grammar parse failed for {}: {}", path, e);
                return vec![file];
            }
        };

        let mut walk = Walk {
            path,
            content,
            language: self.language_name(),
            elements: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
        };

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            self.process_node(child, &mut walk, false);
        }

        file.imports = walk.imports;
        file.exports = walk.exports;

        assemble(file, walk.elements)
    }

    fn language_name(&self) -> &'static str {
        self.base.language_name()
    }

    fn supported_extensions(&self) -> &[&'static str] {
        self.base.extensions()
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Syntactic
    }
}

/// Grammar-tier parsers, consulted after a registry miss.
pub fn grammar_parsers() -> Vec<TypeScriptParser> {
    vec![
        TypeScriptParser::typescript(),
        TypeScriptParser::tsx(),
        TypeScriptParser::javascript(),
    ]
}

// --- Helper functions ---

fn export_modifiers(exported: bool) -> Vec<&'static str> {
    if exported {
        vec!["export"]
    } else {
        Vec::new()
    }
}

fn token_modifiers(node: &Node) -> Vec<&'static str> {
    MODIFIER_TOKENS
        .iter()
        .copied()
        .filter(|token| TreeSitterParser::has_token(node, token))
        .collect()
}

/// Doc comment of a declaration, looking through a wrapping `export`.
fn doc_for(node: &Node, content: &str) -> Option<String> {
    match node.parent() {
        Some(parent) if parent.kind() == "export_statement" => extract_doc_comment(&parent, content),
        _ => extract_doc_comment(node, content),
    }
}

/// Names introduced by an exported declaration.
fn declared_names(declaration: &Node, content: &str) -> Vec<String> {
    if let Some(name) = declaration.child_by_field_name("name") {
        return vec![TreeSitterParser::node_text(&name, content).to_string()];
    }
    let mut cursor = declaration.walk();
    let names: Vec<String> = declaration
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "variable_declarator")
        .filter_map(|c| c.child_by_field_name("name"))
        .map(|n| TreeSitterParser::node_text(&n, content).to_string())
        .collect();
    names
}

fn extract_parameters(node: &Node, walk: &Walk) -> Vec<Parameter> {
    // Single unparenthesized arrow parameter: `x => x`.
    if let Some(single) = node.child_by_field_name("parameter") {
        return vec![Parameter::new(walk.text(&single))];
    }
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut cursor = params.walk();
    let result: Vec<Parameter> = params
        .named_children(&mut cursor)
        .filter(|p| p.kind() != "comment")
        .map(|param| match param.kind() {
            "required_parameter" | "optional_parameter" => {
                let pattern = walk.field_text(&param, "pattern").unwrap_or_default();
                let name = if param.kind() == "optional_parameter" {
                    format!("{}?", pattern)
                } else {
                    pattern.to_string()
                };
                Parameter {
                    name,
                    type_name: walk.field_text(&param, "type").map(|t| strip_annotation(t).to_string()),
                    default_value: walk.field_text(&param, "value").map(String::from),
                }
            }
            "assignment_pattern" => Parameter {
                name: walk.field_text(&param, "left").unwrap_or_default().to_string(),
                type_name: None,
                default_value: walk.field_text(&param, "right").map(String::from),
            },
            _ => Parameter::new(walk.text(&param)),
        })
        .collect();
    result
}

fn return_type(node: &Node, walk: &Walk) -> Option<String> {
    walk.field_text(node, "return_type")
        .map(|t| strip_annotation(t).to_string())
}

/// `: string` -> `string`.
fn strip_annotation(text: &str) -> &str {
    text.trim().trim_start_matches(':').trim()
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS_SAMPLE: &str = r#"import { readFile } from "fs";
import * as path from 'path';

/** Shape contract. */
export interface Shape {
  area(): number;
}

export enum Color { Red, Green }

const enum Flags { A = 1 }

/**
 * Adds two numbers.
 */
export async function add(a: number, b: number = 2, opt?: string): Promise<number> {
  if (a > 0 && b > 0) {
    return a + b;
  }
  return a > b ? a : b;
}

export abstract class Base {
  abstract describe(): string;
}

// Circle shape.
class Circle extends Base implements Shape {
  constructor(private r: number) { super(); }

  /** Area of the circle. */
  public area(): number {
    return Math.PI * this.r * this.r;
  }

  static unit(): Circle {
    return new Circle(1);
  }

  describe(): string { return "circle"; }
}

export const double = (x: number): number => x * 2;
let counter: number = 0;

export { Circle, counter as count };
export * from "./util";
export default Circle;
"#;

    fn parse_ts() -> Vec<CodeElement> {
        TypeScriptParser::typescript().parse_file("shapes.ts", TS_SAMPLE)
    }

    fn find<'a>(elements: &'a [CodeElement], name: &str) -> &'a CodeElement {
        elements.iter().find(|e| e.name == name).unwrap()
    }

    #[test]
    fn test_file_element_aggregates() {
        let elements = parse_ts();
        let file = &elements[0];
        assert_eq!(file.kind, ElementKind::File);
        assert_eq!(file.language, "typescript");
        assert_eq!(file.end_line, TS_SAMPLE.lines().count() as u32);
        assert_eq!(file.imports, vec!["fs", "path"]);
        assert_eq!(
            file.exports,
            vec!["Shape", "Color", "add", "Base", "double", "Circle", "count", "*", "default"]
        );
    }

    #[test]
    fn test_imports_emitted() {
        let elements = parse_ts();
        let imports: Vec<&str> = elements
            .iter()
            .filter(|e| e.kind == ElementKind::Import)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(imports, vec!["fs", "path"]);
    }

    #[test]
    fn test_function_extraction() {
        let elements = parse_ts();
        let add = elements
            .iter()
            .find(|e| e.name == "add" && e.kind == ElementKind::Function)
            .unwrap();
        assert_eq!(add.start_line, 16);
        assert_eq!(add.end_line, 21);
        assert!(add.modifiers.contains("export"));
        assert!(add.modifiers.contains("async"));
        assert_eq!(add.return_type.as_deref(), Some("Promise<number>"));
        assert_eq!(add.documentation.as_deref(), Some("Adds two numbers."));
        // if + && + ternary
        assert_eq!(add.complexity, Some(4));

        let params = add.parameters.as_ref().unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].name, "a");
        assert_eq!(params[0].type_name.as_deref(), Some("number"));
        assert_eq!(params[1].default_value.as_deref(), Some("2"));
        assert_eq!(params[2].name, "opt?");
    }

    #[test]
    fn test_interface_and_enums() {
        let elements = parse_ts();
        let shape = elements
            .iter()
            .find(|e| e.name == "Shape" && e.kind == ElementKind::Interface)
            .unwrap();
        assert_eq!(shape.documentation.as_deref(), Some("Shape contract."));

        let color = elements
            .iter()
            .find(|e| e.name == "Color" && e.kind == ElementKind::Enum)
            .unwrap();
        assert!(color.modifiers.contains("export"));
        assert!(find(&elements, "Flags").modifiers.contains("const"));
    }

    #[test]
    fn test_class_and_methods() {
        let elements = parse_ts();
        let circle = elements
            .iter()
            .find(|e| e.name == "Circle" && e.kind == ElementKind::Class)
            .unwrap();
        assert_eq!(circle.documentation.as_deref(), Some("Circle shape."));
        assert!(!circle.modifiers.contains("export"));

        let area = find(&elements, "Circle.area");
        assert_eq!(area.kind, ElementKind::Method);
        assert!(area.modifiers.contains("public"));
        assert_eq!(area.documentation.as_deref(), Some("Area of the circle."));
        assert_eq!(area.return_type.as_deref(), Some("number"));
        assert!(circle.contains(area));

        assert!(find(&elements, "Circle.unit").modifiers.contains("static"));
        assert!(elements.iter().any(|e| e.name == "Circle.constructor"));

        let base = find(&elements, "Base");
        assert!(base.modifiers.contains("abstract"));
        assert_eq!(find(&elements, "Base.describe").kind, ElementKind::Method);
    }

    #[test]
    fn test_top_level_variables() {
        let elements = parse_ts();
        let double = elements
            .iter()
            .find(|e| e.name == "double" && e.kind == ElementKind::Function)
            .unwrap();
        assert!(double.modifiers.contains("const"));
        assert_eq!(double.return_type.as_deref(), Some("number"));
        assert_eq!(double.parameters.as_ref().unwrap().len(), 1);

        let counter = find(&elements, "counter");
        assert_eq!(counter.kind, ElementKind::Variable);
        assert!(counter.modifiers.contains("let"));
    }

    #[test]
    fn test_non_file_elements_in_range() {
        let elements = parse_ts();
        let last = elements[0].end_line;
        for e in &elements[1..] {
            assert!(1 <= e.start_line && e.start_line <= e.end_line && e.end_line <= last, "{}", e.name);
        }
    }

    #[test]
    fn test_javascript_commonjs_and_arrow() {
        let src = "const fs = require('fs');\n\n// Greets.\nfunction greet(name, greeting = 'hi') {\n  return greeting + name;\n}\n\nconst shout = name => greet(name).toUpperCase();\n\nmodule.exports = { greet };\n";
        let elements = TypeScriptParser::javascript().parse_file("greet.js", src);
        assert_eq!(elements[0].language, "javascript");

        let greet = find(&elements, "greet");
        assert_eq!(greet.kind, ElementKind::Function);
        assert_eq!(greet.documentation.as_deref(), Some("Greets."));
        let params = greet.parameters.as_ref().unwrap();
        assert_eq!(params[1].name, "greeting");
        assert_eq!(params[1].default_value.as_deref(), Some("'hi'"));

        let shout = find(&elements, "shout");
        assert_eq!(shout.kind, ElementKind::Function);
        assert_eq!(shout.parameters.as_ref().unwrap()[0].name, "name");

        assert_eq!(find(&elements, "fs").kind, ElementKind::Variable);
    }

    #[test]
    fn test_typescript_export_assignment() {
        let src = "function f() {}\nexport = f;\n";
        let elements = TypeScriptParser::typescript().parse_file("f.ts", src);
        assert_eq!(elements[0].exports, vec!["="]);
    }

    #[test]
    fn test_malformed_input_degrades() {
        let src = "function ok() {}\nclass {{{ broken\n";
        let elements = TypeScriptParser::typescript().parse_file("bad.ts", src);
        assert_eq!(elements[0].kind, ElementKind::File);
        assert_eq!(elements[0].end_line, 2);
        assert!(elements[1..].iter().all(|e| e.end_line <= 2));
    }
}
