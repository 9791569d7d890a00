//! Tree-sitter backed [`ModuleParser`]

use rootwork_core::SourceRange;
use tree_sitter::Node;

use crate::extractor::{ModuleParser, ModuleReference};
use crate::parser_pool::{FileType, ParseRequest, ParserPool, create_parser_pool};

/// Reads import statements straight off the syntax tree.
#[derive(Clone)]
pub struct TreeSitterParser {
    pool: ParserPool,
}

impl TreeSitterParser {
    pub fn new(pool: ParserPool) -> Self {
        Self { pool }
    }
}

impl Default for TreeSitterParser {
    fn default() -> Self {
        Self::new(create_parser_pool())
    }
}

#[async_trait::async_trait]
impl ModuleParser for TreeSitterParser {
    async fn extract_module_references(
        &self,
        path: &str,
        content: &str,
    ) -> anyhow::Result<Option<Vec<ModuleReference>>> {
        let Some(file_type) = FileType::from_path(path) else {
            return Ok(None);
        };
        let parsed = self
            .pool
            .parse(ParseRequest {
                file_type,
                content: content.to_string(),
                path: path.to_string(),
            })
            .await?;

        let root = parsed.tree.root_node();
        let source = parsed.content.as_bytes();
        let mut refs = Vec::new();
        collect(root, source, file_type, &mut refs);

        // A tree full of errors with nothing found is not trustworthy.
        if refs.is_empty() && root.has_error() {
            return Ok(None);
        }
        Ok(Some(refs))
    }
}

fn collect(node: Node<'_>, source: &[u8], file_type: FileType, refs: &mut Vec<ModuleReference>) {
    match file_type {
        FileType::TypeScript | FileType::Tsx | FileType::JavaScript => ecmascript(node, source, refs),
        FileType::Python => python(node, source, refs),
        FileType::Go => go(node, source, refs),
        FileType::Rust => rust(node, source, refs),
        FileType::Java => java(node, source, refs),
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, source, file_type, refs);
    }
}

fn ecmascript(node: Node<'_>, source: &[u8], refs: &mut Vec<ModuleReference>) {
    match node.kind() {
        "import_statement" | "export_statement" | "import_require_clause" => {
            if let Some(literal) = node.child_by_field_name("source") {
                push_literal(literal, source, refs);
            }
        }
        "call_expression" => {
            let Some(function) = node.child_by_field_name("function") else {
                return;
            };
            let is_loader = function.kind() == "import"
                || (function.kind() == "identifier" && text(function, source) == Some("require"));
            if !is_loader {
                return;
            }
            let first_arg = node
                .child_by_field_name("arguments")
                .and_then(|args| args.named_child(0))
                .filter(|arg| arg.kind() == "string");
            if let Some(literal) = first_arg {
                push_literal(literal, source, refs);
            }
        }
        _ => {}
    }
}

fn python(node: Node<'_>, source: &[u8], refs: &mut Vec<ModuleReference>) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let dotted = if name.kind() == "aliased_import" {
                    name.child_by_field_name("name")
                } else {
                    Some(name)
                };
                if let Some(dotted) = dotted {
                    push_node(dotted, source, refs, None);
                }
            }
        }
        "import_from_statement" => {
            if let Some(module) = node.child_by_field_name("module_name") {
                push_node(module, source, refs, None);
            }
        }
        _ => {}
    }
}

fn go(node: Node<'_>, source: &[u8], refs: &mut Vec<ModuleReference>) {
    if node.kind() == "import_spec" {
        if let Some(path) = node.child_by_field_name("path") {
            push_literal(path, source, refs);
        }
    }
}

fn rust(node: Node<'_>, source: &[u8], refs: &mut Vec<ModuleReference>) {
    match node.kind() {
        "use_declaration" => {
            let Some(argument) = node.child_by_field_name("argument") else {
                return;
            };
            let path = if argument.kind() == "use_as_clause" {
                argument.child_by_field_name("path")
            } else {
                Some(argument)
            };
            if let Some(path) = path {
                push_node(path, source, refs, None);
            }
        }
        // `mod foo;` without a body points at another file.
        "mod_item" if node.child_by_field_name("body").is_none() => {
            if let Some(name) = node.child_by_field_name("name") {
                push_node(name, source, refs, Some("self::"));
            }
        }
        _ => {}
    }
}

fn java(node: Node<'_>, source: &[u8], refs: &mut Vec<ModuleReference>) {
    if node.kind() != "import_declaration" {
        return;
    }
    let mut cursor = node.walk();
    let mut name = None;
    let mut wildcard = false;
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "scoped_identifier" | "identifier" => name = Some(child),
            "asterisk" => wildcard = true,
            _ => {}
        }
    }
    let Some(name) = name else {
        return;
    };
    let Some(dotted) = text(name, source) else {
        return;
    };
    let module = if wildcard {
        format!("{dotted}.*")
    } else {
        dotted.to_string()
    };
    refs.push(ModuleReference::new(module, range_of(name)));
}

fn text<'a>(node: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    node.utf8_text(source).ok()
}

fn range_of(node: Node<'_>) -> SourceRange {
    let start = node.start_position();
    let end = node.end_position();
    SourceRange::new(
        start.row as u32 + 1,
        start.column as u32 + 1,
        end.row as u32 + 1,
        end.column as u32 + 1,
    )
}

/// String literal: strip the quotes.
fn push_literal(node: Node<'_>, source: &[u8], refs: &mut Vec<ModuleReference>) {
    let Some(raw) = text(node, source) else {
        return;
    };
    let module = raw.trim_matches(|c| c == '"' || c == '\'' || c == '`');
    if !module.is_empty() {
        refs.push(ModuleReference::new(module, range_of(node)));
    }
}

fn push_node(node: Node<'_>, source: &[u8], refs: &mut Vec<ModuleReference>, prefix: Option<&str>) {
    let Some(raw) = text(node, source) else {
        return;
    };
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let module = match prefix {
        Some(prefix) => format!("{prefix}{collapsed}"),
        None => collapsed,
    };
    refs.push(ModuleReference::new(module, range_of(node)));
}
