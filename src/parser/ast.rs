//! Abstract Syntax Tree types for mustache templates

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Root AST node - a complete parsed template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub nodes: Vec<Spanned<Node>>,
}

/// A piece of a template
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text copied to the output
    Text(String),
    /// `{{name}}` (escaped) or `{{{name}}}` / `{{&name}}` (unescaped)
    Variable { name: String, escape: bool },
    /// `{{#name}}...{{/name}}` or, when inverted, `{{^name}}...{{/name}}`
    Section {
        name: String,
        inverted: bool,
        children: Vec<Spanned<Node>>,
    },
    /// `{{>name}}`, resolved when the template executes
    Partial(String),
}

impl Node {
    /// Names of the partials referenced by this node and its children
    pub fn partial_names(&self) -> Vec<&str> {
        match self {
            Node::Partial(name) => vec![name.as_str()],
            Node::Section { children, .. } => children
                .iter()
                .flat_map(|child| child.node.partial_names())
                .collect(),
            _ => vec![],
        }
    }
}

impl Document {
    /// Names of all partials referenced anywhere in the document, in source order
    pub fn partial_names(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .flat_map(|n| n.node.partial_names())
            .collect()
    }
}
