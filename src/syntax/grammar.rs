//! Per-language grammar facts used for symbol resolution
//!
//! Tree-sitter grammars name their nodes differently; these tables record
//! which node kinds are identifiers, which open a lexical scope, and which
//! parent/field positions bind a new name.

use tree_sitter::Node;

use super::languages::LanguageId;

// Embedded query files
const JAVASCRIPT_IDENTIFIERS: &str = include_str!("../../queries/javascript/identifiers.scm");
const TYPESCRIPT_IDENTIFIERS: &str = include_str!("../../queries/typescript/identifiers.scm");
const RUST_IDENTIFIERS: &str = include_str!("../../queries/rust/identifiers.scm");
const PYTHON_IDENTIFIERS: &str = include_str!("../../queries/python/identifiers.scm");

/// Symbol namespace. Names only collide within the same namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Variables, functions, parameters
    Value,
    /// Types, traits, classes (where the grammar gives them their own node kind)
    Type,
    /// Properties, fields, methods and path segments; matched by name only
    Member,
}

/// Where a declared name becomes visible inside its scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// From the start of the scope (functions, parameters, imports)
    Hoisted,
    /// After the declaring construct ends (`let`, assignments)
    AfterDeclaration,
}

/// How repeated declarations of one name in one scope relate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebinding {
    /// Each declaration is a new symbol that hides the previous one
    Shadow,
    /// Every declaration rebinds the first one
    Reassign,
}

/// An identifier in `field` of a `parent` node declares a name
#[derive(Debug, Clone, Copy)]
pub struct DeclarationRule {
    pub parent: &'static str,
    /// `None` matches identifiers that are direct children without a field
    pub field: Option<&'static str>,
    /// The name binds in the scope around `parent`, not inside it
    pub binds_outside: bool,
    pub visibility: Visibility,
}

/// An identifier in `field` of `parent` belongs to another namespace
#[derive(Debug, Clone, Copy)]
pub struct Reclassification {
    pub parent: &'static str,
    pub field: &'static str,
    pub namespace: Namespace,
}

/// Grammar facts for one language
#[derive(Debug)]
pub struct Grammar {
    pub language: LanguageId,
    pub identifiers: &'static [(&'static str, Namespace)],
    pub scopes: &'static [&'static str],
    pub declarations: &'static [DeclarationRule],
    pub reclassifications: &'static [Reclassification],
    pub rebinding: Rebinding,
    /// Query capturing every identifier node
    pub identifier_query: &'static str,
}

impl Grammar {
    /// Namespace of an identifier node kind, `None` for non-identifiers
    pub fn namespace_of(&self, kind: &str) -> Option<Namespace> {
        self.identifiers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, ns)| *ns)
    }

    pub fn is_identifier(&self, kind: &str) -> bool {
        self.namespace_of(kind).is_some()
    }

    pub fn is_scope(&self, kind: &str) -> bool {
        self.scopes.contains(&kind)
    }

    /// Namespace of an identifier in context, applying reclassifications
    pub fn classify(
        &self,
        kind: &str,
        parent_kind: Option<&str>,
        field: Option<&str>,
    ) -> Option<Namespace> {
        let namespace = self.namespace_of(kind)?;
        if let (Some(parent_kind), Some(field)) = (parent_kind, field) {
            if let Some(r) = self
                .reclassifications
                .iter()
                .find(|r| r.parent == parent_kind && r.field == field)
            {
                return Some(r.namespace);
            }
        }
        Some(namespace)
    }

    /// Rule under which an identifier at (`parent_kind`, `field`) declares a name
    pub fn declaration_rule(
        &self,
        parent_kind: &str,
        field: Option<&str>,
    ) -> Option<&DeclarationRule> {
        self.declarations
            .iter()
            .find(|r| r.parent == parent_kind && r.field == field)
    }
}

/// Grammar facts for a language, `None` for plain text
pub fn grammar(language: LanguageId) -> Option<&'static Grammar> {
    match language {
        LanguageId::JavaScript => Some(&JAVASCRIPT),
        LanguageId::TypeScript => Some(&TYPESCRIPT),
        LanguageId::Rust => Some(&RUST),
        LanguageId::Python => Some(&PYTHON),
        LanguageId::PlainText => None,
    }
}

/// Field name under which `child` hangs off `parent`
pub fn field_name_of(parent: Node<'_>, child: Node<'_>) -> Option<&'static str> {
    let mut cursor = parent.walk();
    if !cursor.goto_first_child() {
        return None;
    }
    loop {
        if cursor.node().id() == child.id() {
            return cursor.field_name();
        }
        if !cursor.goto_next_sibling() {
            return None;
        }
    }
}

const fn decl(
    parent: &'static str,
    field: Option<&'static str>,
    binds_outside: bool,
    visibility: Visibility,
) -> DeclarationRule {
    DeclarationRule {
        parent,
        field,
        binds_outside,
        visibility,
    }
}

use Visibility::{AfterDeclaration as After, Hoisted};

// =============================================================================
// JavaScript / TypeScript
// =============================================================================

const JS_IDENTIFIERS: &[(&str, Namespace)] = &[
    ("identifier", Namespace::Value),
    ("shorthand_property_identifier", Namespace::Value),
    ("shorthand_property_identifier_pattern", Namespace::Value),
    ("property_identifier", Namespace::Member),
];

const TS_IDENTIFIERS: &[(&str, Namespace)] = &[
    ("identifier", Namespace::Value),
    ("shorthand_property_identifier", Namespace::Value),
    ("shorthand_property_identifier_pattern", Namespace::Value),
    ("property_identifier", Namespace::Member),
    ("type_identifier", Namespace::Type),
];

const JS_SCOPES: &[&str] = &[
    "program",
    "statement_block",
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "arrow_function",
    "method_definition",
    "class_body",
    "for_statement",
    "for_in_statement",
    "catch_clause",
];

const JS_DECLARATIONS: &[DeclarationRule] = &[
    decl("variable_declarator", Some("name"), false, After),
    decl("function_declaration", Some("name"), true, Hoisted),
    decl("generator_function_declaration", Some("name"), true, Hoisted),
    decl("function_expression", Some("name"), false, Hoisted),
    decl("class_declaration", Some("name"), true, Hoisted),
    decl("formal_parameters", None, false, Hoisted),
    decl("arrow_function", Some("parameter"), false, Hoisted),
    decl("assignment_pattern", Some("left"), false, Hoisted),
    decl("rest_pattern", None, false, Hoisted),
    decl("catch_clause", Some("parameter"), false, Hoisted),
    decl("for_in_statement", Some("left"), false, Hoisted),
    decl("import_specifier", Some("name"), false, Hoisted),
    decl("import_specifier", Some("alias"), false, Hoisted),
    decl("import_clause", None, false, Hoisted),
    decl("namespace_import", None, false, Hoisted),
    decl("object_pattern", None, false, After),
    decl("array_pattern", None, false, After),
    decl("pair_pattern", Some("value"), false, After),
];

const TS_DECLARATIONS: &[DeclarationRule] = &[
    decl("variable_declarator", Some("name"), false, After),
    decl("function_declaration", Some("name"), true, Hoisted),
    decl("generator_function_declaration", Some("name"), true, Hoisted),
    decl("function_expression", Some("name"), false, Hoisted),
    decl("class_declaration", Some("name"), true, Hoisted),
    decl("abstract_class_declaration", Some("name"), true, Hoisted),
    decl("interface_declaration", Some("name"), true, Hoisted),
    decl("type_alias_declaration", Some("name"), true, Hoisted),
    decl("enum_declaration", Some("name"), true, Hoisted),
    decl("type_parameter", Some("name"), false, Hoisted),
    decl("required_parameter", Some("pattern"), false, Hoisted),
    decl("optional_parameter", Some("pattern"), false, Hoisted),
    decl("arrow_function", Some("parameter"), false, Hoisted),
    decl("assignment_pattern", Some("left"), false, Hoisted),
    decl("rest_pattern", None, false, Hoisted),
    decl("catch_clause", Some("parameter"), false, Hoisted),
    decl("for_in_statement", Some("left"), false, Hoisted),
    decl("import_specifier", Some("name"), false, Hoisted),
    decl("import_specifier", Some("alias"), false, Hoisted),
    decl("import_clause", None, false, Hoisted),
    decl("namespace_import", None, false, Hoisted),
    decl("object_pattern", None, false, After),
    decl("array_pattern", None, false, After),
    decl("pair_pattern", Some("value"), false, After),
];

static JAVASCRIPT: Grammar = Grammar {
    language: LanguageId::JavaScript,
    identifiers: JS_IDENTIFIERS,
    scopes: JS_SCOPES,
    declarations: JS_DECLARATIONS,
    reclassifications: &[],
    rebinding: Rebinding::Shadow,
    identifier_query: JAVASCRIPT_IDENTIFIERS,
};

static TYPESCRIPT: Grammar = Grammar {
    language: LanguageId::TypeScript,
    identifiers: TS_IDENTIFIERS,
    scopes: JS_SCOPES,
    declarations: TS_DECLARATIONS,
    reclassifications: &[],
    rebinding: Rebinding::Shadow,
    identifier_query: TYPESCRIPT_IDENTIFIERS,
};

// =============================================================================
// Rust
// =============================================================================

static RUST: Grammar = Grammar {
    language: LanguageId::Rust,
    identifiers: &[
        ("identifier", Namespace::Value),
        ("shorthand_field_identifier", Namespace::Value),
        ("type_identifier", Namespace::Type),
        ("field_identifier", Namespace::Member),
    ],
    scopes: &[
        "source_file",
        "block",
        "function_item",
        "closure_expression",
        "for_expression",
        "match_arm",
        "impl_item",
        "trait_item",
        "mod_item",
    ],
    declarations: &[
        decl("let_declaration", Some("pattern"), false, After),
        decl("parameter", Some("pattern"), false, Hoisted),
        decl("mut_pattern", None, false, Hoisted),
        decl("closure_parameters", None, false, Hoisted),
        decl("tuple_pattern", None, false, After),
        decl("for_expression", Some("pattern"), false, Hoisted),
        decl("function_item", Some("name"), true, Hoisted),
        decl("function_signature_item", Some("name"), true, Hoisted),
        decl("struct_item", Some("name"), true, Hoisted),
        decl("enum_item", Some("name"), true, Hoisted),
        decl("union_item", Some("name"), true, Hoisted),
        decl("trait_item", Some("name"), true, Hoisted),
        decl("type_item", Some("name"), true, Hoisted),
        decl("const_item", Some("name"), true, Hoisted),
        decl("static_item", Some("name"), true, Hoisted),
        decl("mod_item", Some("name"), true, Hoisted),
        decl("type_parameters", None, false, Hoisted),
        decl("type_parameter", Some("name"), false, Hoisted),
        decl("constrained_type_parameter", Some("left"), false, Hoisted),
    ],
    reclassifications: &[
        Reclassification {
            parent: "scoped_identifier",
            field: "path",
            namespace: Namespace::Type,
        },
        Reclassification {
            parent: "scoped_identifier",
            field: "name",
            namespace: Namespace::Member,
        },
        Reclassification {
            parent: "scoped_type_identifier",
            field: "name",
            namespace: Namespace::Member,
        },
        Reclassification {
            parent: "macro_invocation",
            field: "macro",
            namespace: Namespace::Member,
        },
    ],
    rebinding: Rebinding::Shadow,
    identifier_query: RUST_IDENTIFIERS,
};

// =============================================================================
// Python
// =============================================================================

static PYTHON: Grammar = Grammar {
    language: LanguageId::Python,
    identifiers: &[("identifier", Namespace::Value)],
    scopes: &["module", "function_definition", "class_definition", "lambda"],
    declarations: &[
        decl("assignment", Some("left"), false, After),
        decl("augmented_assignment", Some("left"), false, After),
        decl("pattern_list", None, false, After),
        decl("tuple_pattern", None, false, After),
        decl("function_definition", Some("name"), true, Hoisted),
        decl("class_definition", Some("name"), true, Hoisted),
        decl("parameters", None, false, Hoisted),
        decl("lambda_parameters", None, false, Hoisted),
        decl("default_parameter", Some("name"), false, Hoisted),
        decl("typed_parameter", None, false, Hoisted),
        decl("typed_default_parameter", Some("name"), false, Hoisted),
        decl("list_splat_pattern", None, false, Hoisted),
        decl("dictionary_splat_pattern", None, false, Hoisted),
        decl("for_statement", Some("left"), false, Hoisted),
        decl("aliased_import", Some("alias"), false, Hoisted),
    ],
    reclassifications: &[
        Reclassification {
            parent: "keyword_argument",
            field: "name",
            namespace: Namespace::Member,
        },
        Reclassification {
            parent: "attribute",
            field: "attribute",
            namespace: Namespace::Member,
        },
    ],
    rebinding: Rebinding::Reassign,
    identifier_query: PYTHON_IDENTIFIERS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_has_no_grammar() {
        assert!(grammar(LanguageId::PlainText).is_none());
        for lang in LanguageId::PARSED {
            assert_eq!(grammar(lang).map(|g| g.language), Some(lang));
        }
    }

    #[test]
    fn test_classify_applies_reclassification() {
        let rust = grammar(LanguageId::Rust).unwrap();
        assert_eq!(
            rust.classify("identifier", Some("let_declaration"), Some("pattern")),
            Some(Namespace::Value)
        );
        assert_eq!(
            rust.classify("identifier", Some("scoped_identifier"), Some("name")),
            Some(Namespace::Member)
        );
        assert_eq!(rust.classify("integer_literal", None, None), None);
    }

    #[test]
    fn test_declaration_rule_field_matching() {
        let js = grammar(LanguageId::JavaScript).unwrap();
        assert!(js
            .declaration_rule("variable_declarator", Some("name"))
            .is_some());
        // The initializer of a declarator is a reference
        assert!(js
            .declaration_rule("variable_declarator", Some("value"))
            .is_none());
        // Field-less rules only match field-less children
        assert!(js.declaration_rule("formal_parameters", None).is_some());
        assert!(js
            .declaration_rule("formal_parameters", Some("anything"))
            .is_none());
    }
}
