//! Symbol resolution: identifier node to canonical declaration

use std::ops::Range;

use tree_sitter::Node;

use crate::model::DocumentId;
use crate::syntax::{field_name_of, Namespace, ParsedFile};

/// The symbol an identifier refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedSymbol {
    /// Declared in a file; identified by its canonical declaring identifier
    Local {
        document: DocumentId,
        namespace: Namespace,
        name: String,
        declaration: Range<usize>,
    },
    /// No declaration in scope (globals, builtins, members)
    Free { namespace: Namespace, name: String },
}

impl ResolvedSymbol {
    pub fn name(&self) -> &str {
        match self {
            ResolvedSymbol::Local { name, .. } | ResolvedSymbol::Free { name, .. } => name,
        }
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            ResolvedSymbol::Local { namespace, .. } | ResolvedSymbol::Free { namespace, .. } => {
                *namespace
            }
        }
    }

    /// Byte range of the canonical declaring identifier
    pub fn declaration(&self) -> Option<&Range<usize>> {
        match self {
            ResolvedSymbol::Local { declaration, .. } => Some(declaration),
            ResolvedSymbol::Free { .. } => None,
        }
    }
}

/// Maps a syntax element to the symbol it names
pub trait Resolver: Send + Sync {
    /// `None` when the element is not a referenceable identifier
    fn resolve(&self, element: Node<'_>, file: &ParsedFile) -> Option<ResolvedSymbol>;
}

/// Lexical-scope resolver over a file's [`ScopeIndex`](crate::syntax::ScopeIndex)
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopeResolver;

impl Resolver for ScopeResolver {
    fn resolve(&self, element: Node<'_>, file: &ParsedFile) -> Option<ResolvedSymbol> {
        let grammar = file.grammar()?;
        if !grammar.is_identifier(element.kind()) || element.byte_range().is_empty() {
            return None;
        }
        let name = element.utf8_text(file.source().as_bytes()).ok()?.to_string();

        let parent = element.parent();
        let field = parent.and_then(|p| field_name_of(p, element));
        let namespace = grammar.classify(element.kind(), parent.map(|p| p.kind()), field)?;
        if namespace == Namespace::Member {
            return Some(ResolvedSymbol::Free { namespace, name });
        }

        let scopes = file.scopes();
        let declared_here = scopes
            .declaration_at(element.start_byte())
            .filter(|d| d.namespace == namespace && d.range == element.byte_range())
            .map(|d| scopes.canonical(d));

        let declaration =
            declared_here.or_else(|| scopes.lookup(namespace, &name, element.start_byte()));

        Some(match declaration {
            Some(decl) => ResolvedSymbol::Local {
                document: file.document(),
                namespace,
                name,
                declaration: decl.range.clone(),
            },
            None => ResolvedSymbol::Free { namespace, name },
        })
    }
}
