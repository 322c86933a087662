//! Lexical scope index for a parsed file
//!
//! Built once per parse snapshot by walking the tree: every scope node gets
//! an entry, and every identifier in a declaring position is recorded in the
//! scope it binds into. Lookups then walk the scope chain outward.

use std::collections::HashMap;
use std::ops::Range;

use tree_sitter::{Node, Tree};

use super::grammar::{Grammar, Namespace, Rebinding, Visibility};

/// Index into [`ScopeIndex`] scopes
pub type ScopeId = usize;

#[derive(Debug, Clone)]
struct Scope {
    range: Range<usize>,
    parent: Option<ScopeId>,
    depth: usize,
}

/// A name introduced by a declaring identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub namespace: Namespace,
    pub name: String,
    /// Byte range of the declaring identifier
    pub range: Range<usize>,
    pub scope: ScopeId,
    /// First byte at which references can see this declaration
    pub visible_from: usize,
}

/// Scopes and declarations of one parse snapshot
#[derive(Debug, Default)]
pub struct ScopeIndex {
    scopes: Vec<Scope>,
    declarations: Vec<Declaration>,
    by_start: HashMap<usize, usize>,
    by_name: HashMap<(Namespace, String), Vec<usize>>,
    rebinding: Option<Rebinding>,
}

impl ScopeIndex {
    /// Walk `tree` and record scopes and declarations
    pub fn build(tree: &Tree, source: &str, grammar: &Grammar) -> Self {
        let mut index = ScopeIndex {
            rebinding: Some(grammar.rebinding),
            ..Default::default()
        };
        index.walk(tree, source, grammar);

        tracing::trace!(
            "Scope index built: {} scopes, {} declarations",
            index.scopes.len(),
            index.declarations.len()
        );
        index
    }

    /// Depth-first walk driven by a tree cursor. Ancestors and open scopes
    /// live on heap stacks, so nesting depth is bounded by memory only.
    fn walk(&mut self, tree: &Tree, source: &str, grammar: &Grammar) {
        let mut cursor = tree.walk();
        let mut ancestors: Vec<Node<'_>> = Vec::new();
        let mut stack: Vec<(ScopeId, usize)> = Vec::new();

        loop {
            let node = cursor.node();
            let parent = ancestors.last().copied();
            self.enter(node, parent, cursor.field_name(), source, grammar, &mut stack);

            if cursor.goto_first_child() {
                ancestors.push(node);
                continue;
            }
            leave(node, &mut stack);

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
                if let Some(up) = ancestors.pop() {
                    leave(up, &mut stack);
                }
            }
        }
    }

    fn enter(
        &mut self,
        node: Node<'_>,
        parent: Option<Node<'_>>,
        field: Option<&str>,
        source: &str,
        grammar: &Grammar,
        stack: &mut Vec<(ScopeId, usize)>,
    ) {
        if parent.is_none() || grammar.is_scope(node.kind()) {
            let id = self.scopes.len();
            self.scopes.push(Scope {
                range: node.byte_range(),
                parent: stack.last().map(|(id, _)| *id),
                depth: stack.len(),
            });
            stack.push((id, node.id()));
        }

        if let Some(parent) = parent {
            self.record_declaration(node, parent, field, source, grammar, stack);
        }
    }

    fn record_declaration(
        &mut self,
        node: Node<'_>,
        parent: Node<'_>,
        field: Option<&str>,
        source: &str,
        grammar: &Grammar,
        stack: &[(ScopeId, usize)],
    ) {
        let Some(namespace) = grammar.classify(node.kind(), Some(parent.kind()), field) else {
            return;
        };
        if namespace == Namespace::Member || node.byte_range().is_empty() {
            return;
        }
        let Some(rule) = grammar.declaration_rule(parent.kind(), field) else {
            return;
        };
        let Ok(name) = node.utf8_text(source.as_bytes()) else {
            return;
        };

        // The parent's own scope sits on top of the stack when the parent
        // is itself a scope node
        let mut frames = stack.iter().rev();
        let frame = match frames.next() {
            Some(top) if rule.binds_outside && top.1 == parent.id() => frames.next().or(Some(top)),
            top => top,
        };
        let Some(&(scope, _)) = frame else {
            return;
        };

        let visible_from = match rule.visibility {
            Visibility::Hoisted => self.scopes[scope].range.start,
            Visibility::AfterDeclaration => parent.end_byte(),
        };

        let idx = self.declarations.len();
        self.declarations.push(Declaration {
            namespace,
            name: name.to_string(),
            range: node.byte_range(),
            scope,
            visible_from,
        });
        self.by_start.insert(node.start_byte(), idx);
        self.by_name
            .entry((namespace, name.to_string()))
            .or_default()
            .push(idx);
    }

    /// Number of scopes, including the root
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Declaration whose identifier starts at `byte`, if any
    pub fn declaration_at(&self, byte: usize) -> Option<&Declaration> {
        self.by_start.get(&byte).map(|&idx| &self.declarations[idx])
    }

    /// Canonical declaration of the symbol `decl` introduces.
    ///
    /// Under reassignment semantics every binding of a name in one scope
    /// refers back to the first one.
    pub fn canonical<'a>(&'a self, decl: &'a Declaration) -> &'a Declaration {
        if self.rebinding != Some(Rebinding::Reassign) {
            return decl;
        }
        self.by_name
            .get(&(decl.namespace, decl.name.clone()))
            .and_then(|candidates| {
                candidates
                    .iter()
                    .map(|&idx| &self.declarations[idx])
                    .find(|d| d.scope == decl.scope)
            })
            .unwrap_or(decl)
    }

    /// Innermost scope containing `byte`
    fn innermost_scope(&self, byte: usize) -> Option<ScopeId> {
        self.scopes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.range.contains(&byte))
            .max_by_key(|(_, s)| s.depth)
            .map(|(id, _)| id)
            .or((!self.scopes.is_empty()).then_some(0))
    }

    /// Resolve a reference to `name` at `byte` by walking the scope chain.
    ///
    /// Returns the canonical declaration, or `None` when no enclosing scope
    /// declares the name.
    pub fn lookup(&self, namespace: Namespace, name: &str, byte: usize) -> Option<&Declaration> {
        let candidates = self.by_name.get(&(namespace, name.to_string()))?;
        let chain = self.scope_chain(byte);

        for &scope in &chain {
            let mut in_scope = candidates
                .iter()
                .map(|&idx| &self.declarations[idx])
                .filter(|d| d.scope == scope);

            let found = match self.rebinding {
                Some(Rebinding::Reassign) => in_scope.next(),
                _ => in_scope.filter(|d| d.visible_from <= byte).last(),
            };
            if let Some(decl) = found {
                return Some(self.canonical(decl));
            }
        }

        // Used before any visible declaration: bind to the nearest scope
        // that declares the name at all
        chain.iter().find_map(|&scope| {
            candidates
                .iter()
                .map(|&idx| &self.declarations[idx])
                .find(|d| d.scope == scope)
                .map(|d| self.canonical(d))
        })
    }

    fn scope_chain(&self, byte: usize) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = self.innermost_scope(byte);
        while let Some(id) = current {
            chain.push(id);
            current = self.scopes[id].parent;
        }
        chain
    }
}

/// Close the scope `node` opened, if any
fn leave(node: Node<'_>, stack: &mut Vec<(ScopeId, usize)>) {
    if stack.last().is_some_and(|(_, id)| *id == node.id()) {
        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::grammar::grammar;
    use crate::syntax::{language_for, LanguageId};
    use tree_sitter::Parser;

    fn index_for(source: &str, language: LanguageId) -> ScopeIndex {
        let grammar = grammar(language).unwrap();
        let mut parser = Parser::new();
        parser.set_language(&language_for(language).unwrap()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        ScopeIndex::build(&tree, source, grammar)
    }

    #[test]
    fn test_let_binding_is_recorded() {
        let index = index_for("let x = 1; print(x)", LanguageId::JavaScript);
        let decl = index.declaration_at(4).expect("x is declared");
        assert_eq!(decl.name, "x");
        assert_eq!(decl.range, 4..5);
        assert_eq!(decl.visible_from, 9);
        assert!(index.declaration_at(17).is_none());
    }

    #[test]
    fn test_function_name_binds_in_enclosing_scope() {
        let source = "function greet(name) { return name; }\ngreet('a');";
        let index = index_for(source, LanguageId::JavaScript);
        let greet = index.declaration_at(9).unwrap();
        let name = index.declaration_at(15).unwrap();
        assert_eq!(greet.name, "greet");
        assert_eq!(greet.scope, 0);
        assert_eq!(name.name, "name");
        assert_ne!(name.scope, 0);

        let call = source.rfind("greet").unwrap();
        assert_eq!(index.lookup(Namespace::Value, "greet", call), Some(greet));
        // `name` is not visible outside the function
        assert!(index.lookup(Namespace::Value, "name", call).is_none());
    }

    #[test]
    fn test_rust_shadowing_resolves_to_latest_visible() {
        let source = "fn main() {\n    let total = 1;\n    let total = total + 1;\n    use_it(total);\n}\n";
        let index = index_for(source, LanguageId::Rust);
        let first = source.find("total").unwrap();
        let second = source[first + 1..].find("total").unwrap() + first + 1;
        let rhs = source[second + 1..].find("total").unwrap() + second + 1;
        let last = source.rfind("total").unwrap();

        assert_eq!(
            index.lookup(Namespace::Value, "total", rhs).map(|d| d.range.start),
            Some(first)
        );
        assert_eq!(
            index.lookup(Namespace::Value, "total", last).map(|d| d.range.start),
            Some(second)
        );
    }

    #[test]
    fn test_python_reassignment_is_one_symbol() {
        let source = "count = 0\ncount = count + 1\nprint(count)\n";
        let index = index_for(source, LanguageId::Python);
        let second = source.find("count = count").unwrap();
        let decl = index.declaration_at(second).unwrap();
        assert_eq!(index.canonical(decl).range.start, 0);
        let last = source.rfind("count").unwrap();
        assert_eq!(
            index.lookup(Namespace::Value, "count", last).map(|d| d.range.start),
            Some(0)
        );
    }

    #[test]
    fn test_deep_nesting_on_worker_stack() {
        let depth = 10_000;
        let source = format!("let x = {}1{}; x;", "[".repeat(depth), "]".repeat(depth));
        let handle = std::thread::spawn(move || {
            let index = index_for(&source, LanguageId::JavaScript);
            let last = source.rfind('x').unwrap();
            (
                index.declaration_at(4).map(|d| d.name.clone()),
                index.lookup(Namespace::Value, "x", last).map(|d| d.range.clone()),
            )
        });
        let (declared, resolved) = handle.join().unwrap();
        assert_eq!(declared.as_deref(), Some("x"));
        assert_eq!(resolved, Some(4..5));
    }

    #[test]
    fn test_sibling_scopes_are_closed() {
        let source = "function a() { let v = 1; }\nfunction b() { return v; }";
        let index = index_for(source, LanguageId::JavaScript);
        let use_site = source.rfind('v').unwrap();
        assert!(index.lookup(Namespace::Value, "v", use_site).is_none());
        assert_eq!(index.scope_count(), 5);
    }

    #[test]
    fn test_unknown_name_does_not_resolve() {
        let index = index_for("let x = 1; print(x)", LanguageId::JavaScript);
        assert!(index.lookup(Namespace::Value, "print", 11).is_none());
    }
}
