//! Lexical scope model for one Go file.
//!
//! One bottom-up walk of the tree produces an arena of sealed scopes, one
//! per scope-defining construct: the file itself, each named function or
//! method, each function literal, and each block. A scope records the
//! identifiers declared directly in it; lookups walk outward through
//! parents. Scopes are sealed as construction of each finishes, and a
//! lookup against an unsealed scope is a bug in this crate, not a property
//! of the input, and panics rather than returning a wrong answer.
//!
//! Import names are deliberately absent: the surviving import of a rewrite
//! binds the target name at file level itself, and a second distinct
//! binding of the same name would be a redeclaration error in Go.

use crate::syntax;
use std::collections::HashMap;
use tree_sitter::Node;

/// Handle into a [`ScopeTree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    /// Identifier name to the node id of its defining identifier.
    /// Last writer wins, matching Go's own redeclaration shadowing rule.
    idents: HashMap<String, usize>,
    sealed: bool,
}

/// The sealed, rooted scope tree for one file.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    /// Non-owning association from scope-defining syntax nodes (by node id)
    /// back to their scope.
    by_node: HashMap<usize, ScopeId>,
    root: ScopeId,
}

impl ScopeTree {
    /// Builds the scope tree for a parsed file. `root` must be the
    /// `source_file` node.
    pub fn build(root: Node, source: &str) -> ScopeTree {
        let mut builder = Builder {
            source,
            scopes: Vec::new(),
            by_node: HashMap::new(),
        };
        let file_scope = builder.walk_file(root);
        ScopeTree {
            scopes: builder.scopes,
            by_node: builder.by_node,
            root: file_scope,
        }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// The scope introduced by the node with this id, if it introduces one.
    pub fn scope_at(&self, node_id: usize) -> Option<ScopeId> {
        self.by_node.get(&node_id).copied()
    }

    /// Whether `name` is declared directly in `scope`.
    pub fn declared_in(&self, scope: ScopeId, name: &str) -> bool {
        let s = &self.scopes[scope.0];
        assert!(s.sealed, "scope queried before it was sealed");
        s.idents.contains_key(name)
    }

    /// Whether `name` is declared in `scope` or any enclosing scope.
    pub fn visible_from(&self, scope: ScopeId, name: &str) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.declared_in(id, name) {
                return true;
            }
            current = self.scopes[id.0].parent;
        }
        false
    }

    #[cfg(test)]
    fn child_scopes(&self, scope: ScopeId) -> &[ScopeId] {
        &self.scopes[scope.0].children
    }
}

struct Builder<'s> {
    source: &'s str,
    scopes: Vec<Scope>,
    by_node: HashMap<usize, ScopeId>,
}

impl Builder<'_> {
    fn new_scope(&mut self, node: Node) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: None,
            children: Vec::new(),
            idents: HashMap::new(),
            sealed: false,
        });
        self.by_node.insert(node.id(), id);
        id
    }

    fn seal(&mut self, id: ScopeId) {
        let scope = &mut self.scopes[id.0];
        assert!(!scope.sealed, "scope sealed twice");
        scope.sealed = true;
    }

    /// Attaches a fully built child. The child must already be sealed.
    fn attach(&mut self, parent: ScopeId, child: ScopeId) {
        assert!(self.scopes[child.0].sealed, "attached an unsealed scope");
        self.scopes[child.0].parent = Some(parent);
        self.scopes[parent.0].children.push(child);
    }

    fn add(&mut self, id: ScopeId, ident: Node) {
        let name = syntax::text(ident, self.source).to_string();
        self.scopes[id.0].idents.insert(name, ident.id());
    }

    fn walk_file(&mut self, node: Node) -> ScopeId {
        let scope = self.new_scope(node);
        self.scan_region(scope, node);
        self.seal(scope);
        scope
    }

    /// Collects declarations belonging to `scope` from the subtree under
    /// `node`, pruning at every construct that defines its own scope. Each
    /// such construct is built exactly once, by the scope that owns it.
    fn scan_region(&mut self, scope: ScopeId, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        self.add(scope, name);
                    }
                    let inner = self.walk_function(child);
                    self.attach(scope, inner);
                }
                "func_literal" => {
                    let inner = self.walk_function(child);
                    self.attach(scope, inner);
                }
                "block" => {
                    let inner = self.walk_block(child);
                    self.attach(scope, inner);
                }
                "var_spec" | "const_spec" => {
                    let mut names = child.walk();
                    for name in child.children_by_field_name("name", &mut names) {
                        self.add(scope, name);
                    }
                    // initializers may contain function literals
                    if let Some(value) = child.child_by_field_name("value") {
                        self.scan_region(scope, value);
                    }
                }
                "type_spec" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        self.add(scope, name);
                    }
                }
                // `switch m := i.(type)` binds m without a
                // short_var_declaration node
                "type_switch_statement" => {
                    if let Some(alias) = child.child_by_field_name("alias") {
                        self.add_expression_list_idents(scope, alias);
                    }
                    self.scan_region(scope, child);
                }
                "range_clause" => {
                    let mut tokens = child.walk();
                    let defines = child.children(&mut tokens).any(|c| c.kind() == ":=");
                    if defines {
                        if let Some(left) = child.child_by_field_name("left") {
                            self.add_expression_list_idents(scope, left);
                        }
                    }
                    if let Some(right) = child.child_by_field_name("right") {
                        self.scan_region(scope, right);
                    }
                }
                "short_var_declaration" => {
                    if let Some(left) = child.child_by_field_name("left") {
                        self.add_expression_list_idents(scope, left);
                    }
                    if let Some(right) = child.child_by_field_name("right") {
                        self.scan_region(scope, right);
                    }
                }
                _ => self.scan_region(scope, child),
            }
        }
    }

    /// A function declaration, method declaration, or function literal:
    /// receiver, parameter, and named result names live in the function
    /// scope, with the body block as a nested child scope.
    fn walk_function(&mut self, node: Node) -> ScopeId {
        let scope = self.new_scope(node);

        if let Some(receiver) = node.child_by_field_name("receiver") {
            self.add_parameter_names(scope, receiver);
        }
        if let Some(parameters) = node.child_by_field_name("parameters") {
            self.add_parameter_names(scope, parameters);
        }
        if let Some(result) = node.child_by_field_name("result") {
            // a bare type result has no names to bind
            if result.kind() == "parameter_list" {
                self.add_parameter_names(scope, result);
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            let inner = self.walk_block(body);
            self.attach(scope, inner);
        }

        self.seal(scope);
        scope
    }

    fn walk_block(&mut self, node: Node) -> ScopeId {
        let scope = self.new_scope(node);
        self.scan_region(scope, node);
        self.seal(scope);
        scope
    }

    fn add_expression_list_idents(&mut self, scope: ScopeId, list: Node) {
        let mut cursor = list.walk();
        for expr in list.named_children(&mut cursor) {
            if expr.kind() == "identifier" {
                self.add(scope, expr);
            }
        }
    }

    fn add_parameter_names(&mut self, scope: ScopeId, list: Node) {
        let mut cursor = list.walk();
        for parameter in list.named_children(&mut cursor) {
            let mut names = parameter.walk();
            for name in parameter.children_by_field_name("name", &mut names) {
                self.add(scope, name);
            }
        }
    }
}
