use crate::endpoint::Endpoint;
use crate::extractor::{
    called_name, combine_paths, http_method, is_cfg_test, module_name, string_literal,
    RouteExtractor, ANY_METHODS,
};
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use syn::{visit::Visit, Expr, ExprMethodCall, ImplItemFn, ItemFn, ItemMod, Local, Pat};

/// Axum route extractor.
///
/// Axum routers are values built by method chains, usually spread over several functions:
///
/// ```ignore
/// fn app() -> Router {
///     Router::new()
///         .nest("/api/user", user::routes())
///         .merge(health())
/// }
/// ```
///
/// Every function (and every `let` binding holding a router) is recorded as a router
/// definition with its `.route`, `.nest` and `.merge` mounts. Definitions nothing else mounts
/// are roots; expanding them with their prefixes yields the application's route table.
pub struct AxumExtractor;

impl RouteExtractor for AxumExtractor {
    fn extract_endpoints(&self, parsed_files: &[ParsedFile]) -> Vec<Endpoint> {
        let mut visitor = AxumVisitor::default();

        for parsed_file in parsed_files {
            visitor.module = module_name(&parsed_file.path);
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        let endpoints = RouterGraph::new(visitor.definitions).expand();
        debug!("Axum extraction found {} endpoints", endpoints.len());
        endpoints
    }
}

/// One mount in a router chain
#[derive(Debug, Clone)]
enum Mount {
    Route {
        path: String,
        methods: BTreeSet<String>,
    },
    Nest {
        prefix: String,
        target: NestTarget,
    },
}

/// What a `.nest` or `.merge` call mounts
#[derive(Debug, Clone)]
enum NestTarget {
    /// A router returned by a function call, by its path segments (`user::routes`)
    Function { segments: Vec<String>, caller: String },
    /// A router held by a local binding, by definition id
    Binding(String),
    /// A router chain written in place
    Inline(Vec<Mount>),
}

#[derive(Default)]
struct AxumVisitor {
    module: String,
    /// Definition ids currently being filled, innermost last
    scopes: Vec<String>,
    /// Local router bindings of the enclosing function, by variable name
    bindings: Vec<BTreeMap<String, String>>,
    definitions: BTreeMap<String, Vec<Mount>>,
}

impl AxumVisitor {
    fn enter_fn(&mut self, name: &str, block: &syn::Block) {
        let id = format!("{}::{}", self.module, name);
        self.definitions.entry(id.clone()).or_default();
        self.scopes.push(id);
        self.bindings.push(BTreeMap::new());
        self.visit_block(block);

        // `router` or `router.route(..)` as the tail returns the binding's routes
        if let Some(syn::Stmt::Expr(tail, None)) = block.stmts.last() {
            let mut root = tail;
            while let Expr::MethodCall(call) = root {
                root = &call.receiver;
            }
            let binding = match root {
                Expr::Path(path) => path
                    .path
                    .get_ident()
                    .and_then(|ident| self.binding(&ident.to_string())),
                _ => None,
            };
            if let Some(binding) = binding {
                self.push_mount(Mount::Nest {
                    prefix: String::new(),
                    target: NestTarget::Binding(binding),
                });
            }
        }
        self.bindings.pop();
        self.scopes.pop();
    }

    fn push_mount(&mut self, mount: Mount) {
        if let Some(scope) = self.scopes.last() {
            self.definitions.entry(scope.clone()).or_default().push(mount);
        }
    }

    fn binding(&self, name: &str) -> Option<String> {
        self.bindings.last().and_then(|b| b.get(name).cloned())
    }

    /// Resolves the router argument of `.nest`/`.merge`
    fn nest_target(&self, expr: &Expr) -> Option<NestTarget> {
        match expr {
            Expr::Call(call) => match &*call.func {
                Expr::Path(path) => {
                    let segments: Vec<String> = path
                        .path
                        .segments
                        .iter()
                        .map(|s| s.ident.to_string())
                        .collect();
                    if segments.last().map(String::as_str) == Some("new") {
                        // `Router::new()` with nothing mounted
                        return Some(NestTarget::Inline(Vec::new()));
                    }
                    Some(NestTarget::Function {
                        segments,
                        caller: self.module.clone(),
                    })
                }
                _ => None,
            },
            Expr::Path(path) => {
                let name = path.path.get_ident()?.to_string();
                self.binding(&name).map(NestTarget::Binding)
            }
            Expr::MethodCall(_) => {
                let mut inline = AxumVisitor {
                    module: self.module.clone(),
                    scopes: vec![String::new()],
                    bindings: self.bindings.clone(),
                    definitions: BTreeMap::new(),
                };
                inline.visit_expr(expr);
                Some(NestTarget::Inline(
                    inline.definitions.remove("").unwrap_or_default(),
                ))
            }
            Expr::Paren(paren) => self.nest_target(&paren.expr),
            Expr::Reference(reference) => self.nest_target(&reference.expr),
            _ => None,
        }
    }
}

/// Variable name bound by a `let` pattern (`app`, `mut app`, `app: Router`)
fn binding_ident(pat: &Pat) -> Option<&syn::Ident> {
    match pat {
        Pat::Ident(pat) => Some(&pat.ident),
        Pat::Type(typed) => binding_ident(&typed.pat),
        _ => None,
    }
}

/// HTTP methods registered by a method router expression (`get(a).post(b)`, `any(c)`)
fn method_router_methods(expr: &Expr) -> BTreeSet<String> {
    let mut methods = BTreeSet::new();
    collect_methods(expr, &mut methods);
    methods
}

fn collect_methods(expr: &Expr, methods: &mut BTreeSet<String>) {
    match expr {
        Expr::Call(call) => {
            let Some(name) = called_name(expr) else {
                return;
            };
            if let Some(method) = http_method(&name) {
                methods.insert(method.to_string());
            } else if name == "any" || name == "any_service" {
                methods.extend(ANY_METHODS.iter().map(|m| m.to_string()));
            } else if name == "on" || name == "on_service" {
                if let Some(Expr::Path(filter)) = call.args.first() {
                    if let Some(method) = filter
                        .path
                        .segments
                        .last()
                        .and_then(|s| http_method(&s.ident.to_string()))
                    {
                        methods.insert(method.to_string());
                    }
                }
            }
        }
        Expr::MethodCall(call) => {
            if let Some(method) = http_method(&call.method.to_string()) {
                methods.insert(method.to_string());
            }
            collect_methods(&call.receiver, methods);
        }
        Expr::Paren(paren) => collect_methods(&paren.expr, methods),
        Expr::Group(group) => collect_methods(&group.expr, methods),
        _ => {}
    }
}

impl<'ast> Visit<'ast> for AxumVisitor {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.enter_fn(&node.sig.ident.to_string(), &node.block);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        self.enter_fn(&node.sig.ident.to_string(), &node.block);
    }

    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        if is_cfg_test(&node.attrs) {
            return;
        }
        syn::visit::visit_item_mod(self, node);
    }

    fn visit_local(&mut self, node: &'ast Local) {
        let (Some(ident), Some(init)) = (binding_ident(&node.pat), &node.init) else {
            syn::visit::visit_local(self, node);
            return;
        };
        let Some(scope) = self.scopes.last().cloned() else {
            syn::visit::visit_local(self, node);
            return;
        };

        // A binding becomes its own router definition so `.nest("/x", binding)` can find it
        let id = format!("{}::{}", scope, ident);
        self.scopes.push(id.clone());
        self.visit_expr(&init.expr);
        self.scopes.pop();

        if self.definitions.contains_key(&id) {
            if let Some(bindings) = self.bindings.last_mut() {
                bindings.insert(ident.to_string(), id);
            }
        }
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        // Builder calls on a binding (`app.route(..)`) keep filling that binding
        match self.chain_binding(node) {
            Some(id) => {
                self.scopes.push(id);
                self.visit_router_call(node);
                self.scopes.pop();
            }
            None => self.visit_router_call(node),
        }
    }
}

impl AxumVisitor {
    fn chain_binding(&self, node: &ExprMethodCall) -> Option<String> {
        let mut root = &*node.receiver;
        while let Expr::MethodCall(call) = root {
            root = &call.receiver;
        }
        match root {
            Expr::Path(path) => self.binding(&path.path.get_ident()?.to_string()),
            _ => None,
        }
    }

    fn visit_router_call(&mut self, node: &ExprMethodCall) {
        let method = node.method.to_string();
        match method.as_str() {
            "route" | "route_service" if node.args.len() == 2 => {
                self.visit_expr(&node.receiver);
                match string_literal(&node.args[0]) {
                    Some(path) => {
                        let methods = method_router_methods(&node.args[1]);
                        if methods.is_empty() {
                            debug!("Route {} registers no recognizable methods", path);
                        } else {
                            self.push_mount(Mount::Route { path, methods });
                        }
                    }
                    None => debug!("Skipping route with non-literal path"),
                }
            }
            "nest" | "nest_service" if node.args.len() == 2 => {
                self.visit_expr(&node.receiver);
                let Some(prefix) = string_literal(&node.args[0]) else {
                    debug!("Skipping nest with non-literal prefix");
                    return;
                };
                match self.nest_target(&node.args[1]) {
                    Some(target) => self.push_mount(Mount::Nest { prefix, target }),
                    None => debug!("Cannot resolve router nested at {}", prefix),
                }
            }
            "merge" if node.args.len() == 1 => {
                self.visit_expr(&node.receiver);
                match self.nest_target(&node.args[0]) {
                    Some(target) => self.push_mount(Mount::Nest {
                        prefix: String::new(),
                        target,
                    }),
                    None => debug!("Cannot resolve merged router"),
                }
            }
            _ => syn::visit::visit_expr_method_call(self, node),
        }
    }
}

/// Router definitions with their mount relationships resolved
struct RouterGraph {
    definitions: BTreeMap<String, Vec<Mount>>,
}

impl RouterGraph {
    fn new(definitions: BTreeMap<String, Vec<Mount>>) -> Self {
        Self { definitions }
    }

    /// Finds the definition a function call refers to.
    ///
    /// `user::routes()` matches `routes` defined in module `user`; a bare `routes()` prefers
    /// the caller's module and otherwise accepts a unique definition of that name.
    fn resolve_function(&self, segments: &[String], caller: &str) -> Option<String> {
        let name = segments.last()?;
        if segments.len() >= 2 {
            let module = &segments[segments.len() - 2];
            let id = if module == "Self" || module == "self" || module == "super" {
                format!("{}::{}", caller, name)
            } else {
                format!("{}::{}", module, name)
            };
            if self.definitions.contains_key(&id) {
                return Some(id);
            }
        }

        let local = format!("{}::{}", caller, name);
        if self.definitions.contains_key(&local) {
            return Some(local);
        }

        let suffix = format!("::{}", name);
        let candidates: Vec<&String> = self
            .definitions
            .keys()
            .filter(|id| id.ends_with(&suffix) && id.matches("::").count() == 1)
            .collect();
        match candidates.as_slice() {
            [only] => Some((*only).clone()),
            _ => None,
        }
    }

    fn resolve(&self, target: &NestTarget) -> Option<String> {
        match target {
            NestTarget::Function { segments, caller } => self.resolve_function(segments, caller),
            NestTarget::Binding(id) => Some(id.clone()),
            NestTarget::Inline(_) => None,
        }
    }

    fn collect_references(&self, mounts: &[Mount], referenced: &mut HashSet<String>) {
        for mount in mounts {
            if let Mount::Nest { target, .. } = mount {
                if let NestTarget::Inline(inner) = target {
                    self.collect_references(inner, referenced);
                } else if let Some(id) = self.resolve(target) {
                    referenced.insert(id);
                }
            }
        }
    }

    /// Expands every root definition into endpoints
    fn expand(&self) -> Vec<Endpoint> {
        let mut referenced = HashSet::new();
        for mounts in self.definitions.values() {
            self.collect_references(mounts, &mut referenced);
        }

        let mut endpoints = Vec::new();
        for id in self.definitions.keys() {
            if !referenced.contains(id) {
                self.expand_definition(id, "", &mut endpoints, &mut Vec::new());
            }
        }
        endpoints
    }

    fn expand_definition(
        &self,
        id: &str,
        prefix: &str,
        endpoints: &mut Vec<Endpoint>,
        stack: &mut Vec<String>,
    ) {
        if stack.iter().any(|entry| entry == id) {
            warn!("Router {} mounts itself, skipping", id);
            return;
        }
        let Some(mounts) = self.definitions.get(id) else {
            return;
        };

        stack.push(id.to_string());
        self.expand_mounts(mounts, prefix, endpoints, stack);
        stack.pop();
    }

    fn expand_mounts(
        &self,
        mounts: &[Mount],
        prefix: &str,
        endpoints: &mut Vec<Endpoint>,
        stack: &mut Vec<String>,
    ) {
        for mount in mounts {
            match mount {
                Mount::Route { path, methods } => endpoints.push(Endpoint {
                    path: combine_paths(prefix, path),
                    methods: methods.clone(),
                }),
                Mount::Nest {
                    prefix: nested,
                    target,
                } => {
                    let full = combine_paths(prefix, nested);
                    match target {
                        NestTarget::Inline(inner) => {
                            self.expand_mounts(inner, &full, endpoints, stack)
                        }
                        _ => match self.resolve(target) {
                            Some(id) => self.expand_definition(&id, &full, endpoints, stack),
                            None => debug!("Unresolved router mounted at {:?}", full),
                        },
                    }
                }
            }
        }
    }
}
