use crate::endpoint::Endpoint;
use crate::extractor::{
    called_name, combine_paths, http_method, is_cfg_test, string_literal, RouteExtractor,
    ANY_METHODS,
};
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use syn::punctuated::Punctuated;
use syn::{visit::Visit, Attribute, Expr, ExprMethodCall, ImplItemFn, ItemFn, ItemMod, Token};

/// Actix-Web route extractor.
///
/// Handlers declare their path with routing macros (`#[get("/users/{id}")]`) and are mounted
/// with `.service(handler)`, possibly inside `web::scope("/api")` or a function passed to
/// `.configure(..)`. Explicit `.route("/path", web::post().to(handler))` registrations and
/// `web::resource` builders are recognized too. A macro-annotated handler that is never
/// mounted anywhere is reported at its declared path.
pub struct ActixExtractor;

impl RouteExtractor for ActixExtractor {
    fn extract_endpoints(&self, parsed_files: &[ParsedFile]) -> Vec<Endpoint> {
        let mut visitor = ActixVisitor::default();

        for parsed_file in parsed_files {
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        let endpoints = visitor.expand();
        debug!("Actix-Web extraction found {} endpoints", endpoints.len());
        endpoints
    }
}

#[derive(Debug, Clone)]
enum Registration {
    /// `.service(handler)` under a prefix
    Handler { prefix: String, name: String },
    /// `.route(..)` with its full path
    Route {
        path: String,
        methods: BTreeSet<String>,
    },
    /// `.configure(f)` under a prefix
    Configure { prefix: String, name: String },
}

#[derive(Default)]
struct ActixVisitor {
    current_fn: Option<String>,
    /// Scope prefixes of the `.service(..)` arguments being visited, innermost last
    scopes: Vec<String>,
    /// Routes declared by routing macros, by handler name
    handlers: BTreeMap<String, Vec<Endpoint>>,
    registrations: BTreeMap<String, Vec<Registration>>,
}

/// Route declared by a routing macro attribute
fn parse_route_macro(attr: &Attribute) -> Option<Endpoint> {
    let name = attr.path().segments.last()?.ident.to_string();
    let args = attr
        .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)
        .ok()?;
    let path = string_literal(args.first()?)?;

    if let Some(method) = http_method(&name) {
        return Some(Endpoint::new(path, [method]));
    }

    if name == "route" {
        // #[route("/path", method = "GET", method = "HEAD")]
        let methods: BTreeSet<String> = args
            .iter()
            .filter_map(|arg| match arg {
                Expr::Assign(assign) => {
                    let is_method =
                        matches!(&*assign.left, Expr::Path(p) if p.path.is_ident("method"));
                    if is_method {
                        string_literal(&assign.right).map(|m| m.to_uppercase())
                    } else {
                        None
                    }
                }
                _ => None,
            })
            .collect();
        if !methods.is_empty() {
            return Some(Endpoint { path, methods });
        }
    }

    None
}

/// The builder a method chain starts from
enum ChainRoot {
    Scope(String),
    Resource(String),
    Other,
}

fn chain_root(expr: &Expr) -> ChainRoot {
    let mut root = expr;
    while let Expr::MethodCall(call) = root {
        root = &call.receiver;
    }

    let path = match root {
        Expr::Call(call) => call.args.first().and_then(string_literal),
        _ => None,
    };
    match (called_name(root).as_deref(), path) {
        (Some("scope"), Some(path)) => ChainRoot::Scope(path),
        (Some("resource"), Some(path)) => ChainRoot::Resource(path),
        _ => ChainRoot::Other,
    }
}

/// HTTP methods a route builder answers (`web::get().to(h)`, `web::method(Method::PATCH)`)
fn route_methods(expr: &Expr) -> BTreeSet<String> {
    let mut methods = BTreeSet::new();
    let mut current = expr;
    loop {
        match current {
            Expr::MethodCall(call) => {
                if call.method == "method" {
                    methods.extend(method_argument(call.args.first()));
                }
                current = &call.receiver;
            }
            Expr::Call(call) => {
                match called_name(current).as_deref() {
                    Some("method") => methods.extend(method_argument(call.args.first())),
                    Some("route") if methods.is_empty() => {
                        methods.extend(ANY_METHODS.iter().map(|m| m.to_string()))
                    }
                    Some(name) => methods.extend(http_method(name).map(str::to_string)),
                    None => {}
                }
                break;
            }
            _ => break,
        }
    }
    methods
}

fn method_argument(arg: Option<&Expr>) -> Option<String> {
    match arg? {
        Expr::Path(path) => {
            let ident = path.path.segments.last()?.ident.to_string();
            http_method(&ident).map(str::to_string)
        }
        _ => None,
    }
}

impl ActixVisitor {
    fn register(&mut self, registration: Registration) {
        if let Some(current) = &self.current_fn {
            self.registrations
                .entry(current.clone())
                .or_default()
                .push(registration);
        }
    }

    fn outer_prefix(&self) -> String {
        self.scopes.last().cloned().unwrap_or_default()
    }

    /// Expands the registrations of every function no `.configure(..)` call reaches
    fn expand(&self) -> Vec<Endpoint> {
        let configured: HashSet<&str> = self
            .registrations
            .values()
            .flatten()
            .filter_map(|registration| match registration {
                Registration::Configure { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();

        let mut endpoints = Vec::new();
        let mut mounted = HashSet::new();
        for name in self.registrations.keys() {
            if !configured.contains(name.as_str()) {
                self.expand_fn(name, "", &mut endpoints, &mut mounted, &mut Vec::new());
            }
        }

        for (name, routes) in &self.handlers {
            if !mounted.contains(name) {
                endpoints.extend(routes.iter().cloned());
            }
        }
        endpoints
    }

    fn expand_fn(
        &self,
        name: &str,
        prefix: &str,
        endpoints: &mut Vec<Endpoint>,
        mounted: &mut HashSet<String>,
        stack: &mut Vec<String>,
    ) {
        if stack.iter().any(|entry| entry == name) {
            warn!("Service configuration {} configures itself, skipping", name);
            return;
        }
        let Some(registrations) = self.registrations.get(name) else {
            debug!("No registrations found for configure function {}", name);
            return;
        };

        stack.push(name.to_string());
        for registration in registrations {
            match registration {
                Registration::Handler {
                    prefix: scope,
                    name: handler,
                } => {
                    let Some(routes) = self.handlers.get(handler) else {
                        debug!("Service {} has no routing macro", handler);
                        continue;
                    };
                    mounted.insert(handler.clone());
                    let full = combine_paths(prefix, scope);
                    endpoints.extend(routes.iter().map(|route| Endpoint {
                        path: combine_paths(&full, &route.path),
                        methods: route.methods.clone(),
                    }));
                }
                Registration::Route { path, methods } => endpoints.push(Endpoint {
                    path: combine_paths(prefix, path),
                    methods: methods.clone(),
                }),
                Registration::Configure {
                    prefix: scope,
                    name: configured,
                } => {
                    let full = combine_paths(prefix, scope);
                    self.expand_fn(configured, &full, endpoints, mounted, stack);
                }
            }
        }
        stack.pop();
    }
}

impl<'ast> Visit<'ast> for ActixVisitor {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        let name = node.sig.ident.to_string();
        for attr in &node.attrs {
            if let Some(endpoint) = parse_route_macro(attr) {
                debug!("Found routing macro on {}: {:?}", name, endpoint);
                self.handlers.entry(name.clone()).or_default().push(endpoint);
            }
        }

        let previous = self.current_fn.replace(name);
        let scopes = std::mem::take(&mut self.scopes);
        syn::visit::visit_item_fn(self, node);
        self.scopes = scopes;
        self.current_fn = previous;
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        let previous = self.current_fn.replace(node.sig.ident.to_string());
        syn::visit::visit_impl_item_fn(self, node);
        self.current_fn = previous;
    }

    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        if is_cfg_test(&node.attrs) {
            return;
        }
        syn::visit::visit_item_mod(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        let method = node.method.to_string();
        let outer = self.outer_prefix();
        let root = chain_root(&node.receiver);
        let prefix = match &root {
            ChainRoot::Scope(scope) => combine_paths(&outer, scope),
            _ => outer.clone(),
        };

        match (method.as_str(), node.args.len()) {
            ("service", 1) => {
                self.visit_expr(&node.receiver);
                match &node.args[0] {
                    Expr::Path(path) => {
                        if let Some(segment) = path.path.segments.last() {
                            self.register(Registration::Handler {
                                prefix,
                                name: segment.ident.to_string(),
                            });
                        }
                    }
                    nested => {
                        self.scopes.push(prefix);
                        self.visit_expr(nested);
                        self.scopes.pop();
                    }
                }
            }
            ("route", 2) => {
                self.visit_expr(&node.receiver);
                match string_literal(&node.args[0]) {
                    Some(path) => {
                        let methods = route_methods(&node.args[1]);
                        self.register(Registration::Route {
                            path: combine_paths(&prefix, &path),
                            methods,
                        });
                    }
                    None => debug!("Skipping route with non-literal path"),
                }
            }
            ("route", 1) => {
                self.visit_expr(&node.receiver);
                if let ChainRoot::Resource(path) = root {
                    let methods = route_methods(&node.args[0]);
                    self.register(Registration::Route {
                        path: combine_paths(&outer, &path),
                        methods,
                    });
                }
            }
            ("configure", 1) => {
                self.visit_expr(&node.receiver);
                if let Expr::Path(path) = &node.args[0] {
                    if let Some(segment) = path.path.segments.last() {
                        self.register(Registration::Configure {
                            prefix,
                            name: segment.ident.to_string(),
                        });
                    }
                }
            }
            _ => syn::visit::visit_expr_method_call(self, node),
        }
    }
}
