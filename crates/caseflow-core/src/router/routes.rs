//! Static route table.

use serde::Serialize;

/// Path unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/login";

/// One entry of the route table. Children are matched relative to their
/// parent's path and inherit its `requires_auth` flag.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRecord {
    pub path: String,
    pub name: Option<String>,
    pub requires_auth: bool,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: Some(name.into()),
            requires_auth: false,
            children: Vec::new(),
        }
    }

    /// A record that only groups children, such as a layout.
    pub fn layout(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            requires_auth: false,
            children: Vec::new(),
        }
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn with_children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

/// A path matched against the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    /// Normalized path without query string or trailing slash
    pub path: String,
    /// The full path as requested, query string included
    pub full_path: String,
    pub name: Option<String>,
    pub requires_auth: bool,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteRecord>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    /// Match `full_path` against the table. Parents are tried in declaration
    /// order and the first matching leaf wins.
    pub fn resolve(&self, full_path: &str) -> Option<ResolvedRoute> {
        let path = normalize(full_path);
        Self::match_records(&self.routes, "", false, &path).map(|(name, requires_auth)| ResolvedRoute {
            path: path.clone(),
            full_path: full_path.to_string(),
            name,
            requires_auth,
        })
    }

    fn match_records(
        records: &[RouteRecord],
        prefix: &str,
        inherited_auth: bool,
        path: &str,
    ) -> Option<(Option<String>, bool)> {
        for record in records {
            let own = join(prefix, &record.path);
            let requires_auth = inherited_auth || record.requires_auth;

            if !record.children.is_empty() {
                if let Some(found) = Self::match_records(&record.children, &own, requires_auth, path) {
                    return Some(found);
                }
            }
            if own == path && (record.name.is_some() || record.children.is_empty()) {
                return Some((record.name.clone(), requires_auth));
            }
        }
        None
    }

    /// Every named route with its full path, in declaration order.
    pub fn flatten(&self) -> Vec<ResolvedRoute> {
        let mut out = Vec::new();
        Self::flatten_into(&self.routes, "", false, &mut out);
        out
    }

    fn flatten_into(records: &[RouteRecord], prefix: &str, inherited_auth: bool, out: &mut Vec<ResolvedRoute>) {
        for record in records {
            let own = join(prefix, &record.path);
            let requires_auth = inherited_auth || record.requires_auth;
            if record.name.is_some() {
                out.push(ResolvedRoute {
                    path: own.clone(),
                    full_path: own.clone(),
                    name: record.name.clone(),
                    requires_auth,
                });
            }
            Self::flatten_into(&record.children, &own, requires_auth, out);
        }
    }
}

impl Default for RouteTable {
    /// The application's views. Everything under the main layout needs a
    /// signed-in user; `/login` and the `/test` scratch page do not.
    fn default() -> Self {
        Self::new(vec![
            RouteRecord::new("/test", "Test"),
            RouteRecord::new(LOGIN_PATH, "Login"),
            RouteRecord::layout("/").requires_auth().with_children(vec![
                RouteRecord::new("", "Dashboard"),
                RouteRecord::new("projects", "Projects"),
                RouteRecord::new("modules", "Modules"),
                RouteRecord::new("pages", "Pages"),
                RouteRecord::new("cases", "TestCases"),
                RouteRecord::new("recording", "Recording"),
                RouteRecord::new("suites", "TestSuites"),
                RouteRecord::new("elements", "PageElements"),
                RouteRecord::new("reports", "Reports"),
            ]),
        ])
    }
}

/// Strip query/fragment and trailing slashes; always starts with `/`.
fn normalize(full_path: &str) -> String {
    let path = full_path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if segment.starts_with('/') {
        return normalize(segment);
    }
    normalize(&format!("{}/{}", prefix.trim_end_matches('/'), segment))
}
