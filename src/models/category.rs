use std::collections::HashMap;

/// Canonical category identifier.
///
/// The backend keys categories by integer, older rows and imported data use
/// strings; everything above the storage layer compares ids as opaque
/// strings. Integer keys are converted at the boundary with `From<i64>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer form for the SQLite boundary. `None` for ids that were
    /// never database keys.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Expense,
    Income,
    Investment,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Investment => "investment",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "income" => Self::Income,
            "investment" => Self::Investment,
            _ => Self::Expense,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Option<CategoryId>,
    pub name: String,
    pub kind: CategoryKind,
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn new(name: String, kind: CategoryKind) -> Self {
        Self {
            id: None,
            name,
            kind,
            parent_id: None,
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.trim().to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Resolve a user-typed token: an exact id first, then a name.
    pub fn resolve<'a>(categories: &'a [Category], token: &str) -> Option<&'a Category> {
        let id = CategoryId::new(token);
        categories
            .iter()
            .find(|c| c.id.as_ref() == Some(&id))
            .or_else(|| Self::find_by_name(categories, token))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Id → display name lookup used by the flow summary and the tables.
/// Categories without an id (not yet stored) are skipped.
pub fn category_names(categories: &[Category]) -> HashMap<CategoryId, String> {
    categories
        .iter()
        .filter_map(|c| c.id.clone().map(|id| (id, c.name.clone())))
        .collect()
}
