use crate::err::GrantErr;
use crate::types::{Category, CategoryId, Term, TermId};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type Catalog = Arc<dyn TermCatalogApi>;

/// read only view of the taxonomy. categories and terms are owned elsewhere.
#[async_trait]
pub trait TermCatalogApi: Send + Sync {
    async fn category<'a>(&'a self, id: &'a CategoryId) -> Result<Option<Category>, GrantErr>;

    /// the category's terms flattened depth first: every parent directly precedes its children
    async fn tree<'a>(&'a self, id: &'a CategoryId) -> Result<Vec<Term>, GrantErr>;
}

/// select options for one category: a leading `<none>` option followed by every term with a
/// `-` prefix per level of depth
pub fn term_options(tree: &Vec<Term>) -> Vec<(Option<TermId>, String)> {
    let mut options = Vec::with_capacity(tree.len() + 1);
    options.push((None, NONE_OPTION.to_string()));
    options.extend(
        tree.iter()
            .map(|term| (Some(term.id), term.indented_name())),
    );
    options
}

pub const NONE_OPTION: &str = "<none>";

/// how a category's terms are written in configuration: nested rather than flattened
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TermNode {
    pub id: TermId,
    pub name: String,
    #[serde(default)]
    pub children: Vec<TermNode>,
}

impl TermNode {
    pub fn leaf<S: ToString>(id: i64, name: S) -> Self {
        Self {
            id: TermId(id),
            name: name.to_string(),
            children: vec![],
        }
    }

    pub fn with_children(mut self, children: Vec<TermNode>) -> Self {
        self.children = children;
        self
    }

    fn flatten_into(&self, category: &CategoryId, depth: usize, into: &mut Vec<Term>) {
        into.push(Term::new(self.id, &self.name, depth, category.clone()));
        for child in &self.children {
            child.flatten_into(category, depth + 1, into);
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub terms: Vec<TermNode>,
}

impl CategoryDef {
    pub fn new<S: ToString>(id: &str, name: S, terms: Vec<TermNode>) -> Self {
        Self {
            id: CategoryId::from(id),
            name: name.to_string(),
            description: None,
            terms,
        }
    }

    pub fn category(&self) -> Category {
        Category {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    pub fn flatten(&self) -> Vec<Term> {
        let mut tree = vec![];
        for node in &self.terms {
            node.flatten_into(&self.id, 0, &mut tree);
        }
        tree
    }
}

#[derive(Clone, Default)]
pub struct MemoryCatalog {
    categories: Arc<DashMap<CategoryId, (Category, Vec<Term>)>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_defs(defs: &Vec<CategoryDef>) -> Self {
        let catalog = Self::new();
        for def in defs {
            catalog.insert(def);
        }
        catalog
    }

    pub fn insert(&self, def: &CategoryDef) {
        self.categories
            .insert(def.id.clone(), (def.category(), def.flatten()));
    }

    pub fn remove(&self, id: &CategoryId) {
        self.categories.remove(id);
    }
}

#[async_trait]
impl TermCatalogApi for MemoryCatalog {
    async fn category<'a>(&'a self, id: &'a CategoryId) -> Result<Option<Category>, GrantErr> {
        Ok(self
            .categories
            .get(id)
            .map(|entry| entry.value().0.clone()))
    }

    async fn tree<'a>(&'a self, id: &'a CategoryId) -> Result<Vec<Term>, GrantErr> {
        self.categories
            .get(id)
            .map(|entry| entry.value().1.clone())
            .ok_or_else(|| GrantErr::not_found(format!("category '{}'", id)))
    }
}

#[cfg(test)]
pub mod test {
    use crate::catalog::{term_options, CategoryDef, MemoryCatalog, TermCatalogApi, TermNode};
    use crate::err::GrantErr;
    use crate::types::{CategoryId, TermId};

    fn regions() -> CategoryDef {
        CategoryDef::new(
            "regions",
            "Regions",
            vec![
                TermNode::leaf(1, "Europe").with_children(vec![
                    TermNode::leaf(2, "France").with_children(vec![TermNode::leaf(3, "Paris")]),
                    TermNode::leaf(4, "Spain"),
                ]),
                TermNode::leaf(5, "Asia"),
            ],
        )
    }

    #[tokio::test]
    pub async fn test_tree_is_depth_first() -> Result<(), GrantErr> {
        let catalog = MemoryCatalog::from_defs(&vec![regions()]);
        let tree = catalog.tree(&CategoryId::from("regions")).await?;
        let flat: Vec<(i64, usize)> = tree.iter().map(|t| (t.id.0, t.depth)).collect();
        assert_eq!(flat, vec![(1, 0), (2, 1), (3, 2), (4, 1), (5, 0)]);
        assert!(tree
            .iter()
            .all(|t| t.category == CategoryId::from("regions")));
        Ok(())
    }

    #[tokio::test]
    pub async fn test_unknown_category() -> Result<(), GrantErr> {
        let catalog = MemoryCatalog::from_defs(&vec![regions()]);
        let missing = CategoryId::from("colors");
        assert!(catalog.category(&missing).await?.is_none());
        match catalog.tree(&missing).await {
            Err(GrantErr::NotFound(what)) => assert!(what.contains("colors")),
            other => panic!("expected NotFound, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    pub fn test_term_options() {
        let options = term_options(&regions().flatten());
        assert_eq!(options.len(), 6);
        assert_eq!(options[0], (None, "<none>".to_string()));
        assert_eq!(options[3], (Some(TermId(3)), "--Paris".to_string()));
        assert_eq!(options[5], (Some(TermId(5)), "Asia".to_string()));
    }
}
