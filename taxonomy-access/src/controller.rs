use crate::catalog::{term_options, Catalog, TermCatalogApi};
use crate::config::AccessConfig;
use crate::err::GrantErr;
use crate::matrix::{GrantMatrix, MatrixView, Submission};
use crate::scheme::{SchemeRegistry, SchemeRegistryApi};
use crate::store::{GrantStore, GrantStoreApi};
use crate::types::{CategoryId, GrantChange, GrantKey, Scheme, SchemeId, Term, TermId, UserId};
use crate::user::{UserDirectory, UserDirectoryApi};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{info, instrument, warn};

/// outcome of a successful [`GrantMatrixController::apply_matrix`]
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub granted: usize,
    pub revoked: usize,
    /// submitted cells whose scheme or term no longer exists; nothing was written for them
    pub ignored: Vec<(SchemeId, TermId)>,
}

/// Translates between the sparse grant rows of a [`GrantStore`] and the scheme x term
/// matrix an administrator edits for one user.
pub struct GrantMatrixController {
    catalog: Catalog,
    schemes: SchemeRegistry,
    users: UserDirectory,
    store: GrantStore,
    vocabularies: Vec<CategoryId>,
    strict_submissions: bool,
}

impl GrantMatrixController {
    pub fn new(
        catalog: Catalog,
        schemes: SchemeRegistry,
        users: UserDirectory,
        store: GrantStore,
        config: &AccessConfig,
    ) -> Self {
        Self {
            catalog,
            schemes,
            users,
            store,
            vocabularies: config.vocabularies.clone(),
            strict_submissions: config.strict_submissions,
        }
    }

    pub fn store(&self) -> &GrantStore {
        &self.store
    }

    /// terms of every configured category in configured order. categories the catalog does not
    /// know are skipped, a term listed by two categories keeps its first position.
    pub async fn terms(&self) -> Result<Vec<Term>, GrantErr> {
        let mut terms = vec![];
        let mut seen = HashSet::new();
        for category in &self.vocabularies {
            match self.catalog.tree(category).await {
                Ok(tree) => {
                    terms.extend(tree.into_iter().filter(|term| seen.insert(term.id)));
                }
                Err(GrantErr::NotFound(what)) => {
                    warn!(%category, "skipping configured category: {} not found", what);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(terms)
    }

    #[instrument(skip_all, fields(user = %user))]
    pub async fn build_matrix(&self, user: &UserId) -> Result<MatrixView, GrantErr> {
        let subject = self.users.resolve(user).await?;
        let terms = self.terms().await?;
        let schemes = self.schemes.schemes().await?;
        let granted = self.store.list_grants(user).await?;

        let matrix: GrantMatrix = schemes
            .iter()
            .map(|scheme| {
                let cells = terms
                    .iter()
                    .map(|term| (term.id, granted.contains(&(scheme.id.clone(), term.id))))
                    .collect();
                (scheme.id.clone(), cells)
            })
            .collect();

        Ok(MatrixView {
            user: subject,
            schemes,
            terms,
            matrix,
        })
    }

    /// Apply the desired state of every cell `submission` names. Cells it does not name are
    /// left as they are; cells naming a scheme or term that no longer exists are skipped (or,
    /// with `strict_submissions`, reject the whole submission before anything is written).
    #[instrument(skip_all, fields(user = %user, cells = submission.len()))]
    pub async fn apply_matrix(
        &self,
        user: &UserId,
        submission: &Submission,
    ) -> Result<ApplyReport, GrantErr> {
        self.users.resolve(user).await?;
        let schemes: HashSet<SchemeId> = self
            .schemes
            .schemes()
            .await?
            .into_iter()
            .map(|scheme: Scheme| scheme.id)
            .collect();
        let terms: HashSet<TermId> = self.terms().await?.into_iter().map(|t| t.id).collect();

        let mut report = ApplyReport::default();
        let mut changes = vec![];
        for change in submission.changes() {
            if !schemes.contains(change.scheme()) || !terms.contains(&change.term()) {
                report.ignored.push(change.key());
                continue;
            }
            match change {
                GrantChange::Grant(..) => report.granted += 1,
                GrantChange::Revoke(..) => report.revoked += 1,
            }
            changes.push(change);
        }

        if !report.ignored.is_empty() {
            if self.strict_submissions {
                return Err(GrantErr::InvalidSubmission {
                    unknown: report.ignored,
                });
            }
            warn!(
                ignored = report.ignored.len(),
                "submission names schemes or terms that no longer exist: {:?}", report.ignored
            );
        }

        self.store.apply(user, &changes).await?;
        info!(
            granted = report.granted,
            revoked = report.revoked,
            "applied grant matrix"
        );
        Ok(report)
    }

    pub async fn list_grants(&self, user: &UserId) -> Result<BTreeSet<GrantKey>, GrantErr> {
        self.store.list_grants(user).await
    }

    /// Remove every grant of `user`. The user does not have to resolve, so grants of deleted
    /// accounts can still be cleaned up.
    #[instrument(skip_all, fields(user = %user))]
    pub async fn purge(&self, user: &UserId) -> Result<usize, GrantErr> {
        let removed = self.store.revoke_all(user).await?;
        info!(removed, "purged grants");
        Ok(removed)
    }

    /// one category's terms as select options, see [`term_options`]
    pub async fn term_options(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<(Option<TermId>, String)>, GrantErr> {
        Ok(term_options(&self.catalog.tree(category).await?))
    }
}

#[cfg(test)]
pub mod test {
    use crate::catalog::{CategoryDef, MemoryCatalog, TermNode};
    use crate::config::AccessConfig;
    use crate::controller::GrantMatrixController;
    use crate::err::GrantErr;
    use crate::matrix::Submission;
    use crate::scheme::MemorySchemeRegistry;
    use crate::store::mem::MemoryGrantStore;
    use crate::types::{CategoryId, Scheme, SchemeId, TermId, User, UserId};
    use crate::user::MemoryUserDirectory;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    pub fn controller(config: AccessConfig) -> GrantMatrixController {
        let catalog = MemoryCatalog::from_defs(&vec![CategoryDef::new(
            "colors",
            "Colors",
            vec![TermNode::leaf(10, "Red"), TermNode::leaf(11, "Blue")],
        )]);
        let schemes = MemorySchemeRegistry::new(vec![
            Scheme::new(SchemeId::from("view"), "View"),
            Scheme::new(SchemeId::from("edit"), "Edit"),
        ]);
        let users = MemoryUserDirectory::new(vec![User {
            id: UserId(42),
            name: "alice".to_string(),
        }]);
        GrantMatrixController::new(
            Arc::new(catalog),
            Arc::new(schemes),
            Arc::new(users),
            Arc::new(MemoryGrantStore::new()),
            &config,
        )
    }

    fn config() -> AccessConfig {
        AccessConfig {
            vocabularies: vec![CategoryId::from("colors")],
            ..Default::default()
        }
    }

    #[tokio::test]
    pub async fn test_red_blue_scenario() -> Result<(), GrantErr> {
        let controller = controller(config());
        let user = UserId(42);

        let view = controller.build_matrix(&user).await?;
        assert_eq!(view.matrix.len(), 2);
        for terms in view.matrix.values() {
            assert_eq!(terms.len(), 2);
            assert!(terms.values().all(|granted| !granted));
        }

        let submission = Submission::new()
            .with("view", 10, true)
            .with("view", 11, false)
            .with("edit", 10, false)
            .with("edit", 11, true);
        let report = controller.apply_matrix(&user, &submission).await?;
        assert_eq!(report.granted, 2);
        assert_eq!(report.revoked, 2);
        assert!(report.ignored.is_empty());

        assert_eq!(
            controller.list_grants(&user).await?,
            BTreeSet::from([
                (SchemeId::from("view"), TermId(10)),
                (SchemeId::from("edit"), TermId(11))
            ])
        );
        Ok(())
    }

    #[tokio::test]
    pub async fn test_strict_rejects_before_writing() -> Result<(), GrantErr> {
        let controller = controller(AccessConfig {
            strict_submissions: true,
            ..config()
        });
        let user = UserId(42);
        let submission = Submission::new()
            .with("view", 10, true)
            .with("delete", 10, true);
        match controller.apply_matrix(&user, &submission).await {
            Err(GrantErr::InvalidSubmission { unknown }) => {
                assert_eq!(unknown, vec![(SchemeId::from("delete"), TermId(10))]);
            }
            other => panic!("expected InvalidSubmission, got {:?}", other),
        }
        assert!(controller.list_grants(&user).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    pub async fn test_term_options() -> Result<(), GrantErr> {
        let controller = controller(config());
        let options = controller
            .term_options(&CategoryId::from("colors"))
            .await?;
        assert_eq!(options.len(), 3);
        assert!(matches!(
            controller.term_options(&CategoryId::from("sizes")).await,
            Err(GrantErr::NotFound(_))
        ));
        Ok(())
    }
}
