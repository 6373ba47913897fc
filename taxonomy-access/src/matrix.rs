use crate::err::GrantErr;
use crate::types::{GrantChange, GrantKey, Scheme, SchemeId, Term, TermId, User};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// scheme -> term -> granted
pub type GrantMatrix = BTreeMap<SchemeId, BTreeMap<TermId, bool>>;

/// everything needed to render one user's grants: a column per scheme, a row per term
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatrixView {
    pub user: User,
    pub schemes: Vec<Scheme>,
    /// every configured category's terms, categories in configured order, each depth first
    pub terms: Vec<Term>,
    pub matrix: GrantMatrix,
}

impl MatrixView {
    pub fn is_granted(&self, scheme: &SchemeId, term: &TermId) -> bool {
        self.matrix
            .get(scheme)
            .and_then(|terms| terms.get(term))
            .copied()
            .unwrap_or_default()
    }

    /// true if the cell is part of the view, granted or not
    pub fn contains(&self, scheme: &SchemeId, term: &TermId) -> bool {
        self.matrix
            .get(scheme)
            .map(|terms| terms.contains_key(term))
            .unwrap_or_default()
    }

    pub fn granted(&self) -> BTreeSet<GrantKey> {
        self.matrix
            .iter()
            .flat_map(|(scheme, terms)| {
                terms
                    .iter()
                    .filter(|(_, granted)| **granted)
                    .map(move |(term, _)| (scheme.clone(), *term))
            })
            .collect()
    }

    /// rows in display order, each with one flag per scheme in `schemes` order
    pub fn rows(&self) -> Vec<(&Term, Vec<bool>)> {
        self.terms
            .iter()
            .map(|term| {
                let flags = self
                    .schemes
                    .iter()
                    .map(|scheme| self.is_granted(&scheme.id, &term.id))
                    .collect();
                (term, flags)
            })
            .collect()
    }

    /// plain text table: indented term names and an `x` under every granted scheme
    pub fn to_table(&self) -> String {
        let width = self
            .terms
            .iter()
            .map(|term| term.indented_name().len())
            .chain(std::iter::once("Term".len()))
            .max()
            .unwrap_or_default();

        let mut table = format!(
            "{:<width$}  {}\n",
            "Term",
            self.schemes.iter().map(|s| s.label.as_str()).join("  "),
            width = width
        );
        for (term, flags) in self.rows() {
            let cells = self
                .schemes
                .iter()
                .zip(flags)
                .map(|(scheme, granted)| {
                    let mark = if granted { "x" } else { "." };
                    format!("{:<w$}", mark, w = scheme.label.len())
                })
                .join("  ");
            table.push_str(
                format!("{:<width$}  {}\n", term.indented_name(), cells, width = width).as_str(),
            );
        }
        table
    }
}

/// desired state for a set of cells. cells that are not named are left alone when applied.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    cells: GrantMatrix,
}

impl Submission {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_matrix(cells: GrantMatrix) -> Self {
        Self { cells }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, GrantErr> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// a submission covering every cell of `view`: the `checked` cells granted, all others revoked
    pub fn from_checked(view: &MatrixView, checked: &BTreeSet<GrantKey>) -> Self {
        let cells = view
            .matrix
            .iter()
            .map(|(scheme, terms)| {
                let terms = terms
                    .keys()
                    .map(|term| (*term, checked.contains(&(scheme.clone(), *term))))
                    .collect();
                (scheme.clone(), terms)
            })
            .collect();
        Self { cells }
    }

    pub fn set(&mut self, scheme: SchemeId, term: TermId, granted: bool) {
        self.cells.entry(scheme).or_default().insert(term, granted);
    }

    pub fn with(mut self, scheme: &str, term: i64, granted: bool) -> Self {
        self.set(SchemeId::from(scheme), TermId(term), granted);
        self
    }

    pub fn get(&self, scheme: &SchemeId, term: &TermId) -> Option<bool> {
        self.cells
            .get(scheme)
            .and_then(|terms| terms.get(term))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(|terms| terms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn changes(&self) -> impl Iterator<Item = GrantChange> + '_ {
        self.cells.iter().flat_map(|(scheme, terms)| {
            terms
                .iter()
                .map(move |(term, granted)| GrantChange::new(scheme.clone(), *term, *granted))
        })
    }
}

#[cfg(test)]
pub mod test {
    use crate::matrix::{GrantMatrix, MatrixView, Submission};
    use crate::types::{CategoryId, Scheme, SchemeId, Term, TermId, User, UserId};
    use std::collections::BTreeSet;

    pub fn view() -> MatrixView {
        let colors = CategoryId::from("colors");
        let schemes = vec![
            Scheme::new(SchemeId::from("view"), "View"),
            Scheme::new(SchemeId::from("edit"), "Edit"),
        ];
        let terms = vec![
            Term::new(TermId(11), "Blue", 0, colors.clone()),
            Term::new(TermId(12), "Navy", 1, colors.clone()),
            Term::new(TermId(10), "Red", 0, colors),
        ];
        let mut matrix = GrantMatrix::new();
        for scheme in &schemes {
            for term in &terms {
                let granted = scheme.id.as_str() == "edit" && term.id == TermId(12);
                matrix
                    .entry(scheme.id.clone())
                    .or_default()
                    .insert(term.id, granted);
            }
        }
        MatrixView {
            user: User {
                id: UserId(42),
                name: "alice".to_string(),
            },
            schemes,
            terms,
            matrix,
        }
    }

    #[test]
    pub fn test_rows_follow_term_and_scheme_order() {
        let view = view();
        let rows: Vec<(i64, Vec<bool>)> = view
            .rows()
            .into_iter()
            .map(|(term, flags)| (term.id.0, flags))
            .collect();
        assert_eq!(
            rows,
            vec![
                (11, vec![false, false]),
                (12, vec![false, true]),
                (10, vec![false, false])
            ]
        );
        assert_eq!(
            view.granted(),
            BTreeSet::from([(SchemeId::from("edit"), TermId(12))])
        );
        assert!(view.contains(&SchemeId::from("view"), &TermId(10)));
        assert!(!view.contains(&SchemeId::from("view"), &TermId(99)));
    }

    #[test]
    pub fn test_table() {
        let table = view().to_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Term   View  Edit");
        assert_eq!(lines[2], "-Navy  .     x   ");
    }

    #[test]
    pub fn test_from_checked_covers_every_cell() {
        let view = view();
        let checked = BTreeSet::from([(SchemeId::from("view"), TermId(10))]);
        let submission = Submission::from_checked(&view, &checked);
        assert_eq!(submission.len(), 6);
        assert_eq!(
            submission.get(&SchemeId::from("view"), &TermId(10)),
            Some(true)
        );
        assert_eq!(
            submission.get(&SchemeId::from("edit"), &TermId(12)),
            Some(false)
        );
        assert_eq!(submission.changes().filter(|c| c.is_grant()).count(), 1);
    }

    #[test]
    pub fn test_yaml_submission() {
        let submission = Submission::from_yaml("view: {10: true, 11: false}\nedit: {11: true}\n")
            .unwrap();
        assert_eq!(
            submission,
            Submission::new()
                .with("view", 10, true)
                .with("view", 11, false)
                .with("edit", 11, true)
        );
        assert!(Submission::new().is_empty());
    }
}
