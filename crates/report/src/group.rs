//! Report ordering of findings

use indexmap::IndexMap;
use rts_core::Finding;
use rts_verifier::Outcome;

#[derive(Default)]
struct TreeGroup<'a> {
    tree_level: Vec<&'a Finding>,
    pages: IndexMap<&'a str, Vec<&'a Finding>>,
}

impl<'a> TreeGroup<'a> {
    fn push(&mut self, finding: &'a Finding) {
        match finding.page.as_deref() {
            None => self.tree_level.push(finding),
            Some(page) => self.pages.entry(page).or_default().push(finding),
        }
    }

    fn into_findings(self) -> impl Iterator<Item = &'a Finding> {
        self.tree_level
            .into_iter()
            .chain(self.pages.into_values().flatten())
    }
}

/// Findings in report order.
///
/// Findings without a tree come first. Trees follow in first-opened order,
/// then trees only named by findings. Inside a tree, tree-level findings
/// precede page groups, pages in first-mention order. Each group keeps
/// emission order.
pub fn order_findings(outcome: &Outcome) -> Vec<&Finding> {
    let mut detached = Vec::new();
    let mut trees: IndexMap<&str, TreeGroup<'_>> = outcome
        .state
        .trees
        .keys()
        .map(|file| (file.as_str(), TreeGroup::default()))
        .collect();

    for finding in &outcome.findings {
        match finding.tree.as_deref() {
            None => detached.push(finding),
            Some(tree) => trees.entry(tree).or_default().push(finding),
        }
    }

    detached
        .into_iter()
        .chain(trees.into_values().flat_map(TreeGroup::into_findings))
        .collect()
}
