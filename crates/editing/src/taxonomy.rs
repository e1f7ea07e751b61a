//! Taxonomic survivor computation
//!
//! Given a set of concepts to retire, decide which of their descendants must
//! retire with them and which survive because an alternate ancestor path
//! keeps them reachable from the live root. Pure, side-effect-free, and
//! restartable: everything flows through the [`TaxonomyView`] oracle.

use rustc_hash::FxHashSet;
use termgraph_core::error::Result;
use termgraph_core::traits::TaxonomyView;
use termgraph_core::types::ComponentId;

/// Compute the retirement closure of a focus set.
///
/// A descendant `d` of a retired focus concept survives exactly when it
/// still has an ancestor that is neither an ancestor of any processed focus
/// concept, nor itself slated for removal, nor a survivor ancestor recorded
/// earlier in the walk; that is, some path from the live root to `d` is
/// untouched by this retirement batch.
///
/// Focus ids are processed **left-to-right**: survivor-ancestor knowledge
/// accumulates across focus concepts, so later entries benefit from earlier
/// ones and the result for overlapping focus sets depends on the order the
/// caller supplies. Callers wanting a canonical result should sort the
/// slice first. Within one focus concept, descendants are visited in
/// identifier order, making the whole computation deterministic for a given
/// input sequence.
pub fn collect_self_and_descendants(
    view: &dyn TaxonomyView,
    focus_ids: &[ComponentId],
) -> Result<FxHashSet<ComponentId>> {
    let focus: FxHashSet<&ComponentId> = focus_ids.iter().collect();
    let mut marked: FxHashSet<ComponentId> = FxHashSet::default();
    let mut survivor_ancestors: FxHashSet<ComponentId> = FxHashSet::default();

    for focus_id in focus_ids {
        let mut self_and_descendants = view.descendants_of(focus_id)?;
        self_and_descendants.insert(focus_id.clone());
        let mut self_and_ancestors = view.ancestors_of(focus_id)?;
        self_and_ancestors.insert(focus_id.clone());

        marked.extend(self_and_descendants.iter().cloned());
        survivor_ancestors.extend(
            self_and_ancestors
                .iter()
                .filter(|a| !self_and_descendants.contains(*a))
                .cloned(),
        );

        let mut descendants: Vec<&ComponentId> = self_and_descendants.iter().collect();
        descendants.sort();
        for descendant in descendants {
            if focus.contains(descendant) {
                // Explicit targets are always removed.
                continue;
            }
            let ancestors = view.ancestors_of(descendant)?;
            let reachable_elsewhere = ancestors.iter().any(|a| {
                !self_and_ancestors.contains(a)
                    && !marked.contains(a)
                    && !survivor_ancestors.contains(a)
            });
            if reachable_elsewhere {
                marked.remove(descendant);
            }
        }
    }
    Ok(marked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    /// Fixed taxonomy, child -> parents over active IS-A edges:
    ///
    /// ```text
    ///                SCT
    ///              /  |  \
    ///             x   y   z
    ///             |   |   |
    ///             |   A   |
    ///             |   |   |
    ///             |   B   |
    ///              \ / \ /
    ///        (+x,y,z)C   D
    ///                \  /
    ///                 E
    /// ```
    ///
    /// `C` is a child of `B` and also a direct child of `x`, `y`, and `z`;
    /// `E` descends from both `C` and `D`, so it is reachable from every
    /// other node.
    struct MockTaxonomy {
        parents: FxHashMap<ComponentId, Vec<ComponentId>>,
    }

    impl MockTaxonomy {
        fn fixture() -> Self {
            let mut parents: FxHashMap<ComponentId, Vec<ComponentId>> = FxHashMap::default();
            let mut edge = |child: &str, ps: &[&str]| {
                parents.insert(
                    ComponentId::from(child),
                    ps.iter().map(|p| ComponentId::from(*p)).collect(),
                );
            };
            edge("x", &["SCT"]);
            edge("y", &["SCT"]);
            edge("z", &["SCT"]);
            edge("A", &["y"]);
            edge("B", &["A"]);
            edge("C", &["B", "x", "y", "z"]);
            edge("D", &["B"]);
            edge("E", &["C", "D"]);
            Self { parents }
        }

        fn direct_parents(&self, id: &ComponentId) -> Vec<ComponentId> {
            self.parents.get(id).cloned().unwrap_or_default()
        }

        fn direct_children(&self, id: &ComponentId) -> Vec<ComponentId> {
            self.parents
                .iter()
                .filter(|(_, ps)| ps.contains(id))
                .map(|(child, _)| child.clone())
                .collect()
        }
    }

    impl TaxonomyView for MockTaxonomy {
        fn ancestors_of(&self, id: &ComponentId) -> Result<FxHashSet<ComponentId>> {
            let mut out = FxHashSet::default();
            let mut frontier = self.direct_parents(id);
            while let Some(next) = frontier.pop() {
                if out.insert(next.clone()) {
                    frontier.extend(self.direct_parents(&next));
                }
            }
            Ok(out)
        }

        fn descendants_of(&self, id: &ComponentId) -> Result<FxHashSet<ComponentId>> {
            let mut out = FxHashSet::default();
            let mut frontier = self.direct_children(id);
            while let Some(next) = frontier.pop() {
                if out.insert(next.clone()) {
                    frontier.extend(self.direct_children(&next));
                }
            }
            Ok(out)
        }
    }

    fn run(focus: &[&str]) -> Vec<String> {
        let taxonomy = MockTaxonomy::fixture();
        let focus_ids: Vec<ComponentId> = focus.iter().map(|f| ComponentId::from(*f)).collect();
        let mut result: Vec<String> = collect_self_and_descendants(&taxonomy, &focus_ids)
            .unwrap()
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect();
        result.sort();
        result
    }

    fn expected(ids: &[&str]) -> Vec<String> {
        let mut expected: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        expected.sort();
        expected
    }

    #[test]
    fn test_retiring_the_root_takes_everything() {
        assert_eq!(
            run(&["SCT"]),
            expected(&["SCT", "x", "y", "z", "A", "B", "C", "D", "E"])
        );
    }

    #[test]
    fn test_retiring_y_spares_concepts_reachable_via_x_and_z() {
        assert_eq!(run(&["y"]), expected(&["y", "A", "B", "D"]));
    }

    #[test]
    fn test_retiring_a_spares_c_and_e() {
        assert_eq!(run(&["A"]), expected(&["A", "B", "D"]));
    }

    #[test]
    fn test_retiring_c_spares_e_via_d() {
        assert_eq!(run(&["C"]), expected(&["C"]));
    }

    #[test]
    fn test_retiring_a_and_x_still_spares_c_and_e() {
        assert_eq!(run(&["A", "x"]), expected(&["x", "A", "B", "D"]));
    }

    #[test]
    fn test_retiring_a_x_and_z_takes_c_and_e() {
        assert_eq!(
            run(&["A", "x", "z"]),
            expected(&["x", "z", "A", "B", "C", "D", "E"])
        );
    }

    #[test]
    fn test_retiring_c_and_b_takes_d_and_e() {
        assert_eq!(run(&["C", "B"]), expected(&["B", "C", "D", "E"]));
    }

    #[test]
    fn test_unknown_focus_retires_only_itself() {
        assert_eq!(run(&["unknown"]), expected(&["unknown"]));
    }

    #[test]
    fn test_empty_focus_is_empty() {
        assert!(run(&[]).is_empty());
    }
}
