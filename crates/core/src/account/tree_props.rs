//! Property tests for the account hierarchy.

use proptest::prelude::*;

use super::tree::AccountTree;
use super::types::AccountNode;
use medfin_shared::types::AccountId;

/// Random forest: node `i` hangs under a random earlier node or is a root.
fn arb_forest() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1usize..30).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    prop_oneof![Just(None), (0..i).prop_map(Some)].boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn materialize(parents: &[Option<usize>]) -> Vec<AccountNode> {
    let mut levels: Vec<i32> = Vec::with_capacity(parents.len());
    let mut out = Vec::with_capacity(parents.len());
    for (i, parent) in parents.iter().enumerate() {
        let level = parent.map_or(1, |p| levels[p] + 1);
        levels.push(level);
        out.push(AccountNode {
            id: AccountId::new(i as i64 + 1),
            code: format!("{}", i + 1),
            parent_id: parent.map(|p| AccountId::new(p as i64 + 1)),
            level,
        });
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every valid forest builds, in any row order, and no account is its own ancestor.
    #[test]
    fn prop_no_account_is_its_own_ancestor(parents in arb_forest()) {
        let mut nodes = materialize(&parents);
        nodes.reverse();
        let tree = AccountTree::build(nodes).unwrap();
        for i in 0..parents.len() {
            let id = AccountId::new(i as i64 + 1);
            let ancestors = tree.ancestors(id).unwrap();
            prop_assert!(!ancestors.contains(&id));
            prop_assert_eq!(ancestors.len() as i32 + 1, tree.get(id).unwrap().level);
        }
    }

    /// Moving any account under one of its own descendants is refused.
    #[test]
    fn prop_reparent_into_subtree_refused(parents in arb_forest(), pick in any::<prop::sample::Index>()) {
        let tree = AccountTree::build(materialize(&parents)).unwrap();
        let id = AccountId::new(pick.index(parents.len()) as i64 + 1);
        for descendant in tree.subtree(id).unwrap() {
            prop_assert!(tree.validate_reparent(id, Some(descendant)).is_err());
        }
    }

    /// Subtrees partition exactly into the top-level accounts' subtrees.
    #[test]
    fn prop_top_level_subtrees_cover_tree(parents in arb_forest()) {
        let tree = AccountTree::build(materialize(&parents)).unwrap();
        let covered: usize = tree
            .top_level()
            .iter()
            .map(|root| tree.subtree(*root).unwrap().len())
            .sum();
        prop_assert_eq!(covered, tree.len());
    }
}
