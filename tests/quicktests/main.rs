use bstmap::{Map, Tree};

use std::collections::{BTreeMap, BTreeSet};

/// Writes a traversal into a `String`.
fn inorder(tree: &Tree<i8>) -> String {
    let mut output = Vec::new();
    tree.traverse_inorder(&mut output).unwrap();
    String::from_utf8(output).unwrap()
}

quickcheck::quickcheck! {
    fn inorder_is_sorted_and_deduplicated(xs: Vec<i8>) -> bool {
        let tree: Tree<_> = xs.iter().copied().collect();
        let expected: String = xs
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|x| format!("{} ", x))
            .collect();

        inorder(&tree) == expected
    }
}

quickcheck::quickcheck! {
    fn size_counts_new_values(xs: Vec<i8>) -> bool {
        let mut tree = Tree::new();
        let mut new_values = 0;
        for x in &xs {
            if tree.insert(*x) {
                new_values += 1;
            }
        }

        tree.len() == new_values && new_values == xs.iter().collect::<BTreeSet<_>>().len()
    }
}

quickcheck::quickcheck! {
    fn changing_a_copy_leaves_the_source_alone(xs: Vec<i8>, extra: Vec<i8>) -> bool {
        let tree: Tree<_> = xs.iter().copied().collect();
        let before = inorder(&tree);

        let mut copy = tree.clone();
        copy.extend(extra);
        for value in copy.iter_mut() {
            *value = value.wrapping_add(1);
        }

        inorder(&tree) == before && tree.check_sorting_invariant()
    }
}

quickcheck::quickcheck! {
    fn assignment_matches_source(xs: Vec<i8>, ys: Vec<i8>) -> bool {
        let source: Tree<_> = xs.iter().copied().collect();
        let mut target: Tree<_> = ys.iter().copied().collect();
        target.clone_from(&source);

        target.iter().eq(source.iter()) && target.len() == source.len()
    }
}

quickcheck::quickcheck! {
    fn min_greater_than_is_next_larger(xs: Vec<i8>, bound: i8) -> bool {
        let tree: Tree<_> = xs.iter().copied().collect();
        let expected = xs.iter().filter(|&&x| x > bound).min();

        tree.min_greater_than(&bound).get() == expected
    }
}

quickcheck::quickcheck! {
    fn map_agrees_with_btreemap(entries: Vec<(i8, u8)>) -> bool {
        let mut map = Map::new();
        let mut expected = BTreeMap::new();
        for (k, v) in &entries {
            map.insert(*k, *v);
            expected.entry(*k).or_insert(*v);
        }

        map.iter().eq(expected.iter()) && map.begin().get() == expected.iter().next()
    }
}
