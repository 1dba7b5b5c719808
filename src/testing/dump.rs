//! Text renderings of the object tree.

use std::fmt::Write;

use slotmap::new_key_type;

use crate::object_tree::ObjectTree;
use crate::tree::Forest;

/// Render every row, depth-first, two spaces of indent per level:
///
/// ```text
/// W1 <GiltWindow> "Main"
///   B <GiltBox>
///     Btn <GiltButton> "OK" .suggested
/// ```
///
/// Insensitive rows are not marked; the sensitive flag follows mapping and
/// would make dumps depend on map order.
pub fn dump_tree(tree: &ObjectTree) -> String {
    let mut out = String::new();
    for (id, row) in tree.iter() {
        let indent = "  ".repeat(tree.depth(id));
        let _ = write!(out, "{indent}{} <{}>", row.name, row.type_name);
        if !row.label.is_empty() {
            let _ = write!(out, " {:?}", row.label);
        }
        for class in row.style_classes.split_whitespace() {
            let _ = write!(out, " .{class}");
        }
        out.push('\n');
    }
    out
}

new_key_type! {
    pub struct ShapeId;
}

/// A bare labelled tree rebuilt from `(parent index, label)` pairs.
#[derive(Debug, Clone, Default)]
pub struct TreeShape {
    nodes: Forest<ShapeId, String>,
}

impl TreeShape {
    /// Rebuild from pairs in depth-first order, as produced by
    /// [`ObjectTree::to_pairs`].
    ///
    /// # Panics
    ///
    /// Panics if a parent index does not precede its child.
    pub fn from_pairs(pairs: &[(Option<usize>, String)]) -> Self {
        let mut nodes = Forest::new();
        let mut ids: Vec<ShapeId> = Vec::with_capacity(pairs.len());
        for (index, (parent, label)) in pairs.iter().enumerate() {
            let id = match parent {
                Some(parent) => {
                    assert!(*parent < index, "parent {parent} does not precede {index}");
                    nodes.insert_child(ids[*parent], label.clone())
                }
                None => nodes.insert_root(label.clone()),
            };
            ids.push(id);
        }
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `(depth, label)` for every node in depth-first pre-order.
    pub fn depth_first(&self) -> Vec<(usize, String)> {
        self.nodes
            .walk_all()
            .into_iter()
            .filter_map(|id| {
                let label = self.nodes.get(id)?;
                Some((self.nodes.depth(id), label.clone()))
            })
            .collect()
    }

    /// Serialize back to pairs.
    pub fn to_pairs(&self) -> Vec<(Option<usize>, String)> {
        let order = self.nodes.walk_all();
        order
            .iter()
            .filter_map(|&id| {
                let label = self.nodes.get(id)?.clone();
                let parent = self
                    .nodes
                    .parent(id)
                    .and_then(|p| order.iter().position(|&o| o == p));
                Some((parent, label))
            })
            .collect()
    }
}

/// `(depth, name)` for every row of `tree` in depth-first pre-order.
pub fn depth_first(tree: &ObjectTree) -> Vec<(usize, String)> {
    tree.iter()
        .map(|(id, row)| (tree.depth(id), row.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Scene;
    use pretty_assertions::assert_eq;

    #[test]
    fn dump_indents_by_depth() {
        let scene = Scene::new();
        let mut tree = ObjectTree::new();
        tree.append_under(None, &scene.window, None);
        insta::assert_snapshot!(dump_tree(&tree), @r#"
        W1 <GiltWindow> "Main"
          frame-clock <GiltFrameClock>
          B <GiltBox>
            L <GiltLabel> "hello"
            Btn <GiltButton> "OK" .suggested
        "#);
    }

    #[test]
    fn shape_round_trip() {
        let pairs = vec![
            (None, "a".to_string()),
            (Some(0), "b".to_string()),
            (Some(1), "c".to_string()),
            (Some(0), "d".to_string()),
            (None, "e".to_string()),
        ];
        let shape = TreeShape::from_pairs(&pairs);
        assert_eq!(shape.to_pairs(), pairs);
        assert_eq!(
            shape.depth_first(),
            vec![
                (0, "a".to_string()),
                (1, "b".to_string()),
                (2, "c".to_string()),
                (1, "d".to_string()),
                (0, "e".to_string()),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "does not precede")]
    fn forward_parent_is_rejected() {
        TreeShape::from_pairs(&[(Some(1), "a".to_string()), (None, "b".to_string())]);
    }
}
