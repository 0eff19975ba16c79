//! Breadth-first packed form of a solved pegging tree.
//!
//! Each node carries its child plays and child minimax values inline, so a
//! consumer picks a play by scanning at most four embedded values and only
//! descends when the game actually continues. Nodes whose children are all
//! terminal are flagged as leaves and their children are not emitted at all;
//! the embedded values are everything the position has left to say.

use super::solver::PlayTree;

/// Maximum branching factor: four distinct ranks in a four-card hand.
pub const MAX_CHILDREN: usize = 4;

/// One packed node. `plays` and `values` are padded with zeros beyond
/// `child_count`; `first_child` is meaningless on leaf nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatNode {
    pub child_count: u8,
    pub plays: [u8; MAX_CHILDREN],
    pub first_child: u16,
    pub values: [i8; MAX_CHILDREN],
    pub is_leaf: bool,
}

impl FlatNode {
    /// Embedded minimax values of the live children.
    #[must_use]
    pub fn child_values(&self) -> &[i8] {
        &self.values[..usize::from(self.child_count)]
    }

    /// Position of the child reached by laying `play`, if any.
    #[must_use]
    pub fn child_index(&self, play: u8) -> Option<u16> {
        if self.is_leaf {
            return None;
        }
        self.plays[..usize::from(self.child_count)]
            .iter()
            .position(|&p| p == play)
            .map(|i| {
                #[allow(clippy::cast_possible_truncation)]
                let offset = i as u16;
                self.first_child + offset
            })
    }
}

/// A pegging tree packed breadth-first: children of node `k` occupy the
/// consecutive positions `first_child .. first_child + child_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTree {
    nodes: Vec<FlatNode>,
}

impl FlatTree {
    /// Pack a solved tree.
    ///
    /// # Panics
    ///
    /// Panics if the packed tree outgrows 16-bit indices or a node exceeds
    /// four children; both bound real pegging trees by construction.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_tree(tree: &PlayTree) -> Self {
        let mut order: Vec<u32> = vec![0];
        let mut nodes: Vec<FlatNode> = Vec::new();
        let mut at = 0;

        while at < order.len() {
            let source = tree.node(order[at]);
            let arity = source.children.len();
            assert!(arity <= MAX_CHILDREN, "branching factor {arity} over 4");

            let is_leaf = !source.children.is_empty()
                && source
                    .children
                    .iter()
                    .all(|&c| tree.node(c).children.is_empty());

            let mut plays = [0u8; MAX_CHILDREN];
            let mut values = [0i8; MAX_CHILDREN];
            for (i, (&play, &child)) in source.plays.iter().zip(&source.children).enumerate() {
                plays[i] = play;
                values[i] = tree.node(child).value;
            }

            let first_child = if is_leaf || arity == 0 {
                0
            } else {
                let first = u16::try_from(order.len()).expect("packed tree outgrew u16 indices");
                order.extend(source.children.iter().copied());
                first
            };

            nodes.push(FlatNode {
                child_count: arity as u8,
                plays,
                first_child,
                values,
                is_leaf: is_leaf || arity == 0,
            });
            at += 1;
        }

        Self { nodes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, index: u16) -> &FlatNode {
        &self.nodes[usize::from(index)]
    }

    #[must_use]
    pub fn root(&self) -> &FlatNode {
        &self.nodes[0]
    }

    /// Root minimax value. The pone leads every stored tree and minimizes
    /// the dealer-minus-pone differential, so the root value is the least
    /// embedded child value.
    #[must_use]
    pub fn root_value(&self) -> i8 {
        self.root()
            .child_values()
            .iter()
            .copied()
            .min()
            .expect("a pegging root always has a candidate lay")
    }
}
