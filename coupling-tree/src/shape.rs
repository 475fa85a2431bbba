use serde::Serialize;

use crate::node::Value;

/// A detached, immutable copy of a tree's structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Shape {
    Empty,
    Node {
        value: Value,
        left: Box<Shape>,
        right: Box<Shape>,
    },
}

impl Shape {
    pub fn leaf(value: Value) -> Shape {
        Shape::node(value, Shape::Empty, Shape::Empty)
    }

    pub fn node(value: Value, left: Shape, right: Shape) -> Shape {
        Shape::Node {
            value,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Shape::Empty)
    }

    pub fn value(&self) -> Option<Value> {
        match self {
            Shape::Empty => None,
            Shape::Node { value, .. } => Some(*value),
        }
    }

    pub fn left(&self) -> Option<&Shape> {
        match self {
            Shape::Empty => None,
            Shape::Node { left, .. } => Some(left),
        }
    }

    pub fn right(&self) -> Option<&Shape> {
        match self {
            Shape::Empty => None,
            Shape::Node { right, .. } => Some(right),
        }
    }

    /// Empty is 0, a leaf is 1.
    pub fn height(&self) -> usize {
        match self {
            Shape::Empty => 0,
            Shape::Node { left, right, .. } => 1 + left.height().max(right.height()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Shape::Empty => 0,
            Shape::Node { left, right, .. } => 1 + left.len() + right.len(),
        }
    }

    /// In-order values; sorted and duplicate-free exactly when this is a search tree.
    pub fn values(&self) -> Vec<Value> {
        let mut values = Vec::with_capacity(self.len());
        self.collect_values(&mut values);
        values
    }

    fn collect_values(&self, values: &mut Vec<Value>) {
        if let Shape::Node { value, left, right } = self {
            left.collect_values(values);
            values.push(*value);
            right.collect_values(values);
        }
    }

    pub fn is_search_tree(&self) -> bool {
        self.values().windows(2).all(|pair| pair[0] < pair[1])
    }

    /// Every node's subtrees differ in height by at most one.
    pub fn is_balanced(&self) -> bool {
        self.checked_height().is_some()
    }

    fn checked_height(&self) -> Option<usize> {
        match self {
            Shape::Empty => Some(0),
            Shape::Node { left, right, .. } => {
                let l = left.checked_height()?;
                let r = right.checked_height()?;
                (l.abs_diff(r) <= 1).then_some(1 + l.max(r))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_and_values() {
        let shape = Shape::node(
            2,
            Shape::leaf(1),
            Shape::node(4, Shape::leaf(3), Shape::Empty),
        );
        assert_eq!(shape.height(), 3);
        assert_eq!(shape.len(), 4);
        assert_eq!(shape.values(), vec![1, 2, 3, 4]);
        assert!(shape.is_search_tree());
        assert!(shape.is_balanced());
        assert_eq!(Shape::Empty.height(), 0);
        assert_eq!(Shape::leaf(9).height(), 1);
    }

    #[test]
    fn test_detects_order_violation() {
        let shape = Shape::node(5, Shape::leaf(7), Shape::leaf(9));
        assert!(!shape.is_search_tree());
        let duplicate = Shape::node(5, Shape::leaf(5), Shape::Empty);
        assert!(!duplicate.is_search_tree());
    }

    #[test]
    fn test_detects_imbalance_below_the_root() {
        // root looks fine (2 vs 2 would be), but 1's right chain is two deep
        let shape = Shape::node(
            10,
            Shape::node(1, Shape::Empty, Shape::node(2, Shape::Empty, Shape::leaf(3))),
            Shape::node(20, Shape::leaf(15), Shape::node(25, Shape::Empty, Shape::leaf(30))),
        );
        assert_eq!(shape.left().unwrap().height(), 3);
        assert_eq!(shape.right().unwrap().height(), 3);
        assert!(!shape.is_balanced());
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_string(&Shape::leaf(1)).unwrap();
        assert_eq!(
            json,
            r#"{"Node":{"value":1,"left":"Empty","right":"Empty"}}"#
        );
    }
}
