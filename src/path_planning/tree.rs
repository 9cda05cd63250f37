//! Tree store for RRT: nodes with parent links, nearest-node lookup and
//! backtracking path extraction.

use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::common::{Path2D, PlanResult, PlanningError, Point2D, Segment};

/// Internal node for RRT tree
#[derive(Debug, Clone)]
pub struct RRTNode {
    pub point: Point2D,
    pub parent: Option<usize>,
}

impl RRTNode {
    pub fn new(point: Point2D, parent: Option<usize>) -> Self {
        RRTNode { point, parent }
    }
}

// Hashable key for exact point lookup
type PointKey = (OrderedFloat<f64>, OrderedFloat<f64>);

fn key(p: &Point2D) -> PointKey {
    (OrderedFloat(p.x), OrderedFloat(p.y))
}

/// Tree rooted at the start point.
///
/// Nodes are stored in insertion order and never removed, so index 0 is
/// always the root and every parent index is smaller than its child's.
#[derive(Debug, Clone)]
pub struct RRTTree {
    node_list: Vec<RRTNode>,
    index: HashMap<PointKey, usize>,
}

impl RRTTree {
    /// Construct a tree holding only the root
    pub fn new(root: Point2D) -> Self {
        let mut index = HashMap::new();
        index.insert(key(&root), 0);
        RRTTree {
            node_list: vec![RRTNode::new(root, None)],
            index,
        }
    }

    pub fn root(&self) -> Point2D {
        self.node_list[0].point
    }

    pub fn len(&self) -> usize {
        self.node_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_list.is_empty()
    }

    pub fn contains(&self, point: &Point2D) -> bool {
        self.index.contains_key(&key(point))
    }

    pub fn get_tree(&self) -> &[RRTNode] {
        &self.node_list
    }

    /// Parent of `point`, `None` for the root or unknown points
    pub fn parent(&self, point: &Point2D) -> Option<Point2D> {
        self.index
            .get(&key(point))
            .and_then(|&i| self.node_list[i].parent)
            .map(|p| self.node_list[p].point)
    }

    /// Adds `new_node` as a child of `parent`.
    ///
    /// # Errors
    ///
    /// `DuplicateNode` if `new_node` is already present, `UnknownParent` if
    /// `parent` is not.
    pub fn insert(&mut self, new_node: Point2D, parent: &Point2D) -> PlanResult<()> {
        if self.contains(&new_node) {
            return Err(PlanningError::DuplicateNode(new_node));
        }
        let parent_ind = *self
            .index
            .get(&key(parent))
            .ok_or(PlanningError::UnknownParent(*parent))?;

        self.index.insert(key(&new_node), self.node_list.len());
        self.node_list.push(RRTNode::new(new_node, Some(parent_ind)));
        Ok(())
    }

    /// Node closest to `query`; ties go to the earliest inserted node.
    pub fn nearest(&self, query: &Point2D) -> Point2D {
        let mut min_dist = f64::INFINITY;
        let mut min_ind = 0;

        for (i, node) in self.node_list.iter().enumerate() {
            let dist = node.point.distance(query);
            if dist < min_dist {
                min_dist = dist;
                min_ind = i;
            }
        }

        self.node_list[min_ind].point
    }

    /// Every parent-child edge, in child insertion order
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.node_list.iter().filter_map(move |node| {
            node.parent
                .map(|p| Segment::new(self.node_list[p].point, node.point))
        })
    }

    /// Backtracks parent links from `goal` to `root`, returned root first.
    ///
    /// # Errors
    ///
    /// `DisconnectedGoal` if `goal` is missing, or `root` is not reached
    /// within as many steps as the tree has nodes.
    pub fn extract_path(&self, root: &Point2D, goal: &Point2D) -> PlanResult<Path2D> {
        let disconnected = || PlanningError::DisconnectedGoal {
            root: *root,
            goal: *goal,
        };

        let mut cur_ind = *self.index.get(&key(goal)).ok_or_else(disconnected)?;
        let mut points = vec![self.node_list[cur_ind].point];

        for _ in 0..self.node_list.len() {
            if self.node_list[cur_ind].point == *root {
                points.reverse();
                return Ok(Path2D::from_points(points));
            }
            cur_ind = self.node_list[cur_ind].parent.ok_or_else(disconnected)?;
            points.push(self.node_list[cur_ind].point);
        }

        Err(disconnected())
    }
}
