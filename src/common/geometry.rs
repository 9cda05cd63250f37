//! Planar geometry primitives: distance and segment intersection.

use crate::common::types::{Point2D, Segment};

/// Euclidean distance between two points.
///
/// The squared norm is clamped at zero before the square root so that
/// near-coincident points can never produce NaN.
pub fn distance(p1: &Point2D, p2: &Point2D) -> f64 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx * dx + dy * dy).max(0.0).sqrt()
}

/// Turn direction of the triple (a, b, c).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Sign of the cross product (b - a) x (c - a)
pub fn orientation(a: &Point2D, b: &Point2D, c: &Point2D) -> Orientation {
    let cross = (b.to_vector() - a.to_vector()).perp(&(c.to_vector() - a.to_vector()));
    if cross > 0.0 {
        Orientation::CounterClockwise
    } else if cross < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Whether `q` lies inside the bounding box of `p`-`r`. Only meaningful for
/// collinear triples.
fn on_segment(p: &Point2D, q: &Point2D, r: &Point2D) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Segment intersection test.
///
/// Touching counts as intersecting: an edge that ends on a barrier, or
/// grazes one of its endpoints, collides. Collinear overlaps are collisions
/// as well.
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    let (p1, q1) = (&a.start, &a.end);
    let (p2, q2) = (&b.start, &b.end);

    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    // Proper crossing
    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (o2 == Orientation::Collinear && on_segment(p1, q2, q1))
        || (o3 == Orientation::Collinear && on_segment(p2, p1, q2))
        || (o4 == Orientation::Collinear && on_segment(p2, q1, q2))
}

/// Whether `p` lies on the closed segment `s`
pub fn point_on_segment(p: &Point2D, s: &Segment) -> bool {
    orientation(&s.start, &s.end, p) == Orientation::Collinear && on_segment(&s.start, p, &s.end)
}
