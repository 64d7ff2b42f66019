//! Control handle, anchor point of the curve together with its tangents
use crate::{EPSILON, Error, Scalar, Staged, Vector3, config::EditConfig};
use std::fmt;

/// Node of a control handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Tangent pointing to the previous segment
    InTangent = 1,
    /// On curve point
    Anchor = 2,
    /// Tangent pointing to the next segment
    OutTangent = 3,
}

impl NodeKind {
    /// Order in which nodes of a single handle are hit-tested, later hits win
    pub const HIT_ORDER: [NodeKind; 3] = [
        NodeKind::InTangent,
        NodeKind::OutTangent,
        NodeKind::Anchor,
    ];
}

/// Positions of the three nodes of a handle
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandleNodes {
    pub in_tangent: Vector3,
    pub anchor: Vector3,
    pub out_tangent: Vector3,
}

impl fmt::Debug for HandleNodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {:?} {:?}",
            self.in_tangent, self.anchor, self.out_tangent
        )
    }
}

impl HandleNodes {
    pub fn new(
        in_tangent: impl Into<Vector3>,
        anchor: impl Into<Vector3>,
        out_tangent: impl Into<Vector3>,
    ) -> Self {
        Self {
            in_tangent: in_tangent.into(),
            anchor: anchor.into(),
            out_tangent: out_tangent.into(),
        }
    }

    /// Position of the node of the given kind
    pub fn get(&self, node: NodeKind) -> Vector3 {
        match node {
            NodeKind::InTangent => self.in_tangent,
            NodeKind::Anchor => self.anchor,
            NodeKind::OutTangent => self.out_tangent,
        }
    }

    /// Mutable reference to the node of the given kind
    pub fn get_mut(&mut self, node: NodeKind) -> &mut Vector3 {
        match node {
            NodeKind::InTangent => &mut self.in_tangent,
            NodeKind::Anchor => &mut self.anchor,
            NodeKind::OutTangent => &mut self.out_tangent,
        }
    }

    /// Apply function to every node
    pub fn map(self, mut f: impl FnMut(Vector3) -> Vector3) -> Self {
        Self {
            in_tangent: f(self.in_tangent),
            anchor: f(self.anchor),
            out_tangent: f(self.out_tangent),
        }
    }

    /// Nodes in the `in_tangent`, `anchor`, `out_tangent` order
    pub fn points(&self) -> [Vector3; 3] {
        [self.in_tangent, self.anchor, self.out_tangent]
    }

    /// Distance from the anchor to the in-tangent
    pub fn in_length(&self) -> Scalar {
        self.in_tangent.dist(self.anchor)
    }

    /// Distance from the anchor to the out-tangent
    pub fn out_length(&self) -> Scalar {
        self.out_tangent.dist(self.anchor)
    }
}

/// Curve anchor with two tangents.
///
/// Node positions are kept as a committed/draft pair, edits are applied to the
/// draft and become permanent with [`ControlHandle::update`]. Tangent lengths and
/// kink flags describe the committed state, they are what tangent coupling uses
/// as reference lengths while a drag is in progress.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "ControlHandleData")
)]
pub struct ControlHandle {
    nodes: Staged<HandleNodes>,
    in_length: Scalar,
    out_length: Scalar,
    in_kink: bool,
    out_kink: bool,
    subdivisions: usize,
    tolerance: Scalar,
}

// serialized form of a handle, derived lengths and kink flags are recomputed
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ControlHandleData {
    nodes: Staged<HandleNodes>,
    subdivisions: usize,
    tolerance: Scalar,
}

#[cfg(feature = "serde")]
impl From<ControlHandleData> for ControlHandle {
    fn from(data: ControlHandleData) -> Self {
        let mut handle = Self {
            nodes: data.nodes,
            in_length: 0.0,
            out_length: 0.0,
            in_kink: false,
            out_kink: false,
            subdivisions: data.subdivisions,
            tolerance: data.tolerance,
        };
        handle.measure();
        handle
    }
}

impl ControlHandle {
    /// Create handle from in-tangent, anchor and out-tangent positions
    pub fn new(
        in_tangent: impl Into<Vector3>,
        anchor: impl Into<Vector3>,
        out_tangent: impl Into<Vector3>,
    ) -> Self {
        Self::from_nodes(HandleNodes::new(in_tangent, anchor, out_tangent))
    }

    pub fn from_nodes(nodes: HandleNodes) -> Self {
        let config = EditConfig::default();
        let mut handle = Self {
            nodes: Staged::new(nodes),
            in_length: 0.0,
            out_length: 0.0,
            in_kink: false,
            out_kink: false,
            subdivisions: config.default_subdivisions,
            tolerance: config.tolerance,
        };
        handle.measure();
        handle
    }

    /// Override kink tolerance
    pub fn with_tolerance(mut self, tolerance: Scalar) -> Self {
        self.tolerance = tolerance;
        self.measure();
        self
    }

    /// Override subdivision count
    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    /// Committed node positions
    #[inline]
    pub fn nodes(&self) -> &HandleNodes {
        self.nodes.committed()
    }

    /// Node positions being edited
    #[inline]
    pub fn draft(&self) -> &HandleNodes {
        self.nodes.draft()
    }

    #[inline]
    pub fn draft_mut(&mut self) -> &mut HandleNodes {
        self.nodes.draft_mut()
    }

    /// Whether draft differs from committed positions
    pub fn is_dirty(&self) -> bool {
        self.nodes.is_dirty()
    }

    /// Committed length of the in-tangent
    #[inline]
    pub fn in_length(&self) -> Scalar {
        self.in_length
    }

    /// Committed length of the out-tangent
    #[inline]
    pub fn out_length(&self) -> Scalar {
        self.out_length
    }

    /// In-tangent is shorter than tolerance, the anchor is a sharp corner on this side
    #[inline]
    pub fn in_kink(&self) -> bool {
        self.in_kink
    }

    /// Out-tangent is shorter than tolerance, the anchor is a sharp corner on this side
    #[inline]
    pub fn out_kink(&self) -> bool {
        self.out_kink
    }

    /// Number of points sampled on the segment starting at this handle
    #[inline]
    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }

    pub fn set_subdivisions(&mut self, subdivisions: usize) {
        self.subdivisions = subdivisions;
    }

    #[inline]
    pub fn tolerance(&self) -> Scalar {
        self.tolerance
    }

    fn measure(&mut self) {
        let nodes = self.nodes.committed();
        self.in_length = nodes.in_length();
        self.out_length = nodes.out_length();
        self.in_kink = self.in_length < self.tolerance;
        self.out_kink = self.out_length < self.tolerance;
    }

    /// Commit draft positions and recompute tangent lengths and kink flags
    pub fn update(&mut self) {
        self.nodes.commit();
        self.measure();
    }

    /// Discard draft positions
    pub fn cancel(&mut self) {
        self.nodes.cancel();
    }

    /// Apply the same modification to both committed and draft positions
    pub fn update_both(&mut self, f: impl FnMut(&mut HandleNodes)) {
        self.nodes.update_both(f);
        self.measure();
    }

    /// Move draft in-tangent along its current direction so that it is `length` away
    /// from the anchor
    pub fn normalize_in(&mut self, length: Scalar) -> Result<(), Error> {
        let draft = self.nodes.draft_mut();
        draft.in_tangent = rescale(draft.anchor, draft.in_tangent, length)?;
        Ok(())
    }

    /// Move draft out-tangent along its current direction so that it is `length` away
    /// from the anchor
    pub fn normalize_out(&mut self, length: Scalar) -> Result<(), Error> {
        let draft = self.nodes.draft_mut();
        draft.out_tangent = rescale(draft.anchor, draft.out_tangent, length)?;
        Ok(())
    }

    /// Make tangents colinear through the anchor keeping their committed lengths,
    /// result is committed.
    ///
    /// Direction is taken from the in-tangent to the out-tangent, the out-tangent is
    /// placed on the side of the anchor it currently occupies along X. Vertically
    /// aligned tangents point the out-tangent up if it lies right of the anchor and
    /// down otherwise.
    pub fn smooth(&mut self) {
        let (in_length, out_length) = (self.in_length, self.out_length);
        let draft = self.nodes.draft_mut();
        let HandleNodes {
            in_tangent,
            anchor,
            out_tangent,
        } = *draft;

        let sign = if out_tangent.x() > anchor.x() { 1.0 } else { -1.0 };
        let dx = out_tangent.x() - in_tangent.x();
        let direction = if dx.abs() < EPSILON {
            Vector3::new(0.0, sign, 0.0)
        } else {
            let slope = (out_tangent.y() - in_tangent.y()) / dx;
            let step = Vector3::new(sign, sign * slope, 0.0);
            step.scale(1.0 / step.length())
        };

        draft.out_tangent = anchor + out_length * direction;
        draft.in_tangent = anchor - in_length * direction;
        tracing::debug!(?anchor, in_length, out_length, "handle smoothed");
        self.update();
    }
}

// point on the ray from `origin` through `point` at `length` distance from `origin`
fn rescale(origin: Vector3, point: Vector3, length: Scalar) -> Result<Vector3, Error> {
    let dist = point.dist(origin);
    if dist < EPSILON {
        return Err(Error::DegenerateGeometry {
            reason: "tangent coincides with its anchor",
        });
    }
    Ok(origin + (length / dist) * (point - origin))
}
