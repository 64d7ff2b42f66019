//! Pointer driven editing of bezier curves
//!
//! Every pointer event rescans all handles, cost is linear in the number of handles.
use crate::{BezierCurve, ControlHandle, NodeKind, Point, Scalar, Vector3};

/// Size of the drawing area in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: Scalar,
    pub height: Scalar,
}

impl Viewport {
    pub fn new(width: Scalar, height: Scalar) -> Self {
        Self { width, height }
    }

    /// Smaller of the two sides, unit of most relative sizes
    pub fn min_side(&self) -> Scalar {
        self.width.min(self.height)
    }
}

/// Pointer position and drag state in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    position: Point,
    drag_origin: Option<Point>,
}

impl Pointer {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            drag_origin: None,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Position at which current drag has started
    pub fn drag_origin(&self) -> Option<Point> {
        self.drag_origin
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Start dragging from the current position
    pub fn press(&mut self) {
        self.drag_origin = Some(self.position);
    }

    pub fn release(&mut self) {
        self.drag_origin = None;
    }

    pub fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    /// Offset from the drag origin, `None` if not dragging
    pub fn drag_delta(&self) -> Option<Point> {
        Some(self.position - self.drag_origin?)
    }
}

/// Editing mode, controls how tangents of a handle affect each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Tangents move independently
    Free,
    /// Opposite tangent moves proportionally staying colinear
    #[default]
    Aligned,
    /// Opposite tangent stays colinear and keeps its length
    Mirrored,
    /// Pressing on an anchor makes its tangents colinear
    Smooth,
}

impl EditMode {
    /// Whether dragging a tangent also moves the opposite one
    pub fn couples_tangents(self) -> bool {
        matches!(self, EditMode::Aligned | EditMode::Mirrored)
    }
}

/// Everything an editing call needs to know about its environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditContext {
    pub viewport: Viewport,
    pub mode: EditMode,
    pub pointer: Pointer,
}

impl EditContext {
    pub fn new(viewport: Viewport, mode: EditMode) -> Self {
        Self {
            viewport,
            mode,
            pointer: Pointer::default(),
        }
    }
}

/// Node under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hover {
    pub index: usize,
    pub node: NodeKind,
}

/// State of the interaction with a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Hover(Hover),
    /// Dragging a node, or panning if `None`
    Dragging(Option<Hover>),
}

impl BezierCurve {
    /// Current interaction state
    pub fn state(&self, ctx: &EditContext) -> InteractionState {
        match (ctx.pointer.is_dragging(), self.hover) {
            (true, hover) => InteractionState::Dragging(hover),
            (false, Some(hover)) => InteractionState::Hover(hover),
            (false, None) => InteractionState::Idle,
        }
    }

    /// Handle pointer movement, updates hover if not dragging, otherwise drags
    /// hovered node or pans the curve
    pub fn pointer_move(&mut self, ctx: &EditContext) {
        match ctx.pointer.drag_delta() {
            None => self.update_hover(ctx),
            Some(delta) => self.drag(ctx, delta),
        }
    }

    /// Handle pointer press, expects `ctx.pointer` to be already pressed
    pub fn pointer_down(&mut self, ctx: &EditContext) {
        if ctx.mode != EditMode::Smooth {
            return;
        }
        if let Some(Hover {
            index,
            node: NodeKind::Anchor,
        }) = self.hover
        {
            if let Some(handle) = self.control.get_mut(index) {
                handle.smooth();
            }
        }
    }

    /// Handle pointer release, commits dragged handle or panned origin
    pub fn pointer_up(&mut self, ctx: &EditContext) {
        match self.hover {
            Some(Hover { index, node }) => {
                if let Some(handle) = self.control.get_mut(index) {
                    handle.update();
                    tracing::debug!(index, ?node, nodes = ?handle.nodes(), "handle committed");
                }
            }
            None => {
                self.origin.commit();
                tracing::debug!(origin = ?self.origin.committed(), "pan committed");
            }
        }
        self.update_hover(ctx);
    }

    /// Discard all uncommitted edits
    pub fn cancel(&mut self) {
        for handle in self.control.iter_mut() {
            handle.cancel();
        }
        self.origin.cancel();
    }

    fn update_hover(&mut self, ctx: &EditContext) {
        let radius = self.tolerance * ctx.viewport.min_side();
        let position = ctx.pointer.position();
        let mut hover = None;
        for (index, handle) in self.control.iter().enumerate() {
            for node in NodeKind::HIT_ORDER {
                let screen = self.map(handle.nodes().get(node), ctx.viewport);
                if screen.dist(position) < radius {
                    hover = Some(Hover { index, node });
                }
            }
        }
        if hover != self.hover {
            tracing::trace!(?hover, "hover changed");
        }
        self.hover = hover;
    }

    fn drag(&mut self, ctx: &EditContext, delta: Point) {
        let Some(Hover { index, node }) = self.hover else {
            if self.allow.pan {
                let Viewport { width, height } = ctx.viewport;
                let pan = Vector3::new(delta.x() / width, delta.y() / height, 0.0);
                *self.origin.draft_mut() = *self.origin.committed() + pan;
            }
            return;
        };
        if !self.allow.edit {
            return;
        }

        let unit = ctx.viewport.min_side() * self.scale;
        let offset = Vector3::new(delta.x() / unit, delta.y() / unit, 0.0);
        let is_end = index == 0 || index + 1 == self.control.len();
        let constrained = self.constrained_ends && is_end;
        let Some(handle) = self.control.get_mut(index) else {
            return;
        };
        match node {
            NodeKind::Anchor => {
                let offset = if constrained {
                    Vector3::new(0.0, offset.y(), 0.0)
                } else {
                    offset
                };
                let committed = *handle.nodes();
                *handle.draft_mut() = committed.map(|point| point + offset);
            }
            NodeKind::InTangent | NodeKind::OutTangent => {
                drag_tangent(handle, node, offset, ctx.mode);
            }
        }
    }
}

// move tangent by offset from its committed position, opposite tangent follows
// if the mode couples tangents and neither of them is kinked
fn drag_tangent(handle: &mut ControlHandle, node: NodeKind, offset: Vector3, mode: EditMode) {
    let (opposite, dragged_length, opposite_length) = match node {
        NodeKind::InTangent => (NodeKind::OutTangent, handle.in_length(), handle.out_length()),
        _ => (NodeKind::InTangent, handle.out_length(), handle.in_length()),
    };
    let coupled = mode.couples_tangents()
        && !handle.in_kink()
        && !handle.out_kink()
        && dragged_length > 0.0;
    let committed = *handle.nodes();

    let draft = handle.draft_mut();
    *draft.get_mut(node) = committed.get(node) + offset;
    if !coupled {
        return;
    }
    let ratio = opposite_length / dragged_length;
    *draft.get_mut(opposite) = committed.get(opposite) - ratio * offset;

    if mode == EditMode::Mirrored {
        let result = match opposite {
            NodeKind::InTangent => handle.normalize_in(opposite_length),
            _ => handle.normalize_out(opposite_length),
        };
        if let Err(error) = result {
            tracing::warn!(%error, "skipping tangent mirroring for this frame");
        }
    }
}
