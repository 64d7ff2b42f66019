//! Drawing of curves through an external canvas
use crate::{
    BezierCurve, Extrusion, Hover, NodeKind, Point, Scalar, Viewport, config::DisplayConfig,
};

/// Symbolic color of a drawn element, actual colors are up to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ink {
    /// Curve strokes
    Curve,
    /// Tangent lines and tangent nodes
    HandleEnd,
    /// Anchor nodes
    HandleMid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub ink: Ink,
    /// Width in pixels
    pub width: Scalar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub ink: Ink,
}

/// Drawing surface, all coordinates are in pixels
pub trait Canvas {
    /// Stroke a chain of cubic segments, each given by two controls and an end point
    fn stroke_cubics(&mut self, start: Point, cubics: &[[Point; 3]], stroke: Stroke);

    /// Stroke a polyline through all points
    fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke);

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.stroke_polyline(&[from, to], stroke)
    }

    fn fill_circle(&mut self, center: Point, radius: Scalar, fill: Fill);
}

/// Widths used by [`BezierCurve::draw`], relative to the display path width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawWidths {
    pub line: Scalar,
    /// Radius of node circles, nodes are not drawn if zero
    pub control_point: Scalar,
    pub control_handle: Scalar,
}

impl Default for DrawWidths {
    fn default() -> Self {
        Self {
            line: 1.0,
            control_point: 1.0,
            control_handle: 0.5,
        }
    }
}

impl BezierCurve {
    /// Draw the curve together with its handles, hovered node is drawn twice as large
    pub fn draw(
        &self,
        canvas: &mut impl Canvas,
        viewport: Viewport,
        display: &DisplayConfig,
        widths: DrawWidths,
    ) {
        if !self.allow.draw {
            return;
        }
        let px = display.path_width * viewport.min_side();
        let map = |point| self.map(point, viewport);

        let cubics: Vec<[Point; 3]> = (0..self.segment_count())
            .filter_map(|index| self.segment(index))
            .map(|segment| {
                let [_, p1, p2, p3] = segment.points();
                [map(p1), map(p2), map(p3)]
            })
            .collect();
        let start = map(self.control[0].draft().anchor);
        canvas.stroke_cubics(
            start,
            &cubics,
            Stroke {
                ink: Ink::Curve,
                width: widths.line * px,
            },
        );

        if widths.control_point == 0.0 {
            return;
        }
        let radius = widths.control_point * px;
        let line = Stroke {
            ink: Ink::HandleEnd,
            width: widths.control_handle * px,
        };
        let last = self.control.len() - 1;
        for (index, handle) in self.control.iter().enumerate() {
            let nodes = handle.draft();
            let anchor = map(nodes.anchor);
            let circle = |kind: NodeKind, ink: Ink| {
                let hovered = self.hover == Some(Hover { index, node: kind });
                let scale = if hovered { 2.0 } else { 1.0 };
                (map(nodes.get(kind)), scale * radius, Fill { ink })
            };
            if index > 0 || self.closed {
                canvas.stroke_line(anchor, map(nodes.in_tangent), line);
                let (center, radius, fill) = circle(NodeKind::InTangent, Ink::HandleEnd);
                canvas.fill_circle(center, radius, fill);
            }
            if index < last || self.closed {
                canvas.stroke_line(anchor, map(nodes.out_tangent), line);
                let (center, radius, fill) = circle(NodeKind::OutTangent, Ink::HandleEnd);
                canvas.fill_circle(center, radius, fill);
            }
            let (center, radius, fill) = circle(NodeKind::Anchor, Ink::HandleMid);
            canvas.fill_circle(center, radius, fill);
        }
    }

    /// Draw projected outlines of an extrusion, bottom outline with half and ribs
    /// every `rib_stride` points with quarter of the `line` width
    pub fn draw3(
        &self,
        canvas: &mut impl Canvas,
        extrusion: &Extrusion,
        viewport: Viewport,
        display: &DisplayConfig,
        line: Scalar,
        rib_stride: usize,
    ) {
        let px = display.path_width * viewport.min_side();
        let map = |point| self.map(point, viewport);
        let stroke = |width: Scalar| Stroke {
            ink: Ink::Curve,
            width: width * px,
        };

        let top: Vec<Point> = extrusion.top.iter().copied().map(map).collect();
        canvas.stroke_polyline(&top, stroke(line));
        let bottom: Vec<Point> = extrusion.bottom.iter().copied().map(map).collect();
        canvas.stroke_polyline(&bottom, stroke(line / 2.0));
        for (top, bottom) in extrusion.ribs(rib_stride) {
            canvas.stroke_line(map(top), map(bottom), stroke(line / 4.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Allow, Vector3, assert_approx_eq};

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Cubics(Point, Vec<[Point; 3]>, Stroke),
        Polyline(Vec<Point>, Stroke),
        Circle(Point, Scalar, Fill),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Canvas for Recorder {
        fn stroke_cubics(&mut self, start: Point, cubics: &[[Point; 3]], stroke: Stroke) {
            self.ops.push(Op::Cubics(start, cubics.to_vec(), stroke));
        }

        fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke) {
            self.ops.push(Op::Polyline(points.to_vec(), stroke));
        }

        fn fill_circle(&mut self, center: Point, radius: Scalar, fill: Fill) {
            self.ops.push(Op::Circle(center, radius, fill));
        }
    }

    fn circles(ops: &[Op]) -> Vec<(Point, Scalar, Ink)> {
        ops.iter()
            .filter_map(|op| match op {
                Op::Circle(center, radius, fill) => Some((*center, *radius, fill.ink)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_draw_open() {
        let curve = BezierCurve::from_svg("M0,0C1,1,2,1,3,0S5,-1,6,0", None).unwrap();
        let viewport = Viewport::new(200.0, 100.0);
        let mut canvas = Recorder::default();
        curve.draw(
            &mut canvas,
            viewport,
            &DisplayConfig::default(),
            DrawWidths::default(),
        );

        let Op::Cubics(start, cubics, stroke) = &canvas.ops[0] else {
            panic!("curve stroke expected");
        };
        assert_eq!(*start, Point::new(0.0, 0.0));
        assert_eq!(cubics.len(), 2);
        assert_eq!(cubics[1][2], Point::new(600.0, 0.0));
        assert_eq!(stroke.ink, Ink::Curve);
        assert_approx_eq!(stroke.width, 0.5);

        // first handle has no in-tangent, last handle has no out-tangent
        let circles = circles(&canvas.ops);
        assert_eq!(circles.len(), 2 + 3 + 2);
        let lines = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Polyline(..)))
            .count();
        assert_eq!(lines, 4);
        let (center, radius, ink) = circles[1];
        assert_eq!(center, Point::new(0.0, 0.0));
        assert_approx_eq!(radius, 0.5);
        assert_eq!(ink, Ink::HandleMid);
    }

    #[test]
    fn test_draw_hover() {
        let mut curve = BezierCurve::from_svg("M0,0C1,0,2,1,2,2C2,3,-1,1,0,0Z", None).unwrap();
        curve.hover = Some(Hover {
            index: 1,
            node: NodeKind::Anchor,
        });
        let mut canvas = Recorder::default();
        curve.draw(
            &mut canvas,
            Viewport::new(100.0, 100.0),
            &DisplayConfig::default(),
            DrawWidths::default(),
        );
        let circles = circles(&canvas.ops);
        // closed curve draws every node
        assert_eq!(circles.len(), 6);
        let (center, radius, ink) = circles[5];
        assert_eq!(center, Point::new(200.0, 200.0));
        assert_approx_eq!(radius, 1.0);
        assert_eq!(ink, Ink::HandleMid);
        assert_approx_eq!(circles[2].1, 0.5);
    }

    #[test]
    fn test_draw_disabled() {
        let curve = BezierCurve::from_svg("M0,0C1,1,2,1,3,0", None)
            .unwrap()
            .with_allow(Allow {
                draw: false,
                ..Allow::default()
            });
        let mut canvas = Recorder::default();
        curve.draw(
            &mut canvas,
            Viewport::new(100.0, 100.0),
            &DisplayConfig::default(),
            DrawWidths::default(),
        );
        assert!(canvas.ops.is_empty());

        let curve = BezierCurve::from_svg("M0,0C1,1,2,1,3,0", None).unwrap();
        curve.draw(
            &mut canvas,
            Viewport::new(100.0, 100.0),
            &DisplayConfig::default(),
            DrawWidths {
                control_point: 0.0,
                ..DrawWidths::default()
            },
        );
        assert_eq!(canvas.ops.len(), 1);
    }

    #[test]
    fn test_draw3() {
        let curve = BezierCurve::from_svg("M0,0C1,1,2,1,3,0", None).unwrap();
        let extrusion = Extrusion {
            top: (0..12).map(|i| Vector3::new(i as Scalar, 1.0, 0.0)).collect(),
            bottom: (0..12).map(|i| Vector3::new(i as Scalar, 0.0, 0.0)).collect(),
        };
        let mut canvas = Recorder::default();
        curve.draw3(
            &mut canvas,
            &extrusion,
            Viewport::new(200.0, 200.0),
            &DisplayConfig::default(),
            4.0,
            5,
        );
        let widths: Vec<Scalar> = canvas
            .ops
            .iter()
            .map(|op| match op {
                Op::Polyline(_, stroke) => stroke.width,
                _ => panic!("only polylines expected"),
            })
            .collect();
        assert_eq!(widths.len(), 5);
        for (width, expected) in widths.into_iter().zip([4.0, 2.0, 1.0, 1.0, 1.0]) {
            assert_approx_eq!(width, expected);
        }
        let Op::Polyline(rib, _) = &canvas.ops[3] else {
            panic!("rib expected");
        };
        assert_eq!(rib, &vec![Point::new(1000.0, 200.0), Point::new(1000.0, 0.0)]);
    }
}
