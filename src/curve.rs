//! Piecewise cubic bezier curve built from control handles
use crate::{
    BBox, Camera, ControlHandle, EPSILON, Error, HandleNodes, Hover, Point, Scalar, Staged,
    Transform, Vector3, Viewport, config::EditConfig, svg::parse_path,
};
use std::fmt;

/// Cubic bezier curve in 3D
///
/// Polynimial form:
/// `(1 - t) ^ 3 * p0 + 3 * (1 - t) ^ 2 * t * p1 + 3 * (1 - t) * t ^ 2 * p2 + t ^ 3 * p3`
#[derive(Clone, Copy, PartialEq)]
pub struct Cubic(pub [Vector3; 4]);

impl fmt::Debug for Cubic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Cubic([p0, p1, p2, p3]) = self;
        write!(f, "Cubic {:?} {:?} {:?} {:?}", p0, p1, p2, p3)
    }
}

impl Cubic {
    pub fn new(
        p0: impl Into<Vector3>,
        p1: impl Into<Vector3>,
        p2: impl Into<Vector3>,
        p3: impl Into<Vector3>,
    ) -> Self {
        Self([p0.into(), p1.into(), p2.into(), p3.into()])
    }

    pub fn points(&self) -> [Vector3; 4] {
        self.0
    }

    /// Point at which curve starts
    pub fn start(&self) -> Vector3 {
        self.0[0]
    }

    /// Point at which curve ends
    pub fn end(&self) -> Vector3 {
        self.0[3]
    }

    /// Evaluate curve at parameter value `t` in (0.0..=1.0)
    pub fn at(&self, t: Scalar) -> Vector3 {
        let Self([p0, p1, p2, p3]) = *self;
        let (t1, t_1) = (t, 1.0 - t);
        let (t2, t_2) = (t1 * t1, t_1 * t_1);
        let (t3, t_3) = (t2 * t1, t_2 * t_1);
        t_3 * p0 + 3.0 * t1 * t_2 * p1 + 3.0 * t2 * t_1 * p2 + t3 * p3
    }

    /// Approximate length as a sum of `samples` chords with uniform parameter steps
    pub fn length(&self, samples: usize) -> Scalar {
        let samples = samples.max(1);
        let step = 1.0 / samples as Scalar;
        (0..samples)
            .map(|i| {
                let t = i as Scalar * step;
                self.at(t).dist(self.at(t + step))
            })
            .sum()
    }
}

/// Operations a curve accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allow {
    pub draw: bool,
    pub edit: bool,
    pub pan: bool,
}

impl Default for Allow {
    fn default() -> Self {
        Self {
            draw: true,
            edit: true,
            pan: true,
        }
    }
}

/// Ordered sequence of control handles forming a curve.
///
/// Segment `i` goes from the anchor of handle `i` through its out-tangent and the
/// in-tangent of handle `i + 1` to the anchor of handle `i + 1`. Closed curves have
/// an additional segment wrapping from the last handle to the first one.
/// Coordinates are normalized, [`BezierCurve::map`] converts them to the screen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BezierCurveData")
)]
pub struct BezierCurve {
    pub(crate) control: Vec<ControlHandle>,
    /// Position of the origin relative to the viewport size
    pub(crate) origin: Staged<Vector3>,
    pub(crate) scale: Scalar,
    pub(crate) theta: Option<Scalar>,
    pub(crate) closed: bool,
    pub(crate) constrained_ends: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) hover: Option<Hover>,
    pub(crate) tolerance: Scalar,
    pub(crate) length_samples: usize,
    pub(crate) allow: Allow,
}

// serialized form of a curve, validated through `BezierCurve::new`
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct BezierCurveData {
    control: Vec<ControlHandle>,
    origin: Staged<Vector3>,
    scale: Scalar,
    theta: Option<Scalar>,
    closed: bool,
    constrained_ends: bool,
    tolerance: Scalar,
    #[serde(default = "default_length_samples")]
    length_samples: usize,
    allow: Allow,
}

#[cfg(feature = "serde")]
fn default_length_samples() -> usize {
    EditConfig::default().length_samples
}

#[cfg(feature = "serde")]
impl TryFrom<BezierCurveData> for BezierCurve {
    type Error = Error;

    fn try_from(data: BezierCurveData) -> Result<Self, Self::Error> {
        let BezierCurveData {
            control,
            origin,
            scale,
            theta,
            closed,
            constrained_ends,
            tolerance,
            length_samples,
            allow,
        } = data;
        Ok(Self {
            origin,
            scale,
            theta,
            constrained_ends,
            tolerance,
            length_samples,
            allow,
            ..Self::new(control, closed)?
        })
    }
}

impl BezierCurve {
    /// Create curve from handles
    pub fn new(control: Vec<ControlHandle>, closed: bool) -> Result<Self, Error> {
        if control.is_empty() {
            return Err(Error::DegenerateGeometry {
                reason: "curve has no control handles",
            });
        }
        let config = EditConfig::default();
        Ok(Self {
            control,
            origin: Staged::new(Vector3::ZERO),
            scale: 1.0,
            theta: None,
            closed,
            constrained_ends: false,
            hover: None,
            tolerance: config.tolerance,
            length_samples: config.length_samples,
            allow: Allow::default(),
        })
    }

    /// Create curve from SVG path, optionally rotated by `theta` radians
    pub fn from_svg(path: &str, theta: Option<Scalar>) -> Result<Self, Error> {
        let parsed = parse_path(path, theta)?;
        let mut curve = Self::new(parsed.handles, parsed.closed)?;
        curve.theta = theta;
        Ok(curve)
    }

    /// Set origin position, in fractions of the viewport size
    pub fn with_origin(mut self, origin: impl Into<Point>) -> Self {
        self.origin = Staged::new(Vector3::from(origin.into()));
        self
    }

    /// Set scale relative to the smaller viewport side
    pub fn with_scale(mut self, scale: Scalar) -> Self {
        self.scale = scale;
        self
    }

    /// Forbid horizontal movement of the end anchors
    pub fn with_constrained_ends(mut self, constrained_ends: bool) -> Self {
        self.constrained_ends = constrained_ends;
        self
    }

    /// Set hover radius and kink tolerance of every handle
    pub fn with_tolerance(mut self, tolerance: Scalar) -> Self {
        self.tolerance = tolerance;
        self.control = self
            .control
            .into_iter()
            .map(|handle| handle.with_tolerance(tolerance))
            .collect();
        self
    }

    /// Take tolerance, segment length sampling and handle subdivisions from the
    /// configuration
    pub fn with_config(mut self, config: &EditConfig) -> Self {
        self.length_samples = config.length_samples;
        self.control = self
            .control
            .into_iter()
            .map(|handle| handle.with_subdivisions(config.default_subdivisions))
            .collect();
        self.with_tolerance(config.tolerance)
    }

    pub fn with_allow(mut self, allow: Allow) -> Self {
        self.allow = allow;
        self
    }

    pub fn handles(&self) -> &[ControlHandle] {
        &self.control
    }

    pub fn handle(&self, index: usize) -> Option<&ControlHandle> {
        self.control.get(index)
    }

    pub fn handle_mut(&mut self, index: usize) -> Option<&mut ControlHandle> {
        self.control.get_mut(index)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn constrained_ends(&self) -> bool {
        self.constrained_ends
    }

    /// Committed origin
    pub fn origin(&self) -> Vector3 {
        *self.origin.committed()
    }

    /// Origin including panning in progress
    pub fn draft_origin(&self) -> Vector3 {
        *self.origin.draft()
    }

    pub fn scale(&self) -> Scalar {
        self.scale
    }

    /// Rotation applied when the curve was parsed
    pub fn theta(&self) -> Option<Scalar> {
        self.theta
    }

    pub fn tolerance(&self) -> Scalar {
        self.tolerance
    }

    pub fn allow(&self) -> Allow {
        self.allow
    }

    /// Number of chords used by [`BezierCurve::segment_length`] by default
    pub fn length_samples(&self) -> usize {
        self.length_samples
    }

    /// Currently hovered node
    pub fn hover(&self) -> Option<Hover> {
        self.hover
    }

    /// Number of segments, wrapping segment of a closed curve included
    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.control.len()
        } else {
            self.control.len().saturating_sub(1)
        }
    }

    // index of the handle at which segment `index` ends
    fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.control.len()
    }

    /// Segment starting at handle `index` built from draft coordinates
    pub fn segment(&self, index: usize) -> Option<Cubic> {
        if index >= self.segment_count() {
            return None;
        }
        let start = self.control[index].draft();
        let end = self.control[self.next_index(index)].draft();
        Some(Cubic([
            start.anchor,
            start.out_tangent,
            end.in_tangent,
            end.anchor,
        ]))
    }

    /// Segment starting at handle `index` built from committed coordinates
    pub fn committed_segment(&self, index: usize) -> Option<Cubic> {
        if index >= self.segment_count() {
            return None;
        }
        let start = self.control[index].nodes();
        let end = self.control[self.next_index(index)].nodes();
        Some(Cubic([
            start.anchor,
            start.out_tangent,
            end.in_tangent,
            end.anchor,
        ]))
    }

    /// Evaluate segment `index` at parameter `t`
    pub fn point(&self, index: usize, t: Scalar) -> Option<Vector3> {
        Some(self.segment(index)?.at(t))
    }

    /// Approximate length of segment `index` from `samples` chords, the curve's
    /// [`BezierCurve::length_samples`] if `None`
    pub fn segment_length(&self, index: usize, samples: Option<usize>) -> Option<Scalar> {
        let samples = samples.unwrap_or(self.length_samples);
        Some(self.segment(index)?.length(samples))
    }

    /// Recenter and rescale so that control points span `[-0.5, 0.5]` along X.
    ///
    /// Y is recentered around its midpoint but scaled by the X extent too, so the
    /// proportions of the shape are kept. Result is committed.
    pub fn normalize(&mut self) -> Result<(), Error> {
        let bbox = BBox::from_points(
            self.control
                .iter()
                .flat_map(|handle| handle.draft().points())
                .map(Vector3::xy),
        )
        .ok_or(Error::DegenerateGeometry {
            reason: "curve has no control handles",
        })?;
        let width = bbox.width();
        if width < EPSILON {
            return Err(Error::DegenerateGeometry {
                reason: "curve has zero horizontal extent",
            });
        }
        tracing::debug!(?bbox, "normalize curve");

        let (min_x, mid_y) = (bbox.min().x(), bbox.mid().y());
        for handle in self.control.iter_mut() {
            let draft = handle.draft_mut();
            *draft = draft.map(|node| {
                Vector3::new(
                    (node.x() - min_x) / width - 0.5,
                    (node.y() - mid_y) / width,
                    node.z(),
                )
            });
            handle.update();
        }
        Ok(())
    }

    /// Distribute up to `max_subdivisions` sample points per segment proportionally
    /// to segment length
    pub fn set_subdivisions(&mut self, max_subdivisions: usize) {
        let _span = tracing::debug_span!("set_subdivisions", max_subdivisions).entered();
        let lengths: Vec<Scalar> = (0..self.segment_count())
            .filter_map(|index| self.segment_length(index, None))
            .collect();
        let max_length = lengths.iter().copied().fold(0.0, Scalar::max);
        for (index, length) in lengths.into_iter().enumerate() {
            let subdivisions = if max_length < EPSILON {
                0
            } else {
                (length / max_length * max_subdivisions as Scalar).floor() as usize
            };
            tracing::debug!(index, length, subdivisions, "segment subdivisions");
            self.control[index].set_subdivisions(subdivisions);
        }
    }

    /// Sample every segment with `subdivisions` points, or with the subdivision
    /// count of its starting handle if `None`. At least two points are produced
    /// per segment, both segment ends included.
    pub fn divide(&self, subdivisions: Option<usize>) -> Vec<Vector3> {
        let mut result = Vec::new();
        for index in 0..self.segment_count() {
            let Some(segment) = self.segment(index) else {
                continue;
            };
            let count = subdivisions
                .unwrap_or(self.control[index].subdivisions())
                .max(2);
            let step = (count - 1) as Scalar;
            result.extend((0..count).map(|j| segment.at(j as Scalar / step)));
        }
        result
    }

    /// Independent copy built from committed coordinates displaced by `offset`
    pub fn copy(&self, offset: Vector3) -> Self {
        let control = self
            .control
            .iter()
            .map(|handle| {
                let nodes = handle.nodes().map(|node| node.copy(Some(offset)));
                ControlHandle::from_nodes(nodes)
                    .with_tolerance(handle.tolerance())
                    .with_subdivisions(handle.subdivisions())
            })
            .collect();
        Self {
            control,
            origin: Staged::new(self.origin()),
            hover: None,
            ..self.clone()
        }
    }

    /// Apply affine transformation to every node, committed and draft
    pub fn transform(&mut self, tr: Transform) {
        for handle in self.control.iter_mut() {
            handle.update_both(|nodes| *nodes = nodes.map(|node| tr.apply3(node)));
        }
    }

    /// Curve whose nodes are projections of committed nodes through the camera
    pub fn project_controls(&self, camera: &Camera) -> Result<Self, Error> {
        let control = self
            .control
            .iter()
            .map(|handle| {
                let [p1, p2, p3] = handle.nodes().points();
                Ok(ControlHandle::from_nodes(HandleNodes::new(
                    camera.project(p1)?,
                    camera.project(p2)?,
                    camera.project(p3)?,
                ))
                .with_tolerance(handle.tolerance()))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self {
            control,
            origin: Staged::new(self.draft_origin()),
            hover: None,
            ..self.clone()
        })
    }

    /// Map normalized point to the screen
    pub fn map(&self, point: Vector3, viewport: Viewport) -> Point {
        let origin = self.origin.draft();
        let unit = viewport.min_side() * self.scale;
        Point::new(
            origin.x() * viewport.width + point.x() * unit,
            origin.y() * viewport.height + point.y() * unit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    fn wave() -> BezierCurve {
        BezierCurve::from_svg("M0,0C1,1,2,1,3,0S5,-1,6,0", None).unwrap()
    }

    fn blob() -> BezierCurve {
        BezierCurve::from_svg("M0,0C1,-1,3,-1,4,0C5,1,5,3,4,4C2,5,-1,3,0,0Z", None).unwrap()
    }

    #[test]
    fn test_new() {
        assert!(matches!(
            BezierCurve::new(Vec::new(), false),
            Err(Error::DegenerateGeometry { .. })
        ));
        let curve = wave();
        assert_eq!(curve.handles().len(), 3);
        assert_eq!(curve.segment_count(), 2);
        assert!(!curve.is_closed());
        let curve = blob();
        assert_eq!(curve.handles().len(), 3);
        assert_eq!(curve.segment_count(), 3);
        assert!(curve.is_closed());
    }

    #[test]
    fn test_point_ends() {
        for curve in [wave(), blob()] {
            let count = curve.handles().len();
            for index in 0..curve.segment_count() {
                let next = (index + 1) % count;
                assert_eq!(
                    curve.point(index, 0.0),
                    Some(curve.handles()[index].draft().anchor)
                );
                assert_eq!(
                    curve.point(index, 1.0),
                    Some(curve.handles()[next].draft().anchor)
                );
            }
            assert!(curve.point(curve.segment_count(), 0.5).is_none());
        }
    }

    #[test]
    fn test_point_uses_draft() {
        let mut curve = wave();
        curve.handle_mut(1).unwrap().draft_mut().anchor = Vector3::new(3.0, 2.0, 0.0);
        assert_eq!(curve.point(0, 1.0), Some(Vector3::new(3.0, 2.0, 0.0)));
        assert_eq!(
            curve.committed_segment(0).unwrap().end(),
            Vector3::new(3.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_divide() {
        let curve = blob();
        let points = curve.divide(Some(7));
        assert_eq!(points.len(), 7 * curve.segment_count());
        for index in 0..curve.segment_count() {
            assert_eq!(Some(points[index * 7]), curve.point(index, 0.0));
            assert_eq!(Some(points[index * 7 + 6]), curve.point(index, 1.0));
        }

        // default subdivisions of handles
        assert_eq!(curve.divide(None).len(), 5 * 3);
        // degenerate counts are clamped
        assert_eq!(curve.divide(Some(0)).len(), 2 * 3);
        assert_eq!(curve.divide(Some(1)).len(), 2 * 3);
    }

    #[test]
    fn test_segment_length() {
        let line = BezierCurve::from_svg("M0,0C1,0,2,0,3,0", None).unwrap();
        assert_approx_eq!(line.segment_length(0, None).unwrap(), 3.0, 1e-12);
        assert_approx_eq!(line.segment_length(0, Some(100)).unwrap(), 3.0, 1e-12);
        assert!(line.segment_length(1, None).is_none());

        let curve = wave();
        let coarse = curve.segment_length(0, Some(2)).unwrap();
        let fine = curve.segment_length(0, Some(100)).unwrap();
        assert!(coarse <= fine);
    }

    #[test]
    fn test_set_subdivisions() {
        let mut curve = BezierCurve::from_svg("M0,0C1,0,2,0,3,0C3.5,0,4,0,4.5,0", None).unwrap();
        curve.set_subdivisions(100);
        assert_eq!(curve.handles()[0].subdivisions(), 100);
        assert!((49..=50).contains(&curve.handles()[1].subdivisions()));
        // terminal handle of an open curve starts no segment
        assert_eq!(curve.handles()[2].subdivisions(), 5);

        let mut point = BezierCurve::from_svg("M1,1C1,1,1,1,1,1Z", None).unwrap();
        point.set_subdivisions(100);
        assert!(point.handles().iter().all(|h| h.subdivisions() == 0));
    }

    #[test]
    fn test_normalize() -> Result<(), Error> {
        let mut curve = BezierCurve::from_svg("M10,20C11,10,35,15,40,30", None)?;
        curve.normalize()?;
        let xs: Vec<Scalar> = curve
            .handles()
            .iter()
            .flat_map(|h| h.nodes().points())
            .map(|p| p.x())
            .collect();
        let min = xs.iter().copied().fold(Scalar::INFINITY, Scalar::min);
        let max = xs.iter().copied().fold(Scalar::NEG_INFINITY, Scalar::max);
        assert_eq!(min, -0.5);
        assert_eq!(max, 0.5);
        // Y span 20 scaled by X span 30
        let first = curve.handles()[0].nodes().anchor;
        assert_approx_eq!(first.y(), 0.0, 1e-12);
        let last = curve.handles()[1].nodes().anchor;
        assert_approx_eq!(last.y(), 10.0 / 30.0, 1e-12);
        assert!(curve.handles().iter().all(|h| !h.is_dirty()));

        let mut vertical = BezierCurve::from_svg("M1,0C1,1,1,2,1,3", None)?;
        assert!(matches!(
            vertical.normalize(),
            Err(Error::DegenerateGeometry { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_copy() {
        let mut curve = wave().with_origin((0.5, 0.25)).with_scale(0.3);
        curve.handle_mut(1).unwrap().draft_mut().anchor = Vector3::new(9.0, 9.0, 0.0);
        let offset = Vector3::new(1.0, 2.0, 3.0);
        let mut copy = curve.copy(offset);
        assert_eq!(copy.scale(), 0.3);
        assert_eq!(copy.origin(), Vector3::new(0.5, 0.25, 0.0));
        for (orig, dup) in curve.handles().iter().zip(copy.handles()) {
            assert_eq!(dup.nodes().anchor, orig.nodes().anchor + offset);
            assert!(!dup.is_dirty());
        }

        // copies are independent
        copy.handle_mut(1).unwrap().draft_mut().anchor = Vector3::new(-7.0, 5.0, 1.0);
        copy.handle_mut(1).unwrap().update();
        assert_eq!(copy.handles()[1].nodes().anchor, Vector3::new(-7.0, 5.0, 1.0));
        assert_eq!(curve.handles()[1].nodes().anchor, Vector3::new(3.0, 0.0, 0.0));
        assert_eq!(curve.handles()[1].draft().anchor, Vector3::new(9.0, 9.0, 0.0));
    }

    #[test]
    fn test_with_config() {
        let config = EditConfig {
            tolerance: 0.5,
            length_samples: 1,
            default_subdivisions: 9,
            ..EditConfig::default()
        };
        let curve = wave().with_config(&config);
        assert_eq!(curve.tolerance(), 0.5);
        assert_eq!(curve.length_samples(), 1);
        assert!(curve.handles().iter().all(|h| h.subdivisions() == 9));
        assert!(curve.handles().iter().all(|h| h.tolerance() == 0.5));
        assert_eq!(curve.divide(None).len(), 9 * 2);

        // a single chord is the distance between segment ends
        let chord = curve.segment_length(0, None).unwrap();
        assert_approx_eq!(chord, 3.0, 1e-12);
        assert!(wave().segment_length(0, None).unwrap() > chord);

        let copy = curve.copy(Vector3::ZERO);
        assert_eq!(copy.length_samples(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() -> Result<(), Error> {
        let mut curve = blob()
            .with_origin((0.5, 0.25))
            .with_scale(0.75)
            .with_constrained_ends(true);
        curve.handle_mut(1).unwrap().draft_mut().anchor = Vector3::new(4.5, 0.5, 0.0);
        let json = serde_json::to_string(&curve)?;
        let restored: BezierCurve = serde_json::from_str(&json)?;
        assert_eq!(restored, curve);
        assert!(restored.handles()[1].is_dirty());
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_rejects_empty_control() -> Result<(), Error> {
        let mut value = serde_json::to_value(wave())?;
        value["control"] = serde_json::json!([]);
        let result: Result<BezierCurve, _> = serde_json::from_value(value);
        let err = result.err().map(|err| err.to_string()).unwrap_or_default();
        assert!(err.contains("curve has no control handles"), "{err}");

        // length sampling falls back to its default when missing
        let mut value = serde_json::to_value(wave().with_config(&EditConfig {
            length_samples: 3,
            ..EditConfig::default()
        }))?;
        assert_eq!(value["length_samples"], serde_json::json!(3));
        if let Some(object) = value.as_object_mut() {
            object.remove("length_samples");
        }
        let restored: BezierCurve = serde_json::from_value(value)?;
        assert_eq!(restored.length_samples(), 10);
        Ok(())
    }

    #[test]
    fn test_transform() {
        let mut curve = wave();
        curve.transform(Transform::default().translate(1.0, 0.0).scale(2.0, 2.0));
        let handle = &curve.handles()[1];
        assert_eq!(handle.nodes().anchor, Vector3::new(7.0, 0.0, 0.0));
        assert_eq!(handle.draft().anchor, Vector3::new(7.0, 0.0, 0.0));
        assert_approx_eq!(handle.out_length(), 2.0 * 2.0f64.sqrt(), 1e-12);
    }

    #[test]
    fn test_project_controls() -> Result<(), Error> {
        let camera = Camera::new(10.0, 0.0, 0.0, 1.0)?;
        let curve = wave();
        let projected = curve.project_controls(&camera)?;
        assert_eq!(projected.handles().len(), curve.handles().len());
        for (orig, proj) in curve.handles().iter().zip(projected.handles()) {
            let expected = camera.project(orig.nodes().anchor)?;
            assert_eq!(proj.nodes().anchor, expected);
        }
        Ok(())
    }

    #[test]
    fn test_map() {
        let curve = wave().with_origin((0.5, 0.5)).with_scale(0.5);
        let viewport = Viewport::new(400.0, 200.0);
        let p = curve.map(Vector3::new(1.0, -1.0, 7.0), viewport);
        assert_approx_eq!(p.x(), 300.0);
        assert_approx_eq!(p.y(), 0.0);
    }
}
