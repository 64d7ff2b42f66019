//! Orbiting perspective camera
use crate::{EPSILON, EditContext, Error, PI, Scalar, Staged, Vector3, clamp, config::EditConfig};

/// Spherical coordinates of the camera eye around the origin
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Orbit {
    /// Distance from the origin
    pub radius: Scalar,
    /// Planar angle
    pub theta: Scalar,
    /// Elevation angle
    pub phi: Scalar,
}

impl Orbit {
    pub fn new(radius: Scalar, theta: Scalar, phi: Scalar) -> Self {
        Self { radius, theta, phi }
    }

    /// Position of the eye in cartesian coordinates
    pub fn eye(&self) -> Vector3 {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        Vector3::new(cos_theta * cos_phi, sin_theta * cos_phi, sin_phi).scale(self.radius)
    }
}

/// Camera looking at the origin from a point on a sphere.
///
/// Frame axes: `view` points from the eye to the origin, `right` lies in the
/// horizontal plane and `up` completes the orthonormal frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "CameraData")
)]
pub struct Camera {
    orbit: Staged<Orbit>,
    focal: Scalar,
    eye: Vector3,
    view: Vector3,
    right: Vector3,
    up: Vector3,
    phi_limit: Scalar,
    sensitivity: Scalar,
}

// serialized form of a camera, the frame is rebuilt from the draft orbit
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct CameraData {
    orbit: Staged<Orbit>,
    focal: Scalar,
    phi_limit: Scalar,
    sensitivity: Scalar,
}

#[cfg(feature = "serde")]
impl TryFrom<CameraData> for Camera {
    type Error = Error;

    fn try_from(data: CameraData) -> Result<Self, Self::Error> {
        let mut camera = Self {
            orbit: data.orbit,
            focal: data.focal,
            eye: Vector3::ZERO,
            view: Vector3::ZERO,
            right: Vector3::ZERO,
            up: Vector3::ZERO,
            phi_limit: data.phi_limit,
            sensitivity: data.sensitivity,
        };
        camera.build_eye()?;
        Ok(camera)
    }
}

impl Camera {
    /// Create camera with orbit parameters and focal length
    pub fn new(radius: Scalar, theta: Scalar, phi: Scalar, focal: Scalar) -> Result<Self, Error> {
        let config = EditConfig::default();
        let mut camera = Self {
            orbit: Staged::new(Orbit::new(radius, theta, phi)),
            focal,
            eye: Vector3::ZERO,
            view: Vector3::ZERO,
            right: Vector3::ZERO,
            up: Vector3::ZERO,
            phi_limit: config.phi_limit * PI / 180.0,
            sensitivity: config.orbit_sensitivity,
        };
        camera.build_eye()?;
        Ok(camera)
    }

    /// Take elevation limit and drag sensitivity from the configuration
    pub fn with_config(mut self, config: &EditConfig) -> Self {
        self.phi_limit = config.phi_limit * PI / 180.0;
        self.sensitivity = config.orbit_sensitivity;
        self
    }

    /// Committed orbit
    pub fn orbit(&self) -> &Orbit {
        self.orbit.committed()
    }

    /// Orbit currently used to build the frame
    pub fn draft_orbit(&self) -> &Orbit {
        self.orbit.draft()
    }

    pub fn focal(&self) -> Scalar {
        self.focal
    }

    pub fn eye(&self) -> Vector3 {
        self.eye
    }

    /// Frame axes `[view, right, up]`
    pub fn axes(&self) -> [Vector3; 3] {
        [self.view, self.right, self.up]
    }

    /// Rebuild eye position and frame from the draft orbit.
    ///
    /// Fails if the eye is at the origin or looks straight along the vertical
    /// axis, in which case the previous frame is kept.
    pub fn build_eye(&mut self) -> Result<(), Error> {
        let eye = self.orbit.draft().eye();
        let mut view = -eye;
        view.normalize()?;
        let mut right = view.cross(Vector3::UP);
        right.normalize()?;
        let mut up = right.cross(view);
        up.normalize()?;
        self.eye = eye;
        self.view = view;
        self.right = right;
        self.up = up;
        Ok(())
    }

    /// Perspective projection of a point onto the lens plane, `z` of the result is 0
    pub fn project(&self, point: Vector3) -> Result<Vector3, Error> {
        let offset = self.eye - point;
        let depth = offset.dot(self.view);
        if depth.abs() < EPSILON {
            return Err(Error::ProjectionSingularity { depth });
        }
        let x = offset.dot(self.right) * self.focal / depth;
        let y = offset.dot(self.up) * self.focal / depth;
        Ok(Vector3::new(x, y, 0.0))
    }

    /// Rotate draft orbit by the pointer drag, does nothing unless dragging
    pub fn drag(&mut self, ctx: &EditContext) -> Result<(), Error> {
        let Some(delta) = ctx.pointer.drag_delta() else {
            return Ok(());
        };
        let side = ctx.viewport.min_side();
        if !(side > 0.0) {
            return Err(Error::DegenerateGeometry {
                reason: "orbit drag needs a non-empty viewport",
            });
        }
        let k = self.sensitivity / side;
        let committed = *self.orbit.committed();
        let draft = self.orbit.draft_mut();
        draft.theta = committed.theta - delta.x() * k;
        draft.phi = clamp(
            committed.phi - delta.y() * k,
            -self.phi_limit,
            self.phi_limit,
        );
        self.build_eye()
    }

    /// Commit draft orbit
    pub fn update(&mut self) -> Result<(), Error> {
        self.orbit.commit();
        tracing::debug!(orbit = ?self.orbit.committed(), "camera committed");
        self.build_eye()
    }

    /// Discard draft orbit
    pub fn cancel(&mut self) -> Result<(), Error> {
        self.orbit.cancel();
        self.build_eye()
    }
}
