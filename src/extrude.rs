//! Extrusion of a cross-section through depth profiles
use crate::{
    BezierCurve, Camera, Error, Scalar, Vector3,
    config::{Dimensions, MeshConfig},
    interpolate_x,
};

/// Planar curve providing depth as a function of `x`
pub trait DepthProfile {
    /// Points of the profile, `y` of each sample is the depth at its `x`
    fn samples(&self, count: usize) -> Vec<Vector3>;

    /// Depth at `x` interpolated between `count` samples
    fn depth_at(&self, x: Scalar, count: usize) -> Scalar {
        interpolate_x(&self.samples(count), x)
    }
}

impl DepthProfile for BezierCurve {
    fn samples(&self, count: usize) -> Vec<Vector3> {
        self.divide(Some(count))
    }
}

impl DepthProfile for [Vector3] {
    fn samples(&self, _count: usize) -> Vec<Vector3> {
        self.to_vec()
    }
}

/// Lift sampled points of a cross-section to the depth given by the profile
pub fn displace(
    points: &[Vector3],
    profile: &(impl DepthProfile + ?Sized),
    profile_samples: usize,
    depth_scale: Scalar,
) -> Vec<Vector3> {
    let samples = profile.samples(profile_samples);
    points
        .iter()
        .map(|point| point.with_z(interpolate_x(&samples, point.x()) / depth_scale))
        .collect()
}

/// Projected outlines of the extruded solid
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extrusion {
    /// Cross-section lifted by the top profile
    pub top: Vec<Vector3>,
    /// Cross-section lifted by the bottom profile
    pub bottom: Vec<Vector3>,
}

impl Extrusion {
    /// Number of points in each outline
    pub fn len(&self) -> usize {
        self.top.len().min(self.bottom.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat `[x, y, z, ...]` view of the top outline
    pub fn top_coords(&self) -> &[Scalar] {
        bytemuck::cast_slice(&self.top)
    }

    /// Flat `[x, y, z, ...]` view of the bottom outline
    pub fn bottom_coords(&self) -> &[Scalar] {
        bytemuck::cast_slice(&self.bottom)
    }

    /// Lines connecting top and bottom outlines every `stride` points
    pub fn ribs(&self, stride: usize) -> impl Iterator<Item = (Vector3, Vector3)> + '_ {
        self.top
            .iter()
            .zip(self.bottom.iter())
            .step_by(stride.max(1))
            .map(|(top, bottom)| (*top, *bottom))
    }
}

/// Sample the cross-section, lift it with both depth profiles and project through
/// the camera
pub fn extrude(
    section: &BezierCurve,
    top: &(impl DepthProfile + ?Sized),
    bottom: &(impl DepthProfile + ?Sized),
    camera: &Camera,
    mesh: &MeshConfig,
    dimensions: &Dimensions,
) -> Result<Extrusion, Error> {
    let points = section.divide(None);
    let project = |points: Vec<Vector3>| -> Result<Vec<Vector3>, Error> {
        points.into_iter().map(|point| camera.project(point)).collect()
    };
    let top = displace(&points, top, mesh.profile_samples, dimensions.depth_scale);
    let bottom = displace(&points, bottom, mesh.profile_samples, dimensions.depth_scale);
    let extrusion = Extrusion {
        top: project(top)?,
        bottom: project(bottom)?,
    };
    tracing::trace!(points = extrusion.len(), "extruded cross-section");
    Ok(extrusion)
}
