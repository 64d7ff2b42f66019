//! Bezier profile sculpting engine.
//!
//! Main features:
//!  - Piecewise cubic curves edited through control handles with tangent coupling
//!  - Restricted SVG path parsing and SVG/Rhino script export
//!  - Orbit camera and perspective preview of a cross-section extruded between
//!    two depth profiles
//!
#![deny(warnings)]

mod camera;
pub mod config;
mod curve;
mod error;
mod export;
mod extrude;
mod geometry;
mod handle;
mod interact;
mod render;
mod svg;
mod utils;

pub use camera::{Camera, Orbit};
pub use config::{Config, Dimensions, DisplayConfig, EditConfig, MeshConfig};
pub use curve::{Allow, BezierCurve, Cubic};
pub use error::Error;
pub use extrude::{DepthProfile, Extrusion, displace, extrude};
pub use geometry::{BBox, EPSILON, PI, Point, Scalar, Transform, Vector3, scalar_fmt};
pub use handle::{ControlHandle, HandleNodes, NodeKind};
pub use interact::{EditContext, EditMode, Hover, InteractionState, Pointer, Viewport};
pub use render::{Canvas, DrawWidths, Fill, Ink, Stroke};
pub use svg::{ParsedPath, SvgPathCmd, SvgPathParser, parse_path};
pub use utils::{Staged, clamp, interpolate_x};
