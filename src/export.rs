//! Serialization of curves into SVG documents and Rhino Python scripts
use crate::{BezierCurve, Scalar, Vector3, config::Dimensions};
use std::fmt::Write;

const SVG_HEADER: &str = concat!(
    r#"<svg version="1.1" id="trace" xmlns="http://www.w3.org/2000/svg" "#,
    r#"xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 200 100" "#,
    r#"style="enable-background:new 0 0 200 100;" xml:space="preserve" >"#,
    "\n",
);

const SVG_PATH_STYLE: &str = "fill:none;stroke-width:4;stroke:#000000;stroke-linecap:round;\
    stroke-linejoin:round;stroke-miterlimit:10;";

// two decimals, ties away from zero, without negative zero
fn fixed(value: Scalar) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{:.2}", rounded + 0.0)
}

impl BezierCurve {
    /// SVG document with a single path tracing committed control points, coordinates
    /// are mapped with `(c + 0.5) * length`
    pub fn export_svg(&self, dimensions: &Dimensions) -> String {
        let length = dimensions.length;
        let point = |node: Vector3| {
            format!(
                "{},{}",
                fixed((node.x() + 0.5) * length),
                fixed((node.y() + 0.5) * length)
            )
        };
        let handles = self.handles();

        let mut out = String::from(SVG_HEADER);
        let _ = write!(
            out,
            "<path style=\"{}\" d=\"M{}\n",
            SVG_PATH_STYLE,
            point(handles[0].nodes().anchor)
        );
        for pair in handles.windows(2) {
            let (prev, next) = (pair[0].nodes(), pair[1].nodes());
            let _ = writeln!(
                out,
                "C{},{},{}",
                point(prev.out_tangent),
                point(next.in_tangent),
                point(next.anchor)
            );
        }
        if self.is_closed() {
            let (last, first) = (handles[handles.len() - 1].nodes(), handles[0].nodes());
            let _ = write!(
                out,
                "C{},{},{}z",
                point(last.out_tangent),
                point(first.in_tangent),
                point(first.anchor)
            );
        }
        out.push_str("\"/></svg>");
        out
    }

    /// Rhino Python snippet recreating the curve on layer `name` and extruding it
    /// symmetrically by half of the real length.
    ///
    /// Horizontal curves keep their axes, others are exported as a cross-section
    /// with `(x * 1.05, z, y / depth_scale)` coordinates.
    pub fn export_rhino_script(
        &self,
        name: &str,
        horizontal: bool,
        dimensions: &Dimensions,
    ) -> String {
        let length = dimensions.length;
        let handles = self.handles();
        let mut out = String::new();

        let _ = write!(
            out,
            "\n\trs.AddLayer(\"{name}\")\n\trs.CurrentLayer(\"{name}\")\n\n\tpts = []\n\t{name}_crvs = []\n\n"
        );
        for handle in handles {
            for node in handle.nodes().points() {
                let [x, y, z] = if horizontal {
                    [node.x() * length, node.y() * length, node.z() * length]
                } else {
                    [
                        node.x() * length * 1.05,
                        node.z() * length,
                        node.y() * length / dimensions.depth_scale,
                    ]
                };
                let _ = writeln!(
                    out,
                    "\tpts.append(rs.AddPoint([{},{},{}]))",
                    fixed(x),
                    fixed(y),
                    fixed(z)
                );
            }
        }

        // points of handle `i` are pts[3i] (in), pts[3i + 1] (anchor), pts[3i + 2] (out)
        let mut add_curve = |points: Vec<usize>| {
            let points: Vec<String> = points.iter().map(|i| format!("pts[{i}]")).collect();
            let _ = write!(
                out,
                "\n\t{name}_crvs.append(rs.AddCurve([{}]))",
                points.join(",")
            );
        };
        for (index, pair) in handles.windows(2).enumerate() {
            let base = 3 * index;
            let mut points = vec![base + 1];
            if pair[0].out_length() != 0.0 {
                points.push(base + 2);
            }
            if pair[1].in_length() != 0.0 {
                points.push(base + 3);
            }
            points.push(base + 4);
            add_curve(points);
        }
        if self.is_closed() {
            let last = handles.len() - 1;
            let base = 3 * last;
            let mut points = vec![base + 1];
            if handles[last].out_length() != 0.0 {
                points.push(base + 2);
            }
            if handles[0].in_length() != 0.0 {
                points.push(0);
            }
            points.push(1);
            add_curve(points);
        }

        let _ = write!(out, "\n\n\t{name}=rs.JoinCurves({name}_crvs, True);\n\n");
        let half = length / 2.0;
        let (path1, path2) = if horizontal {
            (
                format!("[0,0,0],[0,0,{}]", -half),
                format!("[0,0,0],[0,0,{}]", half),
            )
        } else {
            (
                format!("[0,0,0],[0,{},0]", -half),
                format!("[0,0,0],[0,{},0]", half),
            )
        };
        let _ = write!(
            out,
            "\n\t{name}_extrudePath1 = rs.AddLine({path1})\
             \n\t{name}_extrudePath2 = rs.AddLine({path2})\
             \n\t{name}_srf1 = rs.ExtrudeCurve({name},{name}_extrudePath1)\
             \n\t{name}_srf2 = rs.ExtrudeCurve({name},{name}_extrudePath2)\
             \n\t{name}_srf = rs.JoinSurfaces([{name}_srf1,{name}_srf2], True)\
             \n\n\n"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Transform, svg::parse_path};

    fn open() -> BezierCurve {
        BezierCurve::from_svg("M-0.5,0C-0.25,0.1,0.25,0.1,0.5,0", None).unwrap()
    }

    #[test]
    fn test_svg_open() {
        let dimensions = Dimensions {
            length: 100.0,
            ..Dimensions::default()
        };
        let out = open().export_svg(&dimensions);
        assert!(out.starts_with(SVG_HEADER));
        assert!(out.ends_with("\n\"/></svg>"));
        assert!(out.contains("d=\"M0.00,50.00\nC25.00,60.00,75.00,60.00,100.00,50.00\n\""));
        assert!(!out.contains('z'));
    }

    #[test]
    fn test_svg_round_trip() -> Result<(), Error> {
        let curve = BezierCurve::from_svg(
            "M-0.5,0C-0.4,-0.3,0.1,-0.21,0.2,-0.2C0.33,-0.19,0.5,0.1,0.3,0.2C0.1,0.3,-0.55,0.2,-0.5,0",
            None,
        )?;
        let dimensions = Dimensions::default();
        let out = curve.export_svg(&dimensions);
        assert!(out.contains("z\"/>"));

        let start = out.find("d=\"").map(|i| i + 3).unwrap();
        let end = start + out[start..].find('"').unwrap();
        let parsed = parse_path(&out[start..end], None)?;
        assert!(parsed.closed);
        assert_eq!(parsed.handles.len(), curve.handles().len());
        let length = dimensions.length;
        let export = Transform::default()
            .scale(length, length)
            .translate(0.5, 0.5);
        let inverse = export.invert().unwrap();
        for (orig, back) in curve.handles().iter().zip(&parsed.handles) {
            let (orig, back) = (orig.nodes().points(), back.nodes().points());
            for (orig, back) in orig.into_iter().zip(back) {
                assert!(orig.dist(inverse.apply3(back)) < 1e-2);
            }
        }
        Ok(())
    }

    #[test]
    fn test_rhino_horizontal() {
        let dimensions = Dimensions {
            length: 100.0,
            ..Dimensions::default()
        };
        let out = open().export_rhino_script("top", true, &dimensions);
        assert!(out.starts_with(
            "\n\trs.AddLayer(\"top\")\n\trs.CurrentLayer(\"top\")\n\n\tpts = []\n\ttop_crvs = []\n\n"
        ));
        // in-tangent of the first handle coincides with the anchor
        assert!(out.contains(
            "\tpts.append(rs.AddPoint([-50.00,0.00,0.00]))\n\
             \tpts.append(rs.AddPoint([-50.00,0.00,0.00]))\n\
             \tpts.append(rs.AddPoint([-25.00,10.00,0.00]))\n"
        ));
        assert!(out.contains("\n\ttop_crvs.append(rs.AddCurve([pts[1],pts[2],pts[3],pts[4]]))"));
        assert_eq!(out.matches("rs.AddCurve").count(), 1);
        assert!(out.contains("\n\n\ttop=rs.JoinCurves(top_crvs, True);\n\n"));
        assert!(out.contains("\n\ttop_extrudePath1 = rs.AddLine([0,0,0],[0,0,-50])"));
        assert!(out.contains("\n\ttop_extrudePath2 = rs.AddLine([0,0,0],[0,0,50])"));
        assert!(out.ends_with("\n\ttop_srf = rs.JoinSurfaces([top_srf1,top_srf2], True)\n\n\n"));
    }

    #[test]
    fn test_rhino_section() {
        let curve = BezierCurve::from_svg("M0,0C0,0,1,1,1,0C1,-1,0,-1,0,0", None).unwrap();
        let out = curve.export_rhino_script("section", false, &Dimensions::default());
        // (x * 150 * 1.05, z * 150, y * 150 / 10)
        assert!(out.contains("\tpts.append(rs.AddPoint([157.50,0.00,0.00]))\n"));
        assert!(out.contains("\tpts.append(rs.AddPoint([157.50,0.00,15.00]))\n"));
        // zero length out-tangent of the first handle is skipped
        assert!(out.contains("rs.AddCurve([pts[1],pts[3],pts[4]])"));
        // closing segment wraps to the first handle
        assert!(out.contains("rs.AddCurve([pts[4],pts[5],pts[0],pts[1]])"));
        assert!(out.contains("rs.AddLine([0,0,0],[0,-75,0])"));
        assert!(out.contains("rs.AddLine([0,0,0],[0,75,0])"));
    }

    #[test]
    fn test_fixed_ties() {
        assert_eq!(fixed(0.125), "0.13");
        assert_eq!(fixed(-0.125), "-0.13");
        assert_eq!(fixed(2.5), "2.50");
        assert_eq!(fixed(0.0), "0.00");
        assert_eq!(fixed(-0.0), "0.00");
    }

    #[test]
    fn test_rhino_ties() {
        let curve = BezierCurve::from_svg("M0,0C0.015625,0,0.03125,0,0.046875,0", None).unwrap();
        let dimensions = Dimensions {
            length: 8.0,
            ..Dimensions::default()
        };
        let out = curve.export_rhino_script("top", true, &dimensions);
        // 0.015625 * 8 = 0.125, 0.046875 * 8 = 0.375
        assert!(out.contains("\tpts.append(rs.AddPoint([0.13,0.00,0.00]))\n"));
        assert!(out.contains("\tpts.append(rs.AddPoint([0.25,0.00,0.00]))\n"));
        assert!(out.contains("\tpts.append(rs.AddPoint([0.38,0.00,0.00]))\n"));
        assert!(!out.contains("0.12,"));
    }
}
