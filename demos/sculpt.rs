//! Loads a cross-section path, drags one of its anchors, previews the extrusion
//! and prints the result as SVG or Rhino Python script
#![deny(warnings)]

use chisel::*;
use std::{
    env,
    fs::File,
    io::{Read, Write},
};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

const DEFAULT_SECTION: &str =
    "M-0.5,0C-0.5,0.25,-0.25,0.3,0,0.3C0.25,0.3,0.5,0.25,0.5,0C0.5,-0.25,0.25,-0.3,0,-0.3C-0.25,-0.3,-0.5,-0.25,-0.5,0Z";
const TOP_PROFILE: &str = "M-0.5,0.3C-0.2,0.5,0.2,0.5,0.5,0.3";
const BOTTOM_PROFILE: &str = "M-0.5,-0.3C-0.2,-0.5,0.2,-0.5,0.5,-0.3";

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    section: Option<String>,
    rhino: bool,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args::default();
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "sculpt".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    eprintln!("Drag a cross-section anchor and export the result");
                    eprintln!("\nUSAGE:");
                    eprintln!("    {} [-c <config.json>] [-r] [<section.path>]", cmd);
                    eprintln!("\nARGS:");
                    eprintln!("    -c <config.json>   configuration overrides");
                    eprintln!("    -r                 print Rhino Python script instead of SVG");
                    eprintln!("    <section.path>     file containing SVG path ('-' means stdin)");
                    std::process::exit(1);
                }
                "-c" => {
                    result.config = Some(args.next().ok_or("-c requires argument")?);
                }
                "-r" => result.rhino = true,
                _ if result.section.is_none() => result.section = Some(arg),
                _ => return Err("unexpected positional argument".into()),
            }
        }
        Ok(result)
    }
}

fn read_text(path: &str) -> Result<String, Error> {
    let mut contents = String::new();
    if path != "-" {
        File::open(path)?.read_to_string(&mut contents)?;
    } else {
        std::io::stdin().read_to_string(&mut contents)?;
    }
    Ok(contents)
}

/// Canvas that only reports what would be drawn
#[derive(Default)]
struct TraceCanvas {
    strokes: usize,
    circles: usize,
}

impl Canvas for TraceCanvas {
    fn stroke_cubics(&mut self, start: Point, cubics: &[[Point; 3]], stroke: Stroke) {
        tracing::trace!(?start, count = cubics.len(), ?stroke, "cubics");
        self.strokes += 1;
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke) {
        tracing::trace!(count = points.len(), ?stroke, "polyline");
        self.strokes += 1;
    }

    fn fill_circle(&mut self, center: Point, radius: Scalar, fill: Fill) {
        tracing::trace!(?center, radius, ?fill, "circle");
        self.circles += 1;
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    let config = match &args.config {
        Some(path) => Config::from_json(&read_text(path)?)?,
        None => Config::default(),
    };
    let section_path = match &args.section {
        Some(path) => read_text(path)?,
        None => DEFAULT_SECTION.to_owned(),
    };

    let mut section = tracing::debug_span!("[parse]").in_scope(|| {
        BezierCurve::from_svg(section_path.trim(), None).map(|curve| {
            curve
                .with_origin((0.5, 0.5))
                .with_scale(0.8)
                .with_config(&config.edit)
        })
    })?;
    section.normalize()?;
    section.set_subdivisions(config.mesh.section_subdivisions);
    let top = BezierCurve::from_svg(TOP_PROFILE, None)?;
    let bottom = BezierCurve::from_svg(BOTTOM_PROFILE, None)?;

    // drag the first anchor a bit to the left
    let viewport = Viewport::new(800.0, 600.0);
    let mut ctx = EditContext::new(viewport, EditMode::Aligned);
    let anchor = section.map(section.handles()[0].nodes().anchor, viewport);
    ctx.pointer.move_to(anchor);
    section.pointer_move(&ctx);
    tracing::info!(state = ?section.state(&ctx), "pointer over the first anchor");
    ctx.pointer.press();
    section.pointer_down(&ctx);
    ctx.pointer.move_to(anchor + Point::new(-24.0, 0.0));
    section.pointer_move(&ctx);
    ctx.pointer.release();
    section.pointer_up(&ctx);

    // orbit the camera and preview the extrusion
    let mut camera = Camera::new(4.0, 0.6, 0.4, 2.0)?.with_config(&config.edit);
    ctx.pointer.move_to(Point::new(400.0, 300.0));
    ctx.pointer.press();
    ctx.pointer.move_to(Point::new(460.0, 280.0));
    camera.drag(&ctx)?;
    ctx.pointer.release();
    camera.update()?;

    let extrusion = extrude(
        &section,
        &top,
        &bottom,
        &camera,
        &config.mesh,
        &config.dimensions,
    )?;
    let mut canvas = TraceCanvas::default();
    section.draw(
        &mut canvas,
        viewport,
        &config.display,
        DrawWidths::default(),
    );
    section.draw3(
        &mut canvas,
        &extrusion,
        viewport,
        &config.display,
        1.0,
        config.edit.rib_stride,
    );
    tracing::info!(
        points = extrusion.len(),
        strokes = canvas.strokes,
        circles = canvas.circles,
        "preview"
    );

    let output = if args.rhino {
        let mut script = section.export_rhino_script("section", false, &config.dimensions);
        script.push_str(&top.export_rhino_script("top", true, &config.dimensions));
        script
    } else {
        section.export_svg(&config.dimensions)
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", output)?;
    Ok(())
}
