//! Restricted SVG path parser
//!
//! Only `M`, `C`, `S` commands (absolute and relative) and a trailing `Z` are
//! accepted, every command must be followed by exactly its number of arguments.
//! See [SVG Path Specification](https://www.w3.org/TR/SVG11/paths.html#PathData)
use crate::{ControlHandle, Error, Point, Scalar, Transform, Vector3};

/// Maximum distance between the last and the first point of a path for it to be
/// considered closed even without `Z` command
const CLOSE_DISTANCE: Scalar = 1e-9;

/// Supported SVG commands, all points are absolute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SvgPathCmd {
    MoveTo(Point),
    CubicTo(Point, Point, Point),
    Close(Point),
}

impl SvgPathCmd {
    /// Get destination point of the SVG command
    pub fn dst(&self) -> Point {
        use SvgPathCmd::*;
        *match self {
            MoveTo(dst) => dst,
            CubicTo(_, _, dst) => dst,
            Close(dst) => dst,
        }
    }
}

fn is_cmd(byte: u8) -> bool {
    matches!(
        byte,
        b'M' | b'm' | b'C' | b'c' | b'S' | b's' | b'Z' | b'z'
    )
}

fn is_scalar_start(byte: u8) -> bool {
    byte.is_ascii_digit() || matches!(byte, b'.' | b'-' | b'+')
}

struct Parser<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.offset).copied()
    }

    fn unexpected(&self) -> Error {
        match self.text[self.offset..].chars().next() {
            Some(ch) => Error::ParseError {
                reason: format!("unexpected character {:?}", ch),
                offset: self.offset,
            },
            None => Error::ParseError {
                reason: "unexpected end of input".to_owned(),
                offset: self.offset,
            },
        }
    }

    // consume separators from the input
    fn parse_separators(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n' | b',') = self.peek() {
            self.offset += 1;
        }
    }

    // parse single scalar value, `None` if the input is exhausted or a command follows
    fn parse_scalar(&mut self) -> Result<Option<Scalar>, Error> {
        self.parse_separators();
        match self.peek() {
            None => return Ok(None),
            Some(byte) if is_cmd(byte) => return Ok(None),
            Some(byte) if is_scalar_start(byte) => {}
            Some(_) => return Err(self.unexpected()),
        }
        let input = &self.text.as_bytes()[self.offset..];
        match lexical_core::parse_partial::<Scalar>(input) {
            Ok((value, count)) if count > 0 && value.is_finite() => {
                self.offset += count;
                Ok(Some(value))
            }
            _ => Err(Error::ParseError {
                reason: "invalid number".to_owned(),
                offset: self.offset,
            }),
        }
    }
}

/// Path parser for restricted SVG encoded path
pub struct SvgPathParser<'a> {
    parser: Parser<'a>,
    // offset of the last parsed command
    cmd_offset: usize,
    // previous command (used to determine smooth points)
    prev_cmd: Option<SvgPathCmd>,
    // current position from which next relative curve will start
    position: Point,
    // sub-path starting position
    subpath_start: Point,
}

impl<'a> SvgPathParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            parser: Parser::new(text),
            cmd_offset: 0,
            prev_cmd: None,
            position: Point::new(0.0, 0.0),
            subpath_start: Point::new(0.0, 0.0),
        }
    }

    /// Byte offset of the most recently parsed command
    pub fn cmd_offset(&self) -> usize {
        self.cmd_offset
    }

    // parse pair of scalars and convert it to a point
    fn parse_point(&mut self, op: u8, count: usize) -> Result<Point, Error> {
        let mut coords = [0.0; 2];
        for coord in coords.iter_mut() {
            *coord = self.parser.parse_scalar()?.ok_or_else(|| Error::ParseError {
                reason: format!("command '{}' expects {} numbers", op as char, count),
                offset: self.cmd_offset,
            })?;
        }
        let point = Point(coords);
        if op.is_ascii_lowercase() {
            Ok(point + self.position)
        } else {
            Ok(point)
        }
    }

    /// Parse single SVG path command from the input
    pub fn parse_cmd(&mut self) -> Result<Option<SvgPathCmd>, Error> {
        self.parser.parse_separators();
        let op = match self.parser.peek() {
            None => return Ok(None),
            Some(op) if is_cmd(op) => op,
            Some(op) if is_scalar_start(op) => {
                return Err(Error::ParseError {
                    reason: "number without a command".to_owned(),
                    offset: self.parser.offset,
                });
            }
            Some(_) => return Err(self.parser.unexpected()),
        };
        self.cmd_offset = self.parser.offset;
        self.parser.offset += 1;

        let cmd = match op {
            b'M' | b'm' => {
                let dst = self.parse_point(op, 2)?;
                self.subpath_start = dst;
                SvgPathCmd::MoveTo(dst)
            }
            b'C' | b'c' => SvgPathCmd::CubicTo(
                self.parse_point(op, 6)?,
                self.parse_point(op, 6)?,
                self.parse_point(op, 6)?,
            ),
            b'S' | b's' => {
                let p1 = match self.prev_cmd {
                    Some(SvgPathCmd::CubicTo(_, p2, p3)) => 2.0 * p3 - p2,
                    _ => self.position,
                };
                let p2 = self.parse_point(op, 4)?;
                let p3 = self.parse_point(op, 4)?;
                SvgPathCmd::CubicTo(p1, p2, p3)
            }
            _ => SvgPathCmd::Close(self.subpath_start),
        };

        // no implicit repetition of commands
        self.parser.parse_separators();
        if let Some(byte) = self.parser.peek() {
            if is_scalar_start(byte) {
                return Err(Error::ParseError {
                    reason: format!("too many numbers for command '{}'", op as char),
                    offset: self.parser.offset,
                });
            }
        }

        self.position = cmd.dst();
        self.prev_cmd = Some(cmd);
        Ok(self.prev_cmd)
    }
}

impl Iterator for SvgPathParser<'_> {
    type Item = Result<SvgPathCmd, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_cmd().transpose()
    }
}

/// Control handles extracted from a path
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPath {
    pub handles: Vec<ControlHandle>,
    pub closed: bool,
}

/// Parse SVG path into control handles, optionally rotating every point by `rotate`
/// radians around the origin.
///
/// Each cubic segment produces a handle anchored at its start. If the path ends
/// where it started, the last second control point becomes the in-tangent of the
/// first handle and the path is closed. Otherwise a terminal handle is added at
/// the end of the path, and the path is closed only if `Z` is present, in which
/// case the closing segment is straight.
pub fn parse_path(text: &str, rotate: Option<Scalar>) -> Result<ParsedPath, Error> {
    let mut parser = SvgPathParser::new(text);
    let mut start: Option<Point> = None;
    let mut close = false;
    // (first control, second control, end) of every segment
    let mut segments: Vec<(Point, Point, Point)> = Vec::new();

    while let Some(cmd) = parser.parse_cmd()? {
        let offset = parser.cmd_offset();
        if close {
            return Err(Error::ParseError {
                reason: "command after closepath".to_owned(),
                offset,
            });
        }
        match (cmd, start) {
            (SvgPathCmd::MoveTo(p), None) => start = Some(p),
            (SvgPathCmd::MoveTo(_), Some(_)) => {
                return Err(Error::ParseError {
                    reason: "only a single subpath is supported".to_owned(),
                    offset,
                });
            }
            (_, None) => {
                return Err(Error::ParseError {
                    reason: "path must start with moveto".to_owned(),
                    offset,
                });
            }
            (SvgPathCmd::CubicTo(p1, p2, p3), Some(_)) => segments.push((p1, p2, p3)),
            (SvgPathCmd::Close(_), Some(_)) => close = true,
        }
    }

    let Some(start) = start else {
        return Err(Error::ParseError {
            reason: "empty path".to_owned(),
            offset: 0,
        });
    };
    let Some(&(_, last_control, end)) = segments.last() else {
        return Err(Error::ParseError {
            reason: "path has no cubic segments".to_owned(),
            offset: text.len(),
        });
    };

    let tr = match rotate {
        Some(angle) => Transform::default().rotate(angle),
        None => Transform::default(),
    };
    let node = |point: Point| Vector3::from(tr.apply(point));

    let wraps = end.dist(start) < CLOSE_DISTANCE;
    let mut handles = Vec::with_capacity(segments.len() + 1);
    let mut anchor = start;
    let mut in_tangent = if wraps { last_control } else { start };
    for (c1, c2, dst) in segments {
        handles.push(ControlHandle::new(node(in_tangent), node(anchor), node(c1)));
        in_tangent = c2;
        anchor = dst;
    }
    if !wraps {
        handles.push(ControlHandle::new(node(in_tangent), node(end), node(end)));
    }

    Ok(ParsedPath {
        handles,
        closed: wraps || close,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PI, assert_approx_eq};

    fn anchors(path: &ParsedPath) -> Vec<Point> {
        path.handles.iter().map(|h| h.nodes().anchor.xy()).collect()
    }

    #[test]
    fn test_parse_scalar() -> Result<(), Error> {
        let mut parser = Parser::new("1 .22e0.32 3.21e-3-1.24,1e4");
        assert_approx_eq!(parser.parse_scalar()?.unwrap(), 1.0);
        assert_approx_eq!(parser.parse_scalar()?.unwrap(), 0.22);
        assert_approx_eq!(parser.parse_scalar()?.unwrap(), 0.32);
        assert_approx_eq!(parser.parse_scalar()?.unwrap(), 3.21e-3);
        assert_approx_eq!(parser.parse_scalar()?.unwrap(), -1.24);
        assert_approx_eq!(parser.parse_scalar()?.unwrap(), 1e4);
        assert!(parser.parse_scalar()?.is_none());
        Ok(())
    }

    #[test]
    fn test_smooth_reflection() -> Result<(), Error> {
        let path = parse_path("M0,0C1,1,2,2,3,3S5,5,6,6", None)?;
        assert!(!path.closed);
        assert_eq!(path.handles.len(), 3);
        let second = path.handles[1].nodes();
        assert!(second.out_tangent.is_close_to(Vector3::new(4.0, 4.0, 0.0)));
        assert!(second.in_tangent.is_close_to(Vector3::new(2.0, 2.0, 0.0)));
        assert_eq!(
            anchors(&path),
            vec![Point::new(0.0, 0.0), Point::new(3.0, 3.0), Point::new(6.0, 6.0)]
        );
        // terminal handle
        let last = path.handles[2].nodes();
        assert_eq!(last.in_tangent, Vector3::new(5.0, 5.0, 0.0));
        assert_eq!(last.out_tangent, last.anchor);
        Ok(())
    }

    #[test]
    fn test_smooth_without_cubic() -> Result<(), Error> {
        let path = parse_path("M1,2S3,4,5,6", None)?;
        assert_eq!(path.handles[0].nodes().out_tangent, Vector3::new(1.0, 2.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_relative() -> Result<(), Error> {
        let relative = parse_path("m10,10c1,0,2,1,3,3s2,3,3,3c1-1,2-2,3,0", None)?;
        let absolute = parse_path("M10,10C11,10,12,11,13,13S15,16,16,16C17,15,18,14,19,16", None)?;
        assert_eq!(relative, absolute);
        Ok(())
    }

    #[test]
    fn test_closed() -> Result<(), Error> {
        let path = parse_path("M0,0 C1,0 2,1 2,2 C2,3 -1,1 0,0 z", None)?;
        assert!(path.closed);
        assert_eq!(path.handles.len(), 2);
        let first = path.handles[0].nodes();
        assert_eq!(first.in_tangent, Vector3::new(-1.0, 1.0, 0.0));
        assert_eq!(first.out_tangent, Vector3::new(1.0, 0.0, 0.0));

        // implicitly closed
        let implicit = parse_path("M0,0 C1,0 2,1 2,2 C2,3 -1,1 0,0", None)?;
        assert_eq!(implicit, path);

        // explicitly closed with straight closing segment
        let straight = parse_path("M0,0 C1,0 2,1 2,2 Z", None)?;
        assert!(straight.closed);
        assert_eq!(straight.handles.len(), 2);
        assert_eq!(straight.handles[0].nodes().in_tangent, Vector3::ZERO);
        Ok(())
    }

    #[test]
    fn test_rotate() -> Result<(), Error> {
        let path = parse_path("M1,0C1,1,0,1,0,2", Some(PI / 2.0))?;
        let nodes = path.handles[0].nodes();
        assert_approx_eq!(nodes.anchor.x(), 0.0, 1e-12);
        assert_approx_eq!(nodes.anchor.y(), 1.0, 1e-12);
        assert_approx_eq!(nodes.out_tangent.x(), -1.0, 1e-12);
        assert_approx_eq!(nodes.out_tangent.y(), 1.0, 1e-12);
        Ok(())
    }

    fn error_offset(text: &str) -> Option<usize> {
        match parse_path(text, None) {
            Err(Error::ParseError { offset, .. }) => Some(offset),
            _ => None,
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(error_offset(""), Some(0));
        assert_eq!(error_offset("   "), Some(0));
        assert_eq!(error_offset("M0,0"), Some(4));
        assert_eq!(error_offset("C1,1,2,2,3,3"), Some(0));
        // too few arguments
        assert_eq!(error_offset("M0,0 C1,1,2,2,3"), Some(5));
        assert_eq!(error_offset("M0,0 C1,1,2,2,3 S1,1,2,2"), Some(5));
        // no implicit repetition
        assert_eq!(error_offset("M0,0 1,1 C1,1,2,2,3,3"), Some(5));
        // unknown characters
        assert_eq!(error_offset("M0,0 L1,1"), Some(5));
        assert_eq!(error_offset("M0,0 C1,1,2,x,3,3"), Some(12));
        assert_eq!(error_offset("M0,0 C1,1,2,2,3,3 M1,1"), Some(18));
        assert_eq!(error_offset("M0,0 C1,1,2,2,3,3 Z C1,1,2,2,3,3"), Some(20));

        match parse_path("M0,0 C1,1,2,#", None) {
            Err(Error::ParseError { reason, offset }) => {
                assert_eq!(offset, 12);
                assert!(reason.contains('#'));
            }
            result => panic!("unexpected result: {:?}", result),
        }
    }
}
