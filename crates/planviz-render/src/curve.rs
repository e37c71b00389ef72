//! Edge path data.
//!
//! `basis` is the uniform cubic B-spline through the polyline (the d3 `curveBasis` shape): it
//! starts and ends on the first and last points and is pulled towards the ones in between.

use crate::util::fmt_path_into;
use planviz_layout::{Interpolation, Point};

pub fn path_data(points: &[Point], interpolation: Interpolation) -> String {
    match interpolation {
        Interpolation::Basis => basis_path(points),
        Interpolation::Linear => linear_path(points),
    }
}

fn push_pair(out: &mut String, cmd: char, x: f64, y: f64) {
    out.push(cmd);
    fmt_path_into(out, x);
    out.push(',');
    fmt_path_into(out, y);
}

fn push_cubic(out: &mut String, c1: Point, c2: Point, end: Point) {
    out.push('C');
    for (i, p) in [c1, c2, end].into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        fmt_path_into(out, p.x);
        out.push(',');
        fmt_path_into(out, p.y);
    }
}

pub fn linear_path(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 24);
    for (i, p) in points.iter().enumerate() {
        push_pair(&mut out, if i == 0 { 'M' } else { 'L' }, p.x, p.y);
    }
    out
}

pub fn basis_path(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 48);
    let mut spline = Basis::default();
    for &p in points {
        spline.push(&mut out, p);
    }
    spline.finish(&mut out);
    out
}

/// Streaming B-spline writer; `seen` counts points up to 3.
#[derive(Default)]
struct Basis {
    seen: u8,
    prev: Point,
    last: Point,
}

impl Basis {
    fn segment(&self, out: &mut String, next: Point) {
        let (a, b) = (self.prev, self.last);
        push_cubic(
            out,
            Point {
                x: (2.0 * a.x + b.x) / 3.0,
                y: (2.0 * a.y + b.y) / 3.0,
            },
            Point {
                x: (a.x + 2.0 * b.x) / 3.0,
                y: (a.y + 2.0 * b.y) / 3.0,
            },
            Point {
                x: (a.x + 4.0 * b.x + next.x) / 6.0,
                y: (a.y + 4.0 * b.y + next.y) / 6.0,
            },
        );
    }

    fn push(&mut self, out: &mut String, p: Point) {
        match self.seen {
            0 => push_pair(out, 'M', p.x, p.y),
            1 => {}
            2 => {
                let (a, b) = (self.prev, self.last);
                push_pair(out, 'L', (5.0 * a.x + b.x) / 6.0, (5.0 * a.y + b.y) / 6.0);
                self.segment(out, p);
            }
            _ => self.segment(out, p),
        }
        self.seen = (self.seen + 1).min(3);
        self.prev = self.last;
        self.last = p;
    }

    fn finish(&self, out: &mut String) {
        match self.seen {
            3 => {
                self.segment(out, self.last);
                push_pair(out, 'L', self.last.x, self.last.y);
            }
            2 => push_pair(out, 'L', self.last.x, self.last.y),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point { x, y }).collect()
    }

    #[test]
    fn linear_joins_points() {
        let d = linear_path(&pts(&[(0.0, 0.0), (10.0, 5.5), (20.0, 10.0)]));
        assert_eq!(d, "M0,0L10,5.5L20,10");
    }

    #[test]
    fn basis_with_two_points_is_a_line() {
        let d = basis_path(&pts(&[(0.0, 0.0), (0.0, 30.0)]));
        assert_eq!(d, "M0,0L0,30");
    }

    #[test]
    fn basis_with_three_points_bends_through_the_middle() {
        let d = basis_path(&pts(&[(0.0, 0.0), (30.0, 30.0), (0.0, 60.0)]));
        assert_eq!(d, "M0,0L5,5C10,10,20,20,20,30C20,40,10,50,5,55L0,60");
    }

    #[test]
    fn empty_polyline_has_no_path() {
        assert_eq!(basis_path(&[]), "");
        assert_eq!(path_data(&[], Interpolation::Linear), "");
    }
}
