//! Absolute positions in the drawing tree.
//!
//! A shape's own `x`/`y` plus the translation of every `transform` on the way up to the root.

use crate::drawing::{Drawing, ElementId};
use crate::geom::{Box2D, Point, Vector, point, vector};
use crate::{Error, Result};
use std::str::FromStr;

/// Numeric value of a length attribute such as `40` or `40px`; absent or unparsable is 0.
pub fn to_float(value: Option<&str>) -> f64 {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return 0.0;
    };
    match svgtypes::Length::from_str(value) {
        Ok(length) if length.number.is_finite() => length.number,
        _ => value
            .trim_end_matches("px")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
    }
}

/// Translation part of a transform list; `None` when the list does not parse.
pub fn translation(transform: &str) -> Option<Vector> {
    match svgtypes::Transform::from_str(transform) {
        Ok(ts) => Some(vector(ts.e, ts.f)),
        Err(err) => {
            tracing::debug!(transform, %err, "unparsable transform");
            None
        }
    }
}

/// Sum of the translations of `id` and all of its ancestors.
pub fn accumulated_translation(drawing: &Drawing, id: ElementId) -> Result<Vector> {
    let mut total = vector(0.0, 0.0);
    let mut cur = Some(id);
    while let Some(c) = cur {
        let element = drawing.element(c)?;
        if let Some(t) = element.attr("transform").and_then(translation) {
            total += t;
        }
        cur = element.parent();
    }
    Ok(total)
}

pub fn absolute_position(drawing: &Drawing, id: ElementId) -> Result<Point> {
    let element = drawing.element(id)?;
    let local = point(to_float(element.attr("x")), to_float(element.attr("y")));
    Ok(local + accumulated_translation(drawing, id)?)
}

/// Resolves the element whose `id` attribute is `dom_id`.
pub fn absolute_position_of(drawing: &Drawing, dom_id: &str) -> Result<Point> {
    let id = drawing
        .find_by_id(dom_id)
        .ok_or_else(|| Error::missing(dom_id))?;
    absolute_position(drawing, id)
}

/// Absolute box of a sized shape (`x`, `y`, `width`, `height`).
pub fn absolute_bounds(drawing: &Drawing, id: ElementId) -> Result<Box2D> {
    let min = absolute_position(drawing, id)?;
    let element = drawing.element(id)?;
    let max = min + vector(to_float(element.attr("width")), to_float(element.attr("height")));
    Ok(Box2D::new(min, max))
}
