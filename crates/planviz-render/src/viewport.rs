//! Viewport sizing.

use crate::drawing::Drawing;
use crate::geom::{Box2D, point};
use crate::position::absolute_bounds;
use crate::util::fmt;
use crate::{PlanVizConfig, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Viewport of a drawing without any rectangle.
    pub const EMPTY: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn to_box(&self) -> Box2D {
        Box2D::new(
            point(self.x, self.y),
            point(self.x + self.width, self.y + self.height),
        )
    }

    pub fn view_box(&self) -> String {
        format!(
            "{} {} {} {}",
            fmt(self.x),
            fmt(self.y),
            fmt(self.width),
            fmt(self.height)
        )
    }
}

/// Tight box around every rectangle inside a group, grown by the margins.
pub fn compute_viewport(drawing: &Drawing, margin_x: f64, margin_y: f64) -> Result<Viewport> {
    let mut bounds: Option<Box2D> = None;
    for rect in drawing.select_tag("rect") {
        if !drawing
            .ancestors(rect)
            .any(|a| drawing.get(a).is_some_and(|e| e.tag == "g"))
        {
            continue;
        }
        let b = absolute_bounds(drawing, rect)?;
        // Zero-size boxes count too.
        bounds = Some(match bounds {
            Some(acc) => Box2D::new(acc.min.min(b.min), acc.max.max(b.max)),
            None => b,
        });
    }
    let Some(b) = bounds else {
        tracing::warn!("no rectangles to size the viewport around; using an empty viewport");
        return Ok(Viewport::EMPTY);
    };
    Ok(Viewport {
        x: b.min.x - margin_x,
        y: b.min.y - margin_y,
        width: b.max.x - b.min.x + 2.0 * margin_x,
        height: b.max.y - b.min.y + 2.0 * margin_y,
    })
}

/// Computes the viewport and writes it to the root as `viewBox`, `width` and `height`.
pub fn size_viewport(drawing: &mut Drawing, config: &PlanVizConfig) -> Result<Viewport> {
    let viewport = compute_viewport(drawing, config.svg_margin_x, config.svg_margin_y)?;
    let root = drawing.root();
    drawing.set_attr(root, "viewBox", viewport.view_box())?;
    drawing.set_attr(root, "width", fmt(viewport.width))?;
    drawing.set_attr(root, "height", fmt(viewport.height))?;
    tracing::debug!(view_box = %viewport.view_box(), "sized viewport");
    Ok(viewport)
}
