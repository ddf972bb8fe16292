//! Screen geometry for tracked instances
//!
//! The bridge reads element geometry once per animation frame. Reads go
//! through the host's [`ElementRef`] handles and can fail (detached nodes);
//! a failed read contributes nothing to that pass instead of aborting it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("element is detached from the document")]
    Detached,

    #[error("geometry read failed: {0}")]
    ReadFailed(String),
}

/// Axis-aligned box in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Smallest rect containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Box-model edge sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// One element's full geometry reading: bounding box plus padding and
/// margin boxes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementBoxes {
    pub rect: Rect,
    pub padding: Edges,
    pub margin: Edges,
}

/// Host-provided handle onto a rendered element. The host decides what an
/// element actually is; the bridge only reads geometry off it and tags it
/// on the wire.
pub trait ElementRef {
    /// Current geometry. Errors are recovered by the caller per element.
    fn boxes(&self) -> Result<ElementBoxes, GeometryError>;

    /// Short tag used in place of the handle when serializing payloads.
    fn tag(&self) -> &str {
        "Element"
    }
}

/// Union bounding box over a set of geometry readings, skipping elements
/// whose read failed. `None` when nothing was readable.
pub fn union_boxes<'a, I>(readings: I) -> Option<ElementBoxes>
where
    I: IntoIterator<Item = Result<ElementBoxes, GeometryError>>,
{
    let mut combined: Option<Rect> = None;

    for reading in readings {
        let Ok(boxes) = reading else {
            continue;
        };
        combined = Some(match combined {
            Some(rect) => rect.union(&boxes.rect),
            None => boxes.rect,
        });
    }

    combined.map(|rect| ElementBoxes {
        rect,
        padding: Edges::default(),
        margin: Edges::default(),
    })
}
