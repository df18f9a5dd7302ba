//! Bounding box of a rendered area plot.

use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Geographic extent printed by the tool after an area plot.
///
/// The tool prints `|`-delimited fields; field 0 is a label and fields 1–4
/// are north, east, south and west.
///
/// # Examples
///
/// ```
/// use sigplot_invoke::BoundingBox;
///
/// let bbox = BoundingBox::parse("|52.20|-0.54|51.49|-1.82|\n").unwrap();
/// assert_eq!(bbox.north, 52.2);
/// assert_eq!(bbox.west, -1.82);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Parses the tool's stdout.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::BoundingBox`] when fewer than five fields are
    /// present or a coordinate is not a number.
    pub fn parse(stdout: &str) -> Result<Self, ToolError> {
        let fields: Vec<&str> = stdout.trim().split('|').collect();
        if fields.len() < 5 {
            return Err(ToolError::BoundingBox(format!(
                "expected at least 5 '|' separated fields, found {} in '{}'",
                fields.len(),
                stdout.trim()
            )));
        }

        let coordinate = |index: usize| -> Result<f64, ToolError> {
            let raw = fields[index].trim();
            raw.parse().map_err(|_| {
                ToolError::BoundingBox(format!("field {index} is not a number: '{raw}'"))
            })
        };

        Ok(Self {
            north: coordinate(1)?,
            east: coordinate(2)?,
            south: coordinate(3)?,
            west: coordinate(4)?,
        })
    }
}
