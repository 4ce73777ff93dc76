#![cfg(feature = "render")]
//! Rendering the results table to a PNG image.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use std::path::Path;
use tracing::info;

use crate::error::{GradeError, Result};
use crate::grid::{CellRange, GROUP_HEADER_ROW, SheetGrid, column_index};

/// Configuration options for image generation
#[derive(Clone, Debug)]
pub struct RasterOptions {
    /// Pixels per column-width character unit
    pub char_width: u32,

    /// Height of every row in pixels
    pub row_height: u32,

    /// Blank border around the table in pixels
    pub margin: u32,

    /// Font family used for all text
    pub font_family: String,

    /// Font size in points
    pub font_size: f64,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            char_width: 10,
            row_height: 28,
            margin: 16,
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
        }
    }
}

/// Pixel geometry of a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct TableLayout {
    /// Left edge of every column, plus the right edge of the last one.
    pub column_edges: Vec<u32>,
    pub row_height: u32,
    pub margin: u32,
    pub rows: u32,
}

impl TableLayout {
    pub fn new(grid: &SheetGrid, options: &RasterOptions) -> Self {
        let mut column_edges = Vec::with_capacity(grid.column_widths.len() + 1);
        let mut x = options.margin;
        column_edges.push(x);
        for width in &grid.column_widths {
            x += (width * options.char_width as f64).ceil() as u32;
            column_edges.push(x);
        }
        TableLayout {
            column_edges,
            row_height: options.row_height,
            margin: options.margin,
            rows: grid.height() as u32,
        }
    }

    /// Image size in pixels; never zero in either direction.
    pub fn size(&self) -> (u32, u32) {
        let right = self.column_edges.last().copied().unwrap_or(self.margin);
        let width = right + self.margin;
        let height = self.margin * 2 + self.rows * self.row_height;
        (width.max(1), height.max(1))
    }

    /// Pixel rectangle `(x0, y0, x1, y1)` covered by a range of cells.
    pub fn rect(&self, range: &CellRange) -> (i32, i32, i32, i32) {
        let edge = |col: usize| {
            self.column_edges
                .get(col)
                .or(self.column_edges.last())
                .copied()
                .unwrap_or(self.margin) as i32
        };
        let x0 = edge(range.first_col as usize);
        let x1 = edge(range.last_col as usize + 1);
        let y0 = (self.margin + range.first_row * self.row_height) as i32;
        let y1 = (self.margin + (range.last_row + 1) * self.row_height) as i32;
        (x0, y0, x1, y1)
    }
}

fn raster_err(e: impl std::fmt::Display) -> GradeError {
    GradeError::Raster(e.to_string())
}

/// Draws the grid into an RGB buffer of the layout's size.
fn draw_grid(
    grid: &SheetGrid,
    layout: &TableLayout,
    options: &RasterOptions,
    buffer: &mut [u8],
) -> Result<()> {
    let root = BitMapBackend::with_buffer(buffer, layout.size()).into_drawing_area();
    root.fill(&WHITE).map_err(raster_err)?;

    let font = (options.font_family.as_str(), options.font_size).into_font();
    let left = font.clone().color(&BLACK).pos(Pos::new(HPos::Left, VPos::Center));
    let center = font.color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center));
    let padding = (options.char_width as i32).max(1);

    for (r, row) in grid.rows.iter().enumerate() {
        let r = r as u32;
        let columns = if r >= GROUP_HEADER_ROW {
            grid.width()
        } else {
            row.len()
        };

        for c in 0..columns {
            let c = column_index(c)?;
            let range = match grid.merge_at(r, c) {
                Some(m) if m.first_row != r || m.first_col != c => continue,
                Some(m) => *m,
                None => CellRange::single(r, c),
            };
            let (x0, y0, x1, y1) = layout.rect(&range);

            // Only the table itself is ruled; the header lines are plain text.
            if r >= GROUP_HEADER_ROW {
                root.draw(&Rectangle::new([(x0, y0), (x1, y1)], BLACK.stroke_width(1)))
                    .map_err(raster_err)?;
            }

            let text = grid.cell(r, c).to_string();
            if text.trim().is_empty() {
                continue;
            }
            let y = (y0 + y1) / 2;
            if grid.is_centered(r, c) {
                root.draw(&Text::new(text, ((x0 + x1) / 2, y), center.clone()))
                    .map_err(raster_err)?;
            } else {
                root.draw(&Text::new(text, (x0 + padding / 2, y), left.clone()))
                    .map_err(raster_err)?;
            }
        }
    }

    root.present().map_err(raster_err)?;
    Ok(())
}

/// Rasterizes an export grid to PNG bytes
///
/// # Arguments
/// * `grid` - The laid out results table
/// * `options` - Geometry and font options
///
/// # Returns
/// * A Result containing the PNG image data as bytes or an error
pub fn rasterize(grid: &SheetGrid, options: &RasterOptions) -> Result<Vec<u8>> {
    let layout = TableLayout::new(grid, options);
    let (width, height) = layout.size();
    let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];

    draw_grid(grid, &layout, options, &mut buffer)?;

    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| GradeError::Raster("bitmap size mismatch".to_string()))?;
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .map_err(raster_err)?;
    Ok(bytes)
}

/// Rasterizes the grid and writes it as a PNG file.
pub fn save_png(grid: &SheetGrid, options: &RasterOptions, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = rasterize(grid, options)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "image exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradebook::Gradebook;

    #[test]
    fn layout_follows_column_widths() {
        let book = Gradebook::with_subjects(["Maths"]);
        let grid = book.sheet_grid().unwrap();
        let options = RasterOptions::default();
        let layout = TableLayout::new(&grid, &options);

        assert_eq!(layout.column_edges.len(), grid.column_widths.len() + 1);
        let (width, height) = layout.size();
        let total: f64 = grid.column_widths.iter().map(|w| w * 10.0).sum();
        assert!(width as f64 >= total + 32.0);
        assert_eq!(height, 32 + grid.height() as u32 * 28);
    }

    #[test]
    fn merged_rects_span_their_columns() {
        let book = Gradebook::with_subjects(["Maths"]);
        let grid = book.sheet_grid().unwrap();
        let layout = TableLayout::new(&grid, &RasterOptions::default());
        let merged = layout.rect(&CellRange::new(8, 1, 8, 4));
        let first = layout.rect(&CellRange::single(8, 1));
        let last = layout.rect(&CellRange::single(8, 4));
        assert_eq!(merged.0, first.0);
        assert_eq!(merged.2, last.2);
        assert_eq!(merged.1, first.1);
    }
}
