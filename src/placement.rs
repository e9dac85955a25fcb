//! Placement math for watermark overlays.
//!
//! Anchored single placements use a margin of 5% of each canvas dimension.
//! Tiled placements walk a fixed grid; diagonal placements walk an expanded
//! grid so rotated tiles still cover the canvas edges. Positions may be
//! negative or extend past the canvas; the compositor clips when pasting.

/// Margin for corner anchors, as a percentage of the canvas dimension.
pub const CORNER_MARGIN_PERCENT: u32 = 5;

/// Where a single watermark element is anchored on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Geometric center of the canvas.
    Center,
    /// Bottom-right corner, inset by the corner margin.
    BottomRight,
    /// Top-left corner, inset by the corner margin.
    TopLeft,
    /// Bottom-left corner, inset by the corner margin.
    BottomLeft,
}

/// Calculate the top-left coordinates for an anchored element.
///
/// `canvas` and `item` are (width, height) pairs. The returned coordinates
/// may be negative when the item is larger than the canvas.
#[must_use]
pub fn anchor_position(anchor: Anchor, canvas: (u32, u32), item: (u32, u32)) -> (i32, i32) {
    let (cw, ch) = (canvas.0 as i64, canvas.1 as i64);
    let (iw, ih) = (item.0 as i64, item.1 as i64);
    let mx = cw * i64::from(CORNER_MARGIN_PERCENT) / 100;
    let my = ch * i64::from(CORNER_MARGIN_PERCENT) / 100;

    let (x, y) = match anchor {
        Anchor::Center => ((cw - iw) / 2, (ch - ih) / 2),
        Anchor::BottomRight => (cw - iw - mx, ch - ih - my),
        Anchor::TopLeft => (mx, my),
        Anchor::BottomLeft => (mx, ch - ih - my),
    };

    #[allow(clippy::cast_possible_truncation)]
    let clipped = (x as i32, y as i32);
    clipped
}

/// Grid positions for an axis-aligned tiled pattern.
///
/// Tiles are stamped at every multiple of `spacing` starting from the
/// origin, so the count is `ceil(w / spacing) * ceil(h / spacing)`.
/// A zero spacing is treated as 1 to keep the walk finite.
#[must_use]
pub fn grid_positions(canvas: (u32, u32), spacing: u32) -> Vec<(i32, i32)> {
    let step = spacing.max(1);
    let mut positions = Vec::new();

    let mut y = 0u32;
    while y < canvas.1 {
        let mut x = 0u32;
        while x < canvas.0 {
            #[allow(clippy::cast_possible_wrap)]
            positions.push((x as i32, y as i32));
            x += step;
        }
        y += step;
    }

    positions
}

/// Number of stamps `grid_positions` produces for a canvas and spacing.
#[must_use]
pub fn grid_count(canvas: (u32, u32), spacing: u32) -> usize {
    let step = u64::from(spacing.max(1));
    let cols = u64::from(canvas.0).div_ceil(step);
    let rows = u64::from(canvas.1).div_ceil(step);
    (cols * rows) as usize
}

/// Grid positions for a diagonal (rotated-tile) pattern.
///
/// The walk starts one tile before the origin so rotated tiles overlap the
/// top and left edges instead of leaving bare strips.
#[must_use]
pub fn diagonal_positions(canvas: (u32, u32), tile: (u32, u32), spacing: u32) -> Vec<(i32, i32)> {
    let step = spacing.max(1) as i32;
    #[allow(clippy::cast_possible_wrap)]
    let (cw, ch) = (canvas.0 as i32, canvas.1 as i32);
    #[allow(clippy::cast_possible_wrap)]
    let (tw, th) = (tile.0 as i32, tile.1 as i32);

    let mut positions = Vec::new();
    let mut y = -th;
    while y < ch {
        let mut x = -tw;
        while x < cw {
            positions.push((x, y));
            x += step;
        }
        y += step;
    }

    positions
}
