use super::display::{taskbar_position, DisplayMetrics, TaskbarEdge};
use crate::models::{Corner, Point, Rect, Size};

pub const CORNER_MARGIN: i32 = 4;

pub const COMPACT_SIZE: Size = Size::new(200, 48);
pub const EXPANDED_SIZE: Size = Size::new(340, 540);
pub const SETTINGS_PANEL_SIZE: Size = Size::new(560, 720);
pub const SETTINGS_PANEL_MIN_HEIGHT: i32 = 520;
pub const SETTINGS_PANEL_VERTICAL_INSET: i32 = 48;

pub fn widget_size(expanded: bool) -> Size {
    if expanded {
        EXPANDED_SIZE
    } else {
        COMPACT_SIZE
    }
}

pub fn is_widget_size(size: Size) -> bool {
    size == COMPACT_SIZE || size == EXPANDED_SIZE
}

/// Vertical taskbars fall back to the work-area corner even when snapping.
/// The result is not clamped.
pub fn corner_position(
    metrics: &DisplayMetrics,
    corner: Corner,
    size: Size,
    snap_to_taskbar: bool,
) -> Point {
    let screen = metrics.screen;
    let work = metrics.work_area;
    let taskbar = taskbar_position(metrics);

    let snapped_x = || {
        if corner.is_left() {
            CORNER_MARGIN
        } else {
            screen.width - size.width - CORNER_MARGIN
        }
    };

    if snap_to_taskbar {
        match taskbar.edge {
            TaskbarEdge::Bottom => return Point::new(snapped_x(), screen.height - size.height),
            TaskbarEdge::Top => return Point::new(snapped_x(), 0),
            TaskbarEdge::Left | TaskbarEdge::Right => {}
        }
    }

    let left = work.x + CORNER_MARGIN;
    let right = work.right() - size.width - CORNER_MARGIN;
    let top = work.y + CORNER_MARGIN;
    let bottom = work.bottom() - size.height - CORNER_MARGIN;

    match corner {
        Corner::TopLeft => Point::new(left, top),
        Corner::TopRight => Point::new(right, top),
        Corner::BottomRight => Point::new(right, bottom),
        Corner::BottomLeft => Point::new(left, bottom),
    }
}

pub fn clamp_to_screen(point: Point, size: Size, metrics: &DisplayMetrics) -> Point {
    let max_x = metrics.screen.width - size.width;
    let max_y = metrics.screen.height - size.height;

    let x = if max_x < 0 { 0 } else { point.x.clamp(0, max_x) };
    let y = if max_y < 0 { 0 } else { point.y.clamp(0, max_y) };
    Point::new(x, y)
}

pub fn place(metrics: &DisplayMetrics, corner: Corner, size: Size, snap_to_taskbar: bool) -> Point {
    clamp_to_screen(
        corner_position(metrics, corner, size, snap_to_taskbar),
        size,
        metrics,
    )
}

pub fn settings_panel_bounds(metrics: &DisplayMetrics, current_x: i32) -> Rect {
    let work = metrics.work_area;
    let height = SETTINGS_PANEL_SIZE
        .height
        .min(SETTINGS_PANEL_MIN_HEIGHT.max(work.height - SETTINGS_PANEL_VERTICAL_INSET));
    let y = work.y.max(work.y + (work.height - height).div_euclid(2));
    let x = work
        .x
        .max(current_x.min(work.right() - SETTINGS_PANEL_SIZE.width));

    Rect::new(x, y, SETTINGS_PANEL_SIZE.width, height)
}
