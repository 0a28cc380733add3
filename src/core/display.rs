use crate::models::{Rect, Size};

// Auto-hidden taskbars reserve no work area.
pub const FALLBACK_TASKBAR_THICKNESS: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub screen: Size,
    pub work_area: Rect,
}

impl DisplayMetrics {
    pub const fn new(screen: Size, work_area: Rect) -> Self {
        Self { screen, work_area }
    }

    pub fn from_physical(
        screen: (u32, u32),
        work_position: (i32, i32),
        work_size: (u32, u32),
        scale_factor: f64,
    ) -> Self {
        let sf = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let logical = |v: f64| (v / sf).round() as i32;

        Self {
            screen: Size::new(logical(screen.0 as f64), logical(screen.1 as f64)),
            work_area: Rect::new(
                logical(work_position.0 as f64),
                logical(work_position.1 as f64),
                logical(work_size.0 as f64),
                logical(work_size.1 as f64),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl TaskbarEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Taskbar {
    pub edge: TaskbarEdge,
    pub thickness: i32,
}

/// Edges are checked top, bottom, left, right.
pub fn taskbar_position(metrics: &DisplayMetrics) -> Taskbar {
    let screen = metrics.screen;
    let work = metrics.work_area;

    if work.y > 0 {
        return Taskbar {
            edge: TaskbarEdge::Top,
            thickness: work.y,
        };
    }
    if work.height < screen.height {
        return Taskbar {
            edge: TaskbarEdge::Bottom,
            thickness: screen.height - work.height,
        };
    }
    if work.x > 0 {
        return Taskbar {
            edge: TaskbarEdge::Left,
            thickness: work.x,
        };
    }
    if work.width < screen.width {
        return Taskbar {
            edge: TaskbarEdge::Right,
            thickness: screen.width - work.width,
        };
    }

    Taskbar {
        edge: TaskbarEdge::Bottom,
        thickness: FALLBACK_TASKBAR_THICKNESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(work: Rect) -> DisplayMetrics {
        DisplayMetrics::new(Size::new(1920, 1080), work)
    }

    #[test]
    fn detects_each_edge() {
        let bottom = taskbar_position(&metrics(Rect::new(0, 0, 1920, 1032)));
        assert_eq!(bottom, Taskbar { edge: TaskbarEdge::Bottom, thickness: 48 });

        let top = taskbar_position(&metrics(Rect::new(0, 30, 1920, 1050)));
        assert_eq!(top, Taskbar { edge: TaskbarEdge::Top, thickness: 30 });

        let left = taskbar_position(&metrics(Rect::new(62, 0, 1858, 1080)));
        assert_eq!(left, Taskbar { edge: TaskbarEdge::Left, thickness: 62 });

        let right = taskbar_position(&metrics(Rect::new(0, 0, 1860, 1080)));
        assert_eq!(right, Taskbar { edge: TaskbarEdge::Right, thickness: 60 });
    }

    #[test]
    fn top_wins_over_bottom_when_both_differ() {
        // a top menu bar also shortens the work area height
        let t = taskbar_position(&metrics(Rect::new(0, 25, 1920, 1055)));
        assert_eq!(t.edge, TaskbarEdge::Top);
    }

    #[test]
    fn full_work_area_assumes_bottom_bar() {
        let t = taskbar_position(&metrics(Rect::new(0, 0, 1920, 1080)));
        assert_eq!(
            t,
            Taskbar {
                edge: TaskbarEdge::Bottom,
                thickness: FALLBACK_TASKBAR_THICKNESS
            }
        );
    }

    #[test]
    fn edge_names_match_the_log_vocabulary() {
        let names: Vec<_> = [
            TaskbarEdge::Top,
            TaskbarEdge::Bottom,
            TaskbarEdge::Left,
            TaskbarEdge::Right,
        ]
        .iter()
        .map(TaskbarEdge::as_str)
        .collect();
        assert_eq!(names, vec!["top", "bottom", "left", "right"]);
    }

    #[test]
    fn physical_geometry_is_scaled_to_logical() {
        let m = DisplayMetrics::from_physical((2880, 1620), (0, 0), (2880, 1548), 1.5);
        assert_eq!(m.screen, Size::new(1920, 1080));
        assert_eq!(m.work_area, Rect::new(0, 0, 1920, 1032));

        let unscaled = DisplayMetrics::from_physical((800, 600), (0, 0), (800, 560), f64::NAN);
        assert_eq!(unscaled.screen, Size::new(800, 600));
    }
}
