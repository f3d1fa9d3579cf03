/// Display rectangle in virtual-screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl MonitorRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Source of the current monitor layout. Results may change between calls.
pub trait MonitorEnumerator {
    fn list_monitor_rects(&self) -> Vec<MonitorRect>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_handles_negative_origins() {
        let left_of_primary = MonitorRect::new(-1280, -200, 0, 824);
        assert_eq!(left_of_primary.width(), 1280);
        assert_eq!(left_of_primary.height(), 1024);
    }
}
