// Drag state machine and pointer-to-frame mapping.
// Frames per pixel is derived from the live container width, so resizing mid-drag is honoured.

/// Press state. The snapshot only exists while a press is held.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { press_x: f64, press_index: usize },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }
}

/// Outcome of mapping a drag position to a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep {
    pub pixel_offset: f64,
    pub offset_index: i64,
    pub new_index: usize,
}

/// Maps horizontal drag distance to a frame index with wraparound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMapper {
    number_of_frames: usize,
    invert_movement: bool,
}

impl DragMapper {
    pub fn new(number_of_frames: usize, invert_movement: bool) -> Self {
        DragMapper {
            number_of_frames: number_of_frames.max(1),
            invert_movement,
        }
    }

    /// Frames of rotation per pixel. `None` when the width is not measurable.
    pub fn index_per_pixel(&self, container_width: f64) -> Option<f64> {
        if container_width.is_finite() && container_width > 0.0 {
            Some(self.number_of_frames as f64 / container_width)
        } else {
            None
        }
    }

    /// Frames to shift for a pixel offset: signed remainder, so the magnitude stays below N.
    pub fn offset_index(&self, pixel_offset: f64, container_width: f64) -> Option<i64> {
        let per_pixel = self.index_per_pixel(container_width)?;
        let n = self.number_of_frames as i64;
        let shifted = round_half_up(pixel_offset * per_pixel);
        if !shifted.is_finite() {
            return None;
        }
        let offset = (shifted as i64) % n;
        Some(if self.invert_movement { -offset } else { offset })
    }

    pub fn step(
        &self,
        press_x: f64,
        press_index: usize,
        pointer_x: f64,
        container_width: f64,
    ) -> Option<DragStep> {
        let pixel_offset = pointer_x - press_x;
        let offset_index = self.offset_index(pixel_offset, container_width)?;
        Some(DragStep {
            pixel_offset,
            offset_index,
            new_index: wrap_index(press_index as i64 + offset_index, self.number_of_frames),
        })
    }
}

/// Non-negative modulo into [0, n).
pub fn wrap_index(index: i64, number_of_frames: usize) -> usize {
    index.rem_euclid(number_of_frames.max(1) as i64) as usize
}

// Browsers round halves towards +infinity (-2.5 -> -2), unlike f64::round.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
