//! Destructible barriers
//!
//! A barrier is a bag of small square segments, each with its own integrity.
//! Segments are removed as they wear out; an empty barrier stays in place.

use serde::{Deserialize, Serialize};

use super::collision::overlaps;
use super::rect::Rect;
use crate::consts::*;

/// One destructible cell of a barrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub rect: Rect,
    /// Remaining hits (SEGMENT_INTEGRITY..=1; removed at 0)
    pub integrity: u8,
}

impl Segment {
    /// Display tint for the remaining integrity, as 0xRRGGBB
    pub fn tint(&self) -> u32 {
        segment_tint(self.integrity)
    }
}

/// Color ramp from fresh to nearly destroyed
pub fn segment_tint(integrity: u8) -> u32 {
    match integrity {
        3 => 0x00CC00,
        2 => 0x009900,
        1 => 0x006600,
        _ => 0x00FF00,
    }
}

/// A barrier standing between the ship and the formation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrier {
    pub x: f32,
    pub y: f32,
    /// Segments in storage order (row-major at construction)
    pub segments: Vec<Segment>,
}

impl Barrier {
    /// Build the classic arch: clipped top corners and a notch at the bottom
    pub fn new(x: f32, y: f32) -> Self {
        let mut segments = Vec::with_capacity(SEGMENT_ROWS * SEGMENT_COLS);
        for row in 0..SEGMENT_ROWS {
            for col in 0..SEGMENT_COLS {
                let corner = row < 2 && (col == 0 || col == SEGMENT_COLS - 1);
                let notch = row >= 4 && (3..=4).contains(&col);
                if corner || notch {
                    continue;
                }
                segments.push(Segment {
                    rect: Rect::new(
                        x + col as f32 * SEGMENT_SIZE,
                        y + row as f32 * SEGMENT_SIZE,
                        SEGMENT_SIZE,
                        SEGMENT_SIZE,
                    ),
                    integrity: SEGMENT_INTEGRITY,
                });
            }
        }
        Self { x, y, segments }
    }

    /// Apply one hit from `projectile`
    ///
    /// Scans segments in storage order and damages only the first overlapping
    /// one, removing it when its integrity runs out. Returns whether anything
    /// was hit.
    pub fn test_hit(&mut self, projectile: &Rect) -> bool {
        let Some(idx) = self
            .segments
            .iter()
            .position(|seg| overlaps(&seg.rect, projectile))
        else {
            return false;
        };

        let segment = &mut self.segments[idx];
        segment.integrity = segment.integrity.saturating_sub(1);
        if segment.integrity == 0 {
            self.segments.remove(idx);
        }
        true
    }

    /// No segments left
    pub fn is_destroyed(&self) -> bool {
        self.segments.is_empty()
    }
}

/// The standard row of barriers for a fresh game
pub fn standard_barriers() -> Vec<Barrier> {
    (0..BARRIER_COUNT)
        .map(|i| Barrier::new(BARRIER_ORIGIN_X + i as f32 * BARRIER_SPACING, BARRIER_Y))
        .collect()
}
