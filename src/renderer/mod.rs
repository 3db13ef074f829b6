//! Rendering intents
//!
//! The scene is described as a flat list of draw commands. Hosts implement
//! `Canvas` on top of whatever surface they have (a 2D canvas context, a
//! terminal, a test recorder). Drawing never touches simulation state.

pub mod scene;

pub use scene::{FrameInfo, draw_error, draw_frame};

use glam::Vec2;

use crate::sim::Rect;

/// RGBA, 0.0 - 1.0
pub type Color = [f32; 4];

/// Opaque color from 0xRRGGBB
pub const fn hex(rgb: u32) -> Color {
    [
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

/// Same color with a different alpha
pub const fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha]
}

pub const WHITE: Color = hex(0xFFFFFF);
pub const BLACK: Color = hex(0x000000);
pub const RED: Color = hex(0xFF0000);
pub const GREEN: Color = hex(0x00FF00);
pub const GOLD: Color = hex(0xFFD700);

/// Sprite identities; hosts without images fall back to colored boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteId {
    Player,
    Enemy { tier: u8 },
    Bonus,
}

impl SpriteId {
    /// Placeholder color when no image is loaded
    pub fn fallback_color(&self) -> Color {
        match self {
            SpriteId::Player => hex(0x33CCFF),
            SpriteId::Enemy { tier: 3 } => hex(0xFF66CC),
            SpriteId::Enemy { tier: 2 } => hex(0x66FF66),
            SpriteId::Enemy { .. } => hex(0xFFFF66),
            SpriteId::Bonus => hex(0xFF3333),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing request
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface
    Clear { color: Color },
    /// Image sprite; `frame` selects the animation phase
    Sprite {
        sprite: SpriteId,
        rect: Rect,
        frame: u8,
    },
    FillRect { rect: Rect, color: Color },
    /// Text anchored at `pos` (baseline)
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Color,
        align: TextAlign,
    },
}

/// A surface that accepts draw commands
pub trait Canvas {
    fn draw(&mut self, command: DrawCommand);
}

/// Recording canvas
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All text drawn, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Sprites with the given identity
    pub fn sprites(&self, id: SpriteId) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { sprite, .. } if *sprite == id))
            .count()
    }
}

impl Canvas for DrawList {
    fn draw(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(0xFF0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(with_alpha(WHITE, 0.5)[3], 0.5);
    }

    #[test]
    fn test_draw_list_records() {
        let mut list = DrawList::new();
        list.draw(DrawCommand::Clear { color: BLACK });
        list.draw(DrawCommand::Text {
            text: "hi".into(),
            pos: Vec2::ZERO,
            size: 12.0,
            color: WHITE,
            align: TextAlign::Left,
        });
        assert_eq!(list.len(), 2);
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["hi"]);
        list.clear();
        assert!(list.is_empty());
    }
}
