//! Scene composition: game state to draw commands

use glam::Vec2;

use super::{
    BLACK, Canvas, Color, DrawCommand, GOLD, GREEN, RED, SpriteId, TextAlign, WHITE, hex,
    with_alpha,
};
use crate::consts::*;
use crate::sim::{GameState, Mode, ProjectileKind, Rect};

/// Per-frame facts that live outside the simulation
#[derive(Debug, Clone, Default)]
pub struct FrameInfo {
    /// Best stored score
    pub high_score: u64,
    /// Frames per second, for the debug overlay
    pub fps: u32,
    pub show_debug: bool,
    /// Blink the ship while invincible
    pub blink: bool,
}

const HEALTH_BAR_HEIGHT: f32 = 5.0;
const HEALTH_BAR_GAP: f32 = 5.0;
const HEART: Color = hex(0xFF0066);
const HEALTH_LOW: Color = hex(0xFF6600);
const GREY: Color = hex(0xCCCCCC);

fn text(canvas: &mut dyn Canvas, s: String, x: f32, y: f32, size: f32, color: Color, align: TextAlign) {
    canvas.draw(DrawCommand::Text {
        text: s,
        pos: Vec2::new(x, y),
        size,
        color,
        align,
    });
}

fn fill(canvas: &mut dyn Canvas, rect: Rect, color: Color) {
    canvas.draw(DrawCommand::FillRect { rect, color });
}

/// Draw one complete frame
pub fn draw_frame(state: &GameState, info: &FrameInfo, canvas: &mut dyn Canvas) {
    canvas.draw(DrawCommand::Clear { color: BLACK });

    draw_world(state, info, canvas);
    draw_hud(state, info, canvas);

    match state.mode.current() {
        Mode::Paused => draw_pause(state, canvas),
        Mode::GameOver => draw_game_over(state, info, canvas),
        Mode::GameWon => draw_victory(state, canvas),
        Mode::Menu | Mode::Playing => {}
    }

    if info.show_debug {
        draw_debug(state, info, canvas);
    }
}

fn draw_world(state: &GameState, info: &FrameInfo, canvas: &mut dyn Canvas) {
    for barrier in &state.barriers {
        for segment in &barrier.segments {
            fill(canvas, segment.rect, hex(segment.tint()));
        }
    }

    let frame = state.formation.anim_toggle as u8;
    for enemy in &state.enemies {
        canvas.draw(DrawCommand::Sprite {
            sprite: SpriteId::Enemy { tier: enemy.tier },
            rect: enemy.rect,
            frame,
        });
    }

    if state.bonus.active {
        canvas.draw(DrawCommand::Sprite {
            sprite: SpriteId::Bonus,
            rect: state.bonus.rect,
            frame: 0,
        });
    }

    for shot in state.player_shots.active().chain(state.enemy_shots.active()) {
        let color = match shot.kind {
            ProjectileKind::Player => WHITE,
            ProjectileKind::Enemy => RED,
        };
        fill(canvas, shot.rect, color);
    }

    if state.mode.current() != Mode::GameOver {
        draw_player(state, info, canvas);
    }
}

fn draw_player(state: &GameState, info: &FrameInfo, canvas: &mut dyn Canvas) {
    let player = &state.player;
    if !info.blink || player.is_visible() {
        canvas.draw(DrawCommand::Sprite {
            sprite: SpriteId::Player,
            rect: player.rect,
            frame: 0,
        });
    }

    // Health bar under the ship
    let bar_y = player.rect.bottom() + HEALTH_BAR_GAP;
    let width = player.rect.size.x;
    fill(
        canvas,
        Rect::new(player.rect.left(), bar_y, width, HEALTH_BAR_HEIGHT),
        RED,
    );
    let ratio = player.health as f32 / player.max_health.max(1) as f32;
    fill(
        canvas,
        Rect::new(player.rect.left(), bar_y, width * ratio, HEALTH_BAR_HEIGHT),
        GREEN,
    );
}

fn draw_hud(state: &GameState, info: &FrameInfo, canvas: &mut dyn Canvas) {
    let session = &state.session;

    text(
        canvas,
        format!("SCORE: {:06}", session.score),
        20.0,
        30.0,
        20.0,
        WHITE,
        TextAlign::Left,
    );

    let level_color = if session.level > 1 { GOLD } else { WHITE };
    text(
        canvas,
        format!("LEVEL {}", session.level),
        FIELD_WIDTH / 2.0,
        30.0,
        20.0,
        level_color,
        TextAlign::Center,
    );

    text(canvas, "LIVES:".into(), FIELD_WIDTH - 120.0, 30.0, 20.0, WHITE, TextAlign::Right);
    for i in 0..session.lives {
        text(
            canvas,
            "\u{2764}".into(),
            FIELD_WIDTH - 80.0 + i as f32 * 25.0,
            30.0,
            20.0,
            HEART,
            TextAlign::Right,
        );
    }

    if state.mode.current() != Mode::GameOver {
        let player = &state.player;
        let color = if player.health > 3 { GREEN } else { HEALTH_LOW };
        text(
            canvas,
            format!("HEALTH: {}/{}", player.health, player.max_health),
            20.0,
            FIELD_HEIGHT - 20.0,
            16.0,
            color,
            TextAlign::Left,
        );
    }

    if session.score > info.high_score {
        text(
            canvas,
            "NEW HIGH SCORE!".into(),
            FIELD_WIDTH / 2.0,
            55.0,
            14.0,
            GOLD,
            TextAlign::Center,
        );
    }
}

fn dim(canvas: &mut dyn Canvas, color: Color) {
    fill(canvas, Rect::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT), color);
}

fn draw_pause(state: &GameState, canvas: &mut dyn Canvas) {
    let cx = FIELD_WIDTH / 2.0;
    let cy = FIELD_HEIGHT / 2.0;
    let session = &state.session;

    dim(canvas, with_alpha(BLACK, 0.8));
    text(canvas, "PAUSED".into(), cx, cy - 60.0, 40.0, WHITE, TextAlign::Center);
    text(
        canvas,
        "PRESS ENTER TO RESUME".into(),
        cx,
        cy,
        20.0,
        WHITE,
        TextAlign::Center,
    );

    let lines = [
        format!("SCORE: {}", session.score),
        format!("LEVEL: {}", session.level),
        format!("LIVES: {}", session.lives),
        format!("ENEMIES LEFT: {}", state.enemies.len()),
    ];
    for (i, line) in lines.into_iter().enumerate() {
        text(canvas, line, cx, cy + 40.0 + i as f32 * 25.0, 16.0, WHITE, TextAlign::Center);
    }
}

fn draw_game_over(state: &GameState, info: &FrameInfo, canvas: &mut dyn Canvas) {
    let cx = FIELD_WIDTH / 2.0;
    let cy = FIELD_HEIGHT / 2.0;
    let session = &state.session;

    dim(canvas, with_alpha(RED, 0.2));
    text(canvas, "GAME OVER".into(), cx, cy - 60.0, 40.0, RED, TextAlign::Center);
    text(
        canvas,
        format!("FINAL SCORE: {}", session.score),
        cx,
        cy - 10.0,
        20.0,
        WHITE,
        TextAlign::Center,
    );
    text(
        canvas,
        format!("LEVEL REACHED: {}", session.level),
        cx,
        cy + 20.0,
        20.0,
        WHITE,
        TextAlign::Center,
    );

    if session.score > info.high_score {
        text(canvas, "NEW HIGH SCORE!".into(), cx, cy + 50.0, 20.0, GOLD, TextAlign::Center);
    } else {
        text(
            canvas,
            format!("HIGH SCORE: {}", info.high_score),
            cx,
            cy + 50.0,
            20.0,
            GREY,
            TextAlign::Center,
        );
    }

    text(
        canvas,
        "PRESS ENTER TO PLAY AGAIN".into(),
        cx,
        cy + 90.0,
        20.0,
        WHITE,
        TextAlign::Center,
    );
}

fn draw_victory(state: &GameState, canvas: &mut dyn Canvas) {
    let cx = FIELD_WIDTH / 2.0;
    let cy = FIELD_HEIGHT / 2.0;

    dim(canvas, with_alpha(GREEN, 0.2));
    text(canvas, "VICTORY!".into(), cx, cy - 60.0, 40.0, GREEN, TextAlign::Center);
    text(
        canvas,
        format!("FINAL SCORE: {}", state.session.score),
        cx,
        cy - 10.0,
        20.0,
        WHITE,
        TextAlign::Center,
    );
    text(
        canvas,
        format!("LEVEL COMPLETED: {}", state.session.level),
        cx,
        cy + 20.0,
        20.0,
        WHITE,
        TextAlign::Center,
    );
    text(
        canvas,
        "PRESS ENTER TO PLAY AGAIN".into(),
        cx,
        cy + 60.0,
        20.0,
        WHITE,
        TextAlign::Center,
    );
}

/// Terminal error screen, one text line per `\n`-separated line
pub fn draw_error(message: &str, canvas: &mut dyn Canvas) {
    let cx = FIELD_WIDTH / 2.0;
    let cy = FIELD_HEIGHT / 2.0;

    dim(canvas, with_alpha(RED, 0.8));
    text(canvas, "ERROR".into(), cx, cy - 40.0, 20.0, WHITE, TextAlign::Center);
    for (i, line) in message.lines().enumerate() {
        text(canvas, line.to_string(), cx, cy + i as f32 * 25.0, 16.0, WHITE, TextAlign::Center);
    }
}

fn draw_debug(state: &GameState, info: &FrameInfo, canvas: &mut dyn Canvas) {
    text(
        canvas,
        format!("OBJECTS: {}", state.object_count()),
        10.0,
        FIELD_HEIGHT - 25.0,
        12.0,
        WHITE,
        TextAlign::Left,
    );
    text(
        canvas,
        format!("FPS: {}", info.fps),
        10.0,
        FIELD_HEIGHT - 10.0,
        12.0,
        WHITE,
        TextAlign::Left,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DrawList;

    fn render(state: &GameState, info: &FrameInfo) -> DrawList {
        let mut list = DrawList::new();
        draw_frame(state, info, &mut list);
        list
    }

    #[test]
    fn test_playing_frame() {
        let state = GameState::new(1);
        let list = render(&state, &FrameInfo::default());
        assert!(matches!(list.commands()[0], DrawCommand::Clear { .. }));
        assert_eq!(list.sprites(SpriteId::Player), 1);
        assert_eq!(list.sprites(SpriteId::Enemy { tier: 3 }), ENEMY_COLS);
        assert!(list.texts().any(|t| t == "SCORE: 000000"));
        assert!(list.texts().any(|t| t == "HEALTH: 10/10"));
        assert!(!list.texts().any(|t| t == "PAUSED"));
    }

    #[test]
    fn test_blink_hides_ship() {
        let mut state = GameState::new(1);
        state.player.make_invincible(60);
        state.player.blink = 7;
        let blinking = FrameInfo {
            blink: true,
            ..Default::default()
        };
        assert_eq!(render(&state, &blinking).sprites(SpriteId::Player), 0);
        // Reduced motion keeps the ship visible
        assert_eq!(render(&state, &FrameInfo::default()).sprites(SpriteId::Player), 1);
    }

    #[test]
    fn test_overlays() {
        let mut state = GameState::new(1);
        state.set_mode(Mode::Paused);
        let list = render(&state, &FrameInfo::default());
        assert!(list.texts().any(|t| t == "ENEMIES LEFT: 55"));

        state.set_mode(Mode::GameOver);
        let info = FrameInfo {
            high_score: 900,
            ..Default::default()
        };
        let list = render(&state, &info);
        assert!(list.texts().any(|t| t == "GAME OVER"));
        assert!(list.texts().any(|t| t == "HIGH SCORE: 900"));
        assert_eq!(list.sprites(SpriteId::Player), 0);

        state.set_mode(Mode::GameWon);
        assert!(render(&state, &info).texts().any(|t| t == "VICTORY!"));
    }

    #[test]
    fn test_new_high_score_banner() {
        let mut state = GameState::new(1);
        state.session.score = 50;
        let info = FrameInfo {
            high_score: 40,
            ..Default::default()
        };
        assert!(render(&state, &info).texts().any(|t| t == "NEW HIGH SCORE!"));
    }

    #[test]
    fn test_error_screen() {
        let mut list = DrawList::new();
        draw_error("FAILED TO START\nRELOAD", &mut list);
        assert!(matches!(list.commands()[0], DrawCommand::FillRect { .. }));
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["ERROR", "FAILED TO START", "RELOAD"]);
    }

    #[test]
    fn test_debug_overlay() {
        let state = GameState::new(1);
        let info = FrameInfo {
            show_debug: true,
            fps: 59,
            ..Default::default()
        };
        let list = render(&state, &info);
        assert!(list.texts().any(|t| t == "FPS: 59"));
        assert!(list.texts().any(|t| t == "OBJECTS: 55"));
    }
}
