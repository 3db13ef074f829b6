//! Invader Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use invader_rush::audio::{AudioManager, WebAudioBackend};
    use invader_rush::consts::*;
    use invader_rush::persistence::{LocalStorage, MemoryStorage};
    use invader_rush::renderer::{Canvas, Color, DrawCommand, TextAlign, draw_error};
    use invader_rush::sim::GameState;
    use invader_rush::{Game, HighScoreStore, ScoreBook, Settings};

    /// `Canvas` over a 2D context; sprites are drawn as colored boxes
    #[derive(Clone)]
    struct Canvas2d {
        ctx: CanvasRenderingContext2d,
    }

    fn css(color: Color) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            (color[0] * 255.0).round() as u8,
            (color[1] * 255.0).round() as u8,
            (color[2] * 255.0).round() as u8,
            color[3]
        )
    }

    impl Canvas for Canvas2d {
        fn draw(&mut self, command: DrawCommand) {
            let ctx = &self.ctx;
            match command {
                DrawCommand::Clear { color } => {
                    ctx.set_fill_style_str(&css(color));
                    ctx.fill_rect(0.0, 0.0, FIELD_WIDTH as f64, FIELD_HEIGHT as f64);
                }
                DrawCommand::Sprite { sprite, rect, frame } => {
                    ctx.set_fill_style_str(&css(sprite.fallback_color()));
                    // Two-frame squash for the formation animation
                    let inset = if frame == 1 { 2.0 } else { 0.0 };
                    ctx.fill_rect(
                        (rect.left() + inset) as f64,
                        rect.top() as f64,
                        (rect.size.x - inset * 2.0) as f64,
                        rect.size.y as f64,
                    );
                }
                DrawCommand::FillRect { rect, color } => {
                    ctx.set_fill_style_str(&css(color));
                    ctx.fill_rect(
                        rect.left() as f64,
                        rect.top() as f64,
                        rect.size.x as f64,
                        rect.size.y as f64,
                    );
                }
                DrawCommand::Text {
                    text,
                    pos,
                    size,
                    color,
                    align,
                } => {
                    ctx.set_fill_style_str(&css(color));
                    ctx.set_font(&format!("{}px \"Press Start 2P\", monospace", size));
                    ctx.set_text_align(match align {
                        TextAlign::Left => "left",
                        TextAlign::Center => "center",
                        TextAlign::Right => "right",
                    });
                    let _ = ctx.fill_text(&text, pos.x as f64, pos.y as f64);
                }
            }
        }
    }

    struct App {
        game: Game,
        canvas: Canvas2d,
    }

    fn score_store() -> Box<dyn HighScoreStore> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(ScoreBook::new(storage)),
            Err(err) => {
                log::warn!("{err}; high scores will not persist");
                Box::new(ScoreBook::new(MemoryStorage::new()))
            }
        }
    }

    fn load_settings() -> Settings {
        match LocalStorage::open() {
            Ok(storage) => Settings::load(&storage),
            Err(_) => Settings::default(),
        }
    }

    /// Keys whose browser default (scrolling, help) is suppressed
    const CAPTURED_KEYS: [&str; 7] = [
        "ArrowUp",
        "ArrowDown",
        "ArrowLeft",
        "ArrowRight",
        " ",
        "Enter",
        "F1",
    ];

    const STARTUP_FAILED: &str = "FAILED TO START THE GAME.\nPLEASE RELOAD THE PAGE.";

    pub fn run() -> Result<(), JsValue> {
        invader_rush::platform::init_logging();
        log::info!("Invader Rush starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let ctx = match canvas_context(&document) {
            Ok(ctx) => ctx,
            Err(err) => {
                log::error!("Canvas setup failed: {:?}", err);
                // No surface to draw on; report in the page itself
                if let Some(root) = document.document_element() {
                    let _ = root.insert_adjacent_html(
                        "beforeend",
                        "<p style=\"color:#fff;background:#c00;padding:1em\">Failed to start the game. Please reload the page.</p>",
                    );
                }
                return Err(err);
            }
        };

        let mut canvas = Canvas2d { ctx };
        if let Err(err) = start(canvas.clone()) {
            log::error!("Startup failed: {:?}", err);
            draw_error(STARTUP_FAILED, &mut canvas);
            return Err(err);
        }

        log::info!("Invader Rush running!");
        Ok(())
    }

    fn canvas_context(document: &web_sys::Document) -> Result<CanvasRenderingContext2d, JsValue> {
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);
        Ok(canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?)
    }

    fn start(canvas: Canvas2d) -> Result<(), JsValue> {
        let seed = js_sys::Date::now() as u64;
        let settings = load_settings();
        let game = Game::with_parts(
            GameState::new(seed),
            settings,
            AudioManager::new(Box::new(WebAudioBackend::new())),
            score_store(),
        );
        let app = Rc::new(RefCell::new(App { game, canvas }));

        setup_input_handlers(app.clone())?;
        request_animation_frame(app);
        Ok(())
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Key down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut a = app.borrow_mut();
                a.game.resume_audio();
                a.game.key_down(&key);
                if CAPTURED_KEYS.contains(&key.as_str()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().game.key_up(&event.key());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Auto-pause on blur
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().game.focus_lost();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let App { game, canvas } = &mut *a;
            game.frame(time, canvas);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use invader_rush::persistence::{FileStorage, MemoryStorage};
    use invader_rush::platform::Action;
    use invader_rush::renderer::DrawList;
    use invader_rush::sim::{GameEvent, GameState, Mode};
    use invader_rush::{Game, HighScoreStore, ScoreBook, Settings, Tuning};

    /// Headless attract-mode run of the simulation
    #[derive(Parser, Debug)]
    #[command(name = "invader-rush", version, about)]
    pub struct Args {
        /// RNG seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,

        /// Frames to simulate
        #[arg(long, default_value_t = 3600)]
        frames: u64,

        /// Directory for high scores and settings (in-memory when omitted)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Simulated time per frame (ms)
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        frame_ms: f64,

        /// JSON file overriding balance values
        #[arg(long)]
        tuning: Option<PathBuf>,
    }

    #[derive(Debug, Default)]
    struct Summary {
        runs: u32,
        kills: u32,
        bonuses: u32,
        levels: u32,
        best: u64,
    }

    impl Summary {
        fn record(&mut self, event: &GameEvent) {
            match event {
                GameEvent::EnemyDestroyed { .. } => self.kills += 1,
                GameEvent::BonusDestroyed { .. } => self.bonuses += 1,
                GameEvent::LevelCleared { .. } => self.levels += 1,
                GameEvent::ModeChanged { to, .. } if to.is_finished() => self.runs += 1,
                _ => {}
            }
        }
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path.display()))?;
        Tuning::from_json(&json).with_context(|| format!("loading tuning from {}", path.display()))
    }

    pub fn run() -> Result<()> {
        invader_rush::platform::init_logging();
        let args = Args::parse();

        let seed = args
            .seed
            .unwrap_or_else(|| invader_rush::platform::now_epoch_ms() as u64);
        let tuning = load_tuning(args.tuning.as_ref())?;
        anyhow::ensure!(args.frame_ms > 0.0, "--frame-ms must be positive");

        let file_storage = match &args.data_dir {
            Some(dir) => Some(
                FileStorage::open(dir)
                    .with_context(|| format!("opening data dir {}", dir.display()))?,
            ),
            None => None,
        };
        let (settings, scores): (Settings, Box<dyn HighScoreStore>) = match &file_storage {
            Some(storage) => (
                Settings::load(storage),
                Box::new(ScoreBook::new(storage.clone())),
            ),
            None => (
                Settings::default(),
                Box::new(ScoreBook::new(MemoryStorage::new())),
            ),
        };

        log::info!("Invader Rush (headless) seed {} for {} frames", seed, args.frames);

        let mut game = Game::with_parts(
            GameState::with_tuning(seed, tuning),
            settings,
            Default::default(),
            scores,
        );
        game.set_idle_mode(true);

        let mut canvas = DrawList::new();
        let mut summary = Summary::default();
        let mut now = 0.0;
        for _ in 0..args.frames {
            now += args.frame_ms;

            // Tap restart once a run has ended
            game.input_mut().release(Action::Restart);
            if game.state().mode.current() == Mode::GameOver {
                game.input_mut().press(Action::Restart);
            }

            canvas.clear();
            for event in game.frame(now, &mut canvas) {
                summary.record(&event);
            }
            summary.best = summary.best.max(game.state().session.score);
        }

        log::info!(
            "Done: {} finished runs, {} kills, {} bonus craft, {} levels cleared, best score {}",
            summary.runs,
            summary.kills,
            summary.bonuses,
            summary.levels,
            summary.best
        );
        println!(
            "seed={} frames={} score={} level={} best={}",
            seed,
            args.frames,
            game.state().session.score,
            game.state().session.level,
            summary.best
        );

        if let Some(mut storage) = file_storage {
            game.settings()
                .save(&mut storage)
                .context("saving settings")?;
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
