mod game;
mod input;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::{DomBackend, WebRenderer};

use game::ClickerGame;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use time::GameTime;

/// Query the grid container's bounding rect and convert pixel coordinates
/// to a terminal cell. DomBackend creates a <div> grid inside <body>.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let game = Rc::new(RefCell::new(ClickerGame::new()));
    #[cfg(target_arch = "wasm32")]
    game.borrow_mut().load_persisted();

    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let game_time = Rc::new(RefCell::new(GameTime::new(10)));
    let autosave_ticks = Rc::new(RefCell::new(0u32));

    let backend = DomBackend::new()?;
    let terminal = ratzilla::ratatui::Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let action = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                .and_then(|(col, row)| cs.hit_test(col, row));
            drop(cs);

            if let Some(action) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(action));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let mut g = game.borrow_mut();

            // Fixed-timestep animation + autosave cadence
            let ticks = game_time.borrow_mut().update(now_ms());
            g.tick(ticks);

            let mut pending = autosave_ticks.borrow_mut();
            *pending += ticks;
            if *pending >= game::save::AUTOSAVE_INTERVAL {
                *pending = 0;
                #[cfg(target_arch = "wasm32")]
                game::save::save_progress(&g.state);
            }
            drop(pending);

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            g.render(f, size, &click_state);
        }
    });

    Ok(())
}
