//! Banana Clicker rendering: views, particles, and click-target registration.
//!
//! Pure display layer — it reads `ClickerState`, never mutates it. Every
//! `[X]`-style button rendered here must be registered as a click target
//! (enforced by `tests/lint_render.rs`).

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions;
use super::logic::format_number;
use super::state::{ClickerState, UpgradeId, View, EXCHANGE_RATE_BANANAS, SLOT_COST_DIAMONDS};

const BANANA_ART: [&str; 6] = [
    "      _      ",
    "     //\\     ",
    "    ||  \\    ",
    "    ||   \\   ",
    "     \\\\___\\  ",
    "      `---'  ",
];

pub fn render(
    state: &ClickerState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cs = click_state.borrow_mut();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // balances
            Constraint::Length(1), // tabs
            Constraint::Min(8),    // content
            Constraint::Length(3), // help
        ])
        .split(area);

    render_header(state, f, chunks[0]);
    render_tabs(state, f, chunks[1], &mut cs);

    if is_narrow_layout(area.width) {
        let content = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(6)])
            .split(chunks[2]);
        render_view(state, f, content[0], &mut cs);
        render_log(state, f, content[1]);
    } else {
        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);
        render_view(state, f, content[0], &mut cs);
        render_log(state, f, content[1]);
    }

    render_help(state, f, chunks[3]);
}

fn render_header(state: &ClickerState, f: &mut Frame, area: Rect) {
    let banana_style = if state.click_flash > 0 {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" 🍌 {} ", format_number(state.bananas)),
            banana_style,
        ),
        Span::styled(
            format!("(+{}/クリック) ", format_number(state.gain_per_click())),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!(" 💎 {} ", state.diamonds),
            Style::default().fg(Color::Cyan),
        ),
    ]);

    let border_style = if state.purchase_flash > 0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let header = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn render_tabs(state: &ClickerState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let tab_style = |view: View| {
        if state.view == view {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        }
    };

    TabBar::new(" │ ")
        .tab("バナナ", tab_style(View::Main), actions::TAB_MAIN)
        .tab("ショップ", tab_style(View::Shop), actions::TAB_SHOP)
        .tab("セーブ", tab_style(View::Slots), actions::TAB_SLOTS)
        .tab("ダイヤ", tab_style(View::Diamonds), actions::TAB_DIAMONDS)
        .render(f, area, cs);
}

fn render_view(state: &ClickerState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    match state.view {
        View::Main => render_main(state, f, area, cs),
        View::Shop => render_shop(state, f, area, cs),
        View::Slots => render_slots(state, f, area, cs),
        View::Diamonds => render_diamonds(state, f, area, cs),
    }
}

/// Vertical position of a rising particle within `height` content rows.
/// Fresh particles start at the bottom and rise as life runs out.
fn particle_row(life: u32, max_life: u32, height: u16) -> u16 {
    if max_life == 0 || height == 0 {
        return 0;
    }
    let progress = (max_life - life.min(max_life)) as f32 / max_life as f32;
    let row = ((height - 1) as f32 * (1.0 - progress)) as u16;
    row.min(height - 1)
}

// ── Main view ──────────────────────────────────────────────────

fn render_main(state: &ClickerState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if state.click_flash > 0 {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(" タップでバナナ獲得 ");
    let inner = block.inner(area);

    let height = inner.height.max(1);
    let mut rows: Vec<Line> = vec![Line::from(""); height as usize];

    // Banana art, roughly centered, wobbling with the animation frame
    let art_top = (height as usize).saturating_sub(BANANA_ART.len()) / 2;
    let wobble = if state.anim_frame / 5 % 2 == 0 { " " } else { "  " };
    for (i, art) in BANANA_ART.iter().enumerate() {
        if let Some(row) = rows.get_mut(art_top + i) {
            let pad = (inner.width as usize).saturating_sub(art.len()) / 2;
            *row = Line::from(Span::styled(
                format!("{}{}{}", " ".repeat(pad), wobble, art),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
        }
    }

    // Floating "+N" particles rise from the bottom half
    let center = inner.width / 2;
    for p in &state.particles {
        let row = particle_row(p.life, p.max_life, height) as usize;
        let col = (center as i32 + p.col_offset as i32).max(0) as usize;
        if rows[row].width() == 0 {
            rows[row] = Line::from(Span::styled(
                format!("{}{}", " ".repeat(col), p.text),
                Style::default().fg(Color::Green),
            ));
        }
    }

    f.render_widget(Paragraph::new(rows).block(block), area);

    // The whole panel is one big click target
    cs.add_click_target(area, actions::CLICK_BANANA);
}

// ── Shop view ──────────────────────────────────────────────────

fn render_shop(state: &ClickerState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        "アップグレード（買い切り・永続）",
        Style::default().fg(Color::Gray),
    )));
    cl.push(Line::from(""));

    for (i, id) in UpgradeId::all().iter().enumerate() {
        let owned = state.owns(*id);
        let affordable = state.bananas >= id.cost();

        let style = if owned {
            Style::default().fg(Color::DarkGray)
        } else if affordable {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let status = if owned {
            " ✓ 購入済み".to_string()
        } else {
            format!(" {} バナナ", format_number(id.cost()))
        };

        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!(" [{}] ", id.key()), style),
                Span::styled(format!("{} — {}", id.name(), id.description()), style),
                Span::styled(status, style),
            ]),
            actions::BUY_UPGRADE_BASE + i as u16,
        );
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" ショップ ");
    cl.register_targets(area, cs, 1, 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Save slots view ────────────────────────────────────────────

fn render_slots(state: &ClickerState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let mut cl = ClickableList::new();

    for i in 0..state.slot_count as usize {
        let n = i + 1;
        let preview = state.slot_previews.get(i).and_then(|p| p.as_ref());

        let summary = match preview {
            Some(p) => format!(
                "スロット {} — 🍌 {} / 強化 {}個（{}）",
                n,
                format_number(p.bananas),
                p.upgrade_count,
                p.saved_at
            ),
            None => format!("スロット {} — 空", n),
        };
        cl.push(Line::from(Span::styled(
            summary,
            Style::default().fg(Color::White),
        )));

        let save_key = char::from_digit(n as u32 % 10, 10).unwrap_or('?');
        cl.push_clickable(
            Line::from(Span::styled(
                format!("   [{}] ここにセーブ", save_key),
                Style::default().fg(Color::Yellow),
            )),
            actions::SAVE_SLOT_BASE + i as u16,
        );

        let load_key = (b'A' + (i as u8 % 26)) as char;
        let load_style = if preview.is_some() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        cl.push_clickable(
            Line::from(Span::styled(
                format!("   [{}] ここからロード", load_key),
                load_style,
            )),
            actions::LOAD_SLOT_BASE + i as u16,
        );
        cl.push(Line::from(""));
    }

    let buy_style = if state.diamonds >= SLOT_COST_DIAMONDS {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    cl.push_clickable(
        Line::from(Span::styled(
            format!(" [+] スロットを増設（💎 {}）", SLOT_COST_DIAMONDS),
            buy_style,
        )),
        actions::BUY_SLOT,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" セーブスロット ");
    cl.register_targets(area, cs, 1, 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Diamond shop view ──────────────────────────────────────────

fn render_diamonds(state: &ClickerState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let mut cl = ClickableList::new();

    cl.push(Line::from(Span::styled(
        format!("💎 所持ダイヤ: {}", state.diamonds),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(""));

    cl.push(Line::from(Span::styled(
        format!("購入数: {}（1〜1000）", state.diamond_buy_amount),
        Style::default().fg(Color::White),
    )));
    let amount_style = Style::default().fg(Color::Gray);
    cl.push_clickable(
        Line::from(Span::styled(" [Z] -10", amount_style)),
        actions::DIAMOND_AMOUNT_DEC10,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [X] -1", amount_style)),
        actions::DIAMOND_AMOUNT_DEC,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [C] +1", amount_style)),
        actions::DIAMOND_AMOUNT_INC,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [V] +10", amount_style)),
        actions::DIAMOND_AMOUNT_INC10,
    );
    cl.push(Line::from(""));

    // Real-money purchase is a deliberate stub: rendered dim, always declines.
    cl.push_clickable(
        Line::from(Span::styled(
            format!(" [B] ダイヤを {} 個購入する（準備中）", state.diamond_buy_amount),
            Style::default().fg(Color::DarkGray),
        )),
        actions::BUY_DIAMONDS,
    );
    cl.push(Line::from(""));

    let exchange_style = if state.diamonds >= 1 {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    cl.push_clickable(
        Line::from(Span::styled(
            format!(
                " [E] 💎 1 → 🍌 {} に換金",
                format_number(EXCHANGE_RATE_BANANAS)
            ),
            exchange_style,
        )),
        actions::EXCHANGE_DIAMONDS,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" ダイヤショップ ");
    cl.register_targets(area, cs, 1, 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Log / help ─────────────────────────────────────────────────

fn render_log(state: &ClickerState, f: &mut Frame, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;
    let start = state.log.len().saturating_sub(visible_height);

    let lines: Vec<Line> = state.log[start..]
        .iter()
        .map(|entry| {
            if entry.is_important {
                Line::from(Span::styled(
                    entry.text.as_str(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    entry.text.as_str(),
                    Style::default().fg(Color::Gray),
                ))
            }
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" ログ "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_help(state: &ClickerState, f: &mut Frame, area: Rect) {
    let help_text = match state.view {
        View::Main => "クリック/タップ: バナナ獲得   Q/U/O/P: 画面切替",
        View::Shop => "1〜3: 購入   Q/U/O/P: 画面切替",
        View::Slots => "数字: セーブ  Shift+A〜: ロード  B: 増設   Q/U/O/P: 画面切替",
        View::Diamonds => "Z/X/C/V: 購入数  B: 購入(準備中)  E: 換金   Q/U/O/P: 画面切替",
    };
    let help = Paragraph::new(Line::from(Span::styled(
        help_text,
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(help, area);
}
