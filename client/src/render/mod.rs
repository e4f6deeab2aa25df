//! Top-down drawing of the sandbox world, menus and toasts

mod palette;

use macroquad::prelude::*;

use crate::engine::sandbox::{EntityKind, SandboxEngine};
use crate::engine::Coords;
use crate::game::MissionManager;
use crate::ui::{NotifyKind, Overlay};
use palette::*;

/// Screen pixels per world unit
const DEFAULT_ZOOM: f32 = 4.0;
const GRID_SPACING: f32 = 25.0;
const MENU_WIDTH: f32 = 420.0;
const ROW_HEIGHT: f32 = 44.0;

/// Status line contents supplied by the host
pub struct HudInfo<'a> {
    pub connection: &'a str,
    pub player_id: Option<&'a str>,
}

pub struct Renderer {
    pub zoom: f32,
}

impl Renderer {
    pub fn new() -> Self {
        Self { zoom: DEFAULT_ZOOM }
    }

    /// World to screen, centered on `focus`; world y grows north
    fn to_screen(&self, focus: Coords, at: Coords) -> (f32, f32) {
        let x = screen_width() / 2.0 + (at.x - focus.x) * self.zoom;
        let y = screen_height() / 2.0 - (at.y - focus.y) * self.zoom;
        (x.floor(), y.floor())
    }

    pub fn render(&self, engine: &SandboxEngine, missions: &MissionManager, overlay: &Overlay, hud: &HudInfo) {
        clear_background(WORLD_BG);
        let focus = engine.player;

        self.draw_grid(focus);
        self.draw_blips(engine, focus);
        self.draw_entities(engine, focus);

        let (px, py) = self.to_screen(focus, focus);
        draw_circle(px, py, 6.0, PLAYER);

        if !overlay.is_menu_open() {
            if let Some((_, interaction)) = engine.nearest_interaction() {
                let prompt = format!("[E] {}", interaction.label);
                let width = measure_text(&prompt, None, 20, 1.0).width;
                draw_text(&prompt, (px - width / 2.0).floor(), py - 18.0, 20.0, TEXT_TITLE);
            }
        }

        self.draw_hud(engine, missions, hud);
        self.draw_menu(overlay);
        self.draw_toasts(overlay);
    }

    fn draw_grid(&self, focus: Coords) {
        let half_w = screen_width() / 2.0 / self.zoom;
        let half_h = screen_height() / 2.0 / self.zoom;

        let mut x = ((focus.x - half_w) / GRID_SPACING).floor() * GRID_SPACING;
        while x < focus.x + half_w {
            let (sx, _) = self.to_screen(focus, Coords::new(x, focus.y, 0.0));
            draw_line(sx, 0.0, sx, screen_height(), 1.0, GRID_LINE);
            x += GRID_SPACING;
        }
        let mut y = ((focus.y - half_h) / GRID_SPACING).floor() * GRID_SPACING;
        while y < focus.y + half_h {
            let (_, sy) = self.to_screen(focus, Coords::new(focus.x, y, 0.0));
            draw_line(0.0, sy, screen_width(), sy, 1.0, GRID_LINE);
            y += GRID_SPACING;
        }
    }

    fn draw_blips(&self, engine: &SandboxEngine, focus: Coords) {
        let (px, py) = self.to_screen(focus, focus);
        for blip in engine.blips() {
            let (bx, by) = self.to_screen(focus, blip.coords);
            draw_line(px, py, bx, by, 2.0, ROUTE);

            // Off-screen blips sit on the screen border
            let cx = bx.clamp(12.0, screen_width() - 12.0);
            let cy = by.clamp(12.0, screen_height() - 12.0);
            draw_poly(cx, cy, 4, 9.0, 45.0, BLIP);
            let distance = blip.coords.distance(&focus);
            draw_text(&format!("{} ({:.0}m)", blip.label, distance), cx + 12.0, cy + 5.0, 18.0, TEXT_NORMAL);
        }
    }

    fn draw_entities(&self, engine: &SandboxEngine, focus: Coords) {
        for (_, entity) in engine.entities() {
            let (x, y) = self.to_screen(focus, entity.position);
            match entity.kind {
                EntityKind::Ped => {
                    draw_circle(x, y, 7.0, PED);
                    draw_text(&entity.model, x + 10.0, y + 4.0, 14.0, TEXT_DIM);
                }
                EntityKind::Object => {
                    draw_rectangle(x - 4.0, y - 4.0, 8.0, 8.0, OBJECT);
                }
            }
        }
    }

    fn draw_hud(&self, engine: &SandboxEngine, missions: &MissionManager, hud: &HudInfo) {
        let p = engine.player;
        let mut lines = vec![
            format!("Server: {}{}", hud.connection, hud.player_id.map(|id| format!(" ({})", id)).unwrap_or_default()),
            format!("Position: {:.1}, {:.1}, {:.1}", p.x, p.y, p.z),
        ];
        match missions.active_mission() {
            Some(mission) => lines.push(format!("Auftrag: {} [{}]", mission.title, missions.step().as_str())),
            None => lines.push("Kein Auftrag".to_string()),
        }
        lines.push("WASD bewegen | E interagieren | F5 neu laden | F6 NPC neu".to_string());

        for (i, line) in lines.iter().enumerate() {
            draw_text(line, 10.0, 22.0 + i as f32 * 20.0, 18.0, if i == 3 { TEXT_DIM } else { TEXT_NORMAL });
        }
    }

    fn draw_menu(&self, overlay: &Overlay) {
        let Some(menu) = overlay.menu() else {
            return;
        };

        let height = menu.items.len() as f32 * ROW_HEIGHT + 16.0;
        let x = (screen_width() - MENU_WIDTH - 24.0).floor();
        let y = ((screen_height() - height) / 2.0).floor();

        draw_rectangle(x, y, MENU_WIDTH, height, PANEL_BG_DARK);
        draw_rectangle_lines(x, y, MENU_WIDTH, height, 2.0, FRAME_MID);

        let mut number = 0;
        for (index, item) in menu.items.iter().enumerate() {
            let row_y = y + 8.0 + index as f32 * ROW_HEIGHT;
            if item.is_menu_header {
                draw_rectangle(x + 2.0, row_y, MENU_WIDTH - 4.0, ROW_HEIGHT - 2.0, HEADER_BG);
            } else if index == menu.selected {
                draw_rectangle(x + 2.0, row_y, MENU_WIDTH - 4.0, ROW_HEIGHT - 2.0, ROW_SELECTED);
            }

            let header = if item.is_selectable() {
                number += 1;
                format!("{}. {}", number, item.header)
            } else {
                item.header.clone()
            };
            let color = if item.is_menu_header { TEXT_TITLE } else { TEXT_NORMAL };
            draw_text(&header, x + 12.0, row_y + 18.0, 20.0, color);
            if let Some(txt) = &item.txt {
                draw_text(&truncate(txt, 58), x + 12.0, row_y + 36.0, 16.0, TEXT_DIM);
            }
        }

        if !menu.options.hide_footer {
            draw_text("Enter auswählen | Esc schließen", x + 12.0, y + height + 18.0, 16.0, TEXT_DIM);
        }
    }

    fn draw_toasts(&self, overlay: &Overlay) {
        let width = 460.0;
        let x = ((screen_width() - width) / 2.0).floor();
        let mut y = screen_height() - 60.0;

        for toast in overlay.toasts().collect::<Vec<_>>().into_iter().rev() {
            let color = match toast.notification.kind {
                NotifyKind::Success => NOTIFY_SUCCESS,
                NotifyKind::Error => NOTIFY_ERROR,
                NotifyKind::Primary => NOTIFY_PRIMARY,
                NotifyKind::Warning => NOTIFY_WARNING,
            };
            draw_rectangle(x, y, width, 34.0, color);
            draw_text(&truncate(&toast.notification.text, 60), x + 10.0, y + 22.0, 18.0, WHITE);
            y -= 40.0;
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
