//! Terminal world explorer using ratatui
//!
//! Walk a player around the world with the arrow keys. Each terminal cell
//! shows one tile. Chunks are generated as the camera reaches them, a ring
//! around the view is generated a few chunks per frame, and far chunks are
//! evicted when a cache limit is configured.

use std::error::Error;
use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::camera::{Camera, Vec2};
use crate::chunk::{ChunkGenerator, ChunkSource};
use crate::config::WorldConfig;
use crate::export::export_region_image;
use crate::seeds::WorldSeed;
use crate::terrain::TerrainSymbol;
use crate::viewport::VisibleRegion;
use crate::world::WorldMap;

/// Chunks generated ahead of the camera on every side
const PREFETCH_RING: i32 = 1;
/// Tiles moved per key press with Shift / PgUp / PgDn / Home / End
const FAST_STEP: f64 = 10.0;
/// Pixels per tile in exported screenshots
const EXPORT_SCALE: u32 = 4;

/// Darker background from a terrain color so the glyph stays readable.
fn make_bg_color(r: u8, g: u8, b: u8) -> Color {
    let factor = 0.35;
    Color::Rgb(
        (r as f32 * factor) as u8,
        (g as f32 * factor) as u8,
        (b as f32 * factor) as u8,
    )
}

/// Slightly brighter foreground for dark backgrounds.
fn make_fg_color(r: u8, g: u8, b: u8) -> Color {
    let brighten = |c: u8| -> u8 { (c as u16 + 40).min(255) as u8 };
    Color::Rgb(brighten(r), brighten(g), brighten(b))
}

fn terrain_style(terrain: TerrainSymbol) -> Style {
    let (r, g, b) = terrain.color();
    Style::default().fg(make_fg_color(r, g, b)).bg(make_bg_color(r, g, b))
}

/// Explorer state: the world, the camera, and the player it follows.
struct Explorer<S: ChunkSource> {
    world: WorldMap<S>,
    camera: Camera,
    player: Vec2,
    generation_budget: usize,
    show_help: bool,
    message: Option<String>,
}

impl<S: ChunkSource> Explorer<S> {
    fn new(world: WorldMap<S>, config: &WorldConfig, player: Vec2) -> Self {
        let camera = world.camera(config.viewport_width, config.viewport_height);
        Self {
            world,
            camera,
            player,
            generation_budget: config.generation_budget,
            show_help: false,
            message: None,
        }
    }

    fn tile_size(&self) -> f64 {
        self.world.layout().tile_size
    }

    /// Move the player by a number of tiles, slowed down in liquid terrain.
    fn move_player(&mut self, dx: f64, dy: f64) {
        let here = self.world.tile_at(self.player.x, self.player.y);
        let step = self.tile_size() * here.speed_multiplier();
        let (x, y) = self
            .world
            .clamp_position(self.player.x + dx * step, self.player.y + dy * step);
        self.player = Vec2::new(x, y);
    }

    /// Per-frame world upkeep for a map view of `cols` x `rows` cells.
    ///
    /// Returns the visible region, which is fully resident afterwards.
    fn update_frame(&mut self, cols: u16, rows: u16) -> VisibleRegion {
        let tile = self.tile_size();
        self.camera.resize(cols as f64 * tile, rows as f64 * tile);
        self.camera.follow(self.player);

        let region = self.world.visible_region(&self.camera);
        self.world.ensure_region(&region);

        let ring = region.expanded(PREFETCH_RING);
        if let Some(ring) = self.world.clip_region(&ring) {
            self.world.request_region(&ring);
        }
        self.world.pump_pending(self.generation_budget);
        self.world.retain_near(&ring);

        region
    }

    /// Glyph and style for one map cell.
    fn cell_display(&self, col: u16, row: u16) -> (char, Style) {
        let tile = self.tile_size();
        let center = self.camera.screen_to_world(Vec2::new(
            col as f64 * tile + tile / 2.0,
            row as f64 * tile + tile / 2.0,
        ));

        let player_col = ((self.player.x - self.camera.offset.x) / tile).floor();
        let player_row = ((self.player.y - self.camera.offset.y) / tile).floor();
        if player_col == col as f64 && player_row == row as f64 {
            return ('@', Style::default().fg(Color::Black).bg(Color::Yellow));
        }

        match self.world.peek_tile(center.x, center.y) {
            Some(terrain) => (terrain.ascii_char(), terrain_style(terrain)),
            None => (' ', Style::default().bg(Color::Black)),
        }
    }

    fn render_map(&self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let (ch, style) = self.cell_display(col, row);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char(ch).set_style(style);
                }
            }
        }
    }

    fn status_line(&self) -> String {
        let coord = self.world.chunk_coords_of(self.player.x, self.player.y);
        let biome = self
            .world
            .chunk(coord)
            .map(|chunk| chunk.biome.as_str())
            .unwrap_or("?");
        let tile = match self.world.peek_tile(self.player.x, self.player.y) {
            Some(terrain) if terrain.is_plantable() => format!("{} (plantable)", terrain.display_name()),
            Some(terrain) => terrain.display_name().to_string(),
            None => "-".to_string(),
        };
        let msg = self.message.as_ref().map(|m| format!(" | {}", m)).unwrap_or_default();

        format!(
            " ({:.0},{:.0}) chunk {} {} | {} | {}{} | ?:Help  E:Export  Q:Quit",
            self.player.x,
            self.player.y,
            coord,
            biome,
            tile,
            self.world.stats().summary(),
            msg,
        )
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let help_text = [
            "=== Chunk World Explorer ===",
            "",
            "Movement:",
            "  Arrow keys / WASD / HJKL - Walk one tile",
            "  Shift+direction, PgUp/PgDn, Home/End - Run",
            "  Water slows you down",
            "",
            "Other:",
            "  E - Export current view as PNG",
            "  ? - Toggle this help",
            "  Q / Esc - Quit",
            "",
            "Legend:",
            "  ~ Water   % Swamp water   . Light grass",
            "  \" Dark grass   : Soil   @ You",
            "",
            "Press any key to close",
        ];

        let width = 50;
        let height = help_text.len() as u16 + 2;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let help_area = Rect::new(x, y, width.min(area.width), height.min(area.height));

        Clear.render(help_area, buf);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::DarkGray));

        let inner = block.inner(help_area);
        block.render(help_area, buf);

        for (i, line) in help_text.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            buf.set_string(inner.x, inner.y + i as u16, line, Style::default().fg(Color::White));
        }
    }
}

impl<S: ChunkSource + Sync> Explorer<S> {
    fn export_view(&mut self, filename: &str) {
        let region = self.world.visible_region(&self.camera);
        self.message = Some(match export_region_image(&mut self.world, &region, EXPORT_SCALE, filename) {
            Ok(()) => format!("Exported: {}", filename),
            Err(e) => format!("Export failed: {}", e),
        });
    }
}

/// Run `body`, then always run `restore`. The body's error wins over the
/// restore error.
fn run_restoring<T>(
    body: impl FnOnce() -> Result<T, Box<dyn Error>>,
    restore: impl FnOnce() -> io::Result<()>,
) -> Result<T, Box<dyn Error>> {
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

/// Leave the alternate screen and raw mode.
fn restore_terminal() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}

/// Run the interactive explorer until the user quits.
///
/// The terminal is restored on every exit path, including errors.
pub fn run_explorer(world: WorldMap, config: &WorldConfig, start: Vec2) -> Result<(), Box<dyn Error>> {
    let seed = world.seed();
    let mut explorer = Explorer::new(world, config, start);

    terminal::enable_raw_mode()?;
    run_restoring(|| explore(&mut explorer, seed), restore_terminal)
}

fn explore(explorer: &mut Explorer<ChunkGenerator>, seed: WorldSeed) -> Result<(), Box<dyn Error>> {
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        let size = terminal.size()?;
        explorer.update_frame(size.width, size.height.saturating_sub(1));

        terminal.draw(|f| {
            let main_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(f.area());

            let map_area = main_chunks[0];
            let status_area = main_chunks[1];

            explorer.render_map(map_area, f.buffer_mut());

            let status_para = Paragraph::new(explorer.status_line())
                .style(Style::default().bg(Color::DarkGray).fg(Color::White));
            f.render_widget(status_para, status_area);

            if explorer.show_help {
                explorer.render_help(map_area, f.buffer_mut());
            }
        })?;

        explorer.message = None;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if explorer.show_help {
                    explorer.show_help = false;
                    continue;
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('?') => explorer.show_help = true,

                    KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => explorer.move_player(0.0, -1.0),
                    KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => explorer.move_player(0.0, 1.0),
                    KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => explorer.move_player(-1.0, 0.0),
                    KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => explorer.move_player(1.0, 0.0),

                    KeyCode::PageUp | KeyCode::Char('W') | KeyCode::Char('K') => explorer.move_player(0.0, -FAST_STEP),
                    KeyCode::PageDown | KeyCode::Char('S') | KeyCode::Char('J') => explorer.move_player(0.0, FAST_STEP),
                    KeyCode::Home | KeyCode::Char('A') | KeyCode::Char('H') => explorer.move_player(-FAST_STEP, 0.0),
                    KeyCode::End | KeyCode::Char('D') | KeyCode::Char('L') => explorer.move_player(FAST_STEP, 0.0),

                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        let coord = explorer.world.chunk_coords_of(explorer.player.x, explorer.player.y);
                        let filename = format!("chunkworld_{}_{}_{}.png", seed, coord.x, coord.y);
                        explorer.export_view(&filename);
                    }

                    _ => {}
                }
            }
        }
    }

    Ok(())
}
