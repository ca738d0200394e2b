//! # Display Management
//!
//! Screen management and 2D rendering of rooms with macroquad. Every entity is
//! drawn as a colored shape in layer order; the room is scaled to fit the
//! window.

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH, TILE_HEIGHT, TILE_WIDTH};
use crate::game::{
    AnimationState, Catalog, Entity, GameState, GridPosition, Layer, LevelSnapshot, Player, Room, TileRole,
};
use crate::generation::MapGrid;
use crate::rendering::{heart_icons, HeartIcon};
use macroquad::prelude::*;

/// Macroquad display manager for the game.
pub struct MacroquadDisplay {
    /// Window pixels per room pixel
    pub scale: f32,
    /// Recent event messages, oldest first
    pub messages: Vec<String>,
    /// Maximum number of messages to keep
    pub max_messages: usize,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadDisplay {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            messages: Vec::new(),
            max_messages: 100,
        }
    }

    /// Recomputes the room scale from the current window size.
    pub fn update_scale(&mut self) {
        self.scale = (screen_width() / SCREEN_WIDTH).min(screen_height() / SCREEN_HEIGHT);
    }

    /// Renders the complete play screen.
    pub fn render_game(&mut self, game_state: &GameState, show_map: bool) {
        self.update_scale();
        clear_background(BLACK);

        self.render_room(&game_state.room, game_state.catalog());
        self.render_player(&game_state.player);
        self.render_projectiles(&game_state.room);
        self.render_hud(&game_state.player);
        if show_map {
            self.render_map_overlay(&game_state.map, game_state.level_position);
        }
        self.render_messages();
    }

    /// Renders a snapshot without simulating it. Used by the map maker.
    pub fn render_preview(&mut self, snapshot: &LevelSnapshot, catalog: &Catalog) {
        self.update_scale();
        clear_background(BLACK);
        let mut rng = crate::generation::utils::create_rng(&Default::default());
        match Room::from_snapshot(snapshot, catalog, &mut rng) {
            Ok(room) => self.render_room(&room, catalog),
            Err(err) => {
                log::warn!("Cannot preview level: {}", err);
                draw_text("Level cannot be displayed", 20.0, 40.0, 28.0, RED);
            }
        }
    }

    fn rect(&self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        draw_rectangle(x * self.scale, y * self.scale, w * self.scale, h * self.scale, color);
    }

    fn entity(&self, entity: &dyn Entity) {
        let bounds = entity.bounds();
        let mut color = layer_color(entity.layer());
        if matches!(entity.animation_state(), AnimationState::Dying | AnimationState::Exploding) {
            color.a = 0.4;
        }
        match entity.layer() {
            Layer::Enemy | Layer::Item | Layer::Projectile | Layer::Player => {
                let center = bounds.center();
                draw_circle(
                    center.x * self.scale,
                    center.y * self.scale,
                    bounds.w.min(bounds.h) / 2.0 * self.scale,
                    color,
                );
            }
            _ => self.rect(bounds.x, bounds.y, bounds.w, bounds.h, color),
        }
    }

    /// Draws the background and every entity of `room` below the player.
    pub fn render_room(&self, room: &Room, catalog: &Catalog) {
        for (row, tiles) in room.tiles.iter().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                let color = match catalog.tile(&tile.index).map(|spec| spec.role) {
                    Ok(TileRole::Floor) => Color::new(0.16, 0.13, 0.22, 1.0),
                    Ok(TileRole::Wall) => Color::new(0.35, 0.3, 0.45, 1.0),
                    Ok(TileRole::Door) => Color::new(0.7, 0.55, 0.2, 1.0),
                    Err(_) => MAGENTA,
                };
                self.rect(col as f32 * TILE_WIDTH, row as f32 * TILE_HEIGHT, TILE_WIDTH, TILE_HEIGHT, color);
            }
        }

        room.traps.iter().for_each(|trap| self.entity(trap));
        room.enemies.iter().for_each(|enemy| self.entity(enemy));
        room.debris.iter().for_each(|debris| self.entity(debris));
        room.shrubs.iter().for_each(|shrub| self.entity(shrub));
        room.items.iter().for_each(|item| self.entity(item));
        for buff in &room.buffs {
            self.entity(buff);
            let bounds = buff.bounds();
            draw_text(
                &format!("{} ({})", buff.kind, buff.cost),
                bounds.x * self.scale,
                (bounds.bottom() + 18.0) * self.scale,
                18.0 * self.scale,
                WHITE,
            );
        }
    }

    fn render_player(&self, player: &Player) {
        if player.is_invulnerable() && (player.invulnerable_remaining / 4) % 2 == 1 {
            return;
        }
        self.entity(player);
        let grip = player.weapon.position();
        let tip = grip + crate::Vector2::from_angle(player.weapon.angle).scale_to_length(22.0);
        draw_line(
            grip.x * self.scale,
            grip.y * self.scale,
            tip.x * self.scale,
            tip.y * self.scale,
            4.0 * self.scale,
            layer_color(Layer::Weapon),
        );
    }

    fn render_projectiles(&self, room: &Room) {
        room.projectiles.iter().for_each(|projectile| self.entity(projectile));
    }

    /// Hearts and the money counter.
    fn render_hud(&self, player: &Player) {
        for (slot, icon) in heart_icons(player.health, player.stats.max_health).into_iter().enumerate() {
            let x = 20.0 + slot as f32 * 34.0;
            let color = match icon {
                HeartIcon::Full => RED,
                HeartIcon::Half => Color::new(0.8, 0.3, 0.3, 1.0),
                HeartIcon::Empty => DARKGRAY,
            };
            draw_circle(x * self.scale, 24.0 * self.scale, 12.0 * self.scale, color);
        }
        draw_text(
            &format!("Fragments: {}", player.money),
            20.0 * self.scale,
            64.0 * self.scale,
            26.0 * self.scale,
            GOLD,
        );
    }

    /// The dungeon map, centered on the current room.
    pub fn render_map_overlay(&self, map: &MapGrid, current: GridPosition) {
        draw_rectangle(0.0, 0.0, screen_width(), screen_height(), Color::new(0.0, 0.0, 0.0, 0.7));
        let cell = 24.0 * self.scale;
        let origin_x = screen_width() / 2.0 - (current.col as f32 + 0.5) * cell;
        let origin_y = screen_height() / 2.0 - (current.row as f32 + 0.5) * cell;

        for room in map.rooms() {
            let x = origin_x + room.position.col as f32 * cell;
            let y = origin_y + room.position.row as f32 * cell;
            let color = if room.position == current {
                YELLOW
            } else if Some(room.position) == map.shop() {
                GOLD
            } else if room.is_visited() || room.position == map.root() {
                LIGHTGRAY
            } else {
                GRAY
            };
            draw_rectangle(x + 2.0, y + 2.0, cell - 4.0, cell - 4.0, color);
        }
    }

    fn render_messages(&self) {
        let line_height = 20.0;
        let base = screen_height() - 3.0 * line_height - 10.0;
        let start = self.messages.len().saturating_sub(3);
        for (i, message) in self.messages[start..].iter().enumerate() {
            draw_text(message, 10.0, base + i as f32 * line_height, 18.0, WHITE);
        }
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }
}

/// Fill color for entities on `layer`.
pub fn layer_color(layer: Layer) -> Color {
    match layer {
        Layer::Background => Color::new(0.16, 0.13, 0.22, 1.0),
        Layer::Wall => Color::new(0.35, 0.3, 0.45, 1.0),
        Layer::Door => Color::new(0.7, 0.55, 0.2, 1.0),
        Layer::Enemy => Color::new(0.55, 0.2, 0.65, 1.0),
        Layer::Debris => BROWN,
        Layer::Shrub => DARKGREEN,
        Layer::Trap => Color::new(0.5, 0.1, 0.1, 1.0),
        Layer::Item => GOLD,
        Layer::Player => SKYBLUE,
        Layer::Weapon => LIGHTGRAY,
        Layer::Buff => PINK,
        Layer::Projectile => WHITE,
    }
}
