//! # User Interface Elements
//!
//! Menus, heart icons and event messages.

use crate::game::{GameEvent, ItemKind};
use crate::input::MenuCommand;
use macroquad::prelude::*;

/// One heart slot of the health bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartIcon {
    Full,
    Half,
    Empty,
}

/// Heart slots for `health` half-hearts out of `max_health`.
///
/// # Examples
///
/// ```
/// use reverie::{heart_icons, HeartIcon};
///
/// assert_eq!(heart_icons(3, 6), vec![HeartIcon::Full, HeartIcon::Half, HeartIcon::Empty]);
/// ```
pub fn heart_icons(health: i32, max_health: i32) -> Vec<HeartIcon> {
    let slots = (max_health.max(0) + 1) / 2;
    (0..slots)
        .map(|slot| match health - slot * 2 {
            remaining if remaining >= 2 => HeartIcon::Full,
            1 => HeartIcon::Half,
            _ => HeartIcon::Empty,
        })
        .collect()
}

/// A line for the message area, for events worth telling the player about.
pub fn describe_event(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::EnemyKilled { kind, drops, .. } => Some(format!("The {} fades, leaving {} fragments", kind, drops)),
        GameEvent::BuffPurchased { kind, cost } => {
            Some(format!("Bought {} for {}: {}", kind, cost, kind.description()))
        }
        GameEvent::ItemCollected {
            kind: ItemKind::Heart,
            value,
        } => Some(format!("Recovered {} half hearts", value)),
        GameEvent::RoomEntered { first_visit: true, .. } => Some("A new room".to_string()),
        GameEvent::GameOver => Some("You woke up".to_string()),
        _ => None,
    }
}

/// Entries of the top-level menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Start,
    MapMaker,
    NewRun,
    MainMenu,
    Quit,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Start => "Start",
            MenuItem::MapMaker => "Map Maker",
            MenuItem::NewRun => "New Run",
            MenuItem::MainMenu => "Main Menu",
            MenuItem::Quit => "Quit",
        }
    }
}

/// A vertical list menu with a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
    pub selected: usize,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
            selected: 0,
        }
    }

    pub fn main_menu() -> Self {
        Self::new("Reverie", vec![MenuItem::Start, MenuItem::MapMaker, MenuItem::Quit])
    }

    pub fn game_over() -> Self {
        Self::new("Game Over", vec![MenuItem::NewRun, MenuItem::MainMenu, MenuItem::Quit])
    }

    /// Moves the cursor (wrapping) or returns the chosen item.
    pub fn apply(&mut self, command: MenuCommand) -> Option<MenuItem> {
        if self.items.is_empty() {
            return None;
        }
        match command {
            MenuCommand::Previous => {
                self.selected = (self.selected + self.items.len() - 1) % self.items.len();
                None
            }
            MenuCommand::Next => {
                self.selected = (self.selected + 1) % self.items.len();
                None
            }
            MenuCommand::Select => self.items.get(self.selected).copied(),
            MenuCommand::Back => None,
        }
    }

    pub fn render(&self, subtitle: Option<&str>) {
        clear_background(Color::new(0.06, 0.04, 0.1, 1.0));
        let center_x = screen_width() / 2.0;
        let mut y = screen_height() / 3.0;

        let title = measure_text(&self.title, None, 64, 1.0);
        draw_text(&self.title, center_x - title.width / 2.0, y, 64.0, WHITE);
        y += 50.0;

        if let Some(subtitle) = subtitle {
            let size = measure_text(subtitle, None, 24, 1.0);
            draw_text(subtitle, center_x - size.width / 2.0, y, 24.0, LIGHTGRAY);
            y += 40.0;
        }

        for (index, item) in self.items.iter().enumerate() {
            y += 44.0;
            let color = if index == self.selected { YELLOW } else { GRAY };
            let size = measure_text(item.label(), None, 36, 1.0);
            draw_text(item.label(), center_x - size.width / 2.0, y, 36.0, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::EnemyKind;

    #[test]
    fn test_heart_icons() {
        assert_eq!(heart_icons(6, 6), vec![HeartIcon::Full; 3]);
        assert_eq!(heart_icons(0, 4), vec![HeartIcon::Empty; 2]);
        assert_eq!(heart_icons(-3, 2), vec![HeartIcon::Empty]);
        assert_eq!(heart_icons(5, 7).len(), 4);
    }

    #[test]
    fn test_menu_wraps_and_selects() {
        let mut menu = Menu::main_menu();
        assert_eq!(menu.apply(MenuCommand::Previous), None);
        assert_eq!(menu.apply(MenuCommand::Select), Some(MenuItem::Quit));
        menu.apply(MenuCommand::Next);
        assert_eq!(menu.apply(MenuCommand::Select), Some(MenuItem::Start));
        assert_eq!(menu.apply(MenuCommand::Back), None);
    }

    #[test]
    fn test_describe_event() {
        let coin = GameEvent::ItemCollected {
            kind: ItemKind::Money,
            value: 1,
        };
        assert_eq!(describe_event(&coin), None);
        let killed = GameEvent::EnemyKilled {
            enemy: crate::game::new_entity_id(),
            kind: EnemyKind::Gloom,
            drops: 2,
        };
        assert!(describe_event(&killed).unwrap().contains("2 fragments"));
    }
}
