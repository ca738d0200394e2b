//! Effects of pickups and shop buffs on the player.

use crate::game::{Buff, BuffKind, Item, ItemKind, Player};

/// A permanent change to the player's stats.
pub type BuffEffect = fn(&mut Player);

/// What a pickup does to the player, given the pickup's value.
pub type ItemEffect = fn(&mut Player, i32);

impl BuffKind {
    pub fn effect(self) -> BuffEffect {
        match self {
            BuffKind::Nova => nova,
            BuffKind::Haste => haste,
            BuffKind::Vigor => vigor,
            BuffKind::Scope => scope,
            BuffKind::Rapid => rapid,
        }
    }

    /// Short shop label.
    pub fn description(self) -> &'static str {
        match self {
            BuffKind::Nova => "+1 damage, slower shots",
            BuffKind::Haste => "+1 speed",
            BuffKind::Vigor => "+1 heart",
            BuffKind::Scope => "+range, tighter spread",
            BuffKind::Rapid => "faster shots",
        }
    }
}

impl ItemKind {
    pub fn effect(self) -> ItemEffect {
        match self {
            ItemKind::Money => add_money,
            ItemKind::Heart => restore_health,
        }
    }
}

fn nova(player: &mut Player) {
    player.stats.damage += 1;
    player.stats.cooldown += 5;
}

fn haste(player: &mut Player) {
    player.stats.speed += 1.0;
}

fn vigor(player: &mut Player) {
    player.stats.max_health += 2;
    player.health += 2;
}

fn scope(player: &mut Player) {
    player.stats.range += 150.0;
    player.stats.accuracy = (player.stats.accuracy - 2.0).max(0.0);
}

fn rapid(player: &mut Player) {
    player.stats.cooldown = player.stats.cooldown.saturating_sub(5).max(4);
    player.stats.shot_speed += 2.0;
}

fn add_money(player: &mut Player, value: i32) {
    player.money = player.money.saturating_add_signed(value);
}

fn restore_health(player: &mut Player, value: i32) {
    player.heal(value);
}

/// Applies a pickup to the player.
pub fn collect_item(player: &mut Player, item: &Item) {
    (item.kind.effect())(player, item.value);
}

/// Buys `buff` if the player can afford it. Returns whether the purchase
/// went through.
pub fn purchase_buff(player: &mut Player, buff: &Buff) -> bool {
    if !buff.affordable_by(player) {
        return false;
    }
    player.money -= buff.cost;
    (buff.kind.effect())(player);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PlayerStats;
    use crate::Vector2;

    fn player() -> Player {
        Player::new(PlayerStats::default(), Vector2::new(100.0, 100.0))
    }

    #[test]
    fn test_money_pickup() {
        let mut player = player();
        collect_item(&mut player, &Item::new(ItemKind::Money, 3, Vector2::zero()));
        assert_eq!(player.money, 3);
    }

    #[test]
    fn test_heart_pickup_is_capped() {
        let mut player = player();
        player.health = 3;
        collect_item(&mut player, &Item::new(ItemKind::Heart, 2, Vector2::zero()));
        assert_eq!(player.health, 5);
        collect_item(&mut player, &Item::new(ItemKind::Heart, 2, Vector2::zero()));
        assert_eq!(player.health, player.stats.max_health);
    }

    #[test]
    fn test_purchase_requires_money() {
        let mut player = player();
        let buff = Buff::new(BuffKind::Nova, 10, Vector2::zero());
        assert!(!purchase_buff(&mut player, &buff));
        assert_eq!(player.stats.damage, 1);

        player.money = 12;
        assert!(purchase_buff(&mut player, &buff));
        assert_eq!(player.money, 2);
        assert_eq!(player.stats.damage, 2);
        assert_eq!(player.stats.cooldown, 25);
    }

    #[test]
    fn test_every_buff_changes_stats() {
        for kind in BuffKind::ALL {
            let mut player = player();
            let before = (player.stats, player.health);
            (kind.effect())(&mut player);
            assert_ne!((player.stats, player.health), before, "{:?} had no effect", kind);
        }
    }
}
