//! # Content Catalog
//!
//! Static content tables: room archetypes with their door masks, background
//! tile passability patterns, and the stat blocks for the player, enemies,
//! buffs, items and breakable debris.
//!
//! Every entity in a level file is referenced by an *index* string. The
//! catalog is the single place those strings are resolved into typed content;
//! everything past the load boundary works with the enums below.

use crate::game::Direction;
use crate::{ReverieError, ReverieResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which sides of a room have a door, ordered (up, right, down, left).
///
/// Serialized as a `[u8; 4]` of zeros and ones, e.g. `[1, 0, 1, 0]` for a
/// vertical corridor.
///
/// # Examples
///
/// ```
/// use reverie::{Direction, DoorMask};
///
/// let mask = DoorMask::new(true, false, true, false);
/// assert!(mask.has(Direction::Up));
/// assert!(!mask.has(Direction::Right));
/// assert_eq!(mask.open_count(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct DoorMask {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

impl DoorMask {
    pub const fn new(up: bool, right: bool, down: bool, left: bool) -> Self {
        Self { up, right, down, left }
    }

    /// Whether the room has a door on `direction`.
    pub fn has(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Right => self.right,
            Direction::Down => self.down,
            Direction::Left => self.left,
        }
    }

    pub fn set(&mut self, direction: Direction, open: bool) {
        match direction {
            Direction::Up => self.up = open,
            Direction::Right => self.right = open,
            Direction::Down => self.down = open,
            Direction::Left => self.left = open,
        }
    }

    /// Number of doors in the mask.
    pub fn open_count(&self) -> usize {
        Direction::all().iter().filter(|direction| self.has(**direction)).count()
    }

    /// A room with a single door is a dead end.
    pub fn is_dead_end(&self) -> bool {
        self.open_count() == 1
    }
}

impl From<[u8; 4]> for DoorMask {
    fn from(bits: [u8; 4]) -> Self {
        Self::new(bits[0] != 0, bits[1] != 0, bits[2] != 0, bits[3] != 0)
    }
}

impl From<DoorMask> for [u8; 4] {
    fn from(mask: DoorMask) -> Self {
        [mask.up as u8, mask.right as u8, mask.down as u8, mask.left as u8]
    }
}

/// Whether an archetype is an ordinary room or a special one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Basic,
    Shop,
}

/// A named room template: the level file it loads and the doors it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomArchetype {
    pub name: String,
    pub doors: DoorMask,
    pub kind: RoomKind,
}

impl RoomArchetype {
    pub fn new(name: impl Into<String>, doors: DoorMask, kind: RoomKind) -> Self {
        Self {
            name: name.into(),
            doors,
            kind,
        }
    }
}

/// How a background tile takes part in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileRole {
    /// Plain background, nothing spawned
    Floor,
    /// Spawns a wall obstacle
    Wall,
    /// Spawns a door that leads to the neighbouring room
    Door,
}

/// Background tile definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub role: TileRole,
    /// Walkability of the tile's 2×2 quadrants, indexed `[row][col]`.
    pub passability: [[bool; 2]; 2],
}

impl TileSpec {
    pub const fn open(role: TileRole) -> Self {
        Self {
            role,
            passability: [[true, true], [true, true]],
        }
    }

    pub const fn solid(role: TileRole) -> Self {
        Self {
            role,
            passability: [[false, false], [false, false]],
        }
    }
}

/// Movement archetype of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Heads straight for the player when in sight
    Chase,
    /// Drifts to random nearby points
    Wander,
    /// Drifts until the player comes into sight
    WanderChase,
    /// Chases from a distance
    RangedChase,
}

impl MovementType {
    /// Whether the enemy picks random wander targets.
    pub fn wanders(self) -> bool {
        matches!(self, MovementType::Wander | MovementType::WanderChase)
    }

    /// Whether the enemy heads for the player once it is in sight.
    pub fn chases(self) -> bool {
        !matches!(self, MovementType::Wander)
    }

    /// Whether bumping into a wall triggers a pathfinding detour rather than
    /// a snap back.
    pub fn pathfinds_around_walls(self) -> bool {
        matches!(self, MovementType::Chase | MovementType::RangedChase)
    }
}

/// Error returned when an index string names no known content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content index '{0}'")]
pub struct UnknownIndex(pub String);

impl From<UnknownIndex> for ReverieError {
    fn from(err: UnknownIndex) -> Self {
        ReverieError::Configuration(err.to_string())
    }
}

/// Declares a content enum whose variants map one-to-one onto level-file
/// index strings.
macro_rules! content_kind {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $index:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $index)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The index string level files use for this content.
            pub fn as_index(self) -> &'static str {
                match self {
                    $($name::$variant => $index),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownIndex;

            fn from_str(index: &str) -> Result<Self, Self::Err> {
                match index {
                    $($index => Ok($name::$variant),)+
                    other => Err(UnknownIndex(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_index())
            }
        }
    };
}

content_kind! {
    /// Enemy archetypes.
    EnemyKind {
        Gloom => "gloom",
        Lurker => "lurker",
        Drifter => "drifter",
        Sentinel => "sentinel",
    }
}

content_kind! {
    /// Shop buffs. Each one permanently changes the player's stats.
    BuffKind {
        Nova => "nova",
        Haste => "haste",
        Vigor => "vigor",
        Scope => "scope",
        Rapid => "rapid",
    }
}

content_kind! {
    /// Pickups lying around a room.
    ItemKind {
        Money => "money",
        Heart => "heart",
    }
}

/// Stat block of an enemy archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub health: i32,
    pub movement: MovementType,
    /// Line-of-sight range in pixels
    pub aggro_distance: f32,
    /// Pixels per tick
    pub speed: f32,
    pub collision_damage: i32,
    /// Upper bound on the money drops rolled at death
    pub value: u32,
    /// Ticks between wander targets
    pub movement_cooldown: u32,
    pub size: (f32, f32),
}

/// Price of a shop buff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffSpec {
    pub cost: u32,
}

/// Value carried by a pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub value: i32,
}

/// A breakable decoration and the index it leaves behind once broken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebrisSpec {
    pub remains: String,
}

/// Player stat block. The catalog holds the starting values; buffs modify the
/// copy carried by the live [`Player`](crate::Player).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Maximum health in half hearts
    pub max_health: i32,
    pub damage: i32,
    /// Ticks between shots
    pub cooldown: u32,
    /// Pixels per tick
    pub speed: f32,
    /// Maximum projectile travel in pixels
    pub range: f32,
    /// Projectile pixels per tick
    pub shot_speed: f32,
    /// Maximum spread in degrees either side of the aim line
    pub accuracy: f32,
    /// Ticks of invulnerability after taking damage
    pub invulnerable_cooldown: u32,
    /// Pixels an enemy is pushed back by a hit
    pub knockback: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_health: 6,
            damage: 1,
            cooldown: 20,
            speed: 5.0,
            range: 500.0,
            shot_speed: 10.0,
            accuracy: 4.0,
            invulnerable_cooldown: 40,
            knockback: 6.0,
        }
    }
}

/// Tile names procedural layouts are drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPalette {
    pub floor: String,
    pub wall: String,
    pub door: String,
    pub pillar: String,
    /// Non-breakable shrub indices
    pub shrubs: Vec<String>,
    pub traps: Vec<String>,
}

impl Default for RoomPalette {
    fn default() -> Self {
        Self {
            floor: "floor".to_string(),
            wall: "wall".to_string(),
            door: "door".to_string(),
            pillar: "pillar".to_string(),
            shrubs: vec!["fern".to_string(), "dreamcap".to_string()],
            traps: vec!["thorns".to_string()],
        }
    }
}

/// All static content of the game.
///
/// # Examples
///
/// ```
/// use reverie::{Catalog, DoorMask, RoomKind};
///
/// let catalog = Catalog::builtin();
/// catalog.validate().unwrap();
///
/// let four_way = DoorMask::new(true, true, true, true);
/// assert!(!catalog.archetypes_matching(four_way, RoomKind::Basic).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub rooms: Vec<RoomArchetype>,
    pub tiles: BTreeMap<String, TileSpec>,
    pub enemies: BTreeMap<EnemyKind, EnemyStats>,
    pub buffs: BTreeMap<BuffKind, BuffSpec>,
    pub items: BTreeMap<ItemKind, ItemSpec>,
    pub debris: BTreeMap<String, DebrisSpec>,
    pub player: PlayerStats,
    #[serde(default)]
    pub palette: RoomPalette,
}

/// Name of the archetype planted in the root cell of every map.
pub const ROOT_ARCHETYPE: &str = "4_way";

/// Buff index that resolves to a random purchasable buff at load time.
pub const RANDOM_BUFF_INDEX: &str = "random";

impl Catalog {
    /// The content the game ships with.
    pub fn builtin() -> Self {
        let basic = |name: &str, bits: [u8; 4]| RoomArchetype::new(name, DoorMask::from(bits), RoomKind::Basic);
        let shop = |name: &str, bits: [u8; 4]| RoomArchetype::new(name, DoorMask::from(bits), RoomKind::Shop);

        let rooms = vec![
            basic("end_up", [1, 0, 0, 0]),
            basic("end_right", [0, 1, 0, 0]),
            basic("end_down", [0, 0, 1, 0]),
            basic("end_left", [0, 0, 0, 1]),
            basic("hall_vertical", [1, 0, 1, 0]),
            basic("hall_vertical_garden", [1, 0, 1, 0]),
            basic("hall_horizontal", [0, 1, 0, 1]),
            basic("hall_horizontal_garden", [0, 1, 0, 1]),
            basic("corner_up_right", [1, 1, 0, 0]),
            basic("corner_right_down", [0, 1, 1, 0]),
            basic("corner_down_left", [0, 0, 1, 1]),
            basic("corner_left_up", [1, 0, 0, 1]),
            basic("t_no_left", [1, 1, 1, 0]),
            basic("t_no_up", [0, 1, 1, 1]),
            basic("t_no_right", [1, 0, 1, 1]),
            basic("t_no_down", [1, 1, 0, 1]),
            basic(ROOT_ARCHETYPE, [1, 1, 1, 1]),
            basic("4_way_pillars", [1, 1, 1, 1]),
            shop("shop_up", [1, 0, 0, 0]),
            shop("shop_right", [0, 1, 0, 0]),
            shop("shop_down", [0, 0, 1, 0]),
            shop("shop_left", [0, 0, 0, 1]),
        ];

        let mut tiles = BTreeMap::new();
        tiles.insert("blank".to_string(), TileSpec::open(TileRole::Floor));
        tiles.insert("floor".to_string(), TileSpec::open(TileRole::Floor));
        tiles.insert("floor_cracked".to_string(), TileSpec::open(TileRole::Floor));
        tiles.insert("carpet".to_string(), TileSpec::open(TileRole::Floor));
        tiles.insert("wall".to_string(), TileSpec::solid(TileRole::Wall));
        tiles.insert("pillar".to_string(), TileSpec::solid(TileRole::Wall));
        tiles.insert(
            "ledge".to_string(),
            TileSpec {
                role: TileRole::Wall,
                passability: [[false, false], [true, true]],
            },
        );
        tiles.insert("door".to_string(), TileSpec::open(TileRole::Door));

        let mut enemies = BTreeMap::new();
        enemies.insert(
            EnemyKind::Gloom,
            EnemyStats {
                health: 3,
                movement: MovementType::Chase,
                aggro_distance: 450.0,
                speed: 2.0,
                collision_damage: 1,
                value: 2,
                movement_cooldown: 60,
                size: (40.0, 40.0),
            },
        );
        enemies.insert(
            EnemyKind::Lurker,
            EnemyStats {
                health: 5,
                movement: MovementType::WanderChase,
                aggro_distance: 300.0,
                speed: 2.5,
                collision_damage: 2,
                value: 3,
                movement_cooldown: 90,
                size: (44.0, 44.0),
            },
        );
        enemies.insert(
            EnemyKind::Drifter,
            EnemyStats {
                health: 2,
                movement: MovementType::Wander,
                aggro_distance: 0.0,
                speed: 1.5,
                collision_damage: 1,
                value: 1,
                movement_cooldown: 45,
                size: (34.0, 34.0),
            },
        );
        enemies.insert(
            EnemyKind::Sentinel,
            EnemyStats {
                health: 8,
                movement: MovementType::RangedChase,
                aggro_distance: 600.0,
                speed: 1.2,
                collision_damage: 2,
                value: 5,
                movement_cooldown: 120,
                size: (48.0, 48.0),
            },
        );

        let mut buffs = BTreeMap::new();
        buffs.insert(BuffKind::Nova, BuffSpec { cost: 10 });
        buffs.insert(BuffKind::Haste, BuffSpec { cost: 6 });
        buffs.insert(BuffKind::Vigor, BuffSpec { cost: 8 });
        buffs.insert(BuffKind::Scope, BuffSpec { cost: 5 });
        buffs.insert(BuffKind::Rapid, BuffSpec { cost: 9 });

        let mut items = BTreeMap::new();
        items.insert(ItemKind::Money, ItemSpec { value: 1 });
        items.insert(ItemKind::Heart, ItemSpec { value: 2 });

        let mut debris = BTreeMap::new();
        debris.insert(
            "crate".to_string(),
            DebrisSpec {
                remains: "crate_splinters".to_string(),
            },
        );
        debris.insert(
            "urn".to_string(),
            DebrisSpec {
                remains: "urn_shards".to_string(),
            },
        );

        Self {
            rooms,
            tiles,
            enemies,
            buffs,
            items,
            debris,
            player: PlayerStats::default(),
            palette: RoomPalette::default(),
        }
    }

    /// Loads a catalog from a JSON file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> ReverieResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let catalog: Catalog = serde_json::from_str(&text)?;
        catalog.validate()?;
        log::info!(
            "Loaded catalog from {} ({} room archetypes)",
            path.as_ref().display(),
            catalog.rooms.len()
        );
        Ok(catalog)
    }

    /// Checks that the tables are complete enough to run a game.
    pub fn validate(&self) -> ReverieResult<()> {
        self.archetype(ROOT_ARCHETYPE)?;

        for archetype in &self.rooms {
            if archetype.doors.open_count() == 0 {
                return Err(ReverieError::Configuration(format!(
                    "room archetype '{}' has no doors",
                    archetype.name
                )));
            }
        }

        for kind in EnemyKind::ALL {
            self.enemy(*kind)?;
        }
        for kind in ItemKind::ALL {
            self.item(*kind)?;
        }
        if self.buffs.is_empty() {
            return Err(ReverieError::Configuration("catalog has no buffs".to_string()));
        }

        let palette = &self.palette;
        for name in [&palette.floor, &palette.wall, &palette.door, &palette.pillar] {
            self.tile(name)?;
        }
        if self.tile(&palette.door)?.role != TileRole::Door {
            return Err(ReverieError::Configuration(format!(
                "palette door tile '{}' is not a door",
                palette.door
            )));
        }

        Ok(())
    }

    /// Looks up a background tile by index.
    pub fn tile(&self, index: &str) -> ReverieResult<&TileSpec> {
        self.tiles
            .get(index)
            .ok_or_else(|| ReverieError::Configuration(format!("no passability pattern for tile '{}'", index)))
    }

    pub fn enemy(&self, kind: EnemyKind) -> ReverieResult<&EnemyStats> {
        self.enemies
            .get(&kind)
            .ok_or_else(|| ReverieError::Configuration(format!("no stats for enemy '{}'", kind)))
    }

    pub fn buff(&self, kind: BuffKind) -> ReverieResult<&BuffSpec> {
        self.buffs
            .get(&kind)
            .ok_or_else(|| ReverieError::Configuration(format!("no price for buff '{}'", kind)))
    }

    pub fn item(&self, kind: ItemKind) -> ReverieResult<&ItemSpec> {
        self.items
            .get(&kind)
            .ok_or_else(|| ReverieError::Configuration(format!("no value for item '{}'", kind)))
    }

    /// Breakable debris definition, if `index` names one.
    pub fn debris(&self, index: &str) -> Option<&DebrisSpec> {
        self.debris.get(index)
    }

    pub fn archetype(&self, name: &str) -> ReverieResult<&RoomArchetype> {
        self.rooms
            .iter()
            .find(|archetype| archetype.name == name)
            .ok_or_else(|| ReverieError::Configuration(format!("unknown room archetype '{}'", name)))
    }

    /// All archetypes of `kind` whose door mask equals `doors` exactly.
    pub fn archetypes_matching(&self, doors: DoorMask, kind: RoomKind) -> Vec<&RoomArchetype> {
        self.rooms
            .iter()
            .filter(|archetype| archetype.kind == kind && archetype.doors == doors)
            .collect()
    }

    /// Buffs a "random" shop slot can resolve to.
    pub fn purchasable_buffs(&self) -> Vec<BuffKind> {
        self.buffs.keys().copied().collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_every_door_mask_has_a_basic_archetype() {
        let catalog = Catalog::builtin();
        for bits in 1u8..16 {
            let mask = DoorMask::from([bits >> 3 & 1, bits >> 2 & 1, bits >> 1 & 1, bits & 1]);
            assert!(
                !catalog.archetypes_matching(mask, RoomKind::Basic).is_empty(),
                "no basic archetype for {:?}",
                mask
            );
        }
    }

    #[test]
    fn test_every_dead_end_has_a_shop() {
        let catalog = Catalog::builtin();
        for direction in Direction::all() {
            let mut mask = DoorMask::default();
            mask.set(direction, true);
            let shops = catalog.archetypes_matching(mask, RoomKind::Shop);
            assert_eq!(shops.len(), 1);
        }
    }

    #[test]
    fn test_door_mask_serialization() {
        let mask = DoorMask::new(true, false, false, true);
        assert_eq!(serde_json::to_string(&mask).unwrap(), "[1,0,0,1]");
        let back: DoorMask = serde_json::from_str("[0,1,1,0]").unwrap();
        assert_eq!(back, DoorMask::new(false, true, true, false));
    }

    #[test]
    fn test_content_index_parsing() {
        assert_eq!("gloom".parse::<EnemyKind>(), Ok(EnemyKind::Gloom));
        assert_eq!("money".parse::<ItemKind>(), Ok(ItemKind::Money));
        assert_eq!(BuffKind::Rapid.as_index(), "rapid");
        assert!("dragon".parse::<EnemyKind>().is_err());
        assert!(RANDOM_BUFF_INDEX.parse::<BuffKind>().is_err());
    }

    #[test]
    fn test_missing_tile_is_configuration_error() {
        let catalog = Catalog::builtin();
        match catalog.tile("lava") {
            Err(ReverieError::Configuration(message)) => assert!(message.contains("lava")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let mut catalog = Catalog::builtin();
        catalog.rooms.retain(|archetype| archetype.name != ROOT_ARCHETYPE);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_movement_type_predicates() {
        assert!(MovementType::Chase.chases());
        assert!(!MovementType::Chase.wanders());
        assert!(MovementType::WanderChase.chases());
        assert!(MovementType::WanderChase.wanders());
        assert!(!MovementType::Wander.chases());
        assert!(MovementType::RangedChase.pathfinds_around_walls());
        assert!(!MovementType::WanderChase.pathfinds_around_walls());
    }
}
