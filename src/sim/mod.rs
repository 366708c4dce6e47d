//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Variable timestep supplied by the host
//! - Seeded RNG only
//! - Entities owned in flat lists, cross-referenced by id
//! - No rendering or platform dependencies; feedback leaves as events

pub mod ballistics;
pub mod bullet;
pub mod collision;
pub mod director;
pub mod enemy;
pub mod events;
pub mod particle;
pub mod pickup;
pub mod player;
pub mod state;
pub mod tick;

pub use ballistics::{Ballistics, BulletKind, MAX_BULLET_LEVEL, Side};
pub use bullet::Bullet;
pub use collision::{Collider, circles_overlap, colliding, resolve_collisions};
pub use director::{SpawnDirector, roll_drops};
pub use enemy::{BossPhase, Enemy, EnemyKind, FirePattern, MovePattern};
pub use events::{GameEvent, Haptic, Sound};
pub use particle::{Burst, Particle, Star};
pub use pickup::{PowerUp, PowerUpKind, display_name_for};
pub use player::{Arsenal, DamageOutcome, Player, PlayerIntent, PlayerSlot};
pub use state::{EntityId, GameMode, GamePhase, GameState};
pub use tick::{TickInput, activate_bomb, tick};
