//! Domestic simulation events
//!
//! The simulation step reports what happened during a tick as a flat event
//! list. The synchronization layer is the only consumer that turns these
//! into wire messages; the UI collaborator may observe them too.

use crate::sim::entities::{GamePhase, ObjectId, Player};

/// A locally-detected event, expressed in the local coordinate frame.
/// Position payloads are looked up in the entity store by ID at encode
/// time, so events never carry stale coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A locally-owned ball entered play
    BallSpawned { id: ObjectId },
    /// A locally-owned ball changed direction (bounce, paddle hit)
    BallMoved { id: ObjectId },
    /// A locally-owned ball left the bottom edge
    BallKilled { id: ObjectId },
    /// A tile took a hit from a locally-owned ball or bullet
    TileHit { id: ObjectId, destroyed: bool },
    /// A bonus box dropped from a locally-destroyed tile
    BonusBoxSpawned { id: ObjectId },
    /// The local paddle caught a bonus box
    BonusBoxPickup { id: ObjectId },
    /// The local paddle fired a left/right bullet pair
    BulletsFired {
        left_id: ObjectId,
        right_id: ObjectId,
        y: f32,
    },
    /// A locally-owned bullet hit a tile or left the board
    BulletKilled { id: ObjectId },
    /// A player lost a life (UI observes this; not sent on the wire)
    LifeLost { player: Player },
    /// The coarse game phase changed
    PhaseChanged { phase: GamePhase },
    /// No destroyable tile remains on the local board
    LevelDone,
}
