//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Tolerance used when comparing accumulated sim time against deadlines,
/// so that summing `DT` does not push a deadline one tick late.
pub const TIME_EPSILON: f64 = 1e-9;

// --- Guidance ---

/// Rate constant of the exponential velocity smoothing (1/s).
/// The blend factor per tick is `1 - exp(-rate * dt)`.
pub const VELOCITY_SMOOTHING_RATE: f64 = 5.0;

/// Below this separation the unit holds its heading instead of steering.
pub const MIN_STEER_DISTANCE: f64 = 1e-6;

/// Missile collision radius at `missile_size = 1.0` (world units).
pub const MISSILE_BASE_RADIUS: f64 = 0.5;

/// Radius of the random offset applied around the launch origin on spawn.
pub const SPAWN_JITTER_RADIUS: f64 = 0.3;

// --- Blocks ---

/// Collision radius of a block (world units).
pub const BLOCK_RADIUS: f64 = 0.5;

/// Default block mass used for impact impulses.
pub const DEFAULT_BLOCK_MASS: f64 = 1.0;

/// Linear velocity damping for pushed blocks (1/s).
pub const BLOCK_LINEAR_DAMPING: f64 = 2.0;

/// Spacing between blocks in generated grid levels (world units).
pub const LEVEL_GRID_SPACING: f64 = 2.0;

// --- Allocation ---

/// Default number of guidance unit slots in the missile arena.
/// Covers one full round at the maximum missile count with headroom.
pub const DEFAULT_ARENA_CAPACITY: usize = 32;

// --- Config bounds ---

pub const MISSILE_COUNT_MIN: u32 = 1;
pub const MISSILE_COUNT_MAX: u32 = 10;
pub const ROTATION_SPEED_MIN: f64 = 50.0;
pub const ROTATION_SPEED_MAX: f64 = 500.0;
pub const MAX_LIFETIME_MIN: f64 = 5.0;
pub const MAX_LIFETIME_MAX: f64 = 30.0;
pub const IMPACT_FORCE_MIN: f64 = 0.0;
pub const IMPACT_FORCE_MAX: f64 = 20.0;
pub const SPAWN_DELAY_MIN: f64 = 0.1;
pub const SPAWN_DELAY_MAX: f64 = 1.0;
pub const MISSILE_SIZE_MIN: f64 = 0.1;
pub const MISSILE_SIZE_MAX: f64 = 2.0;
pub const CAMERA_TRACKING_MIN: f64 = 1.0;
pub const CAMERA_TRACKING_MAX: f64 = 10.0;
