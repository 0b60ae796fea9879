// Tick and timing
pub const SIMULATION_TICK_MS: u64 = 16; // ~60 FPS, one step per rendered frame
pub const MAX_FRAME_DT_MS: u64 = 100;
pub const SCORE_INTERVAL_MS: u64 = 1000;
pub const SPAWN_INTERVAL_MS: u64 = 5000;
pub const COLLISION_CUE_MS: u64 = 2000;
pub const JUMP_CUE_MS: u64 = 600;

// Track geometry (world units)
pub const LANE_HALF_WIDTH: f64 = 8.0;
pub const LATERAL_STEP: f64 = 3.0;
pub const SPAWN_DISTANCE: f64 = 80.0;
pub const DESPAWN_DISTANCE: f64 = -20.0;
pub const OBSTACLE_REST_HEIGHT: f64 = 1.0;
pub const PLAYER_START_X: f64 = 0.0;
pub const PLAYER_START_Y: f64 = 0.5;
pub const PLAYER_START_Z: f64 = 0.0;

// Obstacle motion, world units per tick
pub const OBSTACLE_SPEED: f64 = 0.3;

// Collision
pub const COLLISION_RADIUS: f64 = 2.0;

// Extra-life puzzle
pub const MAX_PUZZLE_ATTEMPTS: u32 = 3;

// Character unlock thresholds
pub const GREEN_UNLOCK_SCORE: u64 = 50;
pub const BLUE_UNLOCK_SCORE: u64 = 100;
pub const RED_UNLOCK_SCORE: u64 = 150;

// Leaderboards and history
pub const LEADERBOARD_SIZE: usize = 10;
pub const MESSAGE_LOG_CAPACITY: usize = 8;

// Accounts
pub const TOKEN_TTL_DAYS: i64 = 30;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_HASH_COST: u32 = 10;

// Network
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_PUZZLE_URL: &str = "https://marcconrad.com/uob/banana/api.php";
pub const HTTP_TIMEOUT_SECONDS: u64 = 5;
