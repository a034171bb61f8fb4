use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use engine::{
    AssetError, EntityId, EntityIdAllocator, FrameRect, InputAction, InputSnapshot, Outcome,
    Rectf, RenderSink, Rgba, Scene, SceneCommand, Sprite, TextureStore, Vec2,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::{debug, info};

const SCREEN_WIDTH: f32 = 800.0;
const PROJECTILE_MIN_Y: f32 = 0.0;
const PROJECTILE_MAX_Y: f32 = 800.0;
const PROJECTILE_SIZE: Vec2 = Vec2::new(3.0, 5.0);

const PLAYER_SPAWN: Vec2 = Vec2::new(400.0, 570.0);
const PLAYER_SIZE: Vec2 = Vec2::new(60.0, 18.0);
const PLAYER_RESPAWN_X: f32 = 400.0;
const PLAYER_SPEED_PX_PER_MS: f32 = 0.4;
const PLAYER_SHOT_SPEED_PX_PER_MS: f32 = -0.6;
const PLAYER_CHARGE_MS: f32 = 800.0;
const PLAYER_LIVES: u32 = 3;

const ENEMY_SHOT_SPEED_PX_PER_MS: f32 = 0.6;
const ENEMY_STEP_PX: f32 = 15.0;
const ENEMY_STEP_DELAY_MS: f32 = 700.0;
const ENEMY_STEP_DELAY_ACCEL_MS: f32 = 1.5;
const ENEMY_FIRE_CHANCE: f32 = 0.0001;
const ENEMY_FIRE_CHANCE_ACCEL: f32 = 0.000_01;
const ENEMY_SCORE: u32 = 10;

const CLUSTER_COLS: u32 = 11;
const CLUSTER_ROWS: u32 = 5;
const CLUSTER_TOP_Y: f32 = 100.0;
const ENEMY_CELL_PX: f32 = 40.0;
const ENEMY_SPRITE_SCALE: f32 = 0.7;

const UFO_SCORE: u32 = 50;
const UFO_SPAWN_INTERVAL_MS: f32 = 30_000.0;
const UFO_SPAWN_POS: Vec2 = Vec2::new(800.0, 70.0);
const UFO_SIZE: Vec2 = Vec2::new(45.0, 20.0);
const UFO_SPEED_PX_PER_MS: f32 = -0.2;
const UFO_FRAME: FrameRect = FrameRect::new(30, 338, 192, 84);

const HOUSE_COUNT: u32 = 4;
const HOUSE_START_X: f32 = 50.0;
const HOUSE_START_Y: f32 = 480.0;
const HOUSE_BLOCK_PX: f32 = 10.0;
const HOUSE_ROOF_WIDTH: f32 = 100.0;
const HOUSE_ROOF_HEIGHT: f32 = 30.0;
const HOUSE_WALL_WIDTH: f32 = 20.0;
const HOUSE_WALL_HEIGHT: f32 = 30.0;

const LIFE_BAR_POS: Vec2 = Vec2::new(660.0, 20.0);
const LIFE_BAR_SPACING: f32 = 1.2;
const SCORE_BAR_POS: Vec2 = Vec2::new(5.0, 0.0);
const SCORE_CHAR_SIZE: u32 = 60;
const SCORE_DISPLAY_WIDTH: usize = 4;
const UI_SPRITE_SCALE: f32 = 0.7;

const SHEET_TEXTURE: &str = "invaders";
const SHEET_PATH: &str = "textures/invaders.png";

const GREEN: Rgba = [0, 255, 0, 255];
const YELLOW: Rgba = [255, 255, 0, 255];

include!("types.rs");
include!("actors.rs");
include!("arena.rs");
include!("level.rs");

pub(crate) fn build_level(seed: u64) -> LevelScene {
    LevelScene::new(seed)
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
