mod assets;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod sprite;

pub use assets::{AssetError, Texture, TextureStore};
pub use geometry::{Rectf, Vec2};
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{Renderer, Viewport};
pub use scene::{
    EntityId, EntityIdAllocator, InputSnapshot, Outcome, Scene, SceneCommand,
};
pub use sprite::{FrameRect, RenderSink, Rgba, Sprite, SpriteKind};
