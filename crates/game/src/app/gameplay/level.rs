/// Scenario assembly on top of the arena: the player with its life and
/// score bars, the enemy cluster, four houses, and the recurring saucer
/// spawn timer.
pub(crate) struct LevelScene {
    arena: Arena,
    ids: EntityIdAllocator,
    rng: Pcg32,
    score: ScoreCounter,
    signals: LevelSignals,
    ufo_waited_ms: f32,
}

impl LevelScene {
    fn new(seed: u64) -> Self {
        Self {
            arena: Arena::default(),
            ids: EntityIdAllocator::default(),
            rng: Pcg32::seed_from_u64(seed),
            score: ScoreCounter::default(),
            signals: LevelSignals::default(),
            ufo_waited_ms: 0.0,
        }
    }

    fn spawn_player(&mut self) {
        let mut player = Actor::player(self.ids.allocate(), PLAYER_SPAWN);

        let life_sprite = Sprite::rect(
            LIFE_BAR_POS,
            Vec2::new(
                PLAYER_SIZE.x * UI_SPRITE_SCALE,
                PLAYER_SIZE.y * UI_SPRITE_SCALE,
            ),
            GREEN,
        );
        let life_bar = Actor::life_bar(self.ids.allocate(), life_sprite, PLAYER_LIVES);
        player.set_life_bar(life_bar.id());

        let score_bar = Actor::score_bar(self.ids.allocate(), SCORE_BAR_POS, self.score.clone());

        self.arena.add(player);
        self.arena.add(life_bar);
        self.arena.add(score_bar);
    }

    fn spawn_cluster(&mut self) {
        let travel = SCREEN_WIDTH - CLUSTER_COLS as f32 * ENEMY_CELL_PX;
        let size = Vec2::new(
            ENEMY_CELL_PX * ENEMY_SPRITE_SCALE,
            ENEMY_CELL_PX * ENEMY_SPRITE_SCALE,
        );
        for col in 0..CLUSTER_COLS {
            for row in 0..CLUSTER_ROWS {
                let position = Vec2::new(
                    ENEMY_CELL_PX / 2.0 + col as f32 * ENEMY_CELL_PX,
                    CLUSTER_TOP_Y + row as f32 * ENEMY_CELL_PX,
                );
                let sprite =
                    Sprite::frames(position, size, SHEET_TEXTURE, cluster_row_frames(row));
                self.arena
                    .add(Actor::enemy(self.ids.allocate(), sprite, travel));
            }
        }
        self.signals.enemies_remaining = CLUSTER_COLS * CLUSTER_ROWS;
    }

    fn spawn_houses(&mut self) {
        let spacing = SCREEN_WIDTH / HOUSE_COUNT as f32;
        for index in 0..HOUSE_COUNT {
            self.spawn_house(HOUSE_START_X + index as f32 * spacing, HOUSE_START_Y);
        }
    }

    /// Hollow shape: a roof slab with a wall column under each end.
    fn spawn_house(&mut self, start_x: f32, start_y: f32) {
        self.spawn_block_grid(start_x, start_y, HOUSE_ROOF_WIDTH, HOUSE_ROOF_HEIGHT);
        self.spawn_block_grid(
            start_x,
            start_y + HOUSE_ROOF_HEIGHT,
            HOUSE_WALL_WIDTH,
            HOUSE_WALL_HEIGHT,
        );
        self.spawn_block_grid(
            start_x + HOUSE_ROOF_WIDTH - HOUSE_WALL_WIDTH,
            start_y + HOUSE_ROOF_HEIGHT,
            HOUSE_WALL_WIDTH,
            HOUSE_WALL_HEIGHT,
        );
    }

    fn spawn_block_grid(&mut self, start_x: f32, start_y: f32, width: f32, height: f32) {
        let size = Vec2::new(HOUSE_BLOCK_PX, HOUSE_BLOCK_PX);
        for row in 0..(height / HOUSE_BLOCK_PX) as u32 {
            for col in 0..(width / HOUSE_BLOCK_PX) as u32 {
                let position = Vec2::new(
                    start_x + col as f32 * HOUSE_BLOCK_PX,
                    start_y + row as f32 * HOUSE_BLOCK_PX,
                );
                self.arena
                    .add(Actor::block(self.ids.allocate(), position, size));
            }
        }
    }

    /// No-op while a saucer is alive; only one may exist at a time.
    fn spawn_ufo(&mut self) {
        if self.signals.ufo_alive {
            return;
        }
        self.signals.ufo_alive = true;
        let sprite = Sprite::frames(UFO_SPAWN_POS, UFO_SIZE, SHEET_TEXTURE, vec![UFO_FRAME]);
        debug!("ufo_spawned");
        self.arena
            .add(Actor::ufo(self.ids.allocate(), sprite, UFO_SPEED_PX_PER_MS));
    }
}

fn cluster_row_frames(row: u32) -> Vec<FrameRect> {
    if row == 0 {
        vec![
            FrameRect::new(40, 30, 64, 64),
            FrameRect::new(142, 31, 64, 64),
        ]
    } else if row >= 3 {
        vec![
            FrameRect::new(14, 241, 96, 64),
            FrameRect::new(128, 242, 96, 64),
        ]
    } else {
        vec![
            FrameRect::new(27, 134, 88, 64),
            FrameRect::new(131, 134, 88, 64),
        ]
    }
}

impl Scene for LevelScene {
    fn load(&mut self, assets_dir: &Path, textures: &mut TextureStore) -> Result<(), AssetError> {
        textures.load(&assets_dir.join(SHEET_PATH), SHEET_TEXTURE)?;

        self.spawn_player();
        self.spawn_cluster();
        self.spawn_houses();
        info!(
            enemies = self.signals.enemies_remaining,
            "level_loaded"
        );
        Ok(())
    }

    fn update(&mut self, elapsed_ms: f32, input: &InputSnapshot) -> SceneCommand {
        let mut ctx = TickCtx {
            input,
            rng: &mut self.rng,
            ids: &mut self.ids,
            score: &self.score,
            signals: &mut self.signals,
        };
        self.arena.tick(elapsed_ms, &mut ctx);

        self.ufo_waited_ms += elapsed_ms;
        if self.ufo_waited_ms >= UFO_SPAWN_INTERVAL_MS {
            self.ufo_waited_ms -= UFO_SPAWN_INTERVAL_MS;
            self.spawn_ufo();
        }

        if self.signals.exit_requested {
            let outcome = self.signals.outcome.unwrap_or(Outcome::Defeat);
            info!(
                ?outcome,
                score = self.score.get(),
                entities = self.arena.world_count(),
                "session_over"
            );
            return SceneCommand::Exit(outcome);
        }
        SceneCommand::None
    }

    fn render(&mut self, sink: &mut dyn RenderSink) {
        self.arena.render(sink);
    }
}
