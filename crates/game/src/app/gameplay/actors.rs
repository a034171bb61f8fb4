#[derive(Debug, Clone)]
struct PlayerState {
    charge_elapsed_ms: f32,
    charging: bool,
}

#[derive(Debug, Clone)]
struct EnemyState {
    /// One discrete step is owed and will be taken next tick.
    step_pending: bool,
    waited_ms: f32,
    step_delay_ms: f32,
    /// Signed horizontal step; negated at each row edge.
    step_px: f32,
    max_steps: i32,
    steps_taken: i32,
    drop_pending: bool,
    fire_chance: f32,
}

#[derive(Debug, Clone, Copy)]
struct ProjectileState {
    targets: ClassMask,
}

#[derive(Debug, Clone)]
struct LifeBarState {
    count: u32,
}

#[derive(Debug, Clone)]
struct ScoreBarState {
    score: ScoreCounter,
}

/// Closed set of behaviors; every capability site matches exhaustively.
#[derive(Debug, Clone)]
enum Role {
    Player(PlayerState),
    Enemy(EnemyState),
    Projectile(ProjectileState),
    Ufo,
    Block,
    LifeBar(LifeBarState),
    ScoreBar(ScoreBarState),
}

#[derive(Debug, Clone)]
struct Actor {
    id: EntityId,
    class: ClassMask,
    sprite: Sprite,
    velocity: Vec2,
    life_bar: Option<EntityId>,
    role: Role,
}

impl Actor {
    fn player(id: EntityId, position: Vec2) -> Actor {
        Actor {
            id,
            class: ClassMask::PLAYER,
            sprite: Sprite::rect(position, PLAYER_SIZE, GREEN),
            velocity: Vec2::ZERO,
            life_bar: None,
            role: Role::Player(PlayerState {
                charge_elapsed_ms: 0.0,
                charging: false,
            }),
        }
    }

    fn enemy(id: EntityId, sprite: Sprite, travel_distance: f32) -> Actor {
        Actor {
            id,
            class: ClassMask::ENEMY,
            sprite,
            velocity: Vec2::ZERO,
            life_bar: None,
            role: Role::Enemy(EnemyState {
                step_pending: false,
                waited_ms: 0.0,
                step_delay_ms: ENEMY_STEP_DELAY_MS,
                step_px: ENEMY_STEP_PX,
                max_steps: (travel_distance / ENEMY_STEP_PX) as i32,
                steps_taken: 0,
                drop_pending: false,
                fire_chance: ENEMY_FIRE_CHANCE,
            }),
        }
    }

    fn projectile(id: EntityId, position: Vec2, speed_px_per_ms: f32, targets: ClassMask) -> Actor {
        Actor {
            id,
            class: ClassMask::NONE,
            sprite: Sprite::rect(position, PROJECTILE_SIZE, GREEN),
            velocity: Vec2::new(0.0, speed_px_per_ms),
            life_bar: None,
            role: Role::Projectile(ProjectileState { targets }),
        }
    }

    fn ufo(id: EntityId, sprite: Sprite, speed_px_per_ms: f32) -> Actor {
        Actor {
            id,
            class: ClassMask::ENEMY,
            sprite,
            velocity: Vec2::new(speed_px_per_ms, 0.0),
            life_bar: None,
            role: Role::Ufo,
        }
    }

    fn block(id: EntityId, position: Vec2, size: Vec2) -> Actor {
        Actor {
            id,
            class: ClassMask::STRUCTURE,
            sprite: Sprite::rect(position, size, GREEN),
            velocity: Vec2::ZERO,
            life_bar: None,
            role: Role::Block,
        }
    }

    fn life_bar(id: EntityId, sprite: Sprite, count: u32) -> Actor {
        Actor {
            id,
            class: ClassMask::UI,
            sprite,
            velocity: Vec2::ZERO,
            life_bar: None,
            role: Role::LifeBar(LifeBarState { count }),
        }
    }

    fn score_bar(id: EntityId, position: Vec2, score: ScoreCounter) -> Actor {
        let sprite = Sprite::text(position, format_score(score.get()), SCORE_CHAR_SIZE, YELLOW);
        Actor {
            id,
            class: ClassMask::UI,
            sprite,
            velocity: Vec2::ZERO,
            life_bar: None,
            role: Role::ScoreBar(ScoreBarState { score }),
        }
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn class(&self) -> ClassMask {
        self.class
    }

    fn position(&self) -> Vec2 {
        self.sprite.position()
    }

    fn set_life_bar(&mut self, id: EntityId) {
        self.life_bar = Some(id);
    }

    fn clear_life_bar(&mut self) {
        self.life_bar = None;
    }

    fn life_bar_id(&self) -> Option<EntityId> {
        self.life_bar
    }

    fn rigid_body(&self) -> Rectf {
        rigid_body_of(&self.sprite, self.velocity)
    }

    fn score(&self) -> u32 {
        match &self.role {
            Role::Enemy(_) => ENEMY_SCORE,
            Role::Ufo => UFO_SCORE,
            Role::Player(_)
            | Role::Projectile(_)
            | Role::Block
            | Role::LifeBar(_)
            | Role::ScoreBar(_) => 0,
        }
    }

    fn life_count(&self) -> Option<u32> {
        match &self.role {
            Role::LifeBar(state) => Some(state.count),
            _ => None,
        }
    }

    fn decrement_life(&mut self) {
        if let Role::LifeBar(state) = &mut self.role {
            state.count = state.count.saturating_sub(1);
        }
    }

    #[allow(dead_code)]
    fn score_total(&self) -> Option<u32> {
        match &self.role {
            Role::ScoreBar(state) => Some(state.score.get()),
            _ => None,
        }
    }

    #[allow(dead_code)]
    fn set_score(&mut self, value: u32) {
        if let Role::ScoreBar(state) = &self.role {
            state.score.set(value);
            self.sprite.set_text(format_score(value));
        }
    }

    #[allow(dead_code)]
    fn add_score(&mut self, delta: u32) {
        if let Role::ScoreBar(state) = &self.role {
            state.score.add(delta);
            let total = state.score.get();
            self.sprite.set_text(format_score(total));
        }
    }

    fn update(
        &mut self,
        elapsed_ms: f32,
        ctx: &mut TickCtx<'_>,
        arena: &Arena,
        ops: &mut Mutations,
    ) {
        let Actor {
            id,
            sprite,
            velocity,
            role,
            ..
        } = self;
        match role {
            Role::Player(state) => {
                update_player(sprite, velocity, state, elapsed_ms, ctx, ops);
            }
            Role::Enemy(state) => update_enemy(sprite, state, elapsed_ms, ctx, ops),
            Role::Projectile(state) => {
                update_projectile(*id, sprite, *velocity, state, elapsed_ms, ctx, arena, ops);
            }
            Role::Ufo => update_ufo(*id, sprite, *velocity, elapsed_ms, ctx, ops),
            Role::Block | Role::LifeBar(_) => integrate(sprite, *velocity, elapsed_ms),
            Role::ScoreBar(state) => sprite.set_text(format_score(state.score.get())),
        }
    }

    fn on_dead(&mut self, ctx: &mut TickCtx<'_>) {
        match &self.role {
            Role::Player(_) => {
                info!("player_destroyed");
                ctx.signals.request_exit(Outcome::Defeat);
            }
            Role::Enemy(_) => {
                ctx.signals.enemies_remaining = ctx.signals.enemies_remaining.saturating_sub(1);
                if ctx.signals.enemies_remaining == 0 {
                    info!("cluster_cleared");
                    ctx.signals.request_exit(Outcome::Victory);
                }
            }
            Role::Ufo => {
                ctx.signals.ufo_alive = false;
            }
            Role::Projectile(_) | Role::Block | Role::LifeBar(_) | Role::ScoreBar(_) => {}
        }
    }

    fn respawn(&mut self) {
        if matches!(self.role, Role::Player(_)) {
            let pos = self.position();
            self.sprite.set_position(Vec2::new(PLAYER_RESPAWN_X, pos.y));
        }
    }

    fn render(&self, sink: &mut dyn RenderSink) {
        match &self.role {
            Role::LifeBar(state) => {
                let base = self.sprite.position();
                let width = self.sprite.size().x;
                let mut unit = self.sprite.clone();
                for index in 0..state.count {
                    unit.set_position(Vec2::new(
                        base.x + width * LIFE_BAR_SPACING * index as f32,
                        base.y,
                    ));
                    unit.render(sink);
                }
            }
            _ => self.sprite.render(sink),
        }
    }
}

fn integrate(sprite: &mut Sprite, velocity: Vec2, elapsed_ms: f32) {
    let pos = sprite.position();
    sprite.set_position(Vec2::new(
        pos.x + velocity.x * elapsed_ms,
        pos.y + velocity.y * elapsed_ms,
    ));
}

/// Sprite extent grown by |velocity| per axis and shifted against the motion,
/// so the swept path since the last tick stays covered and fast projectiles
/// cannot tunnel through thin targets.
fn rigid_body_of(sprite: &Sprite, velocity: Vec2) -> Rectf {
    let pos = sprite.position();
    let size = sprite.size();
    Rectf::new(
        pos.x - size.x / 2.0 - velocity.x,
        pos.y - size.y / 2.0 - velocity.y,
        size.x + velocity.x.abs(),
        size.y + velocity.y.abs(),
    )
}

fn update_player(
    sprite: &mut Sprite,
    velocity: &mut Vec2,
    state: &mut PlayerState,
    elapsed_ms: f32,
    ctx: &mut TickCtx<'_>,
    ops: &mut Mutations,
) {
    integrate(sprite, *velocity, elapsed_ms);

    let left = ctx.input.is_down(InputAction::MoveLeft);
    let right = ctx.input.is_down(InputAction::MoveRight);
    velocity.x = match (left, right) {
        (true, false) => -PLAYER_SPEED_PX_PER_MS,
        (false, true) => PLAYER_SPEED_PX_PER_MS,
        _ => 0.0,
    };

    let mut pos = sprite.position();
    pos.x = pos.x.clamp(0.0, SCREEN_WIDTH);
    sprite.set_position(pos);

    if state.charging {
        state.charge_elapsed_ms += elapsed_ms;
    } else if ctx.input.is_down(InputAction::Fire) {
        ops.add(Actor::projectile(
            ctx.ids.allocate(),
            pos,
            PLAYER_SHOT_SPEED_PX_PER_MS,
            ClassMask::STRUCTURE | ClassMask::ENEMY,
        ));
        state.charging = true;
    }

    if state.charge_elapsed_ms >= PLAYER_CHARGE_MS {
        state.charge_elapsed_ms -= PLAYER_CHARGE_MS;
        state.charging = false;
    }
}

fn update_enemy(
    sprite: &mut Sprite,
    state: &mut EnemyState,
    elapsed_ms: f32,
    ctx: &mut TickCtx<'_>,
    ops: &mut Mutations,
) {
    let mut pos = sprite.position();

    if ctx.rng.random::<f32>() <= state.fire_chance {
        ops.add(Actor::projectile(
            ctx.ids.allocate(),
            pos,
            ENEMY_SHOT_SPEED_PX_PER_MS,
            ClassMask::PLAYER | ClassMask::STRUCTURE,
        ));
    }

    if state.step_pending {
        if state.drop_pending {
            pos.y += state.step_px.abs();
            state.drop_pending = false;
        } else {
            pos.x += state.step_px;
            // Horizontal steps tighten the cadence and animate; drops do not.
            state.step_delay_ms -= ENEMY_STEP_DELAY_ACCEL_MS;
            state.fire_chance += ENEMY_FIRE_CHANCE_ACCEL;
            sprite.advance_frame();
        }
        state.step_pending = false;
    } else {
        state.waited_ms += elapsed_ms;
        if state.waited_ms >= state.step_delay_ms {
            state.step_pending = true;
            state.waited_ms -= state.step_delay_ms;
            state.steps_taken += 1;
            if state.steps_taken > state.max_steps {
                state.steps_taken = 0;
                state.step_px = -state.step_px;
                state.drop_pending = true;
            }
        }
    }

    sprite.set_position(pos);
}

#[allow(clippy::too_many_arguments)]
fn update_projectile(
    id: EntityId,
    sprite: &mut Sprite,
    velocity: Vec2,
    state: &ProjectileState,
    elapsed_ms: f32,
    ctx: &mut TickCtx<'_>,
    arena: &Arena,
    ops: &mut Mutations,
) {
    integrate(sprite, velocity, elapsed_ms);

    let pos = sprite.position();
    if pos.y <= PROJECTILE_MIN_Y || pos.y >= PROJECTILE_MAX_Y {
        ops.remove(id);
    }

    let hits = arena.collision_from(rigid_body_of(sprite, velocity), id, state.targets);
    // Nearest along the travel direction, resolved deterministically: ids are
    // assigned in insertion order, so upward shots prefer the largest id and
    // downward shots the smallest.
    let resolved = if velocity.y < 0.0 {
        hits.iter().copied().max()
    } else {
        hits.iter().copied().min()
    };
    if let Some(target) = resolved {
        let points = arena.actor(target).score();
        if points != 0 {
            ctx.score.add(points);
        }
        ops.remove(target);
        ops.remove(id);
    }
}

fn update_ufo(
    id: EntityId,
    sprite: &mut Sprite,
    velocity: Vec2,
    elapsed_ms: f32,
    ctx: &mut TickCtx<'_>,
    ops: &mut Mutations,
) {
    integrate(sprite, velocity, elapsed_ms);

    if sprite.position().x < 0.0 {
        ops.remove(id);
        ctx.signals.ufo_alive = false;
    }
}
