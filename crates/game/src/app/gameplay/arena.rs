/// Live actor registry and the per-tick pipeline. World and UI actors live
/// in disjoint id-ordered mappings; structural changes requested mid-tick
/// are queued and applied in the commit phase, so iteration always sees the
/// set committed at the end of the previous tick.
#[derive(Default)]
struct Arena {
    world: BTreeMap<EntityId, Actor>,
    ui: BTreeMap<EntityId, Actor>,
    pending: Mutations,
}

impl Arena {
    fn add(&mut self, actor: Actor) {
        self.pending.add(actor);
    }

    fn remove(&mut self, id: EntityId) {
        self.pending.remove(id);
    }

    /// Panics when `id` is not registered: callers only ever look up ids
    /// they just observed live, so a miss is a contract violation.
    fn actor(&self, id: EntityId) -> &Actor {
        self.find_actor(id)
            .unwrap_or_else(|| panic!("no live actor with id {}", id.0))
    }

    fn find_actor(&self, id: EntityId) -> Option<&Actor> {
        self.world.get(&id).or_else(|| self.ui.get(&id))
    }

    fn find_actor_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        if self.world.contains_key(&id) {
            self.world.get_mut(&id)
        } else {
            self.ui.get_mut(&id)
        }
    }

    fn world_count(&self) -> usize {
        self.world.len()
    }

    #[allow(dead_code)]
    fn ui_count(&self) -> usize {
        self.ui.len()
    }

    /// Ids of all other live actors whose class intersects `targets` and
    /// whose rigid body overlaps `id`'s. Order is unspecified; callers
    /// needing one target resolve the tie themselves.
    #[allow(dead_code)]
    fn collision(&self, id: EntityId, targets: ClassMask) -> Vec<EntityId> {
        let body = self.actor(id).rigid_body();
        self.collision_from(body, id, targets)
    }

    fn collision_from(&self, body: Rectf, exclude: EntityId, targets: ClassMask) -> Vec<EntityId> {
        self.world
            .iter()
            .chain(self.ui.iter())
            .filter(|(candidate, actor)| {
                **candidate != exclude
                    && actor.class().intersects(targets)
                    && body.intersects(&actor.rigid_body())
            })
            .map(|(candidate, _)| *candidate)
            .collect()
    }

    /// One tick: update every registered actor in mapping order (world, then
    /// UI), then commit queued removals and additions. An actor is lifted
    /// out of its mapping while it updates so it can read the rest of the
    /// arena; the mappings themselves only change at commit.
    fn tick(&mut self, elapsed_ms: f32, ctx: &mut TickCtx<'_>) {
        let mut ops = std::mem::take(&mut self.pending);

        let world_ids: Vec<EntityId> = self.world.keys().copied().collect();
        for id in world_ids {
            if let Some(mut actor) = self.world.remove(&id) {
                actor.update(elapsed_ms, ctx, self, &mut ops);
                self.world.insert(id, actor);
            }
        }
        let ui_ids: Vec<EntityId> = self.ui.keys().copied().collect();
        for id in ui_ids {
            if let Some(mut actor) = self.ui.remove(&id) {
                actor.update(elapsed_ms, ctx, self, &mut ops);
                self.ui.insert(id, actor);
            }
        }

        self.pending = ops;
        self.commit(ctx);
    }

    fn commit(&mut self, ctx: &mut TickCtx<'_>) {
        let ops = std::mem::take(&mut self.pending);

        for id in ops.removals {
            if let Some(mut actor) = self.ui.remove(&id) {
                actor.on_dead(ctx);
                continue;
            }

            let Some(life_bar_id) = self.world.get(&id).map(Actor::life_bar_id) else {
                // Already erased by an earlier entry in this queue.
                continue;
            };
            match life_bar_id {
                None => {
                    if let Some(mut actor) = self.world.remove(&id) {
                        actor.on_dead(ctx);
                    }
                }
                Some(bar_id) => {
                    let remaining = {
                        let bar = self.ui.get_mut(&bar_id).unwrap_or_else(|| {
                            panic!("life tracker {} is not registered", bar_id.0)
                        });
                        bar.decrement_life();
                        bar.life_count().unwrap_or(0)
                    };
                    if remaining == 0 {
                        if let Some(mut actor) = self.world.remove(&id) {
                            actor.on_dead(ctx);
                            actor.clear_life_bar();
                        }
                        if let Some(mut bar) = self.ui.remove(&bar_id) {
                            bar.on_dead(ctx);
                        }
                    } else if let Some(actor) = self.find_actor_mut(id) {
                        // Hit, not killed.
                        actor.respawn();
                    }
                }
            }
        }

        for actor in ops.additions {
            if actor.class().intersects(ClassMask::UI) {
                self.ui.insert(actor.id(), actor);
            } else {
                self.world.insert(actor.id(), actor);
            }
        }
    }

    /// Containment order: world actors first, UI actors on top.
    fn render(&self, sink: &mut dyn RenderSink) {
        for actor in self.world.values() {
            actor.render(sink);
        }
        for actor in self.ui.values() {
            actor.render(sink);
        }
    }
}
