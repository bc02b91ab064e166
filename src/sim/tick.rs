//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically. Rendering is not
//! part of the tick; the caller paints the resulting state afterwards.

use super::collision::{clamp_in, fully_outside, overlaps, reflect_in};
use super::entity::Boundary;
use super::input::TickInput;
use super::rules::{Rules, TickContext};
use super::state::{GameEvent, GameState};
use crate::consts::TICKS_PER_SECOND;

/// Advance the game state by one fixed timestep
///
/// Order within a tick: input, movement, collisions and bounds, per-game
/// bookkeeping, termination, spawning.
pub fn tick<R: Rules>(state: &mut GameState<R>, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if !state.session.is_active() {
        return events;
    }

    let GameState {
        rules,
        session,
        entities,
        player,
        spawner,
        rng,
        ..
    } = state;

    session.advance_tick(TICKS_PER_SECOND);
    let now = session.elapsed_ticks();
    let bounds = rules.bounds();

    // Player intents; finer limits are the rules' business
    rules.steer(player, input, dt);
    player.pos = bounds.clamp(player.pos);

    if input.activate {
        if let Some(at) = input.activate_at {
            if let Some(id) = entities.pick(at) {
                let effect = entities.get(id).and_then(|e| rules.on_tap(&e.kind, now));
                if let Some(effect) = effect {
                    entities.remove(id);
                    effect.apply(session);
                    events.push(GameEvent::Tapped { id });
                }
            }
        }
    }

    // Movement
    for entity in entities.iter_mut() {
        rules.advance(entity, dt);
    }

    // Collisions take precedence over leaving the bounds
    entities.retain_mut(|entity| {
        if let Some(hitbox) = player.hitbox {
            if overlaps(player.pos, &hitbox, entity.pos, &entity.hitbox) {
                rules.on_collision(&entity.kind, now).apply(session);
                events.push(GameEvent::Caught { id: entity.id });
                return false;
            }
        }

        match rules.boundary(&entity.kind) {
            Boundary::Reflect => {
                reflect_in(&mut entity.pos, &mut entity.vel, &entity.hitbox, &bounds);
            }
            Boundary::Clamp => {
                entity.pos = clamp_in(entity.pos, &entity.hitbox, &bounds);
            }
            Boundary::DeleteOnExit => {
                if fully_outside(entity.pos, &entity.hitbox, &bounds) {
                    rules.on_exit(&entity.kind, now).apply(session);
                    events.push(GameEvent::Exited { id: entity.id });
                    return false;
                }
            }
        }

        if entity.age() {
            rules.on_expire(&entity.kind, now).apply(session);
            events.push(GameEvent::Expired { id: entity.id });
            return false;
        }
        true
    });

    rules.on_tick(TickContext {
        session,
        entities,
        player,
        rng,
        now,
        dt,
        level: spawner.level(),
    });

    if let Some(reason) = state.check_termination() {
        events.push(GameEvent::Ended { reason });
        return events;
    }

    // Spawning
    let GameState {
        rules,
        session,
        entities,
        spawner,
        rng,
        ..
    } = state;

    if let Some(level) = spawner.update_level(session.score(), session.elapsed_secs()) {
        events.push(GameEvent::LevelUp { level });
    }
    let occupied: Vec<_> = entities.iter().map(|e| e.pos).collect();
    if let Some(roll) = spawner.try_spawn(now, &occupied, rng) {
        let spec = rules.build(roll, rng);
        let id = entities.spawn(spec, now);
        log::debug!("{}: spawned entity {} at tick {}", rules.name(), id, now);
        events.push(GameEvent::Spawned { id });
    }

    events
}
