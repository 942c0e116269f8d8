//! Synchronous in-process event relay between scene actors.

use std::collections::VecDeque;
use std::fmt;

use bevy::math::Vec3;

use crate::sim::orbital::PlaneOrbit;

/// Identifier unique for the lifetime of one director.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        self.next += 1;
        EntityId(self.next)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    MissileFired { start: Vec3, target: Vec3 },
    ProjectileHit { id: EntityId, point: Vec3 },
    ProjectileMissed { id: EntityId },
    /// Hostile craft health reached zero; it starts its dying animation.
    HealthDepleted { position: Vec3 },
    CraftVanished,
    ExplosionFinished { id: EntityId },
    PayloadDeployed { orbit: PlaneOrbit },
    AttackMissionComplete { id: EntityId },
    LauncherMissionComplete { id: EntityId },
}

type Listener = Box<dyn FnMut(&SceneEvent) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<SceneEvent>,
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn emit(&mut self, event: SceneEvent) {
        self.queue.push_back(event);
    }

    // listeners see it before the caller does
    pub fn next_event(&mut self) -> Option<SceneEvent> {
        let event = self.queue.pop_front()?;
        for listener in &mut self.listeners {
            listener(&event);
        }
        Some(event)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SceneEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("queue", &self.queue)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn drains_in_fifo_order_and_notifies_listeners() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut bus = EventBus::default();
        bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        bus.emit(SceneEvent::CraftVanished);
        bus.emit(SceneEvent::ProjectileMissed { id: EntityId(4) });

        assert_eq!(bus.next_event(), Some(SceneEvent::CraftVanished));
        bus.emit(SceneEvent::HealthDepleted { position: Vec3::ONE });
        assert_eq!(bus.next_event(), Some(SceneEvent::ProjectileMissed { id: EntityId(4) }));
        assert_eq!(bus.next_event(), Some(SceneEvent::HealthDepleted { position: Vec3::ONE }));
        assert_eq!(bus.next_event(), None);

        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn ids_are_unique() {
        let mut ids = IdAllocator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "#2");
    }
}
