#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Wait<E> {
    id: TimerId,
    remaining: f32,
    event: E,
}

#[derive(Debug, Clone)]
struct Task<E> {
    id: TimerId,
    interval: f32,
    interval_elapsed: f32,
    duration: f32,
    elapsed: f32,
    tick: Option<E>,
    on_complete: Option<E>,
}

/// Game-clock scheduler.
///
/// Nothing here runs callbacks: when a wait expires or a task ticks, its
/// payload is handed back from [`Timer::update`] and the owner routes it.
/// Owners are expected to check that the payload still applies (for example
/// via a generation counter) before acting on it.
#[derive(Debug, Clone)]
pub struct Timer<E> {
    next_id: u64,
    waits: Vec<Wait<E>>,
    tasks: Vec<Task<E>>,
}

impl<E> Default for Timer<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            waits: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

impl<E: Clone> Timer<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// One-shot: `event` fires once `seconds` of game time have accumulated.
    pub fn wait(&mut self, seconds: f32, event: E) -> TimerId {
        let id = self.allocate_id();
        self.waits.push(Wait {
            id,
            remaining: seconds.max(0.0),
            event,
        });
        id
    }

    /// Repeating task: `tick` fires every `interval` seconds (every update when
    /// `interval` is zero) until `duration` has elapsed, then `on_complete`
    /// fires once and the task is dropped.
    pub fn add_task(
        &mut self,
        tick: Option<E>,
        interval: f32,
        duration: f32,
        on_complete: Option<E>,
    ) -> TimerId {
        let id = self.allocate_id();
        self.tasks.push(Task {
            id,
            interval: interval.max(0.0),
            interval_elapsed: 0.0,
            duration: duration.max(0.0),
            elapsed: 0.0,
            tick,
            on_complete,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let waits_before = self.waits.len();
        let tasks_before = self.tasks.len();
        self.waits.retain(|wait| wait.id != id);
        self.tasks.retain(|task| task.id != id);
        waits_before != self.waits.len() || tasks_before != self.tasks.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.waits.iter().any(|wait| wait.id == id) || self.tasks.iter().any(|task| task.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.waits.len() + self.tasks.len()
    }

    pub fn clear(&mut self) {
        self.waits.clear();
        self.tasks.clear();
    }

    pub fn update(&mut self, dt: f32) -> Vec<E> {
        let mut fired = Vec::new();

        self.waits.retain_mut(|wait| {
            wait.remaining -= dt;
            if wait.remaining <= 0.0 {
                fired.push(wait.event.clone());
                false
            } else {
                true
            }
        });

        self.tasks.retain_mut(|task| {
            task.interval_elapsed += dt;
            task.elapsed += dt;
            if task.interval_elapsed >= task.interval {
                task.interval_elapsed = 0.0;
                if let Some(tick) = &task.tick {
                    fired.push(tick.clone());
                }
            }
            if task.elapsed >= task.duration {
                if let Some(on_complete) = &task.on_complete {
                    fired.push(on_complete.clone());
                }
                return false;
            }
            true
        });

        fired
    }
}
