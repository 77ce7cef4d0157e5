//! Explicit timer service
//!
//! Заменяет implicit world timer manager: сервис передаётся в weapon-системы
//! как Resource, handles принадлежат weapon instance.
//!
//! # Architecture
//!
//! - `TimerQueue` владеет simulation clock (`now`), продвигается фиксированным
//!   тиком из `advance_timer_queue`
//! - `schedule_once` / `schedule_repeating` → `TimerHandle`, `cancel(handle)`
//! - Сработавшие задачи выходят наружу как `TimerFired` события в
//!   детерминированном порядке (due time, затем handle id)
//!
//! Cancellation без side effects; отмена неизвестного handle — no-op.

use bevy::prelude::*;

use crate::logger::log_warning;

/// Handle запланированной задачи (уникален в пределах очереди)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Событие: задача сработала
///
/// Потребители матчат handle против своих сохранённых handles.
#[derive(Event, Debug, Clone, Copy)]
pub struct TimerFired {
    pub handle: TimerHandle,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    handle: TimerHandle,
    due: f64,
    /// None = one-shot, Some(period) = repeating
    period: Option<f64>,
}

/// Очередь таймеров + simulation clock
#[derive(Resource, Debug)]
pub struct TimerQueue {
    now: f64,
    tick_dt: f64,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl TimerQueue {
    pub fn new(tick_hz: f64) -> Self {
        Self {
            now: 0.0,
            tick_dt: 1.0 / tick_hz,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Текущее simulation time (секунды)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Длительность одного тика (секунды)
    pub fn tick_dt(&self) -> f64 {
        self.tick_dt
    }

    /// One-shot задача через `delay` секунд (отрицательный delay = следующий тик)
    pub fn schedule_once(&mut self, delay: f64) -> TimerHandle {
        let handle = self.alloc_handle();
        self.tasks.push(ScheduledTask {
            handle,
            due: self.now + delay.max(0.0),
            period: None,
        });
        handle
    }

    /// Repeating задача: первый раз через `first_delay`, затем каждые `period`
    pub fn schedule_repeating(&mut self, period: f64, first_delay: f64) -> TimerHandle {
        let period = if period > 0.0 {
            Some(period)
        } else {
            // Нулевой период зациклил бы advance; деградируем до one-shot
            log_warning("schedule_repeating: non-positive period, scheduling one-shot");
            None
        };

        let handle = self.alloc_handle();
        self.tasks.push(ScheduledTask {
            handle,
            due: self.now + first_delay.max(0.0),
            period,
        });
        handle
    }

    /// Отменить задачу. No-op если handle уже сработал (one-shot) или неизвестен.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.tasks.retain(|t| t.handle != handle);
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    /// Продвинуть clock на `dt` и вернуть сработавшие handles
    ///
    /// Порядок строго детерминирован: (due, handle id). Repeating задача,
    /// чей период меньше dt, срабатывает несколько раз подряд (catch-up).
    pub fn advance(&mut self, dt: f64) -> Vec<TimerHandle> {
        self.now += dt;
        let mut fired = Vec::new();

        loop {
            let due = self
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= self.now)
                .min_by(|(_, a), (_, b)| {
                    (a.due, a.handle.0)
                        .partial_cmp(&(b.due, b.handle.0))
                        .expect("timer due times are never NaN")
                })
                .map(|(i, _)| i);

            let Some(i) = due else {
                break;
            };

            fired.push(self.tasks[i].handle);
            match self.tasks[i].period {
                Some(period) => self.tasks[i].due += period,
                None => {
                    self.tasks.swap_remove(i);
                }
            }
        }

        fired
    }

    fn alloc_handle(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        handle
    }
}

/// Система: продвинуть очередь на один фиксированный тик
///
/// Первая система в FixedUpdate chain — все остальные видят события этого тика.
pub fn advance_timer_queue(mut queue: ResMut<TimerQueue>, mut fired: EventWriter<TimerFired>) {
    let dt = queue.tick_dt();
    for handle in queue.advance(dt) {
        fired.write(TimerFired { handle });
    }
}

/// Регистрирует TimerQueue + TimerFired (сама система — в SimulationPlugin chain)
pub struct SchedulerPlugin;

impl Plugin for SchedulerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TimerQueue>().add_event::<TimerFired>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_fires_once() {
        let mut queue = TimerQueue::new(10.0); // dt = 0.1
        let handle = queue.schedule_once(0.25);

        assert!(queue.advance(0.1).is_empty());
        assert!(queue.advance(0.1).is_empty());
        assert_eq!(queue.advance(0.1), vec![handle]);
        assert!(queue.advance(0.1).is_empty());
        assert!(!queue.is_scheduled(handle));
    }

    #[test]
    fn test_repeating_with_first_delay() {
        let mut queue = TimerQueue::new(10.0);
        let handle = queue.schedule_repeating(0.25, 0.0);

        // first_delay 0 → срабатывает на первом же тике, дальше каждые 0.25s
        assert_eq!(queue.advance(0.1), vec![handle]);
        assert!(queue.advance(0.1).is_empty());
        assert_eq!(queue.advance(0.1), vec![handle]);
        assert!(queue.advance(0.1).is_empty());
    }

    #[test]
    fn test_negative_delay_clamps_to_now() {
        let mut queue = TimerQueue::new(10.0);
        let handle = queue.schedule_once(-5.0);
        assert_eq!(queue.advance(0.1), vec![handle]);
    }

    #[test]
    fn test_cancel_removes_task() {
        let mut queue = TimerQueue::new(10.0);
        let handle = queue.schedule_repeating(0.1, 0.0);
        queue.cancel(handle);
        assert!(queue.advance(1.0).is_empty());

        // Повторная отмена — no-op
        queue.cancel(handle);
    }

    #[test]
    fn test_catch_up_fires_multiple_times() {
        let mut queue = TimerQueue::new(10.0);
        let handle = queue.schedule_repeating(0.1, 0.0);

        // Один большой advance покрывает 3 периода
        let fired = queue.advance(0.35);
        assert_eq!(fired, vec![handle, handle, handle, handle]);
    }

    #[test]
    fn test_deterministic_order_same_due() {
        let mut queue = TimerQueue::new(10.0);
        let a = queue.schedule_once(0.1);
        let b = queue.schedule_once(0.1);

        // Одинаковое due — порядок по handle id
        assert_eq!(queue.advance(0.1), vec![a, b]);
    }

    #[test]
    fn test_clock_advances() {
        let mut queue = TimerQueue::new(60.0);
        assert_eq!(queue.now(), 0.0);
        let dt = queue.tick_dt();
        queue.advance(dt);
        assert!(queue.now() > 0.0);
    }
}
