use chrono::{DateTime, NaiveDate, TimeZone, Timelike};
use log::info;

use crate::alarm::model::{AlarmEntry, AlarmId, MINUTES_PER_DAY, MealTime};
use crate::alarm::registry::AlarmRegistry;

pub const SNOOZE_MINUTES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmFireEvent {
    pub id: AlarmId,
    pub time: MealTime,
    pub label: String,
}

impl AlarmFireEvent {
    fn capture(entry: &AlarmEntry) -> Self {
        Self {
            id: entry.id,
            time: entry.time,
            label: entry.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AlertState {
    #[default]
    Idle,
    Firing(AlarmFireEvent),
}

pub struct AlarmScheduler {
    state: AlertState,
    last_checked_slot: Option<(NaiveDate, u32)>,
}

impl AlarmScheduler {
    pub fn new() -> Self {
        Self {
            state: AlertState::Idle,
            last_checked_slot: None,
        }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn firing(&self) -> Option<&AlarmFireEvent> {
        match &self.state {
            AlertState::Firing(event) => Some(event),
            AlertState::Idle => None,
        }
    }

    pub fn is_firing(&self) -> bool {
        matches!(self.state, AlertState::Firing(_))
    }

    // Each wall-clock minute is matched at most once, no matter where in the
    // minute the tick lands or how many ticks arrive inside it.
    pub fn tick<Tz>(&mut self, registry: &AlarmRegistry, now: &DateTime<Tz>) -> Option<AlarmFireEvent>
    where
        Tz: TimeZone,
    {
        let slot = minute_slot(now);
        if self.last_checked_slot == Some(slot) {
            return None;
        }
        self.last_checked_slot = Some(slot);

        if self.is_firing() {
            return None;
        }

        let hit = registry.list().iter().find(|entry| {
            entry.enabled && entry.time.hour() == now.hour() && entry.time.minute() == now.minute()
        })?;

        let event = AlarmFireEvent::capture(hit);
        info!("meal alarm fired: '{}' at {}", event.label, event.time);
        self.state = AlertState::Firing(event.clone());
        Some(event)
    }

    pub fn stop(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            AlertState::Firing(event) => {
                info!("meal alarm stopped: '{}'", event.label);
                true
            }
            AlertState::Idle => false,
        }
    }

    pub fn snooze<Tz>(
        &mut self,
        registry: &mut AlarmRegistry,
        now: &DateTime<Tz>,
    ) -> Option<AlarmId>
    where
        Tz: TimeZone,
    {
        let AlertState::Firing(event) = std::mem::take(&mut self.state) else {
            return None;
        };

        let at =
            MealTime::from_minutes(now.hour() * 60 + now.minute()).plus_minutes(SNOOZE_MINUTES);
        let label = format!("{} (Snoozed)", event.label);
        let id = registry.add(at, label, true);
        info!("meal alarm snoozed: '{}' rings again at {}", event.label, at);
        Some(id)
    }
}

impl Default for AlarmScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn minute_slot<Tz>(now: &DateTime<Tz>) -> (NaiveDate, u32)
where
    Tz: TimeZone,
{
    (now.date_naive(), now.hour() * 60 + now.minute())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextAlarm {
    pub entry: AlarmEntry,
    pub minutes_away: u32,
}

pub fn next_alarm<Tz>(registry: &AlarmRegistry, now: &DateTime<Tz>) -> Option<NextAlarm>
where
    Tz: TimeZone,
{
    let now_minutes = now.hour() * 60 + now.minute();
    let mut best: Option<NextAlarm> = None;
    for entry in registry.list() {
        if !entry.enabled {
            continue;
        }
        let minutes_away =
            (entry.time.minutes_from_midnight() + MINUTES_PER_DAY - now_minutes) % MINUTES_PER_DAY;
        // strict comparison keeps the earliest-added entry on ties
        let better = match &best {
            None => true,
            Some(current) => minutes_away < current.minutes_away,
        };
        if better {
            best = Some(NextAlarm {
                entry: entry.clone(),
                minutes_away,
            });
        }
    }
    best
}

pub fn format_minutes_away(minutes: u32) -> String {
    if minutes == 0 {
        "now".to_string()
    } else if minutes < 60 {
        format!("in {minutes} min")
    } else {
        format!("in {} h {:02} min", minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use chrono_tz::Asia::Bangkok;
    use chrono_tz::Europe::London;
    use chrono_tz::Tz;

    use super::*;

    fn bangkok(hour: u32, minute: u32, second: u32) -> DateTime<Tz> {
        Bangkok
            .with_ymd_and_hms(2026, 8, 25, hour, minute, second)
            .single()
            .expect("valid local time")
    }

    fn meal(hour: u32, minute: u32) -> MealTime {
        MealTime::new(hour, minute).expect("valid meal time")
    }

    fn meal_registry() -> AlarmRegistry {
        let mut registry = AlarmRegistry::new();
        registry.add(meal(9, 0), "Breakfast Time!", true);
        registry.add(meal(13, 0), "Lunch Time!", true);
        registry.add(meal(18, 0), "Dinner Time!", true);
        registry
    }

    #[test]
    fn fires_at_matching_minute() {
        let registry = meal_registry();
        let mut scheduler = AlarmScheduler::new();

        assert!(scheduler.tick(&registry, &bangkok(8, 59, 59)).is_none());

        let event = scheduler
            .tick(&registry, &bangkok(9, 0, 0))
            .expect("breakfast fires");
        assert_eq!(event.label, "Breakfast Time!");
        assert_eq!(event.time.to_string(), "09:00");
        assert!(scheduler.is_firing());
    }

    #[test]
    fn tick_late_in_minute_still_fires() {
        let registry = meal_registry();
        let mut scheduler = AlarmScheduler::new();

        let event = scheduler.tick(&registry, &bangkok(9, 0, 37));
        assert!(event.is_some(), "a tick anywhere inside 09:00 must fire");
    }

    #[test]
    fn fired_minute_is_not_rechecked_after_stop() {
        let registry = meal_registry();
        let mut scheduler = AlarmScheduler::new();

        assert!(scheduler.tick(&registry, &bangkok(9, 0, 5)).is_some());
        assert!(scheduler.stop());

        assert!(
            scheduler.tick(&registry, &bangkok(9, 0, 40)).is_none(),
            "stopping must not re-fire within the same minute"
        );
        assert!(scheduler.tick(&registry, &bangkok(9, 1, 0)).is_none());
    }

    #[test]
    fn duplicate_times_fire_first_in_insertion_order() {
        let mut registry = AlarmRegistry::new();
        let first = registry.add(meal(9, 0), "First Breakfast", true);
        registry.add(meal(9, 0), "Second Breakfast", true);
        let mut scheduler = AlarmScheduler::new();

        let event = scheduler
            .tick(&registry, &bangkok(9, 0, 0))
            .expect("one alarm fires");
        assert_eq!(event.id, first);

        scheduler.stop();
        assert!(
            scheduler.tick(&registry, &bangkok(9, 0, 30)).is_none(),
            "the duplicate stays silent for that minute"
        );
    }

    #[test]
    fn no_new_fires_while_firing() {
        let mut registry = AlarmRegistry::new();
        registry.add(meal(9, 0), "Breakfast", true);
        registry.add(meal(9, 1), "Breakfast Dessert", true);
        let mut scheduler = AlarmScheduler::new();

        assert!(scheduler.tick(&registry, &bangkok(9, 0, 0)).is_some());
        assert!(
            scheduler.tick(&registry, &bangkok(9, 1, 10)).is_none(),
            "minutes elapsing during an active alert stay silent"
        );

        scheduler.stop();
        assert!(
            scheduler.tick(&registry, &bangkok(9, 1, 50)).is_none(),
            "a minute consumed while firing is not revisited after stop"
        );
        assert!(scheduler.tick(&registry, &bangkok(9, 2, 0)).is_none());
    }

    #[test]
    fn disabled_entries_never_fire() {
        let mut registry = AlarmRegistry::new();
        let id = registry.add(meal(9, 0), "Breakfast", false);
        let mut scheduler = AlarmScheduler::new();

        assert!(scheduler.tick(&registry, &bangkok(9, 0, 0)).is_none());

        registry.toggle(id).expect("entry exists");
        let mut fresh = AlarmScheduler::new();
        assert!(fresh.tick(&registry, &bangkok(9, 0, 0)).is_some());
    }

    #[test]
    fn matching_follows_the_clock_zone() {
        let registry = meal_registry();
        let instant = Utc
            .with_ymd_and_hms(2026, 8, 25, 6, 0, 0)
            .single()
            .expect("valid instant");

        let mut in_bangkok = AlarmScheduler::new();
        assert!(
            in_bangkok
                .tick(&registry, &instant.with_timezone(&Bangkok))
                .is_some(),
            "06:00 UTC is 13:00 in Bangkok"
        );

        let mut in_london = AlarmScheduler::new();
        assert!(
            in_london
                .tick(&registry, &instant.with_timezone(&London))
                .is_none(),
            "06:00 UTC is 07:00 in London"
        );
    }

    #[test]
    fn snooze_adds_suffixed_entry_and_clears_alert() {
        let mut registry = meal_registry();
        let mut scheduler = AlarmScheduler::new();

        scheduler
            .tick(&registry, &bangkok(9, 0, 0))
            .expect("breakfast fires");
        let before = registry.len();

        let snoozed = scheduler
            .snooze(&mut registry, &bangkok(9, 0, 12))
            .expect("snooze while firing");

        assert_eq!(registry.len(), before + 1);
        let entry = registry.get(snoozed).expect("snoozed entry exists");
        assert_eq!(entry.time.to_string(), "09:05");
        assert_eq!(entry.label, "Breakfast Time! (Snoozed)");
        assert!(entry.enabled);

        let original = &registry.list()[0];
        assert_eq!(original.time.to_string(), "09:00");
        assert_eq!(original.label, "Breakfast Time!");
        assert!(!scheduler.is_firing());
    }

    #[test]
    fn snoozed_entry_fires_five_minutes_later() {
        let mut registry = meal_registry();
        let mut scheduler = AlarmScheduler::new();

        scheduler
            .tick(&registry, &bangkok(9, 0, 0))
            .expect("breakfast fires");
        scheduler
            .snooze(&mut registry, &bangkok(9, 0, 30))
            .expect("snooze while firing");

        assert!(scheduler.tick(&registry, &bangkok(9, 4, 0)).is_none());
        let event = scheduler
            .tick(&registry, &bangkok(9, 5, 0))
            .expect("snoozed alarm fires");
        assert_eq!(event.label, "Breakfast Time! (Snoozed)");
    }

    #[test]
    fn snooze_near_midnight_wraps_to_next_day() {
        let mut registry = AlarmRegistry::new();
        registry.add(meal(23, 58), "Late Snack", true);
        let mut scheduler = AlarmScheduler::new();

        scheduler
            .tick(&registry, &bangkok(23, 58, 10))
            .expect("late snack fires");
        let snoozed = scheduler
            .snooze(&mut registry, &bangkok(23, 58, 40))
            .expect("snooze while firing");

        let entry = registry.get(snoozed).expect("snoozed entry exists");
        assert_eq!(entry.time.to_string(), "00:03");
    }

    #[test]
    fn snooze_while_idle_changes_nothing() {
        let mut registry = meal_registry();
        let mut scheduler = AlarmScheduler::new();

        assert!(scheduler.snooze(&mut registry, &bangkok(10, 0, 0)).is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn stop_leaves_registry_untouched() {
        let registry = meal_registry();
        let mut scheduler = AlarmScheduler::new();

        scheduler
            .tick(&registry, &bangkok(13, 0, 0))
            .expect("lunch fires");
        let snapshot: Vec<AlarmEntry> = registry.list().to_vec();

        assert!(scheduler.stop());
        assert_eq!(registry.list(), snapshot.as_slice());
        assert_eq!(scheduler.state(), &AlertState::Idle);
        assert!(!scheduler.stop(), "stop while idle reports false");
    }

    #[test]
    fn next_alarm_picks_smallest_forward_distance() {
        let registry = meal_registry();

        let afternoon = next_alarm(&registry, &bangkok(14, 0, 0)).expect("dinner is next");
        assert_eq!(afternoon.entry.label, "Dinner Time!");
        assert_eq!(afternoon.minutes_away, 240);

        let early = next_alarm(&registry, &bangkok(8, 59, 0)).expect("breakfast is next");
        assert_eq!(early.entry.label, "Breakfast Time!");
        assert_eq!(early.minutes_away, 1);
    }

    #[test]
    fn next_alarm_at_exact_match_is_now() {
        let registry = meal_registry();

        let at_nine = next_alarm(&registry, &bangkok(9, 0, 45)).expect("breakfast matches");
        assert_eq!(at_nine.entry.label, "Breakfast Time!");
        assert_eq!(at_nine.minutes_away, 0);
        assert_eq!(format_minutes_away(at_nine.minutes_away), "now");
    }

    #[test]
    fn next_alarm_wraps_past_midnight() {
        let registry = meal_registry();

        let late = next_alarm(&registry, &bangkok(23, 0, 0)).expect("breakfast is next");
        assert_eq!(late.entry.label, "Breakfast Time!");
        assert_eq!(late.minutes_away, 10 * 60);
    }

    #[test]
    fn next_alarm_tie_prefers_insertion_order() {
        let mut registry = AlarmRegistry::new();
        let first = registry.add(meal(10, 0), "First", true);
        registry.add(meal(10, 0), "Second", true);

        let next = next_alarm(&registry, &bangkok(9, 0, 0)).expect("one wins");
        assert_eq!(next.entry.id, first);
    }

    #[test]
    fn next_alarm_skips_disabled_entries() {
        let mut registry = AlarmRegistry::new();
        registry.add(meal(9, 0), "Disabled Breakfast", false);
        registry.add(meal(18, 0), "Dinner", true);

        let next = next_alarm(&registry, &bangkok(8, 0, 0)).expect("dinner is next");
        assert_eq!(next.entry.label, "Dinner");

        let mut empty = AlarmRegistry::new();
        empty.add(meal(9, 0), "Off", false);
        assert!(next_alarm(&empty, &bangkok(8, 0, 0)).is_none());
    }

    #[test]
    fn format_minutes_away_buckets() {
        assert_eq!(format_minutes_away(0), "now");
        assert_eq!(format_minutes_away(1), "in 1 min");
        assert_eq!(format_minutes_away(59), "in 59 min");
        assert_eq!(format_minutes_away(60), "in 1 h 00 min");
        assert_eq!(format_minutes_away(240), "in 4 h 00 min");
        assert_eq!(format_minutes_away(251), "in 4 h 11 min");
    }
}
