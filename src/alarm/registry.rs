use crate::alarm::model::{AlarmEntry, AlarmError, AlarmId, AlarmSeed, MealTime};

#[derive(Debug, Clone)]
pub struct AlarmRegistry {
    alarms: Vec<AlarmEntry>,
    next_id: u64,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self {
            alarms: Vec::new(),
            next_id: 1,
        }
    }

    pub fn from_seed(seed: &AlarmSeed) -> Self {
        let mut registry = Self::new();
        for alarm in &seed.alarms {
            registry.add(alarm.time, alarm.label.clone(), alarm.enabled);
        }
        registry
    }

    pub fn add(&mut self, time: MealTime, label: impl Into<String>, enabled: bool) -> AlarmId {
        let id = AlarmId(self.next_id);
        self.next_id += 1;
        self.alarms.push(AlarmEntry {
            id,
            time,
            label: label.into(),
            enabled,
        });
        id
    }

    pub fn update(
        &mut self,
        id: AlarmId,
        time: MealTime,
        label: impl Into<String>,
    ) -> Result<(), AlarmError> {
        let entry = self.entry_mut(id)?;
        entry.time = time;
        entry.label = label.into();
        Ok(())
    }

    pub fn remove(&mut self, id: AlarmId) -> Result<AlarmEntry, AlarmError> {
        let index = self.position(id).ok_or(AlarmError::NotFound(id))?;
        Ok(self.alarms.remove(index))
    }

    pub fn toggle(&mut self, id: AlarmId) -> Result<bool, AlarmError> {
        let entry = self.entry_mut(id)?;
        entry.enabled = !entry.enabled;
        Ok(entry.enabled)
    }

    pub fn get(&self, id: AlarmId) -> Option<&AlarmEntry> {
        self.alarms.iter().find(|entry| entry.id == id)
    }

    pub fn list(&self) -> &[AlarmEntry] {
        &self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    fn position(&self, id: AlarmId) -> Option<usize> {
        self.alarms.iter().position(|entry| entry.id == id)
    }

    fn entry_mut(&mut self, id: AlarmId) -> Result<&mut AlarmEntry, AlarmError> {
        self.alarms
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(AlarmError::NotFound(id))
    }
}

impl Default for AlarmRegistry {
    fn default() -> Self {
        Self::new()
    }
}
