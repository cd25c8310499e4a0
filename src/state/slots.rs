/// Busy/idle flags for the fixed pool of fetch slots
///
/// Slot `i` is busy while a request it started is outstanding. Only the
/// dispatcher marks slots busy; the slot's own completion marks it idle again.
#[derive(Debug, Clone)]
pub struct WorkerSlots {
    busy: Vec<bool>,
}

impl WorkerSlots {
    /// Creates `count` idle slots (at least one)
    pub fn new(count: usize) -> Self {
        Self {
            busy: vec![false; count.max(1)],
        }
    }

    pub fn len(&self) -> usize {
        self.busy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.busy.is_empty()
    }

    pub fn is_busy(&self, index: usize) -> bool {
        self.busy.get(index).copied().unwrap_or(false)
    }

    /// Marks a slot busy; returns false if it was already busy or out of range
    pub fn start_working(&mut self, index: usize) -> bool {
        match self.busy.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    /// Marks a slot idle; returns false if it was already idle or out of range
    pub fn finish_working(&mut self, index: usize) -> bool {
        match self.busy.get_mut(index) {
            Some(flag) if *flag => {
                *flag = false;
                true
            }
            _ => false,
        }
    }

    /// Indices of the slots currently idle
    pub fn idle_slots(&self) -> Vec<usize> {
        self.busy
            .iter()
            .enumerate()
            .filter(|(_, busy)| !**busy)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn busy_count(&self) -> usize {
        self.busy.iter().filter(|busy| **busy).count()
    }

    /// Returns true when no slot has a request outstanding
    pub fn all_idle(&self) -> bool {
        self.busy.iter().all(|busy| !busy)
    }

    /// Marks every slot idle
    pub fn reset(&mut self) {
        self.busy.iter_mut().for_each(|busy| *busy = false);
    }
}
