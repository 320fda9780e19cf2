use std::collections::BTreeSet;

/**
 * Pending stops for one direction of travel.
 *
 * Floors are kept ordered so that logging and status output list them the way
 * the car will visit them. Nothing is re-validated against the car position
 * once inserted.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopSet {
    floors: BTreeSet<i32>,
}

impl StopSet {
    pub fn new() -> StopSet {
        StopSet {
            floors: BTreeSet::new(),
        }
    }

    /// Returns false if the floor was already queued.
    pub fn insert(&mut self, floor: i32) -> bool {
        self.floors.insert(floor)
    }

    pub fn contains(&self, floor: i32) -> bool {
        self.floors.contains(&floor)
    }

    /// Removes the floor and reports whether it was queued.
    pub fn remove(&mut self, floor: i32) -> bool {
        self.floors.remove(&floor)
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &i32> {
        self.floors.iter()
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
