/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::StopSet;
use crate::shared::{CarId, CarMode, CarStatus, Direction, DoorState, Request};

/// Rated load of a car in kg.
pub const DEFAULT_MAX_LOAD: u32 = 680;

/// What a single `step()` did to the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Held,
    Moved { floor: i32 },
    Stopped { floor: i32 },
}

/**
 * One elevator car and its SCAN style state machine.
 *
 * The car travels in one direction until the stop set for that direction is
 * drained, then turns around if the other set has work, and otherwise goes
 * idle. Every public operation is total. Requests that make no sense in the
 * current mode are dropped without touching state.
 *
 * # Fields
 * - `id`:              Position of the car in the fleet, also the tie-break key.
 * - `current_floor`:   Floor the car is at.
 * - `direction`:       Active direction of travel, `Idle` when not travelling.
 * - `door_state`:      Door state as seen between ticks.
 * - `mode`:            In service or taken out for maintenance.
 * - `overloaded`:      Set while `load` exceeds `max_load`. Suspends movement.
 * - `load`:            Current load in kg.
 * - `max_load`:        Load ceiling in kg.
 * - `up_stops`:        Floors above the car at the time they were registered.
 * - `down_stops`:      Floors below the car at the time they were registered.
 */
#[derive(Debug, Clone)]
pub struct Car {
    id: CarId,
    current_floor: i32,
    direction: Direction,
    door_state: DoorState,
    mode: CarMode,
    overloaded: bool,
    load: u32,
    max_load: u32,
    up_stops: StopSet,
    down_stops: StopSet,
}

impl Car {
    pub fn new(id: CarId, start_floor: i32, max_load: u32) -> Car {
        Car {
            id,
            current_floor: start_floor,
            direction: Direction::Idle,
            door_state: DoorState::Closed,
            mode: CarMode::InService,
            overloaded: false,
            load: 0,
            max_load,
            up_stops: StopSet::new(),
            down_stops: StopSet::new(),
        }
    }

    /// Admission rule for hall calls. A busy car only takes calls ahead of it
    /// in its own direction.
    pub fn can_accept(&self, request: &Request) -> bool {
        if self.mode == CarMode::Maintenance {
            return false;
        }

        match self.direction {
            Direction::Idle => true,
            Direction::Up => {
                request.direction() == Direction::Up && request.floor() > self.current_floor
            }
            Direction::Down => {
                request.direction() == Direction::Down && request.floor() < self.current_floor
            }
        }
    }

    // The stop is filed by where the car is, not by where the caller wants to go
    pub fn accept_pickup(&mut self, request: &Request) {
        self.add_stop(request.floor());
    }

    pub fn accept_internal_request(&mut self, floor: i32) {
        self.add_stop(floor);
    }

    fn add_stop(&mut self, floor: i32) {
        if self.mode == CarMode::Maintenance {
            debug!("Car {} in maintenance, ignoring stop at floor {}", self.id, floor);
            return;
        }

        if floor > self.current_floor {
            self.up_stops.insert(floor);
        } else if floor < self.current_floor {
            self.down_stops.insert(floor);
        } else {
            debug!("Car {} already at floor {}", self.id, floor);
        }
    }

    /// Advances the car by one tick.
    pub fn step(&mut self) -> StepOutcome {
        if self.mode == CarMode::Maintenance {
            return StepOutcome::Held;
        }

        self.resolve_direction_if_idle();
        if self.direction == Direction::Idle || self.overloaded {
            return StepOutcome::Held;
        }

        self.current_floor += self.direction.offset();
        let stopped = self.handle_stop_if_present();
        self.resolve_direction_after_movement();

        if stopped {
            StepOutcome::Stopped {
                floor: self.current_floor,
            }
        } else {
            debug!("Car {} passing floor {}", self.id, self.current_floor);
            StepOutcome::Moved {
                floor: self.current_floor,
            }
        }
    }

    fn resolve_direction_if_idle(&mut self) {
        if self.direction != Direction::Idle {
            return;
        }

        if !self.up_stops.is_empty() {
            self.direction = Direction::Up;
        } else if !self.down_stops.is_empty() {
            self.direction = Direction::Down;
        }
    }

    fn handle_stop_if_present(&mut self) -> bool {
        let floor = self.current_floor;
        let stopping = match self.direction {
            Direction::Up => self.up_stops.remove(floor),
            Direction::Down => self.down_stops.remove(floor),
            Direction::Idle => false,
        };

        if stopping {
            // Door opens and closes within the same tick
            self.door_state = DoorState::Open;
            info!("Car {} doors open at floor {}", self.id, floor);
            self.door_state = DoorState::Closed;
        }

        stopping
    }

    fn resolve_direction_after_movement(&mut self) {
        let (active, opposite) = match self.direction {
            Direction::Up => (&self.up_stops, &self.down_stops),
            Direction::Down => (&self.down_stops, &self.up_stops),
            Direction::Idle => return,
        };

        if active.is_empty() {
            self.direction = if opposite.is_empty() {
                Direction::Idle
            } else {
                self.direction.opposite()
            };
        }
    }

    pub fn enter_maintenance(&mut self) {
        self.mode = CarMode::Maintenance;
        self.direction = Direction::Idle;
        self.door_state = DoorState::Closed;
        info!("Car {} entered maintenance at floor {}", self.id, self.current_floor);
    }

    pub fn exit_maintenance(&mut self) {
        self.mode = CarMode::InService;
        self.direction = Direction::Idle;
        info!("Car {} back in service", self.id);
    }

    pub fn add_load(&mut self, kg: u32) {
        self.load = self.load.saturating_add(kg);
        if self.load > self.max_load && !self.overloaded {
            self.overloaded = true;
            warn!("Car {} overload alarm ({} kg > {} kg)", self.id, self.load, self.max_load);
        }
    }

    pub fn remove_load(&mut self, kg: u32) {
        self.load = self.load.saturating_sub(kg);
        if self.load <= self.max_load && self.overloaded {
            self.overloaded = false;
            info!("Car {} overload cleared", self.id);
        }
    }

    /// Halts the car where it is. Queued stops survive and are picked up again
    /// on the next step.
    pub fn emergency_stop(&mut self) {
        self.direction = Direction::Idle;
        self.overloaded = false;
        self.door_state = DoorState::Closed;
        warn!("Car {} emergency stop at floor {}", self.id, self.current_floor);
    }

    pub fn status(&self) -> CarStatus {
        CarStatus {
            id: self.id,
            floor: self.current_floor,
            direction: self.direction,
            door_state: self.door_state,
            mode: self.mode,
            overloaded: self.overloaded,
            load: self.load,
            pending_stops: self.up_stops.len() + self.down_stops.len(),
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn current_floor(&self) -> i32 {
        self.current_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn door_state(&self) -> DoorState {
        self.door_state
    }

    pub fn mode(&self) -> CarMode {
        self.mode
    }

    pub fn is_overloaded(&self) -> bool {
        self.overloaded
    }

    pub fn load(&self) -> u32 {
        self.load
    }

    pub fn up_stops(&self) -> &StopSet {
        &self.up_stops
    }

    pub fn down_stops(&self) -> &StopSet {
        &self.down_stops
    }

    pub fn has_pending_stops(&self) -> bool {
        !self.up_stops.is_empty() || !self.down_stops.is_empty()
    }
}

/***************************************/
/*           Test helpers              */
/***************************************/
#[cfg(test)]
impl Car {
    pub fn test_set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn test_set_floor(&mut self, floor: i32) {
        self.current_floor = floor;
    }
}
