/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};
use std::collections::VecDeque;
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::Config;
use crate::elevator::{Car, StepOutcome};
use crate::shared::{Assignment, CarId, CarStatus, Direction, Request};

/***************************************/
/*               Errors                */
/***************************************/
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("floor {floor} is outside the building ({lowest}..={highest})")]
    InvalidFloor { floor: i32, lowest: i32, highest: i32 },

    #[error("no car with id {0}")]
    UnknownCar(CarId),
}

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub outcomes: Vec<(CarId, StepOutcome)>,
    pub assignments: Vec<Assignment>,
}

/**
 * Fleet controller.
 *
 * Owns every car and a FIFO of hall calls nobody could take yet. Calls are
 * matched on submission and again after every tick, so a car that frees up is
 * offered the backlog straight away.
 *
 * # Fields
 * - `cars`:        The fleet, kept sorted by car id.
 * - `pending`:     Hall calls waiting for an eligible car, oldest first.
 * - `floor_range`: Lowest and highest floor. Floors outside it are rejected.
 *                  `None` accepts any floor.
 */
#[derive(Debug, Clone)]
pub struct Dispatcher {
    cars: Vec<Car>,
    pending: VecDeque<Request>,
    floor_range: Option<(i32, i32)>,
}

impl Dispatcher {
    pub fn new(mut cars: Vec<Car>) -> Dispatcher {
        cars.sort_by_key(|car| car.id());
        Dispatcher {
            cars,
            pending: VecDeque::new(),
            floor_range: None,
        }
    }

    pub fn from_config(config: &Config) -> Dispatcher {
        let cars = config
            .fleet
            .start_floors
            .iter()
            .enumerate()
            .map(|(id, &floor)| Car::new(id, floor, config.fleet.max_load))
            .collect();

        Dispatcher::new(cars)
            .with_floor_range(config.building.lowest_floor, config.building.highest_floor)
    }

    pub fn with_floor_range(mut self, lowest: i32, highest: i32) -> Dispatcher {
        self.floor_range = Some((lowest, highest));
        self
    }

    /// Queues a hall call and tries to place it (and anything older) right away.
    pub fn submit(&mut self, request: Request) -> Result<Vec<Assignment>, DispatchError> {
        self.check_floor(request.floor())?;
        debug!("Queued {} call at floor {}", request.direction(), request.floor());
        self.pending.push_back(request);
        Ok(self.try_assign_all())
    }

    pub fn submit_pickup(
        &mut self,
        floor: i32,
        direction: Direction,
    ) -> Result<Vec<Assignment>, DispatchError> {
        self.submit(Request::new(floor, direction))
    }

    /// In-car destination press. Skips the admission rule.
    pub fn submit_internal(&mut self, car_id: CarId, floor: i32) -> Result<(), DispatchError> {
        self.check_floor(floor)?;
        self.car_mut(car_id)?.accept_internal_request(floor);
        Ok(())
    }

    /// One pass over the backlog in arrival order. Matched calls are removed,
    /// the rest keep their place in the queue.
    pub fn try_assign_all(&mut self) -> Vec<Assignment> {
        let mut assignments = Vec::new();
        let mut unmatched = VecDeque::with_capacity(self.pending.len());

        while let Some(request) = self.pending.pop_front() {
            match self.select_car(&request) {
                Some(index) => {
                    let car = &mut self.cars[index];
                    car.accept_pickup(&request);
                    info!(
                        "Assigned {} call at floor {} to car {} (at floor {})",
                        request.direction(),
                        request.floor(),
                        car.id(),
                        car.current_floor()
                    );
                    assignments.push(Assignment {
                        car: car.id(),
                        request,
                    });
                }
                None => unmatched.push_back(request),
            }
        }

        self.pending = unmatched;
        assignments
    }

    /// Advances every car by one floor, then retries the backlog.
    pub fn tick(&mut self) -> TickReport {
        let outcomes = self
            .cars
            .iter_mut()
            .map(|car| (car.id(), car.step()))
            .collect();
        let assignments = self.try_assign_all();

        if !self.pending.is_empty() {
            debug!("{} calls still waiting for a car", self.pending.len());
        }

        TickReport {
            outcomes,
            assignments,
        }
    }

    /// Car that `try_assign_all` would pick for this request right now.
    /// Floors outside the building have no car.
    pub fn nearest_eligible_for(&self, request: &Request) -> Option<CarId> {
        self.check_floor(request.floor()).ok()?;
        self.select_car(request).map(|index| self.cars[index].id())
    }

    /// Nearest car that would take a call from `floor` in either direction.
    pub fn nearest_eligible(&self, floor: i32) -> Option<CarId> {
        self.check_floor(floor).ok()?;
        let up = Request::new(floor, Direction::Up);
        let down = Request::new(floor, Direction::Down);

        self.cars
            .iter()
            .filter(|car| car.can_accept(&up) || car.can_accept(&down))
            .min_by_key(|car| car.current_floor().abs_diff(floor))
            .map(|car| car.id())
    }

    // Lowest id wins on equal distance, `min_by_key` keeps the first minimum
    fn select_car(&self, request: &Request) -> Option<usize> {
        self.cars
            .iter()
            .enumerate()
            .filter(|(_, car)| car.can_accept(request))
            .min_by_key(|(_, car)| car.current_floor().abs_diff(request.floor()))
            .map(|(index, _)| index)
    }

    fn check_floor(&self, floor: i32) -> Result<(), DispatchError> {
        match self.floor_range {
            Some((lowest, highest)) if floor < lowest || floor > highest => {
                warn!("Rejected floor {} (building is {}..={})", floor, lowest, highest);
                Err(DispatchError::InvalidFloor {
                    floor,
                    lowest,
                    highest,
                })
            }
            _ => Ok(()),
        }
    }

    /***************************************/
    /*           Fleet control             */
    /***************************************/
    pub fn enter_maintenance(&mut self, car_id: CarId) -> Result<(), DispatchError> {
        self.car_mut(car_id)?.enter_maintenance();
        Ok(())
    }

    pub fn exit_maintenance(&mut self, car_id: CarId) -> Result<(), DispatchError> {
        self.car_mut(car_id)?.exit_maintenance();
        Ok(())
    }

    pub fn emergency_stop(&mut self, car_id: CarId) -> Result<(), DispatchError> {
        self.car_mut(car_id)?.emergency_stop();
        Ok(())
    }

    pub fn add_load(&mut self, car_id: CarId, kg: u32) -> Result<(), DispatchError> {
        self.car_mut(car_id)?.add_load(kg);
        Ok(())
    }

    pub fn remove_load(&mut self, car_id: CarId, kg: u32) -> Result<(), DispatchError> {
        self.car_mut(car_id)?.remove_load(kg);
        Ok(())
    }

    /***************************************/
    /*              Queries                */
    /***************************************/
    pub fn status(&self, car_id: CarId) -> Result<CarStatus, DispatchError> {
        self.car(car_id).map(Car::status)
    }

    pub fn fleet_status(&self) -> Vec<CarStatus> {
        self.cars.iter().map(Car::status).collect()
    }

    pub fn car(&self, car_id: CarId) -> Result<&Car, DispatchError> {
        self.cars
            .iter()
            .find(|car| car.id() == car_id)
            .ok_or(DispatchError::UnknownCar(car_id))
    }

    fn car_mut(&mut self, car_id: CarId) -> Result<&mut Car, DispatchError> {
        match self.cars.iter_mut().find(|car| car.id() == car_id) {
            Some(car) => Ok(car),
            None => {
                warn!("Unknown car id {}", car_id);
                Err(DispatchError::UnknownCar(car_id))
            }
        }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/***************************************/
/*           Test helpers              */
/***************************************/
#[cfg(test)]
impl Dispatcher {
    pub fn test_car_mut(&mut self, car_id: CarId) -> &mut Car {
        self.cars
            .iter_mut()
            .find(|car| car.id() == car_id)
            .expect("test car id must exist")
    }
}
