/*
 * Unit tests for the car state machine
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 *  - test_car_init
 *  - test_car_idle_accepts_everything
 *  - test_car_admission_moving_up
 *  - test_car_admission_moving_down
 *  - test_car_stop_classification
 *  - test_car_step_resolves_direction
 *  - test_car_runs_stops_in_order
 *  - test_car_turns_around
 *  - test_car_stop_removed_once
 *  - test_car_maintenance
 *  - test_car_overload
 *  - test_car_remove_load_never_negative
 *  - test_car_emergency_stop
 *  - test_car_drains_all_stops
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod car_tests {
    use crate::elevator::{Car, StepOutcome, DEFAULT_MAX_LOAD};
    use crate::shared::CarMode::{InService, Maintenance};
    use crate::shared::Direction::{Down, Idle, Up};
    use crate::shared::DoorState::Closed;
    use crate::shared::Request;

    fn setup_car(start_floor: i32) -> Car {
        Car::new(0, start_floor, DEFAULT_MAX_LOAD)
    }

    fn stops(car: &Car) -> (Vec<i32>, Vec<i32>) {
        (
            car.up_stops().iter().copied().collect(),
            car.down_stops().iter().copied().collect(),
        )
    }

    #[test]
    fn test_car_init() {
        // Arrange
        let car = setup_car(4);

        // Act
        let status = car.status();

        // Assert
        assert_eq!(status.floor, 4);
        assert_eq!(status.direction, Idle);
        assert_eq!(status.door_state, Closed);
        assert_eq!(status.mode, InService);
        assert!(!status.overloaded);
        assert_eq!(status.pending_stops, 0);
    }

    #[test]
    fn test_car_idle_accepts_everything() {
        // Purpose: An idle in-service car takes any hall call

        // Arrange
        let car = setup_car(5);

        // Act + Assert
        for floor in -2..12 {
            assert!(car.can_accept(&Request::new(floor, Up)));
            assert!(car.can_accept(&Request::new(floor, Down)));
        }
    }

    #[test]
    fn test_car_admission_moving_up() {
        // Arrange
        let mut car = setup_car(4);
        car.test_set_direction(Up);

        // Act + Assert
        for floor in 0..10 {
            assert_eq!(car.can_accept(&Request::new(floor, Up)), floor > 4);
            assert!(!car.can_accept(&Request::new(floor, Down)));
        }
    }

    #[test]
    fn test_car_admission_moving_down() {
        // Arrange
        let mut car = setup_car(4);
        car.test_set_direction(Down);

        // Act + Assert
        for floor in 0..10 {
            assert_eq!(car.can_accept(&Request::new(floor, Down)), floor < 4);
            assert!(!car.can_accept(&Request::new(floor, Up)));
        }
    }

    #[test]
    fn test_car_stop_classification() {
        // Purpose: Stops are filed by car position, not by requested direction

        // Arrange
        let mut car = setup_car(5);

        // Act
        car.accept_pickup(&Request::new(8, Down));
        car.accept_pickup(&Request::new(2, Up));
        car.accept_pickup(&Request::new(5, Up));
        car.accept_internal_request(9);

        // Assert
        assert_eq!(stops(&car), (vec![8, 9], vec![2]));
    }

    #[test]
    fn test_car_step_resolves_direction() {
        // Arrange
        let mut idle = setup_car(3);
        let mut down_only = setup_car(3);
        let mut both = setup_car(3);
        down_only.accept_internal_request(1);
        both.accept_internal_request(1);
        both.accept_internal_request(6);

        // Act
        let idle_outcome = idle.step();
        down_only.step();
        both.step();

        // Assert
        assert_eq!(idle_outcome, StepOutcome::Held);
        assert_eq!(idle.current_floor(), 3);
        assert_eq!(down_only.current_floor(), 2);
        assert_eq!(down_only.direction(), Down);
        assert_eq!(both.current_floor(), 4);
        assert_eq!(both.direction(), Up);
    }

    #[test]
    fn test_car_runs_stops_in_order() {
        // Purpose: Car@1 with up stops {3, 7} stops at 3 and keeps going, then idles at 7

        // Arrange
        let mut car = setup_car(1);
        car.accept_internal_request(3);
        car.accept_internal_request(7);

        // Act
        car.step();
        let arrival = car.step();

        // Assert
        assert_eq!(arrival, StepOutcome::Stopped { floor: 3 });
        assert_eq!(car.current_floor(), 3);
        assert!(!car.up_stops().contains(3));
        assert_eq!(car.direction(), Up);
        assert_eq!(car.door_state(), Closed);

        // Act
        for _ in 0..4 {
            car.step();
        }

        // Assert
        assert_eq!(car.current_floor(), 7);
        assert!(car.up_stops().is_empty());
        assert_eq!(car.direction(), Idle);
    }

    #[test]
    fn test_car_turns_around() {
        // Arrange
        let mut car = setup_car(2);
        car.accept_internal_request(4);
        car.step();
        car.accept_internal_request(1);

        // Act
        let arrival = car.step();

        // Assert
        assert_eq!(arrival, StepOutcome::Stopped { floor: 4 });
        assert_eq!(car.direction(), Down);

        // Act
        for _ in 0..3 {
            car.step();
        }

        // Assert
        assert_eq!(car.current_floor(), 1);
        assert_eq!(car.direction(), Idle);
    }

    #[test]
    fn test_car_stop_removed_once() {
        // Purpose: A stop is only served while moving in its direction

        // Arrange
        let mut car = setup_car(5);
        car.accept_internal_request(8);
        car.accept_internal_request(2);
        let mut served = Vec::new();

        // Act
        for _ in 0..12 {
            if let StepOutcome::Stopped { floor } = car.step() {
                served.push(floor);
            }
        }

        // Assert
        assert_eq!(served, vec![8, 2]);
        assert_eq!(car.current_floor(), 2);
        assert!(!car.has_pending_stops());
    }

    #[test]
    fn test_car_maintenance() {
        // Purpose: A car in maintenance keeps its stops, takes no new ones and never moves

        // Arrange
        let mut car = setup_car(1);
        car.accept_internal_request(5);

        // Act
        car.enter_maintenance();
        car.accept_internal_request(7);
        car.accept_pickup(&Request::new(0, Down));
        for _ in 0..5 {
            assert_eq!(car.step(), StepOutcome::Held);
        }

        // Assert
        assert_eq!(car.mode(), Maintenance);
        assert_eq!(car.current_floor(), 1);
        assert_eq!(car.door_state(), Closed);
        assert_eq!(stops(&car), (vec![5], vec![]));
        assert!(!car.can_accept(&Request::new(3, Up)));

        // Act
        car.exit_maintenance();

        // Assert
        assert_eq!(car.mode(), InService);
        assert_eq!(car.direction(), Idle);
        assert_eq!(car.current_floor(), 1);

        // Act
        car.step();

        // Assert
        assert_eq!(car.current_floor(), 2);
        assert_eq!(car.direction(), Up);
    }

    #[test]
    fn test_car_overload() {
        // Arrange
        let mut car = setup_car(0);
        car.accept_internal_request(3);

        // Act
        car.add_load(DEFAULT_MAX_LOAD);
        let at_limit = car.is_overloaded();
        car.add_load(1);
        car.step();
        car.step();

        // Assert
        assert!(!at_limit);
        assert!(car.is_overloaded());
        assert_eq!(car.current_floor(), 0);
        assert!(car.up_stops().contains(3));

        // Act
        car.remove_load(1);
        car.step();

        // Assert
        assert!(!car.is_overloaded());
        assert_eq!(car.current_floor(), 1);
    }

    #[test]
    fn test_car_remove_load_never_negative() {
        // Arrange
        let mut car = setup_car(0);
        car.add_load(50);

        // Act
        car.remove_load(80);

        // Assert
        assert_eq!(car.load(), 0);
        assert!(!car.is_overloaded());
    }

    #[test]
    fn test_car_emergency_stop() {
        // Purpose: Emergency stop halts the car but keeps its queued stops

        // Arrange
        let mut car = setup_car(0);
        car.accept_internal_request(4);
        car.step();
        car.add_load(DEFAULT_MAX_LOAD + 100);

        // Act
        car.emergency_stop();

        // Assert
        assert_eq!(car.direction(), Idle);
        assert!(!car.is_overloaded());
        assert_eq!(car.door_state(), Closed);
        assert_eq!(stops(&car), (vec![4], vec![]));

        // Act
        car.step();

        // Assert
        assert_eq!(car.current_floor(), 2);
        assert_eq!(car.direction(), Up);
    }

    #[test]
    fn test_car_drains_all_stops() {
        // Purpose: With no new work the car eventually empties both stop sets

        // Arrange
        let mut car = setup_car(6);
        for floor in [9, 0, 3, 12, 7, -1] {
            car.accept_internal_request(floor);
        }

        // Act
        let mut ticks = 0;
        while car.has_pending_stops() && ticks < 100 {
            car.step();
            ticks += 1;
        }

        // Assert
        assert!(!car.has_pending_stops());
        assert_eq!(car.direction(), Idle);
        assert_eq!(car.current_floor(), -1);
    }
}
