/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/***************************************/
/*       Public data structures        */
/***************************************/
pub type CarId = usize;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match *self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
        }
    }

    /// Floor offset of one step in this direction.
    pub fn offset(&self) -> i32 {
        match *self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Idle => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Idle => write!(f, "idle"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "idle" => Ok(Direction::Idle),
            other => Err(format!("invalid direction '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    Open,
    Closed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarMode {
    #[serde(rename = "inService")]
    InService,
    #[serde(rename = "maintenance")]
    Maintenance,
}

/**
 * A hall call: the floor it was made from and where the passenger wants to go.
 *
 * Requests are plain values. The dispatcher drops them once a car has taken them.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    floor: i32,
    direction: Direction,
}

impl Request {
    pub fn new(floor: i32, direction: Direction) -> Request {
        Request { floor, direction }
    }

    pub fn floor(&self) -> i32 {
        self.floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

// Snapshot handed to whatever displays the fleet
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarStatus {
    pub id: CarId,
    pub floor: i32,
    pub direction: Direction,
    #[serde(rename = "doorState")]
    pub door_state: DoorState,
    pub mode: CarMode,
    pub overloaded: bool,
    pub load: u32,
    #[serde(rename = "pendingStops")]
    pub pending_stops: usize,
}

/// A request that was matched to a car during an assignment pass.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub car: CarId,
    pub request: Request,
}
