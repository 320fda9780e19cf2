/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info};
use std::thread::{Builder, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::dispatcher::{DispatchError, Dispatcher, TickReport};
use crate::shared::{Assignment, CarId, CarStatus, Direction, Request};

/***************************************/
/*               Enums                 */
/***************************************/
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("dispatcher service has stopped")]
    Stopped,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarAction {
    EnterMaintenance,
    ExitMaintenance,
    EmergencyStop,
    AddLoad(u32),
    RemoveLoad(u32),
}

type Reply<T> = cbc::Sender<T>;

pub enum Command {
    Pickup(Request, Reply<Result<Vec<Assignment>, DispatchError>>),
    Internal(CarId, i32, Reply<Result<(), DispatchError>>),
    Control(CarId, CarAction, Reply<Result<(), DispatchError>>),
    Tick(Reply<TickReport>),
    Status(CarId, Reply<Result<CarStatus, DispatchError>>),
    FleetStatus(Reply<Vec<CarStatus>>),
    NearestEligible(i32, Reply<Option<CarId>>),
    PendingLen(Reply<usize>),
    Terminate,
}

enum Event {
    NewCommand(Command),
    TimerTick,
    Terminate,
}

/**
 * Runs a `Dispatcher` on its own thread.
 *
 * The service is the only owner of the fleet. Every caller goes through the
 * command channel, so selecting a car and committing the stop happen in one
 * step and two concurrent calls can never both claim the same car. Replies go
 * back on a channel created per call.
 *
 * # Fields
 * - `dispatcher`:      The fleet and its backlog.
 * - `command_rx`:      Receives commands from every `DispatcherHandle`.
 * - `report_tx`:       Publishes a `TickReport` after every tick. Never blocks,
 *                      a report nobody has room for is dropped.
 * - `tick_interval`:   Milliseconds between autonomous ticks, 0 disables them.
 */
pub struct DispatcherService {
    dispatcher: Dispatcher,
    command_rx: cbc::Receiver<Command>,
    report_tx: cbc::Sender<TickReport>,
    tick_interval: u64,
}

impl DispatcherService {
    pub fn new(
        dispatcher: Dispatcher,
        command_rx: cbc::Receiver<Command>,
        report_tx: cbc::Sender<TickReport>,
        tick_interval: u64,
    ) -> DispatcherService {
        DispatcherService {
            dispatcher,
            command_rx,
            report_tx,
            tick_interval,
        }
    }

    /// Starts the service on a named thread and returns a handle to it.
    pub fn spawn(
        dispatcher: Dispatcher,
        report_tx: cbc::Sender<TickReport>,
        tick_interval: u64,
    ) -> std::io::Result<(DispatcherHandle, JoinHandle<()>)> {
        let (command_tx, command_rx) = cbc::unbounded::<Command>();
        let service = DispatcherService::new(dispatcher, command_rx, report_tx, tick_interval);

        let thread = Builder::new()
            .name("dispatcher".into())
            .spawn(move || service.run())?;

        Ok((DispatcherHandle { command_tx }, thread))
    }

    pub fn run(mut self) {
        let ticker = if self.tick_interval > 0 {
            cbc::tick(Duration::from_millis(self.tick_interval))
        } else {
            cbc::never::<Instant>()
        };

        // Main loop
        loop {
            match self.wait_for_event(&ticker) {
                Event::NewCommand(command) => self.handle_command(command),
                Event::TimerTick => self.tick(),
                Event::Terminate => {
                    info!("Dispatcher service terminated");
                    return;
                }
            }
        }
    }

    fn wait_for_event(&self, ticker: &cbc::Receiver<Instant>) -> Event {
        cbc::select! {
            recv(self.command_rx) -> command => {
                match command {
                    Ok(Command::Terminate) => Event::Terminate,
                    Ok(command) => Event::NewCommand(command),
                    // Every handle is gone
                    Err(_) => Event::Terminate,
                }
            },
            recv(ticker) -> _ => Event::TimerTick,
        }
    }

    fn handle_command(&mut self, command: Command) {
        // A caller that gave up waiting has dropped its reply receiver
        match command {
            Command::Pickup(request, reply) => {
                let _ = reply.send(self.dispatcher.submit(request));
            }
            Command::Internal(car, floor, reply) => {
                let _ = reply.send(self.dispatcher.submit_internal(car, floor));
            }
            Command::Control(car, action, reply) => {
                let result = match action {
                    CarAction::EnterMaintenance => self.dispatcher.enter_maintenance(car),
                    CarAction::ExitMaintenance => self.dispatcher.exit_maintenance(car),
                    CarAction::EmergencyStop => self.dispatcher.emergency_stop(car),
                    CarAction::AddLoad(kg) => self.dispatcher.add_load(car, kg),
                    CarAction::RemoveLoad(kg) => self.dispatcher.remove_load(car, kg),
                };
                let _ = reply.send(result);
            }
            Command::Tick(reply) => {
                let report = self.tick_report();
                let _ = reply.send(report);
            }
            Command::Status(car, reply) => {
                let _ = reply.send(self.dispatcher.status(car));
            }
            Command::FleetStatus(reply) => {
                let _ = reply.send(self.dispatcher.fleet_status());
            }
            Command::NearestEligible(floor, reply) => {
                let _ = reply.send(self.dispatcher.nearest_eligible(floor));
            }
            Command::PendingLen(reply) => {
                let _ = reply.send(self.dispatcher.pending_len());
            }
            Command::Terminate => {}
        }
    }

    fn tick(&mut self) {
        self.tick_report();
    }

    fn tick_report(&mut self) -> TickReport {
        let report = self.dispatcher.tick();
        debug!("Tick: {:?}", report.outcomes);
        match self.report_tx.try_send(report.clone()) {
            Ok(()) | Err(cbc::TrySendError::Disconnected(_)) => {}
            Err(cbc::TrySendError::Full(_)) => debug!("Report channel full, dropped tick report"),
        }
        report
    }
}

/**
 * Cloneable front end to a running `DispatcherService`.
 *
 * Every call blocks until the service has applied it. Once the service thread
 * is gone all calls return `ServiceError::Stopped`.
 */
#[derive(Clone)]
pub struct DispatcherHandle {
    command_tx: cbc::Sender<Command>,
}

impl DispatcherHandle {
    fn call<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T, ServiceError> {
        let (reply_tx, reply_rx) = cbc::bounded::<T>(1);
        self.command_tx
            .send(command(reply_tx))
            .map_err(|_| ServiceError::Stopped)?;
        reply_rx.recv().map_err(|_| ServiceError::Stopped)
    }

    pub fn submit_pickup(
        &self,
        floor: i32,
        direction: Direction,
    ) -> Result<Vec<Assignment>, ServiceError> {
        let request = Request::new(floor, direction);
        Ok(self.call(|reply| Command::Pickup(request, reply))??)
    }

    pub fn submit_internal(&self, car: CarId, floor: i32) -> Result<(), ServiceError> {
        Ok(self.call(|reply| Command::Internal(car, floor, reply))??)
    }

    pub fn control(&self, car: CarId, action: CarAction) -> Result<(), ServiceError> {
        Ok(self.call(|reply| Command::Control(car, action, reply))??)
    }

    pub fn tick(&self) -> Result<TickReport, ServiceError> {
        self.call(Command::Tick)
    }

    pub fn status(&self, car: CarId) -> Result<CarStatus, ServiceError> {
        Ok(self.call(|reply| Command::Status(car, reply))??)
    }

    pub fn fleet_status(&self) -> Result<Vec<CarStatus>, ServiceError> {
        self.call(Command::FleetStatus)
    }

    pub fn nearest_eligible(&self, floor: i32) -> Result<Option<CarId>, ServiceError> {
        self.call(|reply| Command::NearestEligible(floor, reply))
    }

    pub fn pending_len(&self) -> Result<usize, ServiceError> {
        self.call(Command::PendingLen)
    }

    pub fn terminate(&self) -> Result<(), ServiceError> {
        self.command_tx
            .send(Command::Terminate)
            .map_err(|_| ServiceError::Stopped)
    }
}
