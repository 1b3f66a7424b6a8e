use std::{
    fmt,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread,
    time::Duration,
};

use tracing::{debug, info, trace, warn};

use crate::{
    codec,
    config::{Config, MAX_SPEED},
    error::{Error, Result},
    proc::Grid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Editing,
    Playing,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Mode::Idle => "idle",
            Mode::Editing => "editing",
            Mode::Playing => "playing",
        })
    }
}

/// Owns the grid and decides when it may change.
///
/// `Idle`, `Editing` and `Playing` are mutually exclusive; editing and playing
/// can only be entered from `Idle`. Operations that are not allowed in the
/// current mode return `false` and leave the grid untouched.
#[derive(Debug)]
pub struct Controller {
    grid: Grid,
    mode: Mode,
    speed: u8,
    base_interval: Duration,
    generation: u64,
}

impl Controller {

    /// Creates a controller over a cleared grid.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_grid(Grid::new(config.rows, config.cols)?, config)
    }

    fn with_grid(grid: Grid, config: Config) -> Result<Self> {
        check_speed(config.speed)?;
        Ok(Controller {
            grid,
            mode: Mode::Idle,
            speed: config.speed,
            base_interval: config.base_interval,
            generation: 0,
        })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.mode == Mode::Playing
    }

    #[inline]
    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Editing
    }

    #[inline]
    pub fn speed(&self) -> u8 {
        self.speed
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn cell(&self, row: isize, col: isize) -> bool {
        self.grid.get(row, col)
    }

    /// Time between generations at the current speed.
    pub fn tick_interval(&self) -> Duration {
        self.base_interval / u32::from(self.speed)
    }

    pub fn start_play(&mut self) -> bool {
        match self.mode {
            Mode::Playing => true,
            Mode::Editing => {
                warn!("cannot play while editing");
                false
            }
            Mode::Idle => {
                self.mode = Mode::Playing;
                debug!(interval = ?self.tick_interval(), "playing");
                true
            }
        }
    }

    pub fn stop_play(&mut self) {
        if self.mode == Mode::Playing {
            self.mode = Mode::Idle;
            debug!(generation = self.generation, "stopped");
        }
    }

    pub fn start_edit(&mut self) -> bool {
        match self.mode {
            Mode::Editing => true,
            Mode::Playing => {
                warn!("cannot edit while playing");
                false
            }
            Mode::Idle => {
                self.mode = Mode::Editing;
                debug!("editing");
                true
            }
        }
    }

    pub fn finish_edit(&mut self) {
        if self.mode == Mode::Editing {
            self.mode = Mode::Idle;
            debug!(population = self.grid.population(), "edit finished");
        }
    }

    /// Sets the speed tier. The new interval is picked up by the next wait of
    /// the ticker, not by one already in progress.
    pub fn set_speed(&mut self, level: u8) -> Result<()> {
        check_speed(level)?;
        self.speed = level;
        debug!(level, interval = ?self.tick_interval(), "speed changed");
        Ok(())
    }

    pub fn faster(&mut self) {
        if self.speed < MAX_SPEED {
            self.speed += 1;
        }
    }

    pub fn slower(&mut self) {
        if self.speed > 1 {
            self.speed -= 1;
        }
    }

    /// Flips one cell. Only allowed while editing.
    pub fn toggle_cell(&mut self, row: isize, col: isize) -> bool {
        if self.mode != Mode::Editing {
            warn!(row, col, mode = %self.mode, "toggle rejected");
            return false;
        }
        self.grid.toggle(row, col);
        true
    }

    pub fn clear_all(&mut self) {
        self.grid.clear();
        self.generation = 0;
        debug!("grid cleared");
    }

    /// Advances a single generation on request. Rejected while editing.
    pub fn step(&mut self) -> bool {
        if self.mode == Mode::Editing {
            return false;
        }
        self.advance();
        true
    }

    /// Timer entry point: advances only while playing.
    pub fn tick(&mut self) -> bool {
        if self.mode != Mode::Playing {
            return false;
        }
        self.advance();
        true
    }

    fn advance(&mut self) {
        self.grid.step();
        self.generation += 1;
        trace!(generation = self.generation, "tick");
    }

    /// Replaces the grid with the parsed `text`. On any error the current grid
    /// is left exactly as it was.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let data = codec::parse(text, self.grid.rows(), self.grid.cols())?;
        self.commit(data);
        Ok(())
    }

    /// Loads a grid file, all or nothing.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match codec::read_file(path, self.grid.rows(), self.grid.cols()) {
            Ok(data) => {
                self.commit(data);
                info!(path = %path.display(), population = self.grid.population(), "grid loaded");
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "load rejected");
                Err(e)
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        codec::write_file(path, &self.grid)
            .inspect(|_| info!(path = %path.display(), "grid saved"))
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "save failed"))
    }

    fn commit(&mut self, data: Vec<Vec<bool>>) {
        self.grid.replace(data);
        self.generation = 0;
    }

    /// Direct grid access for seeding before the UI takes over.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}

fn check_speed(level: u8) -> Result<()> {
    if (1..=MAX_SPEED).contains(&level) {
        Ok(())
    } else {
        Err(Error::InvalidSpeed(level))
    }
}

/// Controller shared between the ticker thread and the UI. Every step, edit,
/// clear or load happens under this one lock.
pub type Shared = Arc<Mutex<Controller>>;

pub fn share(controller: Controller) -> Shared {
    Arc::new(Mutex::new(controller))
}

/// Locks the controller. The grid is never left half-written, so a poisoned
/// lock is still safe to use.
pub fn lock(shared: &Shared) -> MutexGuard<'_, Controller> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

/// Tells the ticker thread to exit after its current wait.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Spawns the thread that steps the controller on its own cadence. The
/// interval is re-read after every tick, so speed changes apply from the next
/// wait onwards.
pub fn spawn_ticker(shared: Shared, stop: StopFlag) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new().name("Tick machine".into()).spawn(move || {
        while !stop.stopped() {
            let interval = {
                let mut c = lock(&shared);
                c.tick();
                c.tick_interval()
            };
            thread::sleep(interval);
        }
        debug!("ticker stopped");
    })
}
