/*!
# Marble Demo

Headless marbles-and-hunters simulation driving a `kd_index` SpatialIndex.

- **MarbleField** owns the index, spawns marbles and decides when to rebuild
- **Hunter** is a two-state agent (Idle / Hunting) that queries the field
- **Simulation** owns both and injects the field into every hunter update

Nothing here is global: the field is created by the simulation and passed
by `&mut` to whoever needs it.
*/

pub mod config;
pub mod field;
pub mod hunter;
pub mod marble;
pub mod simulation;

pub use config::{Args, RebuildPolicy, SimulationConfig};
pub use field::MarbleField;
pub use hunter::{Hunter, HunterEvent, HunterState};
pub use marble::{Marble, MarbleState};
pub use simulation::{HunterKey, Simulation, SimulationReport};
