pub mod constants;
pub mod events;
pub mod game_loop;
pub mod schedule;
pub mod state;
pub mod systems;
