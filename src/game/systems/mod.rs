pub mod arena;
pub mod asteroids;
pub mod collision;
pub mod physics;
pub mod projectile;
pub mod targeting;
pub mod ufo;
pub mod ufo_lifecycle;
