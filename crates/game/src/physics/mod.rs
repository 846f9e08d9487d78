mod world;

pub use world::PhysicsWorld;
