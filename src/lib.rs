//! A translucent cube with glowing edges and orbiting laser beams.
//!
//! `data` holds the plain math and configuration, `game` the ECS plugins that
//! animate the scene, and `client` everything that needs a window and a GPU.

pub mod client;
pub mod data;
pub mod game;
