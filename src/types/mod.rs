mod models;

pub use models::{Compression, Game, Replay, User};
