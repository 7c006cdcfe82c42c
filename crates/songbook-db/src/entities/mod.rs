pub mod song;

pub use song::{FieldError, NewSong, Song, SongChanges, SongCreate, SongUpdate};
