mod mood_table;
mod resolver;
mod track;

pub use mood_table::{normalize_mood, MoodTable, MoodTableError};
pub use resolver::{MoodResolver, DEFAULT_FETCH_CAP, DEFAULT_TRACK_LIMIT};
pub use track::Track;
