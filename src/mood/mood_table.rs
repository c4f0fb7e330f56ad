use std::collections::BTreeMap;
use thiserror::Error;

const BUILTIN_MOODS: &[(&str, &[&str])] = &[
    ("sad", &["7GyDlxXF2EnTImgYJU8JIx", "2ZnAWYy4AOs8tpRUCGF6Py"]),
    ("energetic", &["09C8ZGUepJGErYZcI7s2Ns", "6i71oduwXihfSJBTrLoYOR"]),
    ("in love", &["6oNsYDhN95gkENsdFcAwTh", "60OmycS2YaYLN63oiGPr2p"]),
    ("happy", &["4Fh0313D3PitYzICKHhZ7r", "7ue0JFwZLLUezhvF8HcDyq"]),
    ("relaxed", &["4rFthP2CHmFD6Cszc9mT9A", "44mWcJNKGzFQNICUBnrYLL"]),
    ("depressed", &["7I4DQjGPwh8YTc6iW1GN7f", "2t4BAQJ4IWurz4wznvTxw1"]),
    ("focused", &["14KtkIpsvzDSCXR24EqHCL", "4Qxy1JjPBbohRQIlMj6xBA"]),
    ("chill", &["6IKQrtMc4c00YzONcUt7QH", "4pJNEInSLpsE696XUU00l8"]),
    ("lonely", &["79bxZXB7zD8KWit9ud6lKk", "1M1ogQ10BKAdnW1SsMfsEc"]),
    ("hopeful", &["77qvKHsd1c9YGbGcnZVNzE", "1M1ogQ10BKAdnW1SsMfsEc"]),
    ("confident", &["1krayF0y1dJhfLaGm0jHww", "3RuTobXDwJWJArbuMpBVr8"]),
    (
        "nostalgic",
        &[
            "7GRnA1buU09xvdDoSJlyEw",
            "4GasCSnkoRMY373VFUbinP",
            "27qET95DJqZLtNHmHSpuAG",
        ],
    ),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoodTableError {
    #[error("Mood table is empty")]
    Empty,

    #[error("Mood label is blank")]
    BlankMood,

    #[error("Mood \"{0}\" has no playlists")]
    NoPlaylists(String),

    #[error("Mood \"{0}\" is defined more than once")]
    DuplicateMood(String),
}

/// Normalizes a free-text mood the same way for keys and lookups.
pub fn normalize_mood(mood: &str) -> String {
    mood.trim().to_lowercase()
}

/// Immutable mapping from a lower-case mood label to its candidate playlist ids.
#[derive(Clone, Debug)]
pub struct MoodTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl MoodTable {
    /// Builds a table from arbitrary entries, normalizing labels and playlist ids.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, MoodTableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let mut table = BTreeMap::new();
        for (mood, playlists) in entries {
            let mood = normalize_mood(mood.as_ref());
            if mood.is_empty() {
                return Err(MoodTableError::BlankMood);
            }
            let playlists: Vec<String> = playlists
                .into_iter()
                .map(|id| id.as_ref().trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();
            if playlists.is_empty() {
                return Err(MoodTableError::NoPlaylists(mood));
            }
            if table.insert(mood.clone(), playlists).is_some() {
                return Err(MoodTableError::DuplicateMood(mood));
            }
        }
        if table.is_empty() {
            return Err(MoodTableError::Empty);
        }
        Ok(Self { entries: table })
    }

    /// Candidate playlists for the mood, if known. The label is trimmed and lower-cased first.
    pub fn lookup(&self, mood: &str) -> Option<&[String]> {
        self.entries.get(&normalize_mood(mood)).map(Vec::as_slice)
    }

    /// All mood labels, sorted.
    pub fn moods(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MoodTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN_MOODS
                .iter()
                .map(|(mood, playlists)| {
                    (
                        mood.to_string(),
                        playlists.iter().map(|id| id.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}
