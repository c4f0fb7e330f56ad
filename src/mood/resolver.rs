use super::{MoodTable, Track};
use crate::catalog_client::{CatalogClient, CatalogError, PlaylistItem};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub const DEFAULT_TRACK_LIMIT: usize = 30;
pub const DEFAULT_FETCH_CAP: usize = 150;

/// Turns a mood label into a shuffled, de-duplicated batch of tracks.
pub struct MoodResolver {
    mood_table: Arc<MoodTable>,
    catalog: Arc<dyn CatalogClient>,
    rng: Mutex<StdRng>,
    fetch_cap: usize,
}

impl MoodResolver {
    pub fn new(mood_table: Arc<MoodTable>, catalog: Arc<dyn CatalogClient>) -> Self {
        Self::with_rng(mood_table, catalog, StdRng::from_os_rng())
    }

    /// Deterministic resolver, playlist choice and shuffling depend only on `seed`.
    pub fn with_seed(
        mood_table: Arc<MoodTable>,
        catalog: Arc<dyn CatalogClient>,
        seed: u64,
    ) -> Self {
        Self::with_rng(mood_table, catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mood_table: Arc<MoodTable>, catalog: Arc<dyn CatalogClient>, rng: StdRng) -> Self {
        Self {
            mood_table,
            catalog,
            rng: Mutex::new(rng),
            fetch_cap: DEFAULT_FETCH_CAP,
        }
    }

    /// Stop following pages once this many raw entries have been collected.
    pub fn with_fetch_cap(mut self, fetch_cap: usize) -> Self {
        self.fetch_cap = fetch_cap;
        self
    }

    pub fn mood_table(&self) -> &MoodTable {
        &self.mood_table
    }

    /// Unknown moods resolve to an empty batch. Any catalog failure aborts the whole resolution.
    pub async fn resolve(&self, mood: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let Some(playlists) = self.mood_table.lookup(mood) else {
            debug!("Unknown mood {:?}", mood);
            return Ok(vec![]);
        };

        let playlist_id = {
            let mut rng = self.rng.lock().unwrap();
            match playlists.choose(&mut *rng) {
                Some(id) => id.clone(),
                None => return Ok(vec![]),
            }
        };

        let items = self.fetch_items(&playlist_id).await?;
        let fetched = items.len();

        let mut tracks: Vec<Track> = items
            .into_iter()
            .flatten()
            .filter_map(|item| item.track)
            .map(|raw| Track::from_catalog(&raw))
            .filter(Track::is_identifiable)
            .collect();

        tracks.shuffle(&mut *self.rng.lock().unwrap());

        let mut seen = HashSet::new();
        tracks.retain(|track| seen.insert(track.identity_key().to_string()));
        tracks.truncate(limit);

        info!(
            "Resolved mood {:?} via playlist {} to {} tracks ({} fetched)",
            mood.trim(),
            playlist_id,
            tracks.len(),
            fetched
        );
        Ok(tracks)
    }

    async fn fetch_items(&self, playlist_id: &str) -> Result<Vec<Option<PlaylistItem>>, CatalogError> {
        let mut page = self.catalog.playlist_tracks(playlist_id).await?;
        let mut items = std::mem::take(&mut page.items);

        while let Some(next) = page.next.take() {
            if items.len() >= self.fetch_cap {
                debug!(
                    "Fetch cap of {} reached for playlist {}",
                    self.fetch_cap, playlist_id
                );
                break;
            }
            page = self.catalog.next_page(&next).await?;
            items.append(&mut page.items);
        }

        Ok(items)
    }
}
