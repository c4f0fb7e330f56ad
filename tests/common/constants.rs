//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, moods, playlists), update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// User created in every test database
pub const TEST_USER: &str = "testuser";

pub const TEST_PASS: &str = "testpass123";

/// Secret used by test servers to sign session tokens
pub const TEST_SECRET: &str = "e2e-test-secret";

// ============================================================================
// Test Moods and Playlists
// ============================================================================

/// Mood backed by two playlists, each with two pages of tracks
pub const MOOD_HAPPY: &str = "happy";

pub const HAPPY_PLAYLIST_1: &str = "happy-playlist-1";

pub const HAPPY_PLAYLIST_2: &str = "happy-playlist-2";

/// Unique tracks available in each happy playlist
pub const HAPPY_PLAYLIST_TRACKS: usize = 120;

/// Mood whose only playlist has 3 unique tracks plus 2 duplicates
pub const MOOD_SAD: &str = "sad";

pub const SAD_PLAYLIST: &str = "sad-playlist";

pub const SAD_UNIQUE_TRACKS: usize = 3;

/// Mood whose playlist always fails upstream
pub const MOOD_BROKEN: &str = "broken";

pub const BROKEN_PLAYLIST: &str = "broken-playlist";

/// Message carried by the upstream failure of the broken playlist
pub const BROKEN_PLAYLIST_ERROR: &str = "upstream exploded";

// ============================================================================
// Timeouts
// ============================================================================

pub const REQUEST_TIMEOUT_SECS: u64 = 10;

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
