/**
 * Track Data Structure
 *
 * The track currently playing on the music account, as reported by the
 * track source. Only the fields the name template can reference are kept.
 */
use serde::{Deserialize, Serialize};

/// A track reported as currently playing
///
/// # Fields
/// * `id` - Provider track identifier (change detection independent of formatting)
/// * `title` - Track title as reported by the provider
/// * `artists` - Ordered artist names, primary artist first
/// * `album` - Album name, empty when the provider has none
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub album: String,
}

impl Track {
    /// Create a track with no album
    pub fn new(id: impl Into<String>, title: impl Into<String>, artists: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists,
            album: String::new(),
        }
    }

    /// Set the album name
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// First artist, or the empty string when the track lists none
    pub fn artist_first(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or("")
    }

    /// All artists joined with `", "`
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}
