//! Release key pairs.

use std::fmt;

/// The (client release, latest merged release) transition a change set
/// describes.
///
/// Used as the memoization key of the change-diff cache: two polls that
/// move between the same pair of releases always receive the same diff.
///
/// # Examples
///
/// ```
/// use apogee_core::ReleaseKeyPair;
///
/// let pair = ReleaseKeyPair::new("client-v1", "latest-v2");
/// assert_eq!(pair.client_release_key(), "client-v1");
/// assert_eq!(pair.to_string(), "client-v1->latest-v2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseKeyPair {
    client_release_key: String,
    latest_merged_release_key: String,
}

impl ReleaseKeyPair {
    /// Creates a new pair.
    pub fn new(
        client_release_key: impl Into<String>,
        latest_merged_release_key: impl Into<String>,
    ) -> Self {
        Self {
            client_release_key: client_release_key.into(),
            latest_merged_release_key: latest_merged_release_key.into(),
        }
    }

    /// Returns the release key the client reported.
    pub fn client_release_key(&self) -> &str {
        &self.client_release_key
    }

    /// Returns the latest merged release key on the server.
    pub fn latest_merged_release_key(&self) -> &str {
        &self.latest_merged_release_key
    }
}

impl fmt::Display for ReleaseKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}",
            self.client_release_key, self.latest_merged_release_key
        )
    }
}
