//! Unit tests for the library module
//!
//! Views are tested in memory; playlist persistence uses temp directories
//! and a store whose failures can be switched on and off.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::services::library::{
    FavoritesChange, JsonPlaylistStore, MediaKind, MemoryCatalog, Playlist, PlaylistId,
    PlaylistManager, PlaylistStore, SortOption, StoreError, Track, TrackCatalog, TrackId, view,
};

fn song(id: u64, title: &str, artist: &str, duration_ms: u64) -> Track {
    Track::new(
        TrackId(id),
        format!("file:///music/{id}.mp3"),
        title,
        MediaKind::Audio,
    )
    .with_artist(artist)
    .with_duration_ms(duration_ms)
}

fn library() -> Vec<Track> {
    vec![
        song(1, "Blue Monday", "New Order", 440_000).with_album(10, "Power"),
        song(2, "Atmosphere", "Joy Division", 250_000).with_album(20, "Substance"),
        song(3, "Ceremony", "New Order", 270_000).with_album(10, "Power"),
        song(4, "Decades", "Joy Division", 370_000),
    ]
}

fn ids(tracks: &[Track]) -> Vec<u64> {
    tracks.iter().map(|t| t.id.0).collect()
}

#[derive(Default)]
struct FlakyStore {
    failing: AtomicBool,
    saves: AtomicUsize,
    saved: std::sync::Mutex<Vec<Playlist>>,
}

#[async_trait]
impl PlaylistStore for FlakyStore {
    async fn load(&self) -> Result<Vec<Playlist>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("offline".to_string()));
        }
        Ok(self.saved.lock().unwrap().clone())
    }

    async fn save(&self, playlists: &[Playlist]) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("offline".to_string()));
        }
        *self.saved.lock().unwrap() = playlists.to_vec();
        Ok(())
    }
}

#[test]
fn filter_matches_title_or_artist_case_insensitively() {
    let tracks = library();

    let by_artist = view::filter_and_sort(&tracks, "new order", SortOption::TitleAsc);
    assert_eq!(ids(&by_artist), vec![1, 3]);

    let by_title = view::filter_and_sort(&tracks, "ATMO", SortOption::TitleAsc);
    assert_eq!(ids(&by_title), vec![2]);
}

#[test]
fn sort_options_order_tracks() {
    let tracks = library();

    assert_eq!(
        ids(&view::filter_and_sort(&tracks, "", SortOption::TitleAsc)),
        vec![2, 1, 3, 4]
    );
    assert_eq!(
        ids(&view::filter_and_sort(&tracks, "", SortOption::TitleDesc)),
        vec![4, 3, 1, 2]
    );
    assert_eq!(
        ids(&view::filter_and_sort(&tracks, "", SortOption::DurationAsc)),
        vec![2, 3, 4, 1]
    );
    assert_eq!(
        ids(&view::filter_and_sort(&tracks, "", SortOption::DurationDesc)),
        vec![1, 4, 3, 2]
    );
    assert_eq!(
        ids(&view::filter_and_sort(&tracks, "", SortOption::DateAddedDesc)),
        vec![4, 3, 2, 1]
    );
}

#[test]
fn play_all_falls_back_to_full_list() {
    let tracks = library();
    let visible = view::filter_and_sort(&tracks, "nothing matches", SortOption::TitleAsc);

    assert_eq!(ids(view::play_all_source(&visible, &tracks)), vec![1, 2, 3, 4]);
}

#[test]
fn albums_group_by_first_appearance() {
    let albums = view::albums(&library());

    assert_eq!(albums.len(), 2);
    assert_eq!(albums[0].id, 10);
    assert_eq!(albums[0].name, "Power");
    assert_eq!(albums[0].artist, "New Order");
    assert_eq!(albums[0].song_count, 2);
    assert_eq!(albums[1].id, 20);
    assert_eq!(albums[1].song_count, 1);

    assert_eq!(ids(&view::album_tracks(&library(), 10)), vec![1, 3]);
}

#[test]
fn playlist_resolution_skips_unknown_and_keeps_duplicates() {
    let mut playlist = Playlist::new("Mix");
    playlist.track_ids = vec![TrackId(3), TrackId(99), TrackId(1), TrackId(3)];

    let resolved = view::playlist_tracks(&playlist, &library());

    assert_eq!(ids(&resolved), vec![3, 1, 3]);
}

#[tokio::test]
async fn catalog_lists_by_kind_and_tolerates_rescan() {
    let video = Track::new(TrackId(50), "file:///clip.mp4", "Clip", MediaKind::Video);
    let mut tracks = library();
    tracks.push(video);
    let catalog = MemoryCatalog::new(tracks);

    assert_eq!(catalog.list_tracks(MediaKind::Audio).await.len(), 4);
    assert_eq!(ids(&catalog.list_tracks(MediaKind::Video).await), vec![50]);

    catalog.replace(vec![song(7, "New", "Artist", 1000)]).await;
    assert_eq!(ids(&catalog.list_tracks(MediaKind::Audio).await), vec![7]);
    assert!(catalog.list_tracks(MediaKind::Video).await.is_empty());
}

#[test]
fn catalog_reads_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"[{"id": 1, "locator": "file:///a.mp3", "title": "A", "kind": "audio", "duration_ms": 1000}]"#,
    )
    .unwrap();

    assert!(MemoryCatalog::from_json_file(&path).is_ok());
    assert!(MemoryCatalog::from_json_file(&dir.path().join("missing.json")).is_err());
}

#[tokio::test]
async fn json_store_round_trips_playlists() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonPlaylistStore::new(dir.path().join("nested/playlists.json"));

    assert!(store.load().await.unwrap().is_empty());

    let mut playlist = Playlist::new("Road trip");
    playlist.track_ids = vec![TrackId(2), TrackId(2), TrackId(5)];
    store.save(std::slice::from_ref(&playlist)).await.unwrap();

    assert_eq!(store.load().await.unwrap(), vec![playlist]);
}

#[tokio::test]
async fn json_store_reports_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlists.json");
    std::fs::write(&path, "{not json").unwrap();

    let result = JsonPlaylistStore::new(&path).load().await;

    assert!(matches!(result, Err(StoreError::Json { .. })));
}

#[tokio::test]
async fn manager_persists_every_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonPlaylistStore::new(dir.path().join("playlists.json")));
    let manager = PlaylistManager::new(store.clone(), "Favorites");

    let created = manager.create("  Evening  ").await.unwrap();
    assert_eq!(created.name, "Evening");

    assert!(manager.add_track(&created.id, TrackId(1)).await);
    assert!(manager.add_track(&created.id, TrackId(2)).await);
    assert!(!manager.add_track(&created.id, TrackId(1)).await);
    assert!(manager.rename(&created.id, "Night").await);

    let stored = store.load().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Night");
    assert_eq!(stored[0].track_ids, vec![TrackId(1), TrackId(2)]);

    let reloaded = PlaylistManager::new(store, "Favorites");
    reloaded.load().await;
    assert_eq!(reloaded.playlists(), manager.playlists());
}

#[tokio::test]
async fn manager_ignores_unknown_ids_and_blank_names() {
    let store = Arc::new(FlakyStore::default());
    let manager = PlaylistManager::new(store.clone(), "Favorites");
    let missing = PlaylistId::from_string("missing");

    assert!(manager.create("   ").await.is_none());
    assert!(!manager.delete(&missing).await);
    assert!(!manager.rename(&missing, "x").await);
    assert!(!manager.add_track(&missing, TrackId(1)).await);
    assert!(!manager.remove_track(&missing, TrackId(1)).await);

    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    assert!(manager.playlists().is_empty());
}

#[tokio::test]
async fn remove_track_drops_first_occurrence_only() {
    let store = Arc::new(FlakyStore::default());
    let manager = PlaylistManager::new(store.clone(), "Favorites");
    let playlist = manager.create("Loop").await.unwrap();
    manager.toggle_favorites(&[TrackId(1)]).await;

    let mut with_duplicates = manager.playlists();
    with_duplicates[0].track_ids = vec![TrackId(4), TrackId(5), TrackId(4)];
    store.save(&with_duplicates).await.unwrap();
    manager.load().await;

    assert!(manager.remove_track(&playlist.id, TrackId(4)).await);
    assert_eq!(
        manager.get(&playlist.id).unwrap().track_ids,
        vec![TrackId(5), TrackId(4)]
    );
}

#[tokio::test]
async fn save_failure_keeps_memory_state_and_later_save_reconciles() {
    let store = Arc::new(FlakyStore::default());
    let manager = PlaylistManager::new(store.clone(), "Favorites");

    store.failing.store(true, Ordering::SeqCst);
    let playlist = manager.create("Offline").await.unwrap();
    assert_eq!(manager.playlists().len(), 1);
    assert!(store.saved.lock().unwrap().is_empty());

    store.failing.store(false, Ordering::SeqCst);
    assert!(manager.add_track(&playlist.id, TrackId(9)).await);

    let saved = store.saved.lock().unwrap().clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "Offline");
    assert_eq!(saved[0].track_ids, vec![TrackId(9)]);
}

#[tokio::test]
async fn failed_load_keeps_current_list() {
    let store = Arc::new(FlakyStore::default());
    let manager = PlaylistManager::new(store.clone(), "Favorites");
    manager.create("Kept").await.unwrap();

    store.failing.store(true, Ordering::SeqCst);
    manager.load().await;

    assert_eq!(manager.playlists().len(), 1);
}

#[tokio::test]
async fn toggle_favorites_adds_missing_then_removes_all() {
    let store = Arc::new(FlakyStore::default());
    let manager = PlaylistManager::new(store, "Favorites");
    let album = [TrackId(1), TrackId(3)];

    assert_eq!(
        manager.toggle_favorites(&[TrackId(3)]).await,
        FavoritesChange::Added(1)
    );
    assert_eq!(
        manager.toggle_favorites(&album).await,
        FavoritesChange::Added(1)
    );

    let favorites = manager.playlists();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].name, "Favorites");
    assert_eq!(favorites[0].track_ids, vec![TrackId(3), TrackId(1)]);

    assert_eq!(
        manager.toggle_favorites(&album).await,
        FavoritesChange::Removed(2)
    );
    assert!(manager.playlists()[0].track_ids.is_empty());

    assert_eq!(
        manager.toggle_favorites(&[]).await,
        FavoritesChange::Unchanged
    );
}

#[test]
fn sort_option_parses_cli_names() {
    assert_eq!("title".parse::<SortOption>(), Ok(SortOption::TitleAsc));
    assert_eq!("Duration-Desc".parse::<SortOption>(), Ok(SortOption::DurationDesc));
    assert_eq!("recent".parse::<SortOption>(), Ok(SortOption::DateAddedDesc));
    assert!("shuffle".parse::<SortOption>().is_err());
}
