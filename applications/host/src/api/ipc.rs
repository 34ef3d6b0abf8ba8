/// IPC endpoint
use crate::{
    error::{HostError, Result},
    ipc::{IpcRequest, IpcResponse},
    services::media_server,
    state::AppState,
};
use aurora_core::{PlaybackCommand, ScanProgress, Track};
use aurora_enrichment::{read_local_lyrics, Lyrics, LyricsQuery, LyricsSource};
use axum::{extract::State, Json};
use std::path::{Path, PathBuf};
use tokio::{sync::mpsc, task::JoinHandle};

/// POST /ipc
pub async fn handle_ipc(
    State(app_state): State<AppState>,
    Json(request): Json<IpcRequest>,
) -> Result<Json<IpcResponse>> {
    dispatch(&app_state, request).await.map(Json)
}

pub async fn dispatch(state: &AppState, request: IpcRequest) -> Result<IpcResponse> {
    let response = match request {
        // ===== Library =====
        IpcRequest::ScanFolder { path } => {
            scan_folder(state, &path).await;
            IpcResponse::Tracks(state.library.tracks())
        }
        IpcRequest::RescanAll => {
            let (tx, sink) = progress_sink(state);
            let count = state.library.rescan_all(Some(tx)).await;
            finish_progress(sink).await;
            tracing::info!(count, "Rescanned library");
            IpcResponse::Tracks(state.library.tracks())
        }
        IpcRequest::RemoveFolder { path } => {
            state.library.remove_folder(&path);
            IpcResponse::Library {
                folders: state.library.folders(),
                tracks: state.library.tracks(),
            }
        }
        IpcRequest::GetTracks { sort } => IpcResponse::Tracks(match sort {
            Some(order) => state.library.sorted_tracks(order),
            None => state.library.tracks(),
        }),
        IpcRequest::GetFolders => IpcResponse::Folders(state.library.folders()),
        IpcRequest::GetAlbums { sort } => IpcResponse::Albums(match sort {
            Some(order) => state.library.sorted_albums(order),
            None => state.library.albums(),
        }),
        IpcRequest::GetAlbumTracks { album_id } => {
            IpcResponse::Tracks(state.library.album_tracks(&album_id)?)
        }
        IpcRequest::GetArtists => IpcResponse::Artists(state.library.artists()),
        IpcRequest::Search { query } => IpcResponse::Tracks(state.library.search(&query)),
        IpcRequest::GetScanProgress => IpcResponse::ScanProgress(state.scan_progress()),
        IpcRequest::GetAudioDetails { path } => {
            let details =
                tokio::task::spawn_blocking(move || aurora_metadata::read_audio_details(Path::new(&path)))
                    .await
                    .map_err(|e| HostError::Internal(e.to_string()))??;
            IpcResponse::AudioDetails(details)
        }
        IpcRequest::MediaUrl { path } => IpcResponse::Url(
            media_server::media_url(Path::new(&path))
                .ok_or_else(|| HostError::BadRequest(format!("Not an absolute path: {path}")))?,
        ),

        // ===== Playback =====
        IpcRequest::Playback { command } => IpcResponse::Pipeline(state.player.apply(command)?),
        IpcRequest::Pipeline { event } => IpcResponse::Pipeline(state.player.handle_event(event)),
        IpcRequest::PollPipeline => IpcResponse::Pipeline(state.player.poll()),
        IpcRequest::GetPlaybackState => IpcResponse::Playback(state.player.snapshot()),
        IpcRequest::MediaControl { command } => {
            let command: PlaybackCommand = command.into();
            IpcResponse::Pipeline(state.player.apply(command)?)
        }

        // ===== Settings =====
        IpcRequest::GetSettings => IpcResponse::Settings(state.settings.get().await),
        IpcRequest::UpdateSettings { patch } => {
            IpcResponse::Settings(state.settings.update(patch).await?)
        }

        // ===== Playlists =====
        IpcRequest::ListPlaylists => IpcResponse::Playlists(state.playlists.list().await),
        IpcRequest::GetPlaylist { id } => IpcResponse::Playlist(state.playlists.get(&id).await?),
        IpcRequest::GetPlaylistTracks { id } => {
            let playlist = state.playlists.get(&id).await?;
            IpcResponse::Tracks(
                state
                    .library
                    .with_tracks(|tracks| playlist.resolve(tracks).into_iter().cloned().collect()),
            )
        }
        IpcRequest::CreatePlaylist { name } => {
            IpcResponse::Playlist(state.playlists.create(&name).await?)
        }
        IpcRequest::CreateSmartPlaylist {
            name,
            rules,
            rule_match,
        } => IpcResponse::Playlist(state.playlists.create_smart(&name, rules, rule_match).await?),
        IpcRequest::UpdateSmartPlaylist {
            id,
            name,
            rules,
            rule_match,
        } => IpcResponse::Playlist(
            state
                .playlists
                .update_smart(&id, &name, rules, rule_match)
                .await?,
        ),
        IpcRequest::RenamePlaylist { id, name } => {
            IpcResponse::Playlist(state.playlists.rename(&id, &name).await?)
        }
        IpcRequest::DeletePlaylist { id } => {
            state.playlists.delete(&id).await?;
            IpcResponse::Ok
        }
        IpcRequest::AddToPlaylist { id, track_ids } => {
            IpcResponse::Playlist(state.playlists.add_tracks(&id, &track_ids).await?)
        }
        IpcRequest::RemoveFromPlaylist { id, track_id } => {
            IpcResponse::Playlist(state.playlists.remove_track(&id, &track_id).await?)
        }

        // ===== Favorites =====
        IpcRequest::GetFavorites => IpcResponse::Favorites(state.favorites.list().await),
        IpcRequest::ToggleFavorite { track_id } => {
            IpcResponse::Favorite(state.favorites.toggle(&track_id).await?)
        }

        // ===== Enrichment =====
        IpcRequest::GetLyrics { path } => IpcResponse::Lyrics(
            read_local_lyrics(Path::new(&path))
                .await
                .map(|content| Lyrics {
                    content,
                    source: LyricsSource::Local,
                }),
        ),
        IpcRequest::FindLyrics { track } => IpcResponse::Lyrics(find_lyrics(state, &track).await),
        IpcRequest::GetAlbumArt { artist, album } => IpcResponse::AlbumArt(match &state.enrichment {
            Some(enrichment) => enrichment.art.album_art_url(&artist, &album).await,
            None => None,
        }),
        IpcRequest::GetArtistInfo { name } => IpcResponse::ArtistInfo(match &state.enrichment {
            Some(enrichment) => enrichment.artists.lookup(&name).await,
            None => None,
        }),

        // ===== Remote library =====
        IpcRequest::SubsonicConfigure { config } => {
            state.subsonic.configure(config)?;
            IpcResponse::Connected(state.subsonic.ping().await)
        }
        IpcRequest::SubsonicPing => IpcResponse::Connected(state.subsonic.ping().await),
        IpcRequest::SubsonicSync => {
            if !state.subsonic.is_configured() {
                return Err(HostError::Unavailable(
                    "Remote library is not configured".to_string(),
                ));
            }
            let tracks = state.subsonic.fetch_all_songs().await?;
            tracing::info!(count = tracks.len(), "Fetched remote library");
            state.library.replace_remote_tracks(tracks);
            IpcResponse::Tracks(state.library.tracks())
        }
        IpcRequest::SubsonicDisconnect => {
            state.subsonic.clear();
            state.library.replace_remote_tracks(Vec::new());
            IpcResponse::Ok
        }
    };

    Ok(response)
}

/// Forward scan progress into the shared state until the scan drops the sender
fn progress_sink(state: &AppState) -> (mpsc::Sender<ScanProgress>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ScanProgress>(16);
    let state = state.clone();
    let sink = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            tracing::debug!(current = progress.current, total = progress.total, "Scan progress");
            state.record_scan_progress(progress);
        }
    });
    (tx, sink)
}

/// Wait until the last progress report has been recorded
async fn finish_progress(sink: JoinHandle<()>) {
    if let Err(e) = sink.await {
        tracing::warn!("Scan progress task failed: {}", e);
    }
}

async fn scan_folder(state: &AppState, folder: &str) -> usize {
    let (tx, sink) = progress_sink(state);
    let count = state.library.scan_folder(PathBuf::from(folder), Some(tx)).await;
    finish_progress(sink).await;
    tracing::info!(folder, count, "Scanned folder");
    count
}

async fn find_lyrics(state: &AppState, track: &Track) -> Option<Lyrics> {
    let audio_path = Path::new(&track.path);
    match &state.enrichment {
        Some(enrichment) => {
            enrichment
                .lyrics
                .find_lyrics(audio_path, &LyricsQuery::from(track))
                .await
        }
        None => read_local_lyrics(audio_path).await.map(|content| Lyrics {
            content,
            source: LyricsSource::Local,
        }),
    }
}
