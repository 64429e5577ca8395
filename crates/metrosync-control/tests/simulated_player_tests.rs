use metrosync_control::{AudioPlayer, Metronome, SimulatedPlayer, TransportState};
use metrosync_core::{MetronomeConfig, MetronomeError, SubdivisionPreset};
use std::sync::Arc;
use std::time::Duration;

fn config(preset: SubdivisionPreset) -> MetronomeConfig {
    MetronomeConfig {
        default_preset: preset,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_cursor_cycles_with_simulated_clicks() {
    let player = Arc::new(SimulatedPlayer::new(Duration::from_secs(1)));
    let (handle, _task) = Metronome::spawn(
        Arc::clone(&player) as Arc<dyn AudioPlayer>,
        &config(SubdivisionPreset::Three),
    );
    handle.wait_for(|s| s.ready).await.unwrap();

    handle.toggle().await.unwrap();
    handle.wait_for(|s| s.active_index == 0).await.unwrap();
    assert!((player.rate() - 3.0).abs() < 1e-9);

    handle.wait_for(|s| s.active_index == 2).await.unwrap();
    handle.wait_for(|s| s.active_index == 0).await.unwrap();
    assert!(player.is_playing());

    handle.toggle().await.unwrap();
    let snap = handle
        .wait_for(|s| s.transport == TransportState::Idle)
        .await
        .unwrap();
    assert_eq!(snap.active_index, -1);
    assert!(!player.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_device_failure_is_reported() {
    let player = Arc::new(SimulatedPlayer::new(Duration::from_secs(1)));
    player.set_failing(true);
    let (handle, _task) = Metronome::spawn(
        Arc::clone(&player) as Arc<dyn AudioPlayer>,
        &MetronomeConfig::default(),
    );
    handle.wait_for(|s| s.ready).await.unwrap();

    handle.toggle().await.unwrap();
    let snap = handle.wait_for(|s| s.status.is_some()).await.unwrap();
    assert!(matches!(
        snap.status,
        Some(MetronomeError::PlaybackUnavailable(_))
    ));
    assert!(!snap.running);

    player.set_failing(false);
    handle.toggle().await.unwrap();
    let snap = handle.wait_for(|s| s.active_index == 0).await.unwrap();
    assert_eq!(snap.status, None);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_resets_simulated_player() {
    let player = Arc::new(SimulatedPlayer::new(Duration::from_millis(500)));
    let (handle, task) = Metronome::spawn(
        Arc::clone(&player) as Arc<dyn AudioPlayer>,
        &MetronomeConfig::default(),
    );
    handle.wait_for(|s| s.ready).await.unwrap();
    handle.toggle().await.unwrap();
    handle.wait_for(|s| s.active_index == 0).await.unwrap();

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert!(!player.is_playing());
    assert_eq!(player.position(), 0.0);
}
