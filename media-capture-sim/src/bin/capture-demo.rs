//! Walks a capture session through preview, rotation, snapshot and
//! recording on the simulated platform.
//!
//! Run with `RUST_LOG=debug` to see the session's decisions.

use std::time::Duration;

use media_capture_core::{
    CaptureConfiguration, CaptureSession, CaptureStatus, Device, MediaCaptureState, RecordOptions,
};
use media_capture_sim::SimulatedPlatform;

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("demo failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let sim = SimulatedPlatform::new(vec![
        Device::video("cam-back", "Back Camera"),
        Device::video("cam-front", "Front Camera"),
        Device::audio("mic", "Built-in Microphone"),
    ]);
    let config = CaptureConfiguration::from_json(r#"{ "preferredDevice": "front" }"#)?;
    let session = CaptureSession::start(sim.platform(), config).map_err(|e| e.to_string())?;

    let state = step(&session, "preview", |s| {
        s.status == CaptureStatus::Previewing && s.live_video.is_some()
    })
    .await?;
    print_state("previewing", &state);

    sim.orientation.rotate(90);
    let state = step(&session, "rotation", |s| {
        s.live_video.as_ref().is_some_and(|v| v.height > v.width)
    })
    .await?;
    print_state("rotated", &state);

    session.snap();
    let state = step(&session, "snapshot", |s| s.captured_image.is_some()).await?;
    if let Some(image) = state.captured_image.as_ref() {
        println!("snapshot: {} bytes ({})", image.blob.len(), image.blob.mime_type);
    }

    session.clear();
    step(&session, "fresh preview", |s| {
        s.status == CaptureStatus::Previewing && s.live_video.is_some()
    })
    .await?;

    session.record(RecordOptions {
        segment_hint: Some(Duration::from_millis(100)),
        on_chunk: Some(std::sync::Arc::new(|chunk: &[u8]| {
            println!("chunk: {} bytes", chunk.len());
        })),
        ..RecordOptions::default()
    });
    step(&session, "recording", |s| s.status == CaptureStatus::Recording).await?;

    let recorder = sim
        .recorders
        .last()
        .ok_or_else(|| "no recorder was created".to_string())?;
    for i in 0..3u8 {
        recorder.push_chunk(&[i; 64]);
    }
    session.stop();

    let state = step(&session, "recorded", |s| s.captured_video.is_some()).await?;
    if let Some(video) = state.captured_video.as_ref() {
        let metadata = video.metadata_json().map_err(|e| e.to_string())?;
        println!("recorded video metadata:\n{}", metadata);
    }

    session.shutdown().await;
    println!(
        "shut down; {} stream(s) opened, {} still open",
        sim.devices.streams().len(),
        sim.devices.open_streams().len()
    );
    Ok(())
}

async fn step(
    session: &CaptureSession,
    name: &str,
    predicate: impl FnMut(&MediaCaptureState) -> bool,
) -> Result<MediaCaptureState, String> {
    match tokio::time::timeout(STEP_TIMEOUT, session.wait_for(predicate)).await {
        Ok(Some(state)) => Ok(state),
        Ok(None) => Err(format!("session ended while waiting for {}", name)),
        Err(_) => Err(format!("timed out waiting for {}", name)),
    }
}

fn print_state(label: &str, state: &MediaCaptureState) {
    let video = state
        .live_video
        .as_ref()
        .map(|v| format!("{}x{} from {}", v.width, v.height, v.device_id))
        .unwrap_or_else(|| "none".into());
    println!(
        "{}: status={} selected={:?} video={}",
        label, state.status, state.selected_device_id, video
    );
}
