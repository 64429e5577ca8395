//! Text beat indicator

use metrosync_control::{Snapshot, TransportState};

/// One line per snapshot: a box per subdivision, then tempo and transport.
pub fn render(snapshot: &Snapshot) -> String {
    let mut line = String::new();
    for i in 0..snapshot.subdivisions {
        if i as i32 == snapshot.active_index {
            line.push_str("[#]");
        } else {
            line.push_str("[ ]");
        }
    }

    line.push_str(&format!(
        "  {} BPM  preset {}  {}",
        snapshot.bpm,
        snapshot.preset,
        transport_label(snapshot)
    ));

    if !snapshot.ready {
        line.push_str("  (audio not ready)");
    }
    if let Some(status) = &snapshot.status {
        line.push_str(&format!("  ! {}", status));
    }
    line
}

fn transport_label(snapshot: &Snapshot) -> &'static str {
    match (snapshot.transport, snapshot.running) {
        (TransportState::Starting, _) => "starting",
        (TransportState::Stopping, _) => "stopping",
        (_, true) => "running",
        (_, false) => "stopped",
    }
}
