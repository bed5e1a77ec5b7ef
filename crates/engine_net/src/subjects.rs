//! NATS subject hierarchy.
//!
//! All engine subjects are prefixed with `engine.` to namespace within a
//! shared NATS cluster.

/// Root prefix for all engine NATS subjects.
pub const PREFIX: &str = "engine";

// ── Editor ──────────────────────────────────────────────────────────────────

/// Edit and control messages. Editor → Engine.
pub const EDITOR_IN: &str = "engine.editor.in";

/// Scene snapshots and notices. Engine → Editor.
pub const EDITOR_OUT: &str = "engine.editor.out";

/// Build the per-session outbound subject, for editors that only want one
/// engine's traffic.
///
/// `engine.editor.out.<session>`
#[must_use]
pub fn editor_session_out(session: &str) -> String {
    format!("{EDITOR_OUT}.{session}")
}
