//! Viewer lifecycle state machine
//!
//! A render session moves through a small, strictly ordered set of states:
//!
//! ```text
//! [Uninitialized] -> [Loading] -> [Ready] -> [Rendering]
//!                        |                       ^
//!                        +------> [Failed] ------+
//!
//! any state -> [Disposed] (terminal)
//! ```
//!
//! # State Descriptions
//!
//! - **Uninitialized**: the viewer exists but no asset load was requested.
//! - **Loading**: the kit asset fetch/decode is in flight; the scene renders
//!   lights-only while the host UI stays responsive.
//! - **Ready**: the asset resolved; colors are bound and the camera framed
//!   before the kit becomes visible. This state lasts a single transition.
//! - **Failed**: the load failed. Absorbed into `Rendering` - the session
//!   keeps rendering an empty, lights-only scene.
//! - **Rendering**: the repeating per-frame schedule (optional yaw step plus
//!   a render of the full scene) runs until teardown.
//! - **Disposed**: terminal and absorbing. Frame-gated systems are cancelled
//!   by the state exit before resources are released, and late asset
//!   resolutions are discarded.
//!
//! Transitions are validated against the legal edge set and logged; an
//! illegal transition indicates a logic error and is reported as such.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

/// Lifecycle state of the render session
///
/// This is the root state gating every per-frame system in the viewer.
/// Leaving `Rendering` (or `Loading`) is what cancels the repeating frame
/// work - there is never more than one outstanding scheduled tick.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, States, Reflect)]
pub enum ViewerState {
    /// Viewer created, no load requested yet (starting state)
    #[default]
    Uninitialized,

    /// Kit asset fetch/decode in flight
    Loading,

    /// Asset resolved; binding and framing run before attachment
    Ready,

    /// Asset load failed; the session renders without a model
    Failed,

    /// Continuous per-frame rendering
    Rendering,

    /// Terminal. Resources released exactly once, no further transitions.
    Disposed,
}

/// Computed state active while the session holds (or is acquiring) a scene
///
/// Lets resize and recolor systems run across `Loading`, `Ready`, `Failed`
/// and `Rendering` without enumerating the variants at every call site.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SessionLive;

impl ComputedStates for SessionLive {
    type SourceStates = ViewerState;

    fn compute(sources: ViewerState) -> Option<Self> {
        match sources {
            ViewerState::Loading
            | ViewerState::Ready
            | ViewerState::Failed
            | ViewerState::Rendering => Some(Self),
            ViewerState::Uninitialized | ViewerState::Disposed => None,
        }
    }
}

/// Component marking entities owned by the render session
///
/// The session camera, its lights, and the kit root carry this marker; the
/// resource releaser despawns everything tagged with it exactly once at
/// disposal.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SessionScoped;

/// Validate whether a lifecycle transition is allowed
///
/// Returns true for the legal edges of the session state machine. Invalid
/// transitions indicate logic errors that should be fixed, not recovered.
pub fn is_valid_viewer_transition(from: ViewerState, to: ViewerState) -> bool {
    match (from, to) {
        // Attach: load requested on a live viewport
        (ViewerState::Uninitialized, ViewerState::Loading) => true,

        // Load outcome
        (ViewerState::Loading, ViewerState::Ready) => true,
        (ViewerState::Loading, ViewerState::Failed) => true,

        // The frame schedule begins, with or without a model
        (ViewerState::Ready, ViewerState::Rendering) => true,
        (ViewerState::Failed, ViewerState::Rendering) => true,

        // Teardown is legal from every live state; Disposed is absorbing
        (from, ViewerState::Disposed) if from != ViewerState::Disposed => true,

        // Self-transitions are no-ops
        (from, to) if from == to => true,

        _ => false,
    }
}

/// System to validate and log lifecycle transitions
///
/// Logs each applied transition and flags edges outside the legal set as
/// errors so an inconsistent session surfaces immediately in the logs.
pub fn validate_and_log_transitions(
    mut transition_events: MessageReader<StateTransitionEvent<ViewerState>>,
) {
    for event in transition_events.read() {
        match (event.exited, event.entered) {
            (Some(exited), Some(entered)) => {
                if is_valid_viewer_transition(exited, entered) {
                    info!("[STATE] {:?} -> {:?}", exited, entered);
                } else {
                    error!(
                        "[STATE] INVALID transition {:?} -> {:?} (session may be inconsistent)",
                        exited, entered
                    );
                }
            }
            (Some(exited), None) => {
                debug!("[STATE] exit: {:?}", exited);
            }
            (None, Some(entered)) => {
                debug!("[STATE] enter: {:?}", entered);
            }
            (None, None) => {}
        }
    }
}

/// Timer resource for the periodic state heartbeat
#[derive(Resource, Deref, DerefMut)]
pub struct StateHeartbeatTimer(pub Timer);

impl Default for StateHeartbeatTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(15.0, TimerMode::Repeating))
    }
}

/// System that logs the current lifecycle state every 15 seconds
///
/// A long-lived embedded viewer is easiest to diagnose from its log tail;
/// this keeps the current state visible without spamming every frame.
pub fn log_state_heartbeat(
    state: Res<State<ViewerState>>,
    mut timer: ResMut<StateHeartbeatTimer>,
    time: Res<Time>,
) {
    if timer.tick(time.delta()).just_finished() {
        let current = *state.get();
        let mut state_info = format!("state: {:?}", current);
        if SessionLive::compute(current).is_some() {
            state_info.push_str(" | SessionLive");
        }
        info!("[STATE] {}", state_info);
    }
}
