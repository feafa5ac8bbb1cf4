/// Track state enumeration for the object tracking lifecycle.
///
/// The stored lifecycle is strictly monotonic: Tentative → Confirmed →
/// Removed. `Lost` is the externally reported state of a confirmed track
/// that is coasting on its prediction (no match this frame); a track never
/// stores `Lost` internally, so a removed identity can never be revived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Newly created track, not yet confirmed
    #[default]
    Tentative,
    /// Confirmed track, matched on the current frame
    Confirmed,
    /// Confirmed track coasting on its predicted estimate
    Lost,
    /// Removed from tracking; terminal
    Removed,
}
