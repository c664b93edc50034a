//! Shared engine-wide constants.
//! Centralizes tweakable values used across editing, history, and autosave.

use std::time::Duration;

// Undo/redo
/// Maximum number of undo history snapshots to retain.
pub const MAX_UNDO_HISTORY: usize = 100;

// Autosave
/// Trailing-edge debounce window for autosave after a structural mutation.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(300);

// Selection
/// How long a selection must stay unchanged before the floating action menu
/// is shown. Avoids flicker while a marquee drag is still in progress.
pub const SELECTION_MENU_DEBOUNCE: Duration = Duration::from_millis(50);

// Clipboard
/// Offset (in world units) applied when duplicating a selection in place.
pub const DUPLICATE_OFFSET: (f32, f32) = (40.0, 40.0);

// Ids
/// Number of hex characters taken from a fresh UUID for node id suffixes.
pub const NODE_ID_SUFFIX_LEN: usize = 5;
