/// iced views for the gallery
///
/// - `card.rs` - one model card (thumbnail, labels, actions)
/// - `dialog.rs` - modal tag editor, delete confirmation and 3D viewer
/// - `viewport.rs` - pointer input layer for the 3D viewer

pub mod card;
pub mod dialog;
pub mod viewport;
