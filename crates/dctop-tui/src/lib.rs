//! # dctop-tui
//!
//! The window state machine and rendering pipeline behind the container
//! table view.
//!
//! One long-lived owner task ([`containers::ContainersWindow`]) is the
//! sole mutator of [`state::TableState`]; keyboard, mouse, resize, and
//! refreshed-data messages are serialized through its event queue. Two
//! further tasks run concurrently: the data-refresh loop
//! ([`refresh::RefreshTask`]) and the draw loop ([`draw::DrawTask`]),
//! both talking to the owner exclusively via channels. Per-frame row
//! rendering fans out into short-lived parallel tasks joined before the
//! frame is assembled ([`table`]).
//!
//! Everything visual is expressed through the positional styler model in
//! [`styler`]: a lazy function from a column position to a character and
//! a style, composed into cells, rows, bars, and whole screens.

pub mod containers;
pub mod draw;
pub mod error;
pub mod inspect;
pub mod notify;
pub mod refresh;
pub mod screen;
pub mod state;
pub mod style;
pub mod styler;
pub mod table;
pub mod viewport;
pub mod window;
