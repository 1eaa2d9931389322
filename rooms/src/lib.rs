/// Fetching older history for a room through a [backfill::HistorySource]
pub mod backfill;
/// Mutual exclusion for history fetches of a single room
pub mod history_lock;
/// Room members derived from membership state events
pub mod member;
/// Registry of the rooms of a user session
pub mod registry;
/// The state of a single room and the display values derived from it
pub mod room_state;
/// Thread-safe wrapper around [room_state::RoomState]
pub mod shared;
/// Storage of the latest state event per type and state key
pub mod state_table;
/// Room title resolution
pub mod title;

pub use self::backfill::{backfill, HistoryPage, HistorySource, DEFAULT_HISTORY_PAGE_LIMIT};
pub use self::history_lock::{HistoryLock, HistoryLockGuard};
pub use self::member::{Member, MemberCache};
pub use self::registry::RoomRegistry;
pub use self::room_state::RoomState;
pub use self::shared::SharedRoomState;
pub use self::state_table::{StateEventsByKey, StateTable};
