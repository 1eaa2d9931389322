use anyhow::Context;
use async_trait::async_trait;
use comms::event::RoomEvent;
use tracing::debug;

use crate::shared::SharedRoomState;

/// Page size used when the caller has no preference
pub const DEFAULT_HISTORY_PAGE_LIMIT: usize = 50;

/// A page of room history, oldest events last
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPage {
    pub events: Vec<RoomEvent>,
    /// Pagination token to pass when fetching the page before this one
    pub prev_batch: String,
}

/// [HistorySource] fetches pages of room history, usually from the homeserver
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetches up to `limit` events preceding the `prev_batch` token
    async fn get_history(
        &self,
        room_id: &str,
        prev_batch: &str,
        limit: usize,
    ) -> anyhow::Result<HistoryPage>;
}

/// Fetches the next page of older history for the room and advances its pagination token
///
/// Holds the history lock of the room for the whole fetch, so concurrent backfills of the same
/// room run one after another and each continues where the previous one stopped.
/// The lock is released on every exit path, including errors and cancellation.
/// On error the pagination token is left unchanged.
///
/// Events are returned as is, state events among them are old state and are not applied to the room.
pub async fn backfill<S>(
    room: &SharedRoomState,
    source: &S,
    limit: usize,
) -> anyhow::Result<Vec<RoomEvent>>
where
    S: HistorySource + ?Sized,
{
    let _guard = room.history_lock().acquire_scoped().await;
    let prev_batch = room.prev_batch().await;

    debug!(room_id = %room.room_id(), %prev_batch, limit, "fetching history");

    let page = source
        .get_history(room.room_id(), &prev_batch, limit)
        .await
        .with_context(|| format!("could not fetch history for room '{}'", room.room_id()))?;

    debug!(
        room_id = %room.room_id(),
        events = page.events.len(),
        prev_batch = %page.prev_batch,
        "fetched history"
    );

    room.set_prev_batch(page.prev_batch).await;

    Ok(page.events)
}
