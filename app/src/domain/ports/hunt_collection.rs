//! Port for the remote "hunts" document collection.
//!
//! Adapters wrap a hosted document database. Live queries are registered
//! synchronously and deliver snapshots asynchronously; writes are one-shot
//! async calls. The remote service assigns document ids and creation
//! timestamps.

use async_trait::async_trait;

use crate::domain::{Hunt, HuntId, HuntName, NewHunt, UserId};

use super::{LiveQuery, define_port_error};

define_port_error! {
    /// Errors raised by hunt collection adapters.
    pub enum HuntCollectionError {
        /// The remote service could not be reached.
        Connection { message: String } =>
            "hunt collection connection failed: {message}",
        /// A query or write failed during execution.
        Query { message: String } =>
            "hunt collection query failed: {message}",
        /// Security rules rejected the call.
        PermissionDenied { message: String } =>
            "hunt collection permission denied: {message}",
    }
}

/// Port for reading and writing hunt documents.
///
/// # Ordering
///
/// Snapshots from [`HuntCollection::watch_owned`] are sorted by `createdAt`
/// descending. Documents whose server timestamp has not resolved yet sort
/// first, matching how the hosted service reports pending writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HuntCollection: Send + Sync {
    /// Open a live query over every hunt owned by `owner`.
    fn watch_owned(&self, owner: &UserId) -> Result<LiveQuery<Vec<Hunt>>, HuntCollectionError>;

    /// Open a live query over a single document.
    ///
    /// Snapshots carry `None` while the document does not exist.
    fn watch_hunt(&self, id: &HuntId) -> Result<LiveQuery<Option<Hunt>>, HuntCollectionError>;

    /// One-shot exact-match query on owner and name.
    async fn find_owned_by_name(
        &self,
        owner: &UserId,
        name: &HuntName,
    ) -> Result<Vec<Hunt>, HuntCollectionError>;

    /// Create a document and return its server-assigned id.
    async fn create(&self, hunt: &NewHunt) -> Result<HuntId, HuntCollectionError>;

    /// Update the `name` field of one document.
    async fn rename(&self, id: &HuntId, name: &HuntName) -> Result<(), HuntCollectionError>;

    /// Delete one document.
    async fn delete(&self, id: &HuntId) -> Result<(), HuntCollectionError>;
}

/// Fixture collection with no documents.
///
/// Live queries deliver one empty snapshot and then close; writes succeed
/// without storing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureHuntCollection;

/// Id returned by [`FixtureHuntCollection::create`].
pub const FIXTURE_HUNT_ID: &str = "fixture-hunt";

#[async_trait]
impl HuntCollection for FixtureHuntCollection {
    fn watch_owned(&self, _owner: &UserId) -> Result<LiveQuery<Vec<Hunt>>, HuntCollectionError> {
        let (feed, query) = LiveQuery::channel();
        feed.publish(Ok(Vec::new()));
        Ok(query)
    }

    fn watch_hunt(&self, _id: &HuntId) -> Result<LiveQuery<Option<Hunt>>, HuntCollectionError> {
        let (feed, query) = LiveQuery::channel();
        feed.publish(Ok(None));
        Ok(query)
    }

    async fn find_owned_by_name(
        &self,
        _owner: &UserId,
        _name: &HuntName,
    ) -> Result<Vec<Hunt>, HuntCollectionError> {
        Ok(Vec::new())
    }

    async fn create(&self, _hunt: &NewHunt) -> Result<HuntId, HuntCollectionError> {
        HuntId::new(FIXTURE_HUNT_ID).map_err(|err| HuntCollectionError::query(err.to_string()))
    }

    async fn rename(&self, _id: &HuntId, _name: &HuntName) -> Result<(), HuntCollectionError> {
        Ok(())
    }

    async fn delete(&self, _id: &HuntId) -> Result<(), HuntCollectionError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn owner() -> UserId {
        UserId::new("u1").expect("valid uid")
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_owned_query_yields_one_empty_snapshot(owner: UserId) {
        let mut query = FixtureHuntCollection
            .watch_owned(&owner)
            .expect("fixture query opens");
        let first = query.next().await.expect("event").expect("snapshot");
        assert!(first.is_empty());
        assert!(query.next().await.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_create_returns_stable_id(owner: UserId) {
        let hunt = NewHunt {
            name: HuntName::new("Beach Hunt").expect("valid name"),
            user_id: owner,
        };
        let id = FixtureHuntCollection
            .create(&hunt)
            .await
            .expect("fixture create succeeds");
        assert_eq!(id.as_ref(), FIXTURE_HUNT_ID);
    }

    #[rstest]
    fn errors_render_provider_detail() {
        let err = HuntCollectionError::permission_denied("missing or insufficient permissions");
        assert_eq!(
            err.to_string(),
            "hunt collection permission denied: missing or insufficient permissions"
        );
    }
}
