use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::convert::{pos_from_osm_node, OsmNodeMissingFields};
use super::domain::Pos;
use super::repository::{PosRepository, RepositoryError};
use crate::osm::{OsmNodeFetcher, OsmNodeNotFound};

/// Service facade composing the catalog repository and the OSM fetcher
/// port. Holds no state of its own; every call is a linear delegation.
pub struct PosService<R, F> {
    repository: Arc<R>,
    fetcher: Arc<F>,
}

impl<R, F> PosService<R, F>
where
    R: PosRepository + 'static,
    F: OsmNodeFetcher + 'static,
{
    pub fn new(repository: Arc<R>, fetcher: Arc<F>) -> Self {
        Self { repository, fetcher }
    }

    pub fn get_all(&self) -> Vec<Pos> {
        debug!("retrieving all POS");
        self.repository.find_all()
    }

    pub fn get_by_id(&self, id: i64) -> Result<Pos, PosServiceError> {
        debug!(id, "retrieving POS");
        Ok(self.repository.find_by_id(id)?)
    }

    pub fn clear(&self) {
        warn!("clearing all POS data");
        self.repository.clear();
    }

    /// Create-or-update. An update must target an existing record; the
    /// existence check runs before any write, so no record is ever
    /// created under a caller-supplied id.
    pub fn upsert(&self, pos: Pos) -> Result<Pos, PosServiceError> {
        match pos.id {
            None => info!(name = %pos.name, "creating new POS"),
            Some(id) => {
                info!(id, "updating POS");
                self.repository.find_by_id(id)?;
            }
        }

        self.perform_upsert(pos)
    }

    /// Import one POS from an OpenStreetMap node: fetch, convert, upsert.
    ///
    /// A conversion failure aborts the import before anything is written;
    /// fetch and persistence failures propagate as their own typed
    /// errors.
    pub async fn import_from_osm_node(&self, node_id: i64) -> Result<Pos, PosServiceError> {
        info!(node_id, "importing POS from OSM node");

        let node = self.fetcher.fetch_node(node_id).await.map_err(|err| {
            error!(node_id, %err, "failed to fetch OSM node");
            err
        })?;
        let candidate = pos_from_osm_node(&node).map_err(|err| {
            warn!(node_id, %err, "OSM node cannot be converted to a POS");
            err
        })?;
        let saved = self.upsert(candidate)?;

        info!(node_id, name = %saved.name, "successfully imported POS from OSM node");
        Ok(saved)
    }

    fn perform_upsert(&self, pos: Pos) -> Result<Pos, PosServiceError> {
        match self.repository.upsert(pos) {
            Ok(saved) => {
                info!(id = ?saved.id, "upserted POS");
                Ok(saved)
            }
            Err(err) => {
                error!(%err, "failed to upsert POS");
                Err(err.into())
            }
        }
    }
}

/// Failures surfaced by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum PosServiceError {
    #[error(transparent)]
    Source(#[from] OsmNodeNotFound),
    #[error(transparent)]
    MissingFields(#[from] OsmNodeMissingFields),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
