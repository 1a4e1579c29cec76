use async_trait::async_trait;
use shared::{
    domain::Master,
    protocol::{PageRequest, ResultSet},
};

use crate::{
    api::RemoteDataApi,
    download::Endpoint,
    error::ClientError,
    linking::LinkTarget,
    list::{QueryMode, Record},
    master::MasterContext,
    session::AuthContext,
};

/// Everything that distinguishes one entity list from another: its endpoints, its
/// columns, and how it reacts to the shared master context.
#[async_trait]
pub trait EntityDescriptor: Send + Sync + 'static {
    type Record: Record;

    fn name(&self) -> &'static str;

    /// The master setting under which this list is the driving list.
    fn own_master(&self) -> Master;

    fn display_columns(&self) -> &'static [&'static str];

    /// Masters whose selected record scopes this list.
    fn related_masters(&self) -> &'static [Master];

    fn query_mode(&self, master: &MasterContext, auth: &dyn AuthContext) -> QueryMode;

    /// Relevant when the master setting itself changed, or when the master this list
    /// is slaved to now has a different selected record.
    fn is_relevant_change(&self, previous: &MasterContext, next: &MasterContext) -> bool {
        if previous.master != next.master {
            return true;
        }
        self.related_masters().contains(&next.master)
            && previous.selected_id(next.master) != next.selected_id(next.master)
    }

    /// The plain GET endpoint equivalent to a live query, for download links.
    fn endpoint(&self, mode: &QueryMode) -> Option<Endpoint>;

    fn link_target(&self, _master: &MasterContext, _record: &Self::Record) -> Option<LinkTarget> {
        None
    }

    async fn load_unfiltered(
        &self,
        api: &dyn RemoteDataApi,
        page: &PageRequest,
    ) -> Result<ResultSet<Self::Record>, ClientError>;

    async fn load_by_relation(
        &self,
        api: &dyn RemoteDataApi,
        via: Master,
        related_id: i64,
        related_key: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Self::Record>, ClientError>;

    async fn load_by_id(
        &self,
        api: &dyn RemoteDataApi,
        id: i64,
    ) -> Result<Option<Self::Record>, ClientError>;
}
