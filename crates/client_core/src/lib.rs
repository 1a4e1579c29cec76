//! Client core for browsing the climate science database: the REST client, the
//! authentication session, and the generic paginated list machinery shared by the
//! persons, publications, declarations and quotations lists.

pub mod api;
pub mod download;
pub mod entities;
pub mod error;
pub mod linking;
pub mod list;
pub mod master;
pub mod paths;
pub mod rest;
pub mod session;

pub use api::{MutationStatus, RemoteDataApi};
pub use entities::{DeclarationList, PersonList, PublicationList, QuotationList};
pub use error::{ClientError, ErrorCategory, ErrorHandler, LogErrorHandler};
pub use list::{
    EntityDescriptor, LinkOutcome, ListController, ListDataSource, ListPhase, ListQuery,
    ListSettings, ListState, QueryMode, Record, Relation,
};
pub use master::MasterContext;
pub use rest::RestClient;
pub use session::{AuthContext, Session, StaticAuth};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
