//! The four entity lists: persons, publications, declarations and quotations.
//!
//! | list         | NONE / self | PERSONS     | PUBLICATIONS | DECLARATIONS | QUOTATIONS  |
//! |--------------|-------------|-------------|--------------|--------------|-------------|
//! | persons      | unfiltered  | unfiltered  | authors      | signatories  | quoted person |
//! | publications | unfiltered  | by author   | -            | cleared      | cleared     |
//! | declarations | unfiltered  | by signatory| cleared      | -            | cleared     |
//! | quotations   | unfiltered  | by author   | cleared      | cleared      | -           |

use async_trait::async_trait;
use shared::{
    domain::{
        Declaration, DeclarationId, Master, Person, PersonId, Publication, PublicationId,
        Quotation, QuotationId,
    },
    protocol::{PageRequest, ResultSet},
};

use crate::{
    api::RemoteDataApi,
    download::Endpoint,
    error::ClientError,
    linking::LinkTarget,
    list::{EntityDescriptor, QueryMode, Record, Relation},
    master::MasterContext,
    paths,
    session::AuthContext,
};

impl Record for Person {
    fn id(&self) -> i64 {
        self.id.0
    }

    fn linked(&self) -> bool {
        self.linked
    }

    fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }
}

impl Record for Publication {
    fn id(&self) -> i64 {
        self.id.0
    }

    fn linked(&self) -> bool {
        self.linked
    }

    fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }
}

impl Record for Declaration {
    fn id(&self) -> i64 {
        self.id.0
    }

    fn linked(&self) -> bool {
        self.linked
    }

    fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }
}

impl Record for Quotation {
    fn id(&self) -> i64 {
        self.id.0
    }

    fn linked(&self) -> bool {
        self.linked
    }

    fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }
}

/// Mode for a list that is scoped only by a selected person.
fn person_scoped_mode(own: Master, master: &MasterContext, auth: &dyn AuthContext) -> QueryMode {
    match master.master {
        Master::None => QueryMode::Unfiltered,
        Master::Persons => QueryMode::ByRelation(master.person_relation(auth)),
        other if other == own => QueryMode::Unfiltered,
        _ => QueryMode::Cleared,
    }
}

/// Endpoint for a list that is scoped only by a selected person.
fn person_scoped_endpoint(
    mode: &QueryMode,
    find: &str,
    find_by_person: &str,
    by_id: &str,
) -> Option<Endpoint> {
    match mode {
        QueryMode::Unfiltered => Some(Endpoint::new(find)),
        QueryMode::ByRelation(Relation {
            via: Master::Persons,
            related_id: Some(person_id),
            related_key,
        }) => Some(Endpoint::new(find_by_person).with_params(paths::person_relation_pairs(
            *person_id,
            related_key.as_deref(),
        ))),
        QueryMode::ByIdentity(Some(id)) => Some(Endpoint::new(format!("{by_id}/{id}"))),
        _ => None,
    }
}

/// The person selected as master, paired with this list's row, when linking applies.
fn selected_person(master: &MasterContext) -> Option<PersonId> {
    match master.master {
        Master::Persons => master.person.as_ref().map(|person| person.id),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PersonList;

#[async_trait]
impl EntityDescriptor for PersonList {
    type Record = Person;

    fn name(&self) -> &'static str {
        "persons"
    }

    fn own_master(&self) -> Master {
        Master::Persons
    }

    fn display_columns(&self) -> &'static [&'static str] {
        &["TITLE", "FIRST_NAME", "LAST_NAME", "COUNTRY", "RATING", "PUBLISHED"]
    }

    fn related_masters(&self) -> &'static [Master] {
        &[Master::Publications, Master::Declarations, Master::Quotations]
    }

    fn query_mode(&self, master: &MasterContext, _auth: &dyn AuthContext) -> QueryMode {
        match master.master {
            Master::None | Master::Persons => QueryMode::Unfiltered,
            Master::Publications => QueryMode::ByRelation(master.relation(Master::Publications)),
            Master::Declarations => QueryMode::ByRelation(master.relation(Master::Declarations)),
            Master::Quotations => QueryMode::ByIdentity(
                master
                    .quotation
                    .as_ref()
                    .and_then(|quotation| quotation.person_id)
                    .map(|person_id| person_id.0),
            ),
        }
    }

    fn endpoint(&self, mode: &QueryMode) -> Option<Endpoint> {
        match mode {
            QueryMode::Unfiltered => Some(Endpoint::new(paths::PERSON_FIND)),
            QueryMode::ByRelation(Relation {
                via: Master::Publications,
                related_id: Some(id),
                ..
            }) => Some(
                Endpoint::new(paths::PERSON_FIND_BY_PUBLICATION)
                    .with_params(vec![(paths::PUBLICATION_ID, id.to_string())]),
            ),
            QueryMode::ByRelation(Relation {
                via: Master::Declarations,
                related_id: Some(id),
                ..
            }) => Some(
                Endpoint::new(paths::PERSON_FIND_BY_DECLARATION)
                    .with_params(vec![(paths::DECLARATION_ID, id.to_string())]),
            ),
            QueryMode::ByIdentity(Some(id)) => {
                Some(Endpoint::new(format!("{}/{id}", paths::PERSON)))
            }
            _ => None,
        }
    }

    async fn load_unfiltered(
        &self,
        api: &dyn RemoteDataApi,
        page: &PageRequest,
    ) -> Result<ResultSet<Person>, ClientError> {
        api.find_persons(page).await
    }

    async fn load_by_relation(
        &self,
        api: &dyn RemoteDataApi,
        via: Master,
        related_id: i64,
        _related_key: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Person>, ClientError> {
        match via {
            Master::Publications => {
                api.find_persons_by_publication(PublicationId(related_id), page)
                    .await
            }
            Master::Declarations => {
                api.find_persons_by_declaration(DeclarationId(related_id), page)
                    .await
            }
            via => Err(ClientError::UnsupportedRelation {
                list: self.name(),
                via,
            }),
        }
    }

    async fn load_by_id(
        &self,
        api: &dyn RemoteDataApi,
        id: i64,
    ) -> Result<Option<Person>, ClientError> {
        api.get_person_by_id(PersonId(id)).await
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PublicationList;

#[async_trait]
impl EntityDescriptor for PublicationList {
    type Record = Publication;

    fn name(&self) -> &'static str {
        "publications"
    }

    fn own_master(&self) -> Master {
        Master::Publications
    }

    fn display_columns(&self) -> &'static [&'static str] {
        &[
            "TITLE",
            "AUTHORS",
            "JOURNAL",
            "PUBLICATION_TYPE_ID",
            "PUBLICATION_YEAR",
            "PEER_REVIEWED",
            "LINKED",
        ]
    }

    fn related_masters(&self) -> &'static [Master] {
        &[Master::Persons]
    }

    fn query_mode(&self, master: &MasterContext, auth: &dyn AuthContext) -> QueryMode {
        person_scoped_mode(self.own_master(), master, auth)
    }

    fn endpoint(&self, mode: &QueryMode) -> Option<Endpoint> {
        person_scoped_endpoint(
            mode,
            paths::PUBLICATION_FIND,
            paths::PUBLICATION_FIND_BY_AUTHOR,
            paths::PUBLICATION,
        )
    }

    fn link_target(&self, master: &MasterContext, record: &Publication) -> Option<LinkTarget> {
        selected_person(master).map(|person_id| LinkTarget::Authorship {
            person_id,
            publication_id: record.id,
        })
    }

    async fn load_unfiltered(
        &self,
        api: &dyn RemoteDataApi,
        page: &PageRequest,
    ) -> Result<ResultSet<Publication>, ClientError> {
        api.find_publications(page).await
    }

    async fn load_by_relation(
        &self,
        api: &dyn RemoteDataApi,
        via: Master,
        related_id: i64,
        related_key: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Publication>, ClientError> {
        match via {
            Master::Persons => {
                api.find_publications_by_author(PersonId(related_id), related_key, page)
                    .await
            }
            via => Err(ClientError::UnsupportedRelation {
                list: self.name(),
                via,
            }),
        }
    }

    async fn load_by_id(
        &self,
        api: &dyn RemoteDataApi,
        id: i64,
    ) -> Result<Option<Publication>, ClientError> {
        api.get_publication_by_id(PublicationId(id)).await
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationList;

#[async_trait]
impl EntityDescriptor for DeclarationList {
    type Record = Declaration;

    fn name(&self) -> &'static str {
        "declarations"
    }

    fn own_master(&self) -> Master {
        Master::Declarations
    }

    fn display_columns(&self) -> &'static [&'static str] {
        &["TYPE", "TITLE", "DATE", "COUNTRY", "SIGNATORY_COUNT", "LINKED"]
    }

    fn related_masters(&self) -> &'static [Master] {
        &[Master::Persons]
    }

    fn query_mode(&self, master: &MasterContext, auth: &dyn AuthContext) -> QueryMode {
        person_scoped_mode(self.own_master(), master, auth)
    }

    fn endpoint(&self, mode: &QueryMode) -> Option<Endpoint> {
        person_scoped_endpoint(
            mode,
            paths::DECLARATION_FIND,
            paths::DECLARATION_FIND_BY_SIGNATORY,
            paths::DECLARATION,
        )
    }

    fn link_target(&self, master: &MasterContext, record: &Declaration) -> Option<LinkTarget> {
        selected_person(master).map(|person_id| LinkTarget::Signatory {
            person_id,
            declaration_id: record.id,
        })
    }

    async fn load_unfiltered(
        &self,
        api: &dyn RemoteDataApi,
        page: &PageRequest,
    ) -> Result<ResultSet<Declaration>, ClientError> {
        api.find_declarations(page).await
    }

    async fn load_by_relation(
        &self,
        api: &dyn RemoteDataApi,
        via: Master,
        related_id: i64,
        related_key: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Declaration>, ClientError> {
        match via {
            Master::Persons => {
                api.find_declarations_by_signatory(PersonId(related_id), related_key, page)
                    .await
            }
            via => Err(ClientError::UnsupportedRelation {
                list: self.name(),
                via,
            }),
        }
    }

    async fn load_by_id(
        &self,
        api: &dyn RemoteDataApi,
        id: i64,
    ) -> Result<Option<Declaration>, ClientError> {
        api.get_declaration_by_id(DeclarationId(id)).await
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct QuotationList;

#[async_trait]
impl EntityDescriptor for QuotationList {
    type Record = Quotation;

    fn name(&self) -> &'static str {
        "quotations"
    }

    fn own_master(&self) -> Master {
        Master::Quotations
    }

    fn display_columns(&self) -> &'static [&'static str] {
        &["AUTHOR", "TEXT", "DATE", "SOURCE", "LINKED"]
    }

    fn related_masters(&self) -> &'static [Master] {
        &[Master::Persons]
    }

    fn query_mode(&self, master: &MasterContext, auth: &dyn AuthContext) -> QueryMode {
        person_scoped_mode(self.own_master(), master, auth)
    }

    fn endpoint(&self, mode: &QueryMode) -> Option<Endpoint> {
        person_scoped_endpoint(
            mode,
            paths::QUOTATION_FIND,
            paths::QUOTATION_FIND_BY_AUTHOR,
            paths::QUOTATION,
        )
    }

    fn link_target(&self, master: &MasterContext, record: &Quotation) -> Option<LinkTarget> {
        selected_person(master).map(|person_id| LinkTarget::QuotationAuthor {
            quotation_id: record.id,
            person_id,
        })
    }

    async fn load_unfiltered(
        &self,
        api: &dyn RemoteDataApi,
        page: &PageRequest,
    ) -> Result<ResultSet<Quotation>, ClientError> {
        api.find_quotations(page).await
    }

    async fn load_by_relation(
        &self,
        api: &dyn RemoteDataApi,
        via: Master,
        related_id: i64,
        related_key: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Quotation>, ClientError> {
        match via {
            Master::Persons => {
                api.find_quotations_by_author(PersonId(related_id), related_key, page)
                    .await
            }
            via => Err(ClientError::UnsupportedRelation {
                list: self.name(),
                via,
            }),
        }
    }

    async fn load_by_id(
        &self,
        api: &dyn RemoteDataApi,
        id: i64,
    ) -> Result<Option<Quotation>, ClientError> {
        api.get_quotation_by_id(QuotationId(id)).await
    }
}

#[cfg(test)]
#[path = "tests/entities_tests.rs"]
mod tests;
