use async_trait::async_trait;
use shared::{
    domain::{
        Declaration, DeclarationId, Person, PersonId, Publication, PublicationId, Quotation,
        QuotationId,
    },
    protocol::{PageRequest, ResultSet},
};

use crate::error::ClientError;

/// HTTP-style status returned by the link/unlink endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationStatus(pub u16);

impl MutationStatus {
    pub const OK: MutationStatus = MutationStatus(200);
    pub const CREATED: MutationStatus = MutationStatus(201);
    pub const NO_CONTENT: MutationStatus = MutationStatus(204);

    pub fn is_success(self) -> bool {
        matches!(self.0, 200 | 201 | 204)
    }
}

/// The remote database, as seen through its REST service.
#[async_trait]
pub trait RemoteDataApi: Send + Sync {
    async fn find_persons(&self, page: &PageRequest) -> Result<ResultSet<Person>, ClientError>;
    async fn find_persons_by_publication(
        &self,
        publication_id: PublicationId,
        page: &PageRequest,
    ) -> Result<ResultSet<Person>, ClientError>;
    async fn find_persons_by_declaration(
        &self,
        declaration_id: DeclarationId,
        page: &PageRequest,
    ) -> Result<ResultSet<Person>, ClientError>;
    async fn get_person_by_id(&self, person_id: PersonId) -> Result<Option<Person>, ClientError>;

    async fn find_publications(
        &self,
        page: &PageRequest,
    ) -> Result<ResultSet<Publication>, ClientError>;
    async fn find_publications_by_author(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Publication>, ClientError>;
    async fn get_publication_by_id(
        &self,
        publication_id: PublicationId,
    ) -> Result<Option<Publication>, ClientError>;

    async fn find_declarations(
        &self,
        page: &PageRequest,
    ) -> Result<ResultSet<Declaration>, ClientError>;
    async fn find_declarations_by_signatory(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Declaration>, ClientError>;
    async fn get_declaration_by_id(
        &self,
        declaration_id: DeclarationId,
    ) -> Result<Option<Declaration>, ClientError>;

    async fn find_quotations(&self, page: &PageRequest)
        -> Result<ResultSet<Quotation>, ClientError>;
    async fn find_quotations_by_author(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Quotation>, ClientError>;
    async fn get_quotation_by_id(
        &self,
        quotation_id: QuotationId,
    ) -> Result<Option<Quotation>, ClientError>;

    async fn create_authorship(
        &self,
        person_id: PersonId,
        publication_id: PublicationId,
    ) -> Result<MutationStatus, ClientError>;
    async fn delete_authorship(
        &self,
        person_id: PersonId,
        publication_id: PublicationId,
    ) -> Result<MutationStatus, ClientError>;
    async fn create_signatory(
        &self,
        person_id: PersonId,
        declaration_id: DeclarationId,
    ) -> Result<MutationStatus, ClientError>;
    async fn delete_signatory(
        &self,
        person_id: PersonId,
        declaration_id: DeclarationId,
    ) -> Result<MutationStatus, ClientError>;
    /// Passing `None` for the person unlinks the quotation's author.
    async fn link_quotation_author(
        &self,
        quotation_id: QuotationId,
        person_id: Option<PersonId>,
    ) -> Result<MutationStatus, ClientError>;
}
