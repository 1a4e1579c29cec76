//! Explicit links between a person and a publication, declaration or quotation.

use shared::domain::{DeclarationId, PersonId, PublicationId, QuotationId};

use crate::{
    api::{MutationStatus, RemoteDataApi},
    error::ClientError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Authorship {
        person_id: PersonId,
        publication_id: PublicationId,
    },
    Signatory {
        person_id: PersonId,
        declaration_id: DeclarationId,
    },
    QuotationAuthor {
        quotation_id: QuotationId,
        person_id: PersonId,
    },
}

impl LinkTarget {
    /// Makes (`link == true`) or breaks the link on the server.
    pub async fn apply(
        self,
        api: &dyn RemoteDataApi,
        link: bool,
    ) -> Result<MutationStatus, ClientError> {
        match self {
            LinkTarget::Authorship {
                person_id,
                publication_id,
            } if link => api.create_authorship(person_id, publication_id).await,
            LinkTarget::Authorship {
                person_id,
                publication_id,
            } => api.delete_authorship(person_id, publication_id).await,
            LinkTarget::Signatory {
                person_id,
                declaration_id,
            } if link => api.create_signatory(person_id, declaration_id).await,
            LinkTarget::Signatory {
                person_id,
                declaration_id,
            } => api.delete_signatory(person_id, declaration_id).await,
            LinkTarget::QuotationAuthor {
                quotation_id,
                person_id,
            } => {
                api.link_quotation_author(quotation_id, link.then_some(person_id))
                    .await
            }
        }
    }
}
