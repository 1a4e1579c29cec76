//! In-memory `RemoteDataApi` that records every call and can hold responses back
//! behind gates, so tests control completion order.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::{
    domain::{
        Declaration, DeclarationId, Person, PersonId, Publication, PublicationId, Quotation,
        QuotationId,
    },
    error::ApiError,
    protocol::{PageRequest, ResultSet},
};
use tokio::sync::oneshot;

use crate::{
    api::{MutationStatus, RemoteDataApi},
    error::{ClientError, ErrorHandler},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    FindPersons(PageRequest),
    FindPersonsByPublication(PublicationId, PageRequest),
    FindPersonsByDeclaration(DeclarationId, PageRequest),
    GetPersonById(PersonId),
    FindPublications(PageRequest),
    FindPublicationsByAuthor {
        person_id: PersonId,
        last_name: Option<String>,
        page: PageRequest,
    },
    GetPublicationById(PublicationId),
    FindDeclarations(PageRequest),
    FindDeclarationsBySignatory {
        person_id: PersonId,
        last_name: Option<String>,
        page: PageRequest,
    },
    GetDeclarationById(DeclarationId),
    FindQuotations(PageRequest),
    FindQuotationsByAuthor {
        person_id: PersonId,
        last_name: Option<String>,
        page: PageRequest,
    },
    GetQuotationById(QuotationId),
    CreateAuthorship(PersonId, PublicationId),
    DeleteAuthorship(PersonId, PublicationId),
    CreateSignatory(PersonId, DeclarationId),
    DeleteSignatory(PersonId, DeclarationId),
    LinkQuotationAuthor(QuotationId, Option<PersonId>),
}

pub(crate) fn person(id: i64, last_name: &str) -> Person {
    Person {
        id: PersonId(id),
        title: Some("Dr".into()),
        first_name: Some("Test".into()),
        nickname: None,
        prefix: None,
        last_name: last_name.to_string(),
        suffix: None,
        alias: None,
        description: None,
        qualifications: None,
        country: Some("UK".into()),
        rating: 3,
        checked: false,
        published: true,
        linked: false,
    }
}

pub(crate) fn publication(id: i64, title: &str, linked: bool) -> Publication {
    Publication {
        id: PublicationId(id),
        title: title.to_string(),
        authors: Some("Smith, A.".into()),
        journal: Some("Energy & Environment".into()),
        location: None,
        publication_type_id: Some("JOUR".into()),
        publication_date: None,
        publication_year: Some(2011),
        r#abstract: None,
        peer_reviewed: true,
        doi: None,
        issn_isbn: None,
        url: None,
        accessed: None,
        linked,
    }
}

pub(crate) fn declaration(id: i64, title: &str, linked: bool) -> Declaration {
    Declaration {
        id: DeclarationId(id),
        r#type: Some("Open letter".into()),
        title: title.to_string(),
        date: Some("2019-09-23".into()),
        country: Some("NL".into()),
        url: None,
        signatories: None,
        signatory_count: Some("500".into()),
        linked,
    }
}

pub(crate) fn quotation(id: i64, person_id: Option<i64>, text: &str, linked: bool) -> Quotation {
    Quotation {
        id: QuotationId(id),
        person_id: person_id.map(PersonId),
        author: Some("Smith".into()),
        text: text.to_string(),
        date: None,
        source: None,
        url: None,
        linked,
    }
}

/// Answers every `find*` with one row labelled by the request's filter, so tests can
/// tell which request produced the visible page.
pub(crate) struct RecordingApi {
    calls: Mutex<Vec<ApiCall>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    fail_status: Mutex<Option<u16>>,
    mutation_status: Mutex<MutationStatus>,
    total: u64,
    linked: bool,
}

impl RecordingApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::with_total(25))
    }

    pub(crate) fn with_total(total: u64) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(VecDeque::new()),
            fail_status: Mutex::new(None),
            mutation_status: Mutex::new(MutationStatus::OK),
            total,
            linked: false,
        }
    }

    /// Rows come back with this `linked` flag.
    pub(crate) fn with_linked(mut self, linked: bool) -> Self {
        self.linked = linked;
        self
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().expect("calls").clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("calls").len()
    }

    /// The next request to arrive waits until the returned sender fires (or drops).
    pub(crate) fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().expect("gates").push_back(rx);
        tx
    }

    pub(crate) fn fail_with(&self, status: Option<u16>) {
        *self.fail_status.lock().expect("fail status") = status;
    }

    pub(crate) fn respond_to_mutations_with(&self, status: MutationStatus) {
        *self.mutation_status.lock().expect("mutation status") = status;
    }

    async fn enter(&self, call: ApiCall) -> Result<(), ClientError> {
        self.calls.lock().expect("calls").push(call);
        let gate = self.gates.lock().expect("gates").pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match *self.fail_status.lock().expect("fail status") {
            Some(status) => Err(ClientError::status(
                status,
                ApiError::from_status(status, "scripted failure"),
            )),
            None => Ok(()),
        }
    }

    fn page<T>(&self, page: &PageRequest, make: impl Fn(i64, &str) -> T) -> ResultSet<T> {
        let id = i64::try_from(page.offset).unwrap_or(i64::MAX - 1) + 1;
        let label = if page.filter.is_empty() {
            "all"
        } else {
            page.filter.as_str()
        };
        ResultSet {
            count: self.total,
            records: vec![make(id, label)],
        }
    }

    async fn mutation(&self, call: ApiCall) -> Result<MutationStatus, ClientError> {
        self.enter(call).await?;
        Ok(*self.mutation_status.lock().expect("mutation status"))
    }
}

#[async_trait]
impl RemoteDataApi for RecordingApi {
    async fn find_persons(&self, page: &PageRequest) -> Result<ResultSet<Person>, ClientError> {
        self.enter(ApiCall::FindPersons(page.clone())).await?;
        Ok(self.page(page, person))
    }

    async fn find_persons_by_publication(
        &self,
        publication_id: PublicationId,
        page: &PageRequest,
    ) -> Result<ResultSet<Person>, ClientError> {
        self.enter(ApiCall::FindPersonsByPublication(publication_id, page.clone()))
            .await?;
        Ok(self.page(page, person))
    }

    async fn find_persons_by_declaration(
        &self,
        declaration_id: DeclarationId,
        page: &PageRequest,
    ) -> Result<ResultSet<Person>, ClientError> {
        self.enter(ApiCall::FindPersonsByDeclaration(declaration_id, page.clone()))
            .await?;
        Ok(self.page(page, person))
    }

    async fn get_person_by_id(&self, person_id: PersonId) -> Result<Option<Person>, ClientError> {
        self.enter(ApiCall::GetPersonById(person_id)).await?;
        Ok(Some(person(person_id.0, "Quoted")))
    }

    async fn find_publications(
        &self,
        page: &PageRequest,
    ) -> Result<ResultSet<Publication>, ClientError> {
        self.enter(ApiCall::FindPublications(page.clone())).await?;
        Ok(self.page(page, |id, title| publication(id, title, self.linked)))
    }

    async fn find_publications_by_author(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Publication>, ClientError> {
        self.enter(ApiCall::FindPublicationsByAuthor {
            person_id,
            last_name: last_name.map(str::to_string),
            page: page.clone(),
        })
        .await?;
        Ok(self.page(page, |id, title| publication(id, title, self.linked)))
    }

    async fn get_publication_by_id(
        &self,
        publication_id: PublicationId,
    ) -> Result<Option<Publication>, ClientError> {
        self.enter(ApiCall::GetPublicationById(publication_id))
            .await?;
        Ok(Some(publication(publication_id.0, "by id", self.linked)))
    }

    async fn find_declarations(
        &self,
        page: &PageRequest,
    ) -> Result<ResultSet<Declaration>, ClientError> {
        self.enter(ApiCall::FindDeclarations(page.clone())).await?;
        Ok(self.page(page, |id, title| declaration(id, title, self.linked)))
    }

    async fn find_declarations_by_signatory(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Declaration>, ClientError> {
        self.enter(ApiCall::FindDeclarationsBySignatory {
            person_id,
            last_name: last_name.map(str::to_string),
            page: page.clone(),
        })
        .await?;
        Ok(self.page(page, |id, title| declaration(id, title, self.linked)))
    }

    async fn get_declaration_by_id(
        &self,
        declaration_id: DeclarationId,
    ) -> Result<Option<Declaration>, ClientError> {
        self.enter(ApiCall::GetDeclarationById(declaration_id))
            .await?;
        Ok(Some(declaration(declaration_id.0, "by id", self.linked)))
    }

    async fn find_quotations(
        &self,
        page: &PageRequest,
    ) -> Result<ResultSet<Quotation>, ClientError> {
        self.enter(ApiCall::FindQuotations(page.clone())).await?;
        Ok(self.page(page, |id, text| quotation(id, None, text, self.linked)))
    }

    async fn find_quotations_by_author(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Quotation>, ClientError> {
        self.enter(ApiCall::FindQuotationsByAuthor {
            person_id,
            last_name: last_name.map(str::to_string),
            page: page.clone(),
        })
        .await?;
        Ok(self.page(page, |id, text| {
            quotation(id, Some(person_id.0), text, self.linked)
        }))
    }

    async fn get_quotation_by_id(
        &self,
        quotation_id: QuotationId,
    ) -> Result<Option<Quotation>, ClientError> {
        self.enter(ApiCall::GetQuotationById(quotation_id)).await?;
        Ok(Some(quotation(quotation_id.0, None, "by id", self.linked)))
    }

    async fn create_authorship(
        &self,
        person_id: PersonId,
        publication_id: PublicationId,
    ) -> Result<MutationStatus, ClientError> {
        self.mutation(ApiCall::CreateAuthorship(person_id, publication_id))
            .await
    }

    async fn delete_authorship(
        &self,
        person_id: PersonId,
        publication_id: PublicationId,
    ) -> Result<MutationStatus, ClientError> {
        self.mutation(ApiCall::DeleteAuthorship(person_id, publication_id))
            .await
    }

    async fn create_signatory(
        &self,
        person_id: PersonId,
        declaration_id: DeclarationId,
    ) -> Result<MutationStatus, ClientError> {
        self.mutation(ApiCall::CreateSignatory(person_id, declaration_id))
            .await
    }

    async fn delete_signatory(
        &self,
        person_id: PersonId,
        declaration_id: DeclarationId,
    ) -> Result<MutationStatus, ClientError> {
        self.mutation(ApiCall::DeleteSignatory(person_id, declaration_id))
            .await
    }

    async fn link_quotation_author(
        &self,
        quotation_id: QuotationId,
        person_id: Option<PersonId>,
    ) -> Result<MutationStatus, ClientError> {
        self.mutation(ApiCall::LinkQuotationAuthor(quotation_id, person_id))
            .await
    }
}

#[derive(Default)]
pub(crate) struct RecordingErrors {
    reported: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingErrors {
    pub(crate) fn reported(&self) -> Vec<(&'static str, String)> {
        self.reported.lock().expect("reported").clone()
    }
}

impl ErrorHandler for RecordingErrors {
    fn on_error(&self, list: &'static str, err: &ClientError) {
        self.reported
            .lock()
            .expect("reported")
            .push((list, err.to_string()));
    }
}

/// Yields until `api` has seen at least `calls` requests.
pub(crate) async fn wait_for_calls(api: &RecordingApi, calls: usize) {
    for _ in 0..1_000 {
        if api.call_count() >= calls {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {calls} calls, saw {:?}", api.calls());
}
