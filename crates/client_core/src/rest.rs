//! `reqwest` implementation of [`RemoteDataApi`] against the climate science REST service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{
        Declaration, DeclarationId, Person, PersonId, Publication, PublicationId, Quotation,
        QuotationId,
    },
    error::ApiError,
    protocol::{LoginRequest, PageRequest, ResultSet},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    api::{MutationStatus, RemoteDataApi},
    error::ClientError,
    paths,
    session::Session,
};

pub struct RestClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
}

impl RestClient {
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url.trim())?;
        Ok(Self {
            http: Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Authenticates and, on success, installs the issued token in the session.
    /// Any failure leaves the session signed out.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .post(self.url(paths::AUTH_LOGIN))
            .json(&LoginRequest {
                user_id: user_id.to_string(),
                password: password.to_string(),
            })
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.session.clear();
                return Err(err.into());
            }
        };

        if response.status() != StatusCode::OK {
            warn!(status = response.status().as_u16(), "authentication failed");
            self.session.clear();
            return Ok(false);
        }

        let body = response.text().await?;
        let jwt = match serde_json::from_str::<String>(&body) {
            Ok(quoted) => quoted,
            Err(_) => body.trim().to_string(),
        };
        if let Err(err) = self.session.set_token(&jwt) {
            self.session.clear();
            return Err(err);
        }
        info!(user_id, "authentication successful");
        Ok(true)
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token() {
            Some(jwt) => builder.bearer_auth(jwt),
            None => builder,
        }
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        pairs: Vec<(&'static str, String)>,
    ) -> Result<ResultSet<T>, ClientError> {
        debug!(path, ?pairs, "GET page");
        let response = self
            .authorize(self.http.get(self.url(path)).query(&pairs))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        path: &str,
        id: i64,
    ) -> Result<Option<T>, ClientError> {
        let response = self
            .authorize(self.http.get(format!("{}/{id}", self.url(path))))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = ensure_success(response).await?.text().await?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn mutate(&self, builder: RequestBuilder) -> Result<MutationStatus, ClientError> {
        let response = self.authorize(builder).send().await?;
        let status = MutationStatus(response.status().as_u16());
        if !status.is_success() {
            warn!(status = status.0, url = %response.url(), "mutation rejected");
        }
        Ok(status)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ApiError>(&body)
        .unwrap_or_else(|_| ApiError::from_status(status.as_u16(), &body));
    Err(ClientError::status(status.as_u16(), error))
}

fn with_page(
    mut pairs: Vec<(&'static str, String)>,
    page: &PageRequest,
) -> Vec<(&'static str, String)> {
    pairs.extend(page.query_pairs());
    pairs
}

#[async_trait]
impl RemoteDataApi for RestClient {
    async fn find_persons(&self, page: &PageRequest) -> Result<ResultSet<Person>, ClientError> {
        self.fetch_page(paths::PERSON_FIND, page.query_pairs()).await
    }

    async fn find_persons_by_publication(
        &self,
        publication_id: PublicationId,
        page: &PageRequest,
    ) -> Result<ResultSet<Person>, ClientError> {
        let pairs = vec![(paths::PUBLICATION_ID, publication_id.to_string())];
        self.fetch_page(paths::PERSON_FIND_BY_PUBLICATION, with_page(pairs, page))
            .await
    }

    async fn find_persons_by_declaration(
        &self,
        declaration_id: DeclarationId,
        page: &PageRequest,
    ) -> Result<ResultSet<Person>, ClientError> {
        let pairs = vec![(paths::DECLARATION_ID, declaration_id.to_string())];
        self.fetch_page(paths::PERSON_FIND_BY_DECLARATION, with_page(pairs, page))
            .await
    }

    async fn get_person_by_id(&self, person_id: PersonId) -> Result<Option<Person>, ClientError> {
        self.fetch_one(paths::PERSON, person_id.0).await
    }

    async fn find_publications(
        &self,
        page: &PageRequest,
    ) -> Result<ResultSet<Publication>, ClientError> {
        self.fetch_page(paths::PUBLICATION_FIND, page.query_pairs())
            .await
    }

    async fn find_publications_by_author(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Publication>, ClientError> {
        let pairs = paths::person_relation_pairs(person_id.0, last_name);
        self.fetch_page(paths::PUBLICATION_FIND_BY_AUTHOR, with_page(pairs, page))
            .await
    }

    async fn get_publication_by_id(
        &self,
        publication_id: PublicationId,
    ) -> Result<Option<Publication>, ClientError> {
        self.fetch_one(paths::PUBLICATION, publication_id.0).await
    }

    async fn find_declarations(
        &self,
        page: &PageRequest,
    ) -> Result<ResultSet<Declaration>, ClientError> {
        self.fetch_page(paths::DECLARATION_FIND, page.query_pairs())
            .await
    }

    async fn find_declarations_by_signatory(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Declaration>, ClientError> {
        let pairs = paths::person_relation_pairs(person_id.0, last_name);
        self.fetch_page(paths::DECLARATION_FIND_BY_SIGNATORY, with_page(pairs, page))
            .await
    }

    async fn get_declaration_by_id(
        &self,
        declaration_id: DeclarationId,
    ) -> Result<Option<Declaration>, ClientError> {
        self.fetch_one(paths::DECLARATION, declaration_id.0).await
    }

    async fn find_quotations(
        &self,
        page: &PageRequest,
    ) -> Result<ResultSet<Quotation>, ClientError> {
        self.fetch_page(paths::QUOTATION_FIND, page.query_pairs())
            .await
    }

    async fn find_quotations_by_author(
        &self,
        person_id: PersonId,
        last_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ResultSet<Quotation>, ClientError> {
        let pairs = paths::person_relation_pairs(person_id.0, last_name);
        self.fetch_page(paths::QUOTATION_FIND_BY_AUTHOR, with_page(pairs, page))
            .await
    }

    async fn get_quotation_by_id(
        &self,
        quotation_id: QuotationId,
    ) -> Result<Option<Quotation>, ClientError> {
        self.fetch_one(paths::QUOTATION, quotation_id.0).await
    }

    async fn create_authorship(
        &self,
        person_id: PersonId,
        publication_id: PublicationId,
    ) -> Result<MutationStatus, ClientError> {
        let url = format!("{}/{person_id}/{publication_id}", self.url(paths::AUTHORSHIP));
        self.mutate(self.http.put(url)).await
    }

    async fn delete_authorship(
        &self,
        person_id: PersonId,
        publication_id: PublicationId,
    ) -> Result<MutationStatus, ClientError> {
        let url = format!("{}/{person_id}/{publication_id}", self.url(paths::AUTHORSHIP));
        self.mutate(self.http.delete(url)).await
    }

    async fn create_signatory(
        &self,
        person_id: PersonId,
        declaration_id: DeclarationId,
    ) -> Result<MutationStatus, ClientError> {
        let url = format!("{}/{person_id}/{declaration_id}", self.url(paths::SIGNATORY));
        self.mutate(self.http.put(url)).await
    }

    async fn delete_signatory(
        &self,
        person_id: PersonId,
        declaration_id: DeclarationId,
    ) -> Result<MutationStatus, ClientError> {
        let url = format!("{}/{person_id}/{declaration_id}", self.url(paths::SIGNATORY));
        self.mutate(self.http.delete(url)).await
    }

    async fn link_quotation_author(
        &self,
        quotation_id: QuotationId,
        person_id: Option<PersonId>,
    ) -> Result<MutationStatus, ClientError> {
        let url = format!("{}/{quotation_id}", self.url(paths::QUOTATION));
        let pairs: Vec<(&str, String)> = person_id
            .map(|person_id| vec![(paths::PERSON_ID, person_id.to_string())])
            .unwrap_or_default();
        self.mutate(self.http.patch(url).query(&pairs)).await
    }
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
