//! REST service routes, relative to the service base URL.

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTHORSHIP: &str = "/authorship";
pub const DECLARATION: &str = "/declaration";
pub const DECLARATION_FIND: &str = "/declaration/find";
pub const DECLARATION_FIND_BY_SIGNATORY: &str = "/declaration/findBySignatory";
pub const PERSON: &str = "/person";
pub const PERSON_FIND: &str = "/person/find";
pub const PERSON_FIND_BY_DECLARATION: &str = "/person/findByDeclaration";
pub const PERSON_FIND_BY_PUBLICATION: &str = "/person/findByPublication";
pub const PUBLICATION: &str = "/publication";
pub const PUBLICATION_FIND: &str = "/publication/find";
pub const PUBLICATION_FIND_BY_AUTHOR: &str = "/publication/findByAuthor";
pub const QUOTATION: &str = "/quotation";
pub const QUOTATION_FIND: &str = "/quotation/find";
pub const QUOTATION_FIND_BY_AUTHOR: &str = "/quotation/findByAuthor";
pub const SIGNATORY: &str = "/signatory";

pub const PUBLICATION_ID: &str = "publicationId";
pub const DECLARATION_ID: &str = "declarationId";
pub const PERSON_ID: &str = "personId";
pub const LAST_NAME: &str = "lastName";
pub const CONTENT_TYPE: &str = "contentType";

/// Relation query pairs for the `findBy*` endpoints keyed by a person.
pub fn person_relation_pairs(
    person_id: i64,
    last_name: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut pairs = vec![(PERSON_ID, person_id.to_string())];
    if let Some(last_name) = last_name.filter(|name| !name.is_empty()) {
        pairs.push((LAST_NAME, last_name.to_string()));
    }
    pairs
}
