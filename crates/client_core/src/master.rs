//! The master/detail context handed top-down to every list controller.

use shared::domain::{Declaration, Master, Person, Publication, Quotation};

use crate::{list::Relation, session::AuthContext};

/// Current master setting plus the record selected in each driving list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterContext {
    pub master: Master,
    pub person: Option<Person>,
    pub publication: Option<Publication>,
    pub declaration: Option<Declaration>,
    pub quotation: Option<Quotation>,
}

impl MasterContext {
    pub fn new(master: Master) -> Self {
        Self {
            master,
            ..Self::default()
        }
    }

    pub fn with_person(mut self, person: Option<Person>) -> Self {
        self.person = person;
        self
    }

    pub fn with_publication(mut self, publication: Option<Publication>) -> Self {
        self.publication = publication;
        self
    }

    pub fn with_declaration(mut self, declaration: Option<Declaration>) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn with_quotation(mut self, quotation: Option<Quotation>) -> Self {
        self.quotation = quotation;
        self
    }

    /// Id of the record selected in the list that `master` names.
    pub fn selected_id(&self, master: Master) -> Option<i64> {
        match master {
            Master::None => None,
            Master::Persons => self.person.as_ref().map(|p| p.id.0),
            Master::Publications => self.publication.as_ref().map(|p| p.id.0),
            Master::Declarations => self.declaration.as_ref().map(|d| d.id.0),
            Master::Quotations => self.quotation.as_ref().map(|q| q.id.0),
        }
    }

    /// The selected person's last name, withheld from unauthenticated callers.
    pub fn person_last_name(&self, auth: &dyn AuthContext) -> Option<String> {
        self.person
            .as_ref()
            .filter(|_| auth.is_authenticated())
            .map(|person| person.last_name.clone())
    }

    pub fn person_relation(&self, auth: &dyn AuthContext) -> Relation {
        Relation {
            via: Master::Persons,
            related_id: self.selected_id(Master::Persons),
            related_key: self.person_last_name(auth),
        }
    }

    pub fn relation(&self, via: Master) -> Relation {
        Relation {
            via,
            related_id: self.selected_id(via),
            related_key: None,
        }
    }
}
