//! Equality filters over record attributes (logical AND across set fields).

use sqlx::{QueryBuilder, Sqlite};

use super::{DbAuthor, DbQuote};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub surname: Option<String>,
}

impl AuthorFilter {
    pub fn matches(&self, author: &DbAuthor) -> bool {
        self.id.is_none_or(|id| author.id == id)
            && self.name.as_ref().is_none_or(|name| &author.name == name)
            && self
                .surname
                .as_ref()
                .is_none_or(|surname| author.surname.as_ref() == Some(surname))
    }

    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut clause = WhereClause::default();
        if let Some(id) = self.id {
            clause.next(qb).push("id = ").push_bind(id);
        }
        if let Some(name) = &self.name {
            clause.next(qb).push("name = ").push_bind(name.clone());
        }
        if let Some(surname) = &self.surname {
            clause.next(qb).push("surname = ").push_bind(surname.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    pub id: Option<i64>,
    pub author_id: Option<i64>,
    pub text: Option<String>,
    pub rating: Option<i64>,
}

impl QuoteFilter {
    pub fn matches(&self, quote: &DbQuote) -> bool {
        self.id.is_none_or(|id| quote.id == id)
            && self.author_id.is_none_or(|id| quote.author_id == id)
            && self.text.as_ref().is_none_or(|text| &quote.text == text)
            && self.rating.is_none_or(|rating| quote.rating == rating)
    }

    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut clause = WhereClause::default();
        if let Some(id) = self.id {
            clause.next(qb).push("id = ").push_bind(id);
        }
        if let Some(author_id) = self.author_id {
            clause.next(qb).push("author_id = ").push_bind(author_id);
        }
        if let Some(text) = &self.text {
            clause.next(qb).push("text = ").push_bind(text.clone());
        }
        if let Some(rating) = self.rating {
            clause.next(qb).push("rating = ").push_bind(rating);
        }
    }
}

#[derive(Default)]
struct WhereClause {
    started: bool,
}

impl WhereClause {
    fn next<'q, 'args>(
        &mut self,
        qb: &'q mut QueryBuilder<'args, Sqlite>,
    ) -> &'q mut QueryBuilder<'args, Sqlite> {
        qb.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
        qb
    }
}
