//! Full-text index over the loaded tutors.
//!
//! The index is an in-RAM tantivy index, rebuilt from scratch whenever the tutor collection
//! changes, there is no incremental update. Every query term is matched as a prefix of an
//! indexed term with up to 20% of its characters edited (at most two edits). A tutor is a hit
//! only if every query term matches one of its fields; exact term matches are scored with
//! BM25 on top of the loose match, and every field is scaled by its boost.
use std::{borrow::Cow, fmt};

use log::{debug, error};
use tantivy::{
    collector::TopDocs,
    query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery},
    schema::{Field, IndexRecordOption, Schema, Value, STORED, TEXT},
    Index, IndexReader, IndexWriter, ReloadPolicy, Score, TantivyDocument, Term,
};
use thiserror::Error;

use super::models::{FallbackPolicy, TutorRecord};

pub const MAX_QUERY_TERMS: usize = 32;
pub const MAX_TERM_CHARS: usize = 64;

const FUZZY_RATIO: f64 = 0.2;
/// Largest edit distance tantivy builds an automaton for.
pub const MAX_FUZZY_DISTANCE: u8 = 2;
const LOOSE_MATCH_BOOST: Score = 0.4;

const WRITER_MEMORY_BYTES: usize = 15_000_000;
const POSITION_FIELD: &str = "position";
const FIELD_COUNT: usize = 5;

/// Indexed fields of a tutor, in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Language,
    Specialties,
    Name,
    Biography,
    Country,
}

impl SearchField {
    pub const ALL: [SearchField; FIELD_COUNT] = [
        SearchField::Language,
        SearchField::Specialties,
        SearchField::Name,
        SearchField::Biography,
        SearchField::Country,
    ];

    pub fn boost(self) -> Score {
        match self {
            SearchField::Language => 3.0,
            SearchField::Specialties => 2.0,
            SearchField::Name => 1.5,
            SearchField::Biography => 1.0,
            SearchField::Country => 0.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SearchField::Language => "language",
            SearchField::Specialties => "specialties",
            SearchField::Name => "name",
            SearchField::Biography => "bio",
            SearchField::Country => "country",
        }
    }

    fn text(self, tutor: &TutorRecord) -> Cow<'_, str> {
        match self {
            SearchField::Language => Cow::Borrowed(tutor.language.as_str()),
            SearchField::Specialties => Cow::Owned(tutor.specialties.join(" ")),
            SearchField::Name => Cow::Borrowed(tutor.name.as_str()),
            SearchField::Biography => Cow::Borrowed(tutor.bio.as_str()),
            SearchField::Country => Cow::Borrowed(tutor.country.as_str()),
        }
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Query has {count} terms, at most {limit} are supported")]
    TooManyTerms { count: usize, limit: usize },

    #[error("Query term {term:?} is longer than {limit} characters")]
    TermTooLong { term: String, limit: usize },

    #[error("Search index is not available")]
    Unavailable,

    #[error("Search index failed: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTutor {
    pub id: u32,
    pub score: f64,
}

/// Handles of one built tantivy index.
struct Engine {
    reader: IndexReader,
    position: Field,
    fields: [Field; FIELD_COUNT],
}

impl Engine {
    fn build(tutors: &[TutorRecord]) -> Result<Self, SearchError> {
        let mut builder = Schema::builder();
        let position = builder.add_u64_field(POSITION_FIELD, STORED);
        let fields = SearchField::ALL.map(|kind| builder.add_text_field(kind.name(), TEXT));
        let index = Index::create_in_ram(builder.build());

        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
        for (slot, tutor) in tutors.iter().enumerate() {
            let mut doc = TantivyDocument::default();
            doc.add_u64(position, slot as u64);
            for (kind, field) in SearchField::ALL.iter().zip(fields) {
                doc.add_text(field, kind.text(tutor));
            }
            writer.add_document(doc)?;
        }
        writer.commit()?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(Self {
            reader,
            position,
            fields,
        })
    }

    /// All fields, each matching `term` loosely and, when it matches exactly, with its BM25 score.
    fn term_query(&self, term: &str) -> Box<dyn Query> {
        let distance = fuzzy_distance(term);
        let per_field = SearchField::ALL
            .iter()
            .zip(self.fields)
            .map(|(kind, field)| {
                let term = Term::from_field_text(field, term);
                let exact: Box<dyn Query> =
                    Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs));
                let loose: Box<dyn Query> = Box::new(BoostQuery::new(
                    Box::new(FuzzyTermQuery::new_prefix(term, distance, true)),
                    LOOSE_MATCH_BOOST,
                ));
                let field_query =
                    BooleanQuery::new(vec![(Occur::Should, exact), (Occur::Should, loose)]);
                let boosted: Box<dyn Query> =
                    Box::new(BoostQuery::new(Box::new(field_query), kind.boost()));
                (Occur::Should, boosted)
            })
            .collect::<Vec<_>>();
        Box::new(BooleanQuery::new(per_field))
    }

    /// Matching collection positions with their scores, best first.
    fn search(&self, terms: &[String], limit: usize) -> Result<Vec<(usize, Score)>, SearchError> {
        let query = BooleanQuery::new(
            terms
                .iter()
                .map(|term| (Occur::Must, self.term_query(term)))
                .collect(),
        );
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            match doc.get_first(self.position).and_then(|v| v.as_u64()) {
                Some(slot) => hits.push((slot as usize, score)),
                None => return Err(SearchError::Unavailable),
            }
        }
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(hits)
    }
}

/// Edits tolerated for a query term: 20% of its characters, rounded, and at most two.
pub fn fuzzy_distance(term: &str) -> u8 {
    let distance = (term.chars().count() as f64 * FUZZY_RATIO).round();
    if distance >= MAX_FUZZY_DISTANCE as f64 {
        MAX_FUZZY_DISTANCE
    } else {
        distance as u8
    }
}

/// Lower-cases the text and splits it on everything that is not a letter or a digit,
/// the same way tantivy's default tokenizer reads the indexed fields.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[derive(Default)]
pub struct SearchIndex {
    ids: Vec<u32>,
    engine: Option<Engine>,
    fallback: FallbackPolicy,
}

impl fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("ids", &self.ids)
            .field("built", &self.engine.is_some())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl SearchIndex {
    /// Indexes `tutors`. A collection that cannot be indexed is logged and every later
    /// query goes to the fallback.
    pub fn build(tutors: &[TutorRecord]) -> Self {
        let engine = if tutors.is_empty() {
            None
        } else {
            match Engine::build(tutors) {
                Ok(engine) => Some(engine),
                Err(e) => {
                    error!("Could not index {} tutors: {}", tutors.len(), e);
                    None
                }
            }
        };
        debug!("Indexed {} tutors", tutors.len());

        Self {
            ids: tutors.iter().map(|t| t.id).collect(),
            engine,
            fallback: FallbackPolicy::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids of the indexed tutors in collection order.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Ranked ids of the tutors matching `query`.
    /// A blank query returns every id in collection order. If the query fails,
    /// the error is logged and the configured fallback decides the result.
    pub fn search(&self, query: &str) -> Vec<u32> {
        if query.trim().is_empty() {
            return self.ids.clone();
        }
        match self.try_search(query) {
            Ok(hits) => hits.into_iter().map(|hit| hit.id).collect(),
            Err(e) => {
                error!("Search for {:?} failed: {}", query, e);
                match self.fallback {
                    FallbackPolicy::FailOpen => self.ids.clone(),
                    FallbackPolicy::FailClosed => Vec::new(),
                }
            }
        }
    }

    pub fn try_search(&self, query: &str) -> Result<Vec<ScoredTutor>, SearchError> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return Ok(self
                .ids
                .iter()
                .map(|&id| ScoredTutor { id, score: 0.0 })
                .collect());
        }
        if query_terms.len() > MAX_QUERY_TERMS {
            return Err(SearchError::TooManyTerms {
                count: query_terms.len(),
                limit: MAX_QUERY_TERMS,
            });
        }
        if let Some(term) = query_terms
            .iter()
            .find(|term| term.chars().count() > MAX_TERM_CHARS)
        {
            return Err(SearchError::TermTooLong {
                term: term.clone(),
                limit: MAX_TERM_CHARS,
            });
        }
        if self.ids.is_empty() {
            return Ok(Vec::new());
        }

        let engine = self.engine.as_ref().ok_or(SearchError::Unavailable)?;
        let hits = engine.search(&query_terms, self.ids.len())?;
        hits.into_iter()
            .map(|(slot, score)| match self.ids.get(slot) {
                Some(&id) => Ok(ScoredTutor {
                    id,
                    score: f64::from(score),
                }),
                None => Err(SearchError::Unavailable),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/search_index.rs"]
mod tests;
