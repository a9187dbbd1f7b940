// source.rs — Tag enumeration contract.
//
// The enumeration service is an external collaborator. The core only needs
// a paginated, finite sequence of `(resource_id, tags)` scoped by a tag
// filter. `pages()` walks that sequence lazily, one page per `next()`, and
// stops after the first error: a run is not resumable, so there is nothing
// useful to do with later pages once one has failed. A page whose next
// token repeats the one just requested ends the walk with InvalidToken.

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::resource::TaggedResource;
use crate::tags::PROJECT_TAG;

/// Tag filter applied to enumeration and cost queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagScope {
    pub key: String,
    pub value: String,
}

impl TagScope {
    /// Scope to resources tagged `Project = <project>`.
    pub fn project(project: impl Into<String>) -> Self {
        Self {
            key: PROJECT_TAG.to_string(),
            value: project.into(),
        }
    }
}

/// One page of enumerated resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPage {
    pub resources: Vec<TaggedResource>,
    /// Token for the next page, `None` on the last page.
    pub next_token: Option<String>,
}

/// Paginated enumeration of tagged resources.
///
/// Implementations must bound each call with a timeout and report it as
/// [`SourceError::Timeout`] rather than blocking indefinitely.
pub trait TagSource {
    /// Fetch one page. `page_token` is `None` for the first page.
    fn fetch_page(&self, scope: &TagScope, page_token: Option<&str>) -> Result<TagPage, SourceError>;

    /// Source display name (for logs).
    fn name(&self) -> &str;
}

/// Lazy iterator over the pages of a [`TagSource`].
pub struct Pages<'a, S: TagSource + ?Sized> {
    source: &'a S,
    scope: &'a TagScope,
    next_token: Option<String>,
    finished: bool,
}

/// Walk every page of `source` for `scope`, fetching on demand.
pub fn pages<'a, S: TagSource + ?Sized>(source: &'a S, scope: &'a TagScope) -> Pages<'a, S> {
    Pages {
        source,
        scope,
        next_token: None,
        finished: false,
    }
}

impl<S: TagSource + ?Sized> Iterator for Pages<'_, S> {
    type Item = Result<TagPage, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self
            .source
            .fetch_page(self.scope, self.next_token.as_deref());
        match &result {
            Ok(page) if page.next_token.is_some() && page.next_token == self.next_token => {
                // A source that hands back the token it was just given would
                // never finish.
                self.finished = true;
                let token = page.next_token.clone().unwrap_or_default();
                return Some(Err(SourceError::InvalidToken(token)));
            }
            Ok(page) => {
                self.next_token = page.next_token.clone();
                self.finished = self.next_token.is_none();
            }
            Err(_) => self.finished = true,
        }
        Some(result)
    }
}

/// In-memory tag source serving pre-scoped pages.
///
/// Page tokens are page indices. Used for snapshot replay and tests; can be
/// told to fail on a given page to exercise enumeration failure.
#[derive(Debug, Clone, Default)]
pub struct StaticTagSource {
    pages: Vec<Vec<TaggedResource>>,
    failure: Option<(usize, SourceError)>,
}

impl StaticTagSource {
    pub fn new(pages: Vec<Vec<TaggedResource>>) -> Self {
        Self {
            pages,
            failure: None,
        }
    }

    /// Fail when page `index` is requested.
    pub fn failing_at(mut self, index: usize, error: SourceError) -> Self {
        self.failure = Some((index, error));
        self
    }
}

impl TagSource for StaticTagSource {
    fn fetch_page(&self, _scope: &TagScope, page_token: Option<&str>) -> Result<TagPage, SourceError> {
        let index = match page_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| SourceError::InvalidToken(token.to_string()))?,
        };

        if let Some((fail_index, error)) = &self.failure {
            if *fail_index == index {
                return Err(error.clone());
            }
        }

        let resources = self.pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(TagPage {
            resources,
            next_token,
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}
