use tracing::debug;

use crate::catalog::AuthorDescriptor;
use crate::error::Result;
use crate::models::{Author, NewAuthor};
use crate::names::parse_author_name;
use crate::storage::repositories::AuthorRepository;

/// Maps catalog author descriptors onto stored authors, one per canonical name.
pub struct AuthorResolver<'r, R: AuthorRepository> {
    repo: &'r R,
}

impl<'r, R: AuthorRepository> AuthorResolver<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Find the author by exact name or create it.
    ///
    /// An existing author only gains life years it did not have before.
    pub fn resolve(&self, descriptor: &AuthorDescriptor) -> Result<Author> {
        if let Some(mut author) = self.repo.find_by_canonical_name(&descriptor.name)? {
            if author.backfill_life_years(descriptor.birth_year, descriptor.death_year) {
                debug!(id = author.id, name = %author.canonical_name, "backfilling life years");
                self.repo.update_life_years(&author)?;
            }
            return Ok(author);
        }

        let parsed = parse_author_name(&descriptor.name);
        self.repo.save(&NewAuthor {
            canonical_name: descriptor.name.clone(),
            last_name: parsed.last_name,
            first_name: parsed.first_name,
            birth_year: descriptor.birth_year,
            death_year: descriptor.death_year,
        })
    }
}
