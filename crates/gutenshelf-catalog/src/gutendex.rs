use std::time::Duration;

use async_trait::async_trait;
use gutenshelf_core::{
    AuthorDescriptor, CatalogBook, CatalogClient, CatalogConfig, CatalogPage, CatalogServiceError,
};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::{GutendexError, Result};
use crate::http::HttpClient;

// ─── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GutendexPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<GutendexBook>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GutendexBook {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<GutendexPerson>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub download_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GutendexPerson {
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
}

impl From<GutendexPerson> for AuthorDescriptor {
    fn from(person: GutendexPerson) -> Self {
        AuthorDescriptor {
            name: person.name,
            birth_year: person.birth_year,
            death_year: person.death_year,
        }
    }
}

impl From<GutendexBook> for CatalogBook {
    fn from(book: GutendexBook) -> Self {
        CatalogBook {
            external_id: book.id,
            title: book.title,
            authors: book.authors.into_iter().map(Into::into).collect(),
            languages: book.languages,
            download_count: book.download_count,
        }
    }
}

impl From<GutendexPage> for CatalogPage {
    fn from(page: GutendexPage) -> Self {
        CatalogPage {
            count: page.count,
            results: page.results.into_iter().map(Into::into).collect(),
        }
    }
}

// ─── Source ───────────────────────────────────────────────────────────────────

/// Project Gutenberg metadata via the Gutendex API.
pub struct GutendexSource {
    client: HttpClient,
    base_url: String,
}

impl GutendexSource {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = HttpClient::new(&config.user_agent, Duration::from_secs(config.timeout_secs))?;
        let source = Self {
            client,
            base_url: config.base_url.clone(),
        };
        source.books_url()?;
        Ok(source)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(&CatalogConfig {
            base_url: base_url.into(),
            ..CatalogConfig::default()
        })
    }

    /// `{base_url}/books/`
    fn books_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GutendexError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|_| GutendexError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?;
            segs.pop_if_empty().push("books").push("");
        }
        Ok(url)
    }

    /// Free-text search over titles and author names. Only the first page is fetched.
    pub async fn search_books(&self, query: &str) -> Result<GutendexPage> {
        let mut url = self.books_url()?;
        url.query_pairs_mut().append_pair("search", query);

        let page: GutendexPage = self.client.get_json(&url).await?;
        debug!(query, count = page.count, returned = page.results.len(), "gutendex search");
        Ok(page)
    }
}

#[async_trait]
impl CatalogClient for GutendexSource {
    async fn search(&self, query: &str) -> std::result::Result<CatalogPage, CatalogServiceError> {
        Ok(self.search_books(query).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const PRIDE_AND_PREJUDICE: &str = r#"{
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {
                "id": 1342,
                "title": "Pride and Prejudice",
                "authors": [{"name": "Austen, Jane", "birth_year": 1775, "death_year": 1817}],
                "summaries": ["A novel of manners."],
                "translators": [],
                "subjects": ["England -- Fiction"],
                "bookshelves": [],
                "languages": ["en"],
                "copyright": false,
                "media_type": "Text",
                "formats": {"text/html": "https://www.gutenberg.org/ebooks/1342.html.images"},
                "download_count": 75000
            },
            {
                "id": 42671,
                "title": "Pride and Prejudice",
                "authors": [{"name": "Austen, Jane", "birth_year": null, "death_year": null}],
                "languages": ["en"],
                "download_count": null
            }
        ]
    }"#;

    #[test]
    fn test_books_url() {
        let source = GutendexSource::with_base_url("https://gutendex.com").unwrap();
        assert_eq!(source.books_url().unwrap().as_str(), "https://gutendex.com/books/");

        let nested = GutendexSource::with_base_url("http://localhost:8000/api/").unwrap();
        assert_eq!(nested.books_url().unwrap().as_str(), "http://localhost:8000/api/books/");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            GutendexSource::with_base_url("not a url"),
            Err(GutendexError::InvalidUrl(_))
        ));
        assert!(matches!(
            GutendexSource::with_base_url("mailto:someone@example.com"),
            Err(GutendexError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_search_decodes_results() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/books/")
            .match_query(Matcher::UrlEncoded("search".to_string(), "pride and prejudice".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PRIDE_AND_PREJUDICE)
            .create_async()
            .await;

        let source = GutendexSource::with_base_url(server.url()).unwrap();
        let page = source.search("pride and prejudice").await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.count, 2);
        assert_eq!(page.results.len(), 2);

        let first = &page.results[0];
        assert_eq!(first.external_id, 1342);
        assert_eq!(first.title, "Pride and Prejudice");
        assert_eq!(first.languages, ["en"]);
        assert_eq!(first.download_count, Some(75000));
        assert_eq!(
            first.authors,
            [AuthorDescriptor::new("Austen, Jane").born(1775).died(1817)]
        );

        let second = &page.results[1];
        assert_eq!(second.download_count, None);
        assert_eq!(second.authors[0].birth_year, None);
    }

    #[tokio::test]
    async fn test_search_with_no_results() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/books/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"count": 0, "next": null, "previous": null, "results": []}"#)
            .create_async()
            .await;

        let source = GutendexSource::with_base_url(server.url()).unwrap();
        let page = source.search("zzzz").await.unwrap();

        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/books/")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let source = GutendexSource::with_base_url(server.url()).unwrap();
        let err = source.search_books("emma").await.unwrap_err();
        assert!(matches!(err, GutendexError::Api { status: 503, ref body, .. } if body == "maintenance"));

        let err = source.search("emma").await.unwrap_err();
        assert!(err.message().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/books/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"count": 1, "results": [{"title": "no id"}]}"#)
            .create_async()
            .await;

        let source = GutendexSource::with_base_url(server.url()).unwrap();
        let err = source.search_books("emma").await.unwrap_err();
        assert!(matches!(err, GutendexError::Parse(_)));
    }
}
