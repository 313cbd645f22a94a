//! A core module for interacting with the Derpibooru API.
//!
//! Usually, you prefer to use the [`BatchGetter`] struct to get the [`data`]
//! from the Derpibooru API.

use std::path::PathBuf;
use std::sync::LazyLock;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::config::SearchQuery;

/// The query text sent when the user supplied an empty one.
/// Derpibooru treats `*` as "match every image".
pub const WILDCARD_QUERY: &str = "*";

/// The URLs for the Derpibooru API.
pub mod url {
    use super::*;

    /// The base URL of the Derpibooru.
    pub const BASE_URL: &str = "https://derpibooru.org";

    /// The search URL of the Derpibooru API, which can be used to query
    /// derpibooru's database.
    pub static SEARCH_URL: LazyLock<Url> = LazyLock::new(|| {
        // see: https://derpibooru.org/pages/api
        Url::parse(BASE_URL)
            .unwrap()
            .join("/api/v1/json/search/images")
            .unwrap()
    });
}

/// This struct is used to auto initialize the `filename` field for the
/// `Image` struct.
#[derive(Deserialize)]
pub(crate) struct ImageInner {
    pub(crate) id: u64,
    pub(crate) sha512_hash: String,
    pub(crate) representations: Representations,
}

/// The nested `representations` field of the JSON response. Only the
/// full-resolution URL is of interest here.
#[derive(Deserialize)]
pub(crate) struct Representations {
    pub(crate) full: String,
}

impl From<ImageInner> for data::field::Image {
    /// `filename` equals to the last path segment of `representations.full`.
    /// e.g. `full = "https://derpicdn.net/img/view/2020/1/1/2252626.jpg"`,
    /// then `filename = "2252626.jpg"`.
    fn from(value: ImageInner) -> Self {
        let filename = PathBuf::from(crate::tool::url_file_name(&value.representations.full));

        Self {
            id: value.id,
            sha512_hash: value.sha512_hash,
            full_url: value.representations.full,
            filename,
        }
    }
}

/// The data structure for the JSON response from the Derpibooru API.
pub mod data {
    use super::*;

    /// The fields of the [`Json`] response.
    pub mod field {
        use super::*;

        /// The image field of the JSON response.
        #[non_exhaustive]
        #[derive(Debug, Deserialize, Serialize)]
        #[serde(from = "ImageInner")]
        pub struct Image {
            /// The ID of the image.
            pub id: u64,
            /// The SHA-512 hash of the image, as lowercase hex.
            pub sha512_hash: String,
            /// The URL of the full-resolution image, which can be used to
            /// download the image.
            pub full_url: String,
            /// The filename of the image, which is the basename of `full_url`.
            /// We will use this field to save the image.
            pub(crate) filename: PathBuf,
        }
    }

    /// The JSON structure response from the Derpibooru API.
    #[non_exhaustive]
    #[derive(Debug, Deserialize, Serialize)]
    pub struct Json {
        /// The images matching the query on the requested page.
        /// Empty if the query matched nothing, or the page is out of range.
        pub images: Vec<field::Image>,
        /// The total number of images matching the query.
        pub total: u64,
    }
}

/// A Consuming-Builders style function to get the data from the Derpibooru API.
///
/// # Example
///
/// ```no_run
/// use reqwest::Client;
/// use derpi_dl::api::Getter;
/// use derpi_dl::config::SearchQuery;
///
/// #[tokio::main]
/// async fn main() -> reqwest::Result<()> {
///     let client = Client::new();
///     let search = SearchQuery::resolve(None, "cat".to_string(), 10);
///
///     let data = Getter::build(&client, &search, 50, 1)
///         .expect("illegal arguments")
///         .run()
///         .await?;
///
///     Ok(())
/// }
/// ```
pub struct Getter<'a> {
    client: &'a Client,
    search: &'a SearchQuery,
    base_url: Url,
    per_page: u64,
    page: u64,
}

impl Getter<'_> {
    /// See <https://derpibooru.org/pages/api> for arguments.
    ///
    /// # Errors
    ///
    /// If `per_page` is not in the range `1..=50`, or `page` is `0`,
    /// this function will return an error.
    pub fn build<'a>(
        client: &'a Client,
        search: &'a SearchQuery,
        per_page: u64,
        page: u64,
    ) -> anyhow::Result<Getter<'a>> {
        // This is derpibooru's limit.
        // see: https://derpibooru.org/pages/api
        if !matches!(per_page, 1..=50) {
            return Err(anyhow::anyhow!("Per-page can only be between 1 and 50"));
        }
        // pages are 1-based
        if page == 0 {
            return Err(anyhow::anyhow!("Page cannot be 0"));
        }
        Ok(Getter {
            client,
            search,
            base_url: url::SEARCH_URL.clone(),
            per_page,
            page,
        })
    }

    /// Override the search endpoint. Mainly useful for tests against a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Send the request to the Derpibooru API and get the JSON response.
    ///
    /// An empty query text is sent as [`WILDCARD_QUERY`].
    ///
    /// # Errors
    ///
    /// If the request fails, or the response status is not a success,
    /// this function will return an error.
    pub async fn run(self) -> reqwest::Result<data::Json> {
        let query = if self.search.query.is_empty() {
            WILDCARD_QUERY
        } else {
            self.search.query.as_str()
        };

        let mut target_url = self.base_url.clone();
        target_url.query_pairs_mut().extend_pairs([
            ("q", query),
            ("per_page", &self.per_page.to_string()),
            ("page", &self.page.to_string()),
        ]);
        if let Some(key) = &self.search.key {
            target_url.query_pairs_mut().append_pair("key", key);
        }

        self.client
            .get(target_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// This helper wraps the [`Getter`] struct and automatically polls the API
/// until the number of images is reached.
///
/// # Example
///
/// See [`Getter#example`] for example usage.
pub struct BatchGetter<'a> {
    client: &'a Client,
    search: &'a SearchQuery,
    base_url: Url,
}

impl BatchGetter<'_> {
    /// Create a batch getter for `search`.
    ///
    /// A `search.limit` of `0` is allowed and yields an empty batch
    /// without touching the network.
    pub fn new<'a>(client: &'a Client, search: &'a SearchQuery) -> BatchGetter<'a> {
        BatchGetter {
            client,
            search,
            base_url: url::SEARCH_URL.clone(),
        }
    }

    /// Override the search endpoint. Mainly useful for tests against a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Poll the API page by page until `search.limit` images are collected,
    /// or the results are exhausted.
    ///
    /// If none of the images are found, this function will return a zero
    /// capacity vector.
    ///
    /// # Errors
    ///
    /// If a request fails, this function will return an error.
    pub async fn run(self) -> reqwest::Result<Vec<data::field::Image>> {
        const PER_PAGE: u64 = 50;

        let Self {
            client,
            search,
            base_url,
        } = self;

        if search.limit == 0 {
            return Ok(Vec::with_capacity(0));
        }

        let mut current_page = 1;
        let data = Getter::build(client, search, PER_PAGE, current_page)
            .unwrap()
            .with_base_url(base_url.clone())
            .run()
            .await?;

        let mut image_vec = data.images;
        if image_vec.is_empty() {
            return Ok(image_vec);
        }
        let total_num: usize = std::cmp::min(search.limit, data.total)
            .try_into()
            .expect("total number is too large to convert to `usize`");

        while image_vec.len() < total_num {
            current_page += 1;
            let current_image_vec = Getter::build(client, search, PER_PAGE, current_page)
                .unwrap()
                .with_base_url(base_url.clone())
                .run()
                .await?
                .images;
            if current_image_vec.is_empty() {
                // the service claimed more images than it will serve
                break;
            }
            image_vec.extend(current_image_vec);
        }
        image_vec.truncate(total_num);

        Ok(image_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use httpmock::prelude::*;
    use serde_json::json;

    fn search(query: &str, limit: u64) -> SearchQuery {
        SearchQuery {
            key: None,
            query: query.to_string(),
            limit,
        }
    }

    fn image_json(id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "sha512_hash": "0".repeat(128),
            "representations": {
                "full": format!("https://derpicdn.net/img/view/2020/1/1/{id}.png"),
            },
        })
    }

    #[test]
    fn test_illegal_args() {
        let client = Client::new();
        let search = search("cat", 10);

        assert!(Getter::build(&client, &search, 0, 1).is_err());
        assert!(Getter::build(&client, &search, 51, 1).is_err());
        assert!(Getter::build(&client, &search, 50, 0).is_err());
    }

    #[test]
    fn test_parse_api_data() {
        let body = json!({
            "images": [image_json(2252626)],
            "total": 1,
        });

        let data: data::Json = serde_json::from_value(body).unwrap();
        assert_eq!(data.total, 1);
        assert_eq!(data.images[0].id, 2252626);
        assert_eq!(
            data.images[0].full_url,
            "https://derpicdn.net/img/view/2020/1/1/2252626.png"
        );
        assert_eq!(
            data.images[0].filename,
            PathBuf::from("2252626.png")
        );
    }

    #[tokio::test]
    async fn test_get_api_data() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("q", "cat")
                    .query_param("per_page", "50")
                    .query_param("page", "1");
                then.status(200)
                    .json_body(json!({ "images": [image_json(1)], "total": 1 }));
            })
            .await;

        let client = Client::new();
        let search = search("cat", 10);
        let base_url = Url::parse(&server.url("/search")).unwrap();

        let data = Getter::build(&client, &search, 50, 1)
            .unwrap()
            .with_base_url(base_url)
            .run()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(data.images.len(), 1);
        assert_eq!(data.images[0].id, 1);
    }

    #[tokio::test]
    async fn test_empty_query_becomes_wildcard() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search").query_param("q", "*");
                then.status(200)
                    .json_body(json!({ "images": [], "total": 0 }));
            })
            .await;

        let client = Client::new();
        let search = search("", 10);
        let base_url = Url::parse(&server.url("/search")).unwrap();

        let image_vec = BatchGetter::new(&client, &search)
            .with_base_url(base_url)
            .run()
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(image_vec.is_empty());
    }

    #[tokio::test]
    async fn test_key_is_sent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search").query_param("key", "sekrit");
                then.status(200)
                    .json_body(json!({ "images": [], "total": 0 }));
            })
            .await;

        let client = Client::new();
        let search = SearchQuery {
            key: Some("sekrit".to_string()),
            query: "cat".to_string(),
            limit: 10,
        };
        let base_url = Url::parse(&server.url("/search")).unwrap();

        let image_vec = BatchGetter::new(&client, &search)
            .with_base_url(base_url)
            .run()
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(image_vec.is_empty());
    }

    #[tokio::test]
    async fn test_batch_get_api_data() {
        let server = MockServer::start_async().await;

        let first_page: Vec<_> = (0..50).map(image_json).collect();
        let second_page: Vec<_> = (50..60).map(image_json).collect();

        let first_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search").query_param("page", "1");
                then.status(200)
                    .json_body(json!({ "images": first_page, "total": 60 }));
            })
            .await;
        let second_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search").query_param("page", "2");
                then.status(200)
                    .json_body(json!({ "images": second_page, "total": 60 }));
            })
            .await;

        let client = Client::new();
        let search = search("cat", 55);
        let base_url = Url::parse(&server.url("/search")).unwrap();

        let image_vec = BatchGetter::new(&client, &search)
            .with_base_url(base_url)
            .run()
            .await
            .unwrap();

        first_mock.assert_async().await;
        second_mock.assert_async().await;
        // truncated to the requested limit, remote order preserved
        assert_eq!(image_vec.len(), 55);
        assert_eq!(image_vec[0].id, 0);
        assert_eq!(image_vec[54].id, 54);
    }

    #[tokio::test]
    async fn test_zero_limit_skips_network() {
        let client = Client::new();
        let search = search("cat", 0);

        let image_vec = BatchGetter::new(&client, &search).run().await.unwrap();
        assert!(image_vec.is_empty());
    }
}
