//! Some useful tools for the project.
//!
//! Usually, you don't need to use this module directly.
//! [`crate::api`] will automatically use these tools.

/// Extract the last path segment of a URL, with any query string or
/// fragment stripped.
///
/// This is what names the downloaded file on disk, so it must stay stable
/// for a given URL.
pub fn url_file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_file_name() {
        assert_eq!(
            url_file_name("https://derpicdn.net/img/view/2020/1/1/2252626.jpg"),
            "2252626.jpg"
        );
        assert_eq!(url_file_name("https://example.com/a/b.png?x=1"), "b.png");
        assert_eq!(url_file_name("https://example.com/a/b.png#frag"), "b.png");
        assert_eq!(url_file_name("b.png"), "b.png");
    }
}
