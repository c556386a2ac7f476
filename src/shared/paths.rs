//! Helpers for the path-like keys shared by the catalog and provider backends.
//!
//! Object stores hold keys without a leading slash; every key exposed over
//! HTTP carries one.

/// Strips leading slashes so the key can be used against an object store
pub fn object_key(key: &str) -> &str {
    key.trim_start_matches('/')
}

/// Key as exposed to clients (`/photos/a.jpg`)
pub fn public_key(object_key: &str) -> String {
    format!("/{}", object_key.trim_start_matches('/'))
}

/// Joins path segments with single slashes, dropping empty segments
pub fn join(base: &str, name: &str) -> String {
    base.split('/')
        .chain(name.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Last segment of a key; directories keep their own name
pub fn base_name(key: &str) -> &str {
    key.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(key)
}

/// Splits a client-supplied file name such as `photos/2024/a.jpg` into
/// its relative folder and bare file name.
pub fn split_relative(source_path: &str) -> (String, String) {
    let trimmed = source_path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((folder, name)) => (folder.to_string(), name.to_string()),
        None => (String::new(), trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_never_doubles_slashes() {
        assert_eq!(join("", "a.txt"), "a.txt");
        assert_eq!(join("/", "a.txt"), "a.txt");
        assert_eq!(join("/docs/", "a.txt"), "docs/a.txt");
        assert_eq!(join("docs//2024", "/a.txt"), "docs/2024/a.txt");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/photos/2024/a.jpg"), "a.jpg");
        assert_eq!(base_name("a.jpg"), "a.jpg");
        assert_eq!(base_name("/photos/"), "photos");
    }

    #[test]
    fn test_object_and_public_keys() {
        assert_eq!(object_key("/docs/a.txt"), "docs/a.txt");
        assert_eq!(object_key("docs/a.txt"), "docs/a.txt");
        assert_eq!(public_key("docs/a.txt"), "/docs/a.txt");
        assert_eq!(public_key("/docs/a.txt"), "/docs/a.txt");
    }

    #[test]
    fn test_split_relative() {
        assert_eq!(
            split_relative("photos/2024/a.jpg"),
            ("photos/2024".to_string(), "a.jpg".to_string())
        );
        assert_eq!(split_relative("a.jpg"), (String::new(), "a.jpg".to_string()));
    }
}
