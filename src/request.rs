//! Request input as seen by the pipeline: parameters and uploaded parts.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Ordered values submitted under one parameter name.
///
/// `None` marks a value that is absent (for example after normalization
/// blanked it out).
pub type ParamValues = Vec<Option<String>>;

/// Mapping from parameter name to its ordered values.
///
/// # Examples
///
/// ```
/// use action_pipeline::ParamMap;
///
/// let mut params = ParamMap::new();
/// params.add("tag", "rust");
/// params.add("tag", "web");
///
/// assert_eq!(params.first("tag"), Some("rust"));
/// assert_eq!(params.get("tag").map(|v| v.len()), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    values: BTreeMap<String, ParamValues>,
}

impl ParamMap {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(name.into())
            .or_default()
            .push(Some(value.into()));
    }

    /// Replaces all values under `name`.
    pub fn insert(&mut self, name: impl Into<String>, values: ParamValues) {
        self.values.insert(name.into(), values);
    }

    /// Returns all values under `name`.
    pub fn get(&self, name: &str) -> Option<&[Option<String>]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Returns the first value under `name`, if it is present.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .and_then(|v| v.as_deref())
    }

    /// Returns `true` if `name` was submitted (even with absent values).
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates parameter names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates `(name, values)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValues> {
        self.values.iter()
    }

    /// Returns the number of parameter names.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameters were submitted.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, ParamValues)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (String, ParamValues)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ParamMap {
    type Item = (&'a String, &'a ParamValues);
    type IntoIter = btree_map::Iter<'a, String, ParamValues>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// An uploaded multipart body part, already saved by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    /// Declared content type
    pub content_type: String,
    /// Client-side file name
    pub file_name: String,
    /// Where the transport saved the part's bytes
    pub location: PathBuf,
}

impl UploadedPart {
    /// Creates a part descriptor.
    pub fn new(
        content_type: impl Into<String>,
        file_name: impl Into<String>,
        location: impl AsRef<Path>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: file_name.into(),
            location: location.as_ref().to_path_buf(),
        }
    }
}

/// Mapping from multipart field name to its ordered uploaded parts.
pub type FileParts = BTreeMap<String, Vec<UploadedPart>>;

/// Framework-neutral request input consumed by the pipeline.
///
/// Transport adapters build a `Request` from their own request type; the
/// pipeline never touches the transport directly.
///
/// # Examples
///
/// ```
/// use action_pipeline::{Request, UploadedPart};
///
/// let request = Request::new()
///     .param("name", " Alice ")
///     .file("avatar", UploadedPart::new("image/png", "me.png", "/tmp/up-1"));
///
/// assert_eq!(request.params().first("name"), Some(" Alice "));
/// assert_eq!(request.files()["avatar"].len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    params: ParamMap,
    files: FileParts,
}

impl Request {
    /// Creates a request with no input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request from an existing parameter map.
    pub fn from_params(params: ParamMap) -> Self {
        Self {
            params,
            files: FileParts::new(),
        }
    }

    /// Adds a parameter value, builder style.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.add(name, value);
        self
    }

    /// Adds an uploaded part, builder style.
    pub fn file(mut self, name: impl Into<String>, part: UploadedPart) -> Self {
        self.files.entry(name.into()).or_default().push(part);
        self
    }

    /// Returns the raw parameters.
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    /// Returns the uploaded parts.
    pub fn files(&self) -> &FileParts {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_in_order() {
        let mut params = ParamMap::new();
        params.add("k", "1");
        params.add("k", "2");

        assert_eq!(
            params.get("k"),
            Some(&[Some("1".to_string()), Some("2".to_string())][..])
        );
    }

    #[test]
    fn first_is_none_when_leading_value_is_absent() {
        let mut params = ParamMap::new();
        params.insert("k", vec![None, Some("x".to_string())]);

        assert_eq!(params.first("k"), None);
        assert!(params.contains("k"));
    }

    #[test]
    fn request_builder_collects_parts_per_field() {
        let request = Request::new()
            .file("docs", UploadedPart::new("text/plain", "a.txt", "/tmp/a"))
            .file("docs", UploadedPart::new("text/plain", "b.txt", "/tmp/b"));

        let docs = &request.files()["docs"];
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].file_name, "b.txt");
    }
}
