//! Binding of request input onto typed forms.
//!
//! Concrete forms implement [`Bind`]; the pipeline only ever calls through
//! this trait and [`clone_of`], so a form's binding strategy (hand-written,
//! generated, serde-driven) stays its own business.

use std::path::PathBuf;

use crate::error::Error;
use crate::request::{FileParts, ParamMap, UploadedPart};

/// An uploaded file as seen by a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    content_type: String,
    file_name: String,
    location: PathBuf,
}

impl UploadedFile {
    /// Returns the declared content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the client-side file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns where the transport saved the file.
    pub fn location(&self) -> &PathBuf {
        &self.location
    }
}

impl From<&UploadedPart> for UploadedFile {
    fn from(part: &UploadedPart) -> Self {
        Self {
            content_type: part.content_type.clone(),
            file_name: part.file_name.clone(),
            location: part.location.clone(),
        }
    }
}

/// Value bound onto a file field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileValue {
    /// Exactly one part was uploaded under the field name
    Single(UploadedFile),
    /// Several parts were uploaded under the same field name
    Multiple(Vec<UploadedFile>),
}

impl FileValue {
    /// Wraps the parts uploaded under one field name.
    ///
    /// Returns `None` when no parts were uploaded.
    pub fn from_parts(parts: &[UploadedPart]) -> Option<Self> {
        match parts {
            [] => None,
            [single] => Some(FileValue::Single(single.into())),
            many => Some(FileValue::Multiple(many.iter().map(Into::into).collect())),
        }
    }

    /// Returns all files, whether one or many were uploaded.
    pub fn files(&self) -> &[UploadedFile] {
        match self {
            FileValue::Single(file) => std::slice::from_ref(file),
            FileValue::Multiple(files) => files,
        }
    }
}

/// Copies request input onto a typed object's matching properties.
///
/// Parameters and files whose names match no property are ignored.
///
/// # Examples
///
/// ```
/// use action_pipeline::{Bind, Error, ParamMap};
///
/// #[derive(Default)]
/// struct Login {
///     user: Option<String>,
/// }
///
/// impl Bind for Login {
///     fn bind(&mut self, params: &ParamMap) -> Result<(), Error> {
///         if params.contains("user") {
///             self.user = params.first("user").map(str::to_string);
///         }
///         Ok(())
///     }
/// }
///
/// let mut params = ParamMap::new();
/// params.add("user", "alice");
/// let mut login = Login::default();
/// login.bind(&params).unwrap();
/// assert_eq!(login.user.as_deref(), Some("alice"));
/// ```
pub trait Bind {
    /// Binds parameters onto matching properties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] if a value cannot be converted to its
    /// property's type.
    fn bind(&mut self, params: &ParamMap) -> Result<(), Error>;

    /// Binds an uploaded file value onto the property named `name`.
    ///
    /// The default implementation ignores files.
    fn bind_file(&mut self, _name: &str, _value: FileValue) -> Result<(), Error> {
        Ok(())
    }
}

/// Binds every uploaded field in `files` onto `target`.
///
/// A single part becomes [`FileValue::Single`]; several parts under one name
/// become [`FileValue::Multiple`].
pub fn bind_files<T: Bind + ?Sized>(target: &mut T, files: &FileParts) -> Result<(), Error> {
    for (name, parts) in files {
        if let Some(value) = FileValue::from_parts(parts) {
            target.bind_file(name, value)?;
        }
    }
    Ok(())
}

/// Creates an independent copy of `source`.
pub fn clone_of<T: Clone>(source: &T) -> T {
    source.clone()
}

/// Parses a bound value into `T`, mapping failures to [`Error::Bind`].
///
/// An absent value yields `Ok(None)`.
///
/// # Examples
///
/// ```
/// use action_pipeline::parse_param;
///
/// assert_eq!(parse_param::<u32>("age", Some("42")).unwrap(), Some(42));
/// assert_eq!(parse_param::<u32>("age", None).unwrap(), None);
/// assert!(parse_param::<u32>("age", Some("forty")).is_err());
/// ```
pub fn parse_param<T>(name: &str, value: Option<&str>) -> Result<Option<T>, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| v.parse::<T>().map_err(|e| Error::bind(name, e)))
        .transpose()
}
