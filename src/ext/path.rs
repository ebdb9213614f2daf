use std::path::Path;

use crate::error::{Error, Result};

/// Extension trait for Path to provide convenient string conversion methods
pub trait PathExt {
    /// Converts a path to a string slice, returning an error if the path contains invalid Unicode characters.
    ///
    /// # Examples
    /// ```
    /// use servgen::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let path = Path::new("site.conf");
    /// assert_eq!(path.to_str_checked().unwrap(), "site.conf");
    /// ```
    fn to_str_checked(&self) -> Result<&str>;

    /// Converts a path to a String for diagnostics. Never fails; invalid
    /// Unicode is replaced.
    fn display_string(&self) -> String;

    /// Lowercased extension, if the path has a valid Unicode one.
    fn extension_lowercase(&self) -> Option<String>;
}

impl PathExt for Path {
    fn to_str_checked(&self) -> Result<&str> {
        self.to_str().ok_or_else(|| {
            Error::Other(anyhow::anyhow!(
                "Path '{}' contains invalid Unicode characters",
                self.display()
            ))
        })
    }

    fn display_string(&self) -> String {
        self.display().to_string()
    }

    fn extension_lowercase(&self) -> Option<String> {
        self.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase)
    }
}
