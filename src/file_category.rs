/// File categorization by extension.
///
/// This module maps file extensions to a closed set of categories. Each
/// category owns a subfolder of the organized directory, named after the
/// category itself.
///
/// # Examples
///
/// ```
/// use foldersort::file_category::{Category, FileMapper};
///
/// let mapper = FileMapper::default();
/// assert_eq!(mapper.category_of(".jpg"), Category::Images);
/// assert_eq!(mapper.category_of("PDF"), Category::Documents);
/// assert_eq!(mapper.category_of(".unknownext"), Category::Other);
/// ```
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A broad file category.
///
/// The declaration order is the order in which categories are processed
/// and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Image files (JPG, PNG, SVG, etc.)
    Images,
    /// Document files (PDF, DOCX, TXT, etc.)
    Documents,
    /// Video files (MP4, MKV, AVI, etc.)
    Videos,
    /// Audio files (MP3, FLAC, WAV, etc.)
    Audio,
    /// Archive files (ZIP, TAR.GZ, 7Z, etc.)
    Archives,
    /// Source code and markup files
    Code,
    /// Installers and executables
    Executables,
    /// E-books
    Books,
    /// Everything else
    Other,
}

impl Category {
    /// Every category, in processing order.
    pub const ALL: [Category; 9] = [
        Category::Images,
        Category::Documents,
        Category::Videos,
        Category::Audio,
        Category::Archives,
        Category::Code,
        Category::Executables,
        Category::Books,
        Category::Other,
    ];

    /// Returns the subfolder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldersort::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Other.dir_name(), "Other");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Code => "Code",
            Category::Executables => "Executables",
            Category::Books => "Books",
            Category::Other => "Other",
        }
    }

    /// Built-in extensions for this category, without the leading dot.
    fn builtin_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => &[
                "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tiff", "psd", "raw",
                "heic",
            ],
            Category::Documents => &[
                "pdf", "doc", "docx", "txt", "xlsx", "xls", "pptx", "ppt", "odt", "rtf", "tex",
                "csv", "md",
            ],
            Category::Videos => &[
                "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
            ],
            Category::Audio => &[
                "mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "ape",
            ],
            Category::Archives => &[
                "zip", "rar", "tar", "gz", "7z", "bz2", "xz", "tar.gz", "tgz", "deb", "rpm",
            ],
            Category::Code => &[
                "py", "js", "html", "css", "java", "cpp", "c", "h", "json", "xml", "php", "rb",
                "go", "rs", "swift", "kt", "ts", "jsx", "tsx", "vue", "sh", "bat",
            ],
            Category::Executables => &["exe", "msi", "app", "deb", "dmg", "pkg", "apk"],
            Category::Books => &["epub", "mobi", "azw", "azw3"],
            Category::Other => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.dir_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Normalizes an extension for lookup: lowercase, one leading dot removed.
fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_lowercase();
    match lower.strip_prefix('.') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Maps file extensions to categories.
///
/// An extension maps to exactly one category. Registrations never
/// overwrite an existing mapping, so the first category to claim an
/// extension keeps it.
#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<String, Category>,
}

impl FileMapper {
    /// Creates a new `FileMapper` with the built-in table.
    pub fn new() -> Self {
        Self::with_overrides(std::iter::empty::<(String, Category)>())
    }

    /// Creates a `FileMapper` where the given mappings take precedence over
    /// the built-in table.
    pub fn with_overrides<I, S>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, Category)>,
        S: AsRef<str>,
    {
        let mut mapper = Self {
            extension_map: HashMap::new(),
        };
        for (ext, category) in overrides {
            mapper.add_extension_mapping(ext.as_ref(), category);
        }
        mapper.populate_standard_mappings();
        mapper
    }

    fn populate_standard_mappings(&mut self) {
        for category in Category::ALL {
            for ext in category.builtin_extensions() {
                self.add_extension_mapping(ext, category);
            }
        }
    }

    /// Adds an extension mapping unless the extension is already claimed.
    ///
    /// Returns `false` when an earlier mapping kept the extension.
    pub fn add_extension_mapping(&mut self, ext: &str, category: Category) -> bool {
        let key = normalize_extension(ext);
        if key.is_empty() || self.extension_map.contains_key(&key) {
            return false;
        }
        self.extension_map.insert(key, category);
        true
    }

    /// Looks up the category for an extension, with or without the leading
    /// dot and in any case. Unknown extensions are `Category::Other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldersort::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.category_of(".TAR.GZ"), Category::Archives);
    /// assert_eq!(mapper.category_of(""), Category::Other);
    /// ```
    pub fn category_of(&self, ext: &str) -> Category {
        self.extension_map
            .get(&normalize_extension(ext))
            .copied()
            .unwrap_or(Category::Other)
    }

    /// Categorizes a file by the extension after the last dot of its name.
    pub fn category_for_path(&self, path: &Path) -> Category {
        match path.extension() {
            Some(ext) => self.category_of(&ext.to_string_lossy()),
            None => Category::Other,
        }
    }

    /// Returns true if the extension has an explicit mapping.
    pub fn is_known(&self, ext: &str) -> bool {
        self.extension_map.contains_key(&normalize_extension(ext))
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}
