//! # Slug Service
//!
//! 部署名からURLスラッグを生成

/// 小文字化し、空白の連続を `-` 1文字に置き換える
///
/// ```
/// use orgdash::domain::services::slug::slugify;
///
/// assert_eq!(slugify("Riset dan  Teknologi"), "riset-dan-teknologi");
/// ```
pub fn slugify(name: &str) -> String {
    name.trim()
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
