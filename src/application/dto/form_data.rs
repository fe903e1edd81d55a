//! # Form Data DTO
//!
//! フォーム送信の内容（テキストフィールドとファイル）

use crate::domain::entities::upload::UploadedFile;

/// フォーム送信の内容
///
/// ブラウザの `FormData` と同じく、同名フィールドを複数持てる
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<(String, UploadedFile)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// テキストフィールドを追加
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// ファイルを追加
    pub fn append_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.push((name.into(), file));
    }

    /// ビルダー形式でテキストフィールドを追加
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.append(name, value);
        self
    }

    /// ビルダー形式でファイルを追加
    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.append_file(name, file);
        self
    }

    /// 最初の値
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 最初の値（なければ空文字列）
    pub fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    /// 全ての値
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// 空でないファイル
    ///
    /// 0バイトのファイルは未選択として扱う
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files
            .iter()
            .find(|(key, file)| key == name && !file.is_empty())
            .map(|(_, file)| file)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (name, value) in iter {
            form.append(name, value);
        }
        form
    }
}
