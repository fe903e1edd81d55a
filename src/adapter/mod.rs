//! Adapter Layer
//!
//! 外部システム（ファイルシステム、プロセス内キャッシュ）との統合

pub mod config;
pub mod repositories;
