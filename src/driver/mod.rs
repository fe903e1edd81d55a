//! # Driver Layer (Presentation)
//!
//! CLIとHTTP APIを提供
//!
//! ## 特徴
//!
//! - Use Caseを呼び出してビジネスフローを起動
//! - 依存性注入（DI）を行い、全てを組み立てる
//! - アクション結果をHTTPステータスに対応付ける
//!
//! ## 構成要素
//!
//! - **cli**: CLI引数のパース
//! - **app**: Repository実装とUse Caseの組み立て、サブコマンドの実行
//! - **http**: axumのルーターとハンドラ
//! - **server**: HTTPサーバーの起動と停止

pub mod app;
pub mod cli;
pub mod http;
pub mod server;

pub use app::{run, AppState};
pub use cli::{Args, Command};
