//! # Application Layer
//!
//! アプリケーション固有のビジネスフロー（ユースケース）
//!
//! ## 特徴
//!
//! - Domain層のエンティティとサービスを組み合わせてビジネスフローを実現
//! - Repository traitに依存（実装には依存しない）
//! - 検証エラーや失敗は `ActionResult` として返し、パニックしない
//!
//! ## 構成要素
//!
//! - **dto**: フォーム、一覧条件、アクション結果
//! - **use_cases**: エンティティごとのユースケース

pub mod dto;
pub mod use_cases;
