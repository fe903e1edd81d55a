//! # Orgdash
//!
//! 学生団体の管理ダッシュボード用バックエンド（部署・メンバー・期間・実績・商品）
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: エンティティ、検証ルール、一覧処理、リポジトリtrait（外部依存なし）
//! - **Application層**: 一覧・更新系のユースケースと画像の差し替えフロー
//! - **Adapter層**: 設定、JSONファイルのドキュメントストア、ローカルのオブジェクトストレージ、ページキャッシュ
//! - **Driver層**: CLI、依存性注入、HTTP API

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時にサーバー起動コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
