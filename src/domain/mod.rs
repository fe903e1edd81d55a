//! # Domain Layer
//!
//! ダッシュボードが管理するレコードとビジネスルールを定義します。
//!
//! ## 特徴
//!
//! - HTTPやファイルシステムについて何も知らない
//! - 永続化はRepository trait（ポート）越しにのみ行う
//! - バリデーションルールはここに集約する
//!
//! ## 構成要素
//!
//! - **entities**: レコード（Division, Member, Period, Prestasi, Product）とアップロード値オブジェクト
//! - **repositories**: DocumentStore / ObjectStorage / PageCache trait
//! - **services**: バリデーション、一覧（検索・ページング）、スラッグ生成

pub mod entities;
pub mod repositories;
pub mod services;
