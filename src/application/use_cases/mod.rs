//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **DivisionUseCase**: 部署の一覧・追加・更新・削除
//! - **MemberUseCase**: メンバーの一覧・追加・更新・削除（写真必須）
//! - **PeriodUseCase**: 活動期間の一覧・追加・更新・削除（数値ID）
//! - **PrestasiUseCase**: 実績の一覧・追加・更新・削除と選択肢
//! - **ProductUseCase**: 商品の一覧・追加・更新・削除とサンプル投入
//!
//! 更新系は全て `ActionResult` を返し、成功時は関連するページキャッシュを破棄する。

pub mod divisions;
pub mod images;
pub mod members;
pub mod periods;
pub mod prestasi;
pub mod products;
pub mod revalidate;
