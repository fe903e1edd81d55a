//! # Domain Entities
//!
//! ドキュメントとして保存されるレコードと、その検証済みドラフト
//!
//! ## エンティティ
//!
//! - **Division**: 組織の部署
//! - **Member**: メンバー（写真必須）
//! - **Period**: 活動期間（数値ID）
//! - **Prestasi**: 実績（画像任意）
//! - **Product**: 商品（画像任意）
//! - **UploadedFile / StoredImage**: 画像アップロードの値オブジェクト

pub mod division;
pub mod member;
pub mod period;
pub mod prestasi;
pub mod product;
pub mod upload;

/// ドキュメントとして保存できるレコード
pub trait Record {
    /// 保存先コレクション名
    const COLLECTION: &'static str;

    /// 結果メッセージに使う表示名（例: "Member"）
    const LABEL: &'static str;
}
