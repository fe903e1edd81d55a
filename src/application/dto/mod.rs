//! # Data Transfer Objects
//!
//! ドライバとユースケースの間で受け渡すデータ

pub mod action_result;
pub mod form_data;
pub mod forms;
pub mod list_params;
pub mod search_params;
