//! # Domain Services
//!
//! エンティティをまたぐ純粋なビジネスルール

pub mod listing;
pub mod slug;
pub mod validation;
