pub mod card;
pub mod error;
pub mod lark;
pub mod notifier;
